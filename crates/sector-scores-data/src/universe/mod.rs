//! Offline sector universe.
//!
//! A built-in table of large-cap constituents keyed by the provider's
//! sector identifiers. Used when the live sectors endpoint is unavailable
//! and as a deterministic resolver in tests.

pub mod constituents;
pub mod sector;

pub use constituents::{Constituent, StaticUniverse};
pub use sector::Sector;
