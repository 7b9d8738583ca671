//! Provider sector identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eleven market sectors, identified by provider key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sector {
    /// Basic Materials
    BasicMaterials,

    /// Communication Services
    CommunicationServices,

    /// Consumer Cyclical
    ConsumerCyclical,

    /// Consumer Defensive
    ConsumerDefensive,

    /// Energy
    Energy,

    /// Financial Services
    FinancialServices,

    /// Healthcare
    Healthcare,

    /// Industrials
    Industrials,

    /// Real Estate
    RealEstate,

    /// Technology
    Technology,

    /// Utilities
    Utilities,
}

impl Sector {
    /// Returns all sectors in processing order.
    pub fn all() -> Vec<Self> {
        vec![
            Self::BasicMaterials,
            Self::CommunicationServices,
            Self::ConsumerCyclical,
            Self::ConsumerDefensive,
            Self::Energy,
            Self::FinancialServices,
            Self::Healthcare,
            Self::Industrials,
            Self::RealEstate,
            Self::Technology,
            Self::Utilities,
        ]
    }

    /// Returns the provider key.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::BasicMaterials => "basic-materials",
            Self::CommunicationServices => "communication-services",
            Self::ConsumerCyclical => "consumer-cyclical",
            Self::ConsumerDefensive => "consumer-defensive",
            Self::Energy => "energy",
            Self::FinancialServices => "financial-services",
            Self::Healthcare => "healthcare",
            Self::Industrials => "industrials",
            Self::RealEstate => "real-estate",
            Self::Technology => "technology",
            Self::Utilities => "utilities",
        }
    }

    /// Returns the display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BasicMaterials => "Basic Materials",
            Self::CommunicationServices => "Communication Services",
            Self::ConsumerCyclical => "Consumer Cyclical",
            Self::ConsumerDefensive => "Consumer Defensive",
            Self::Energy => "Energy",
            Self::FinancialServices => "Financial Services",
            Self::Healthcare => "Healthcare",
            Self::Industrials => "Industrials",
            Self::RealEstate => "Real Estate",
            Self::Technology => "Technology",
            Self::Utilities => "Utilities",
        }
    }

    /// Parse a sector from its provider key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|s| s.key() == key)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
