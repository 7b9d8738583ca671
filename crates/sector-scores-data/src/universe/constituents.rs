//! Built-in large-cap constituents per sector.

use crate::error::Result;
use crate::source::SectorResolver;
use crate::universe::sector::Sector;
use async_trait::async_trait;
use std::collections::HashMap;

/// A constituent ticker and its sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constituent {
    /// Stock symbol.
    pub symbol: String,
    /// Sector.
    pub sector: Sector,
}

impl Constituent {
    /// Create a new constituent.
    pub fn new(symbol: impl Into<String>, sector: Sector) -> Self {
        Self {
            symbol: symbol.into(),
            sector,
        }
    }
}

/// Offline sector universe.
#[derive(Debug, Clone)]
pub struct StaticUniverse {
    constituents: Vec<Constituent>,
}

impl StaticUniverse {
    /// Create a universe with the default constituents.
    pub fn new() -> Self {
        Self::from_constituents(Self::default_constituents())
    }

    /// Create a universe from an explicit constituent list.
    pub const fn from_constituents(constituents: Vec<Constituent>) -> Self {
        Self { constituents }
    }

    /// Get all constituents.
    pub fn constituents(&self) -> &[Constituent] {
        &self.constituents
    }

    /// Get all symbols in a specific sector, in table order.
    pub fn symbols_in_sector(&self, sector: Sector) -> Vec<String> {
        self.constituents
            .iter()
            .filter(|c| c.sector == sector)
            .map(|c| c.symbol.clone())
            .collect()
    }

    /// Get the count of constituents per sector.
    pub fn sector_counts(&self) -> HashMap<Sector, usize> {
        let mut counts = HashMap::new();
        for constituent in &self.constituents {
            *counts.entry(constituent.sector).or_insert(0) += 1;
        }
        counts
    }

    /// Default constituents (100+ stocks across all 11 sectors).
    fn default_constituents() -> Vec<Constituent> {
        use Sector::*;

        vec![
            // Technology - 15 stocks
            Constituent::new("AAPL", Technology),
            Constituent::new("MSFT", Technology),
            Constituent::new("NVDA", Technology),
            Constituent::new("AVGO", Technology),
            Constituent::new("ORCL", Technology),
            Constituent::new("CSCO", Technology),
            Constituent::new("ACN", Technology),
            Constituent::new("AMD", Technology),
            Constituent::new("IBM", Technology),
            Constituent::new("INTC", Technology),
            Constituent::new("TXN", Technology),
            Constituent::new("QCOM", Technology),
            Constituent::new("ADBE", Technology),
            Constituent::new("CRM", Technology),
            Constituent::new("NOW", Technology),
            // Healthcare - 12 stocks
            Constituent::new("LLY", Healthcare),
            Constituent::new("UNH", Healthcare),
            Constituent::new("JNJ", Healthcare),
            Constituent::new("ABBV", Healthcare),
            Constituent::new("MRK", Healthcare),
            Constituent::new("TMO", Healthcare),
            Constituent::new("ABT", Healthcare),
            Constituent::new("DHR", Healthcare),
            Constituent::new("PFE", Healthcare),
            Constituent::new("BMY", Healthcare),
            Constituent::new("AMGN", Healthcare),
            Constituent::new("GILD", Healthcare),
            // Financial Services - 12 stocks
            Constituent::new("BRK.B", FinancialServices),
            Constituent::new("JPM", FinancialServices),
            Constituent::new("V", FinancialServices),
            Constituent::new("MA", FinancialServices),
            Constituent::new("BAC", FinancialServices),
            Constituent::new("WFC", FinancialServices),
            Constituent::new("MS", FinancialServices),
            Constituent::new("GS", FinancialServices),
            Constituent::new("BLK", FinancialServices),
            Constituent::new("C", FinancialServices),
            Constituent::new("AXP", FinancialServices),
            Constituent::new("SCHW", FinancialServices),
            // Consumer Cyclical - 12 stocks
            Constituent::new("AMZN", ConsumerCyclical),
            Constituent::new("TSLA", ConsumerCyclical),
            Constituent::new("HD", ConsumerCyclical),
            Constituent::new("MCD", ConsumerCyclical),
            Constituent::new("NKE", ConsumerCyclical),
            Constituent::new("SBUX", ConsumerCyclical),
            Constituent::new("LOW", ConsumerCyclical),
            Constituent::new("TJX", ConsumerCyclical),
            Constituent::new("BKNG", ConsumerCyclical),
            Constituent::new("CMG", ConsumerCyclical),
            Constituent::new("F", ConsumerCyclical),
            Constituent::new("GM", ConsumerCyclical),
            // Communication Services - 10 stocks
            Constituent::new("GOOGL", CommunicationServices),
            Constituent::new("GOOG", CommunicationServices),
            Constituent::new("META", CommunicationServices),
            Constituent::new("NFLX", CommunicationServices),
            Constituent::new("DIS", CommunicationServices),
            Constituent::new("CMCSA", CommunicationServices),
            Constituent::new("T", CommunicationServices),
            Constituent::new("VZ", CommunicationServices),
            Constituent::new("TMUS", CommunicationServices),
            Constituent::new("EA", CommunicationServices),
            // Industrials - 12 stocks
            Constituent::new("CAT", Industrials),
            Constituent::new("UNP", Industrials),
            Constituent::new("RTX", Industrials),
            Constituent::new("HON", Industrials),
            Constituent::new("UPS", Industrials),
            Constituent::new("BA", Industrials),
            Constituent::new("DE", Industrials),
            Constituent::new("LMT", Industrials),
            Constituent::new("GE", Industrials),
            Constituent::new("MMM", Industrials),
            Constituent::new("FDX", Industrials),
            Constituent::new("NSC", Industrials),
            // Consumer Defensive - 10 stocks
            Constituent::new("WMT", ConsumerDefensive),
            Constituent::new("PG", ConsumerDefensive),
            Constituent::new("COST", ConsumerDefensive),
            Constituent::new("KO", ConsumerDefensive),
            Constituent::new("PEP", ConsumerDefensive),
            Constituent::new("PM", ConsumerDefensive),
            Constituent::new("MO", ConsumerDefensive),
            Constituent::new("CL", ConsumerDefensive),
            Constituent::new("MDLZ", ConsumerDefensive),
            Constituent::new("KHC", ConsumerDefensive),
            // Energy - 10 stocks
            Constituent::new("XOM", Energy),
            Constituent::new("CVX", Energy),
            Constituent::new("COP", Energy),
            Constituent::new("SLB", Energy),
            Constituent::new("EOG", Energy),
            Constituent::new("MPC", Energy),
            Constituent::new("PSX", Energy),
            Constituent::new("VLO", Energy),
            Constituent::new("OXY", Energy),
            Constituent::new("HAL", Energy),
            // Utilities - 8 stocks
            Constituent::new("NEE", Utilities),
            Constituent::new("SO", Utilities),
            Constituent::new("DUK", Utilities),
            Constituent::new("CEG", Utilities),
            Constituent::new("AEP", Utilities),
            Constituent::new("EXC", Utilities),
            Constituent::new("XEL", Utilities),
            Constituent::new("D", Utilities),
            // Real Estate - 8 stocks
            Constituent::new("PLD", RealEstate),
            Constituent::new("AMT", RealEstate),
            Constituent::new("EQIX", RealEstate),
            Constituent::new("CCI", RealEstate),
            Constituent::new("PSA", RealEstate),
            Constituent::new("SPG", RealEstate),
            Constituent::new("O", RealEstate),
            Constituent::new("WELL", RealEstate),
            // Basic Materials - 10 stocks
            Constituent::new("LIN", BasicMaterials),
            Constituent::new("APD", BasicMaterials),
            Constituent::new("SHW", BasicMaterials),
            Constituent::new("FCX", BasicMaterials),
            Constituent::new("NEM", BasicMaterials),
            Constituent::new("ECL", BasicMaterials),
            Constituent::new("DD", BasicMaterials),
            Constituent::new("DOW", BasicMaterials),
            Constituent::new("PPG", BasicMaterials),
            Constituent::new("NUE", BasicMaterials),
        ]
    }
}

impl Default for StaticUniverse {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SectorResolver for StaticUniverse {
    async fn resolve(&self, sector: &str) -> Result<Vec<String>> {
        Ok(Sector::from_key(sector)
            .map(|s| self.symbols_in_sector(s))
            .unwrap_or_default())
    }
}
