//! Per-run summary of sector outcomes.

use crate::export::ExportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Terminal status of one sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectorStatus {
    /// The sector contributed rows to the combined dataset.
    Done {
        /// Rows contributed.
        rows: usize,
    },
    /// The sector contributed nothing.
    SkippedEmpty {
        /// Why the sector was skipped.
        reason: String,
    },
}

/// Outcome of one sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorSummary {
    /// Sector identifier.
    pub sector: String,
    /// Companies the resolver returned.
    pub companies: usize,
    /// Terminal status.
    #[serde(flatten)]
    pub status: SectorStatus,
}

/// Summary of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// Sector outcomes in processing order.
    pub sectors: Vec<SectorSummary>,
}

impl RunReport {
    /// Create an empty report stamped now.
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            sectors: Vec::new(),
        }
    }

    /// Record a sector outcome.
    pub fn push(&mut self, summary: SectorSummary) {
        self.sectors.push(summary);
    }

    /// Rows contributed across all sectors.
    pub fn total_rows(&self) -> usize {
        self.sectors
            .iter()
            .map(|s| match s.status {
                SectorStatus::Done { rows } => rows,
                SectorStatus::SkippedEmpty { .. } => 0,
            })
            .sum()
    }

    /// Number of sectors that contributed rows.
    pub fn sectors_with_data(&self) -> usize {
        self.sectors
            .iter()
            .filter(|s| matches!(s.status, SectorStatus::Done { .. }))
            .count()
    }

    /// Plain-text table of sector outcomes.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Run at {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out, "{:<26} {:>9} {:>6}  Status", "Sector", "Companies", "Rows");
        let _ = writeln!(out, "{}", "-".repeat(60));
        for summary in &self.sectors {
            let (rows, status) = match &summary.status {
                SectorStatus::Done { rows } => (rows.to_string(), "done".to_string()),
                SectorStatus::SkippedEmpty { reason } => ("-".to_string(), format!("skipped: {reason}")),
            };
            let _ = writeln!(
                out,
                "{:<26} {:>9} {:>6}  {}",
                summary.sector, summary.companies, rows, status
            );
        }
        let _ = writeln!(out, "{}", "-".repeat(60));
        let _ = writeln!(
            out,
            "{} of {} sectors produced data, {} rows total",
            self.sectors_with_data(),
            self.sectors.len(),
            self.total_rows()
        );
        out
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
