//! Contributor leaderboard for Wikimedia campaign exports.
//!
//! A raw upload (editors, overview, articles or commons export) is reconciled
//! onto seven canonical counters by the [`adapter`], then ranked by the
//! [`scoring`] engine under either the campaign's fixed point tariff or a
//! weighted blend of normalized metrics. The engine keeps no state between
//! calls; [`session::AnalysisSession`] holds the caller's last upload.

pub mod adapter;
mod aliases;
mod cells;
pub mod export;
mod headers;
pub mod normalization;
pub mod router;
pub mod schema;
pub mod scoring;
pub mod session;
pub mod summary;
pub mod table;
pub mod views;

#[cfg(test)]
mod tests;

pub use adapter::adapt;
pub use export::{write_csv, DEFAULT_EXPORT_FILE_NAME};
pub use normalization::normalize;
pub use router::leaderboard_router;
pub use schema::{
    AdaptError, Advisory, CanonicalTable, ContributorMetrics, DataType, FieldProvenance,
    InvalidCell, MetricField, Provenance, SchemaError,
};
pub use scoring::{
    RankedTable, ScoredContributor, ScoringEngine, ScoringFailure, ScoringMode, ScoringOptions,
    ScoringOutcome, Weights,
};
pub use session::{AnalysisSession, SessionError};
pub use summary::{contributor_summary, ContributorSummary, LeaderboardTotals};
pub use table::{RawTable, TableError};
pub use views::LeaderboardRow;

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{error, warn};

/// Caller-facing knobs, with weights still keyed by their user labels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f64>>,
    #[serde(default = "default_include_time_bonus")]
    pub include_time_bonus: bool,
}

fn default_include_time_bonus() -> bool {
    true
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            weights: None,
            include_time_bonus: true,
        }
    }
}

impl AnalysisOptions {
    pub fn with_time_bonus(mut self, include_time_bonus: bool) -> Self {
        self.include_time_bonus = include_time_bonus;
        self
    }

    pub fn with_weight(mut self, label: impl Into<String>, weight: f64) -> Self {
        self.weights
            .get_or_insert_with(BTreeMap::new)
            .insert(label.into(), weight);
        self
    }

    fn scoring_options(&self) -> Result<ScoringOptions, ScoringFailure> {
        match &self.weights {
            Some(labels) => Ok(ScoringOptions::weighted(Weights::from_labels(
                labels.iter().map(|(label, weight)| (label.as_str(), *weight)),
            )?)),
            None => Ok(ScoringOptions::point_tariff(self.include_time_bonus)),
        }
    }

    fn mode(&self) -> ScoringMode {
        if self.weights.is_some() {
            ScoringMode::Weighted
        } else {
            ScoringMode::PointTariff
        }
    }
}

/// Everything a renderer needs from one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub data_type: DataType,
    pub mode: ScoringMode,
    pub advisories: Vec<Advisory>,
    pub provenance: FieldProvenance,
    pub outcome: ScoringOutcome,
}

impl AnalysisReport {
    pub fn is_ranked(&self) -> bool {
        self.outcome.is_ranked()
    }

    pub fn ranked(&self) -> Option<&RankedTable> {
        self.outcome.ranked()
    }

    /// The ranking, or an empty table when the analysis failed.
    pub fn table(&self) -> RankedTable {
        self.outcome.clone().into_table(self.mode)
    }

    pub fn totals(&self) -> LeaderboardTotals {
        self.ranked()
            .map(LeaderboardTotals::from_table)
            .unwrap_or_default()
    }
}

/// Runs adaptation and scoring for one data type.
#[derive(Debug, Clone, Copy)]
pub struct LeaderboardEngine {
    data_type: DataType,
}

impl LeaderboardEngine {
    pub fn new(data_type: DataType) -> Self {
        Self { data_type }
    }

    /// Only a missing identity column aborts; every other problem comes back
    /// as a failed outcome.
    pub fn analyze(
        &self,
        raw: &RawTable,
        options: &AnalysisOptions,
    ) -> Result<AnalysisReport, SchemaError> {
        let mode = options.mode();
        let canonical = match adapt(raw, self.data_type) {
            Ok(canonical) => canonical,
            Err(AdaptError::Schema(error)) => return Err(error),
            Err(AdaptError::InvalidCell(cell)) => {
                let failure = ScoringFailure::from(cell);
                error!(data_type = %self.data_type, %failure, "analysis failed");
                return Ok(self.failed(mode, Vec::new(), FieldProvenance::default(), failure));
            }
        };

        for advisory in &canonical.advisories {
            warn!(
                data_type = %self.data_type,
                advisory = %advisory.message(),
                "adapted with advisory"
            );
        }

        let scoring = match options.scoring_options() {
            Ok(scoring) => scoring,
            Err(failure) => {
                error!(data_type = %self.data_type, %failure, "analysis failed");
                return Ok(self.failed(
                    mode,
                    canonical.advisories,
                    canonical.provenance,
                    failure,
                ));
            }
        };

        let outcome = ScoringEngine::new(scoring).score(&canonical);
        Ok(AnalysisReport {
            data_type: self.data_type,
            mode,
            advisories: canonical.advisories,
            provenance: canonical.provenance,
            outcome,
        })
    }

    fn failed(
        &self,
        mode: ScoringMode,
        advisories: Vec<Advisory>,
        provenance: FieldProvenance,
        failure: ScoringFailure,
    ) -> AnalysisReport {
        AnalysisReport {
            data_type: self.data_type,
            mode,
            advisories,
            provenance,
            outcome: ScoringOutcome::Failed(failure),
        }
    }
}
