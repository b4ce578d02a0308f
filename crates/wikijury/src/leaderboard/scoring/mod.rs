mod config;
mod ranking;
mod tariff;
mod time_bonus;
mod weighted;

pub use config::{criterion_from_label, ScoringOptions, Weights};
pub use tariff::{article_creation_points, PointBreakdown};
pub use time_bonus::{time_bonus_multipliers, TimeBonusSkipped};

use super::schema::{CanonicalTable, ContributorMetrics, InvalidCell, MetricField};
use super::summary::LeaderboardTotals;
use serde::Serialize;
use tracing::{debug, error, info};

/// Which policy produced a ranked table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    PointTariff,
    Weighted,
}

/// A canonical contributor plus its point breakdown and final placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredContributor {
    #[serde(flatten)]
    pub metrics: ContributorMetrics,
    pub article_creation_points: f64,
    pub wikidata_points: f64,
    pub upload_points: f64,
    pub commons_usage_points: f64,
    pub time_bonus: f64,
    pub score: f64,
    pub rank: usize,
}

/// Contributors sorted by descending score with dense ranks `1..=N`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTable {
    pub mode: ScoringMode,
    pub time_bonus_applied: bool,
    pub contributors: Vec<ScoredContributor>,
}

impl RankedTable {
    pub fn empty(mode: ScoringMode) -> Self {
        Self {
            mode,
            time_bonus_applied: false,
            contributors: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    pub fn find(&self, username: &str) -> Option<&ScoredContributor> {
        self.contributors
            .iter()
            .find(|contributor| contributor.metrics.username == username)
    }
}

/// Computation errors caught at the engine boundary.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringFailure {
    #[error(transparent)]
    InvalidCell(#[from] InvalidCell),
    #[error("the uploaded table contains no contributor rows")]
    EmptyInput,
    #[error("unknown scoring criterion '{label}'")]
    UnknownCriterion { label: String },
    #[error("weight for '{criterion}' must be a finite number, got {value}")]
    InvalidWeight { criterion: MetricField, value: f64 },
    #[error("labels '{first}' and '{second}' both weight '{criterion}'")]
    DuplicateCriterion {
        criterion: MetricField,
        first: String,
        second: String,
    },
    #[error("score for '{username}' is not a finite number")]
    NonFiniteScore { username: String },
}

/// Either a populated ranking or the structured reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringOutcome {
    Ranked(RankedTable),
    Failed(ScoringFailure),
}

impl ScoringOutcome {
    pub fn is_ranked(&self) -> bool {
        matches!(self, Self::Ranked(_))
    }

    pub fn ranked(&self) -> Option<&RankedTable> {
        match self {
            Self::Ranked(table) => Some(table),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ScoringFailure> {
        match self {
            Self::Ranked(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    /// Collapses a failure to an empty table, the "analysis failed" signal.
    pub fn into_table(self, mode: ScoringMode) -> RankedTable {
        match self {
            Self::Ranked(table) => table,
            Self::Failed(_) => RankedTable::empty(mode),
        }
    }
}

/// Stateless scorer applying either the fixed tariff or a weighted blend.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    options: ScoringOptions,
}

impl ScoringEngine {
    pub fn new(options: ScoringOptions) -> Self {
        Self { options }
    }

    pub fn mode(&self) -> ScoringMode {
        if self.options.weights.is_some() {
            ScoringMode::Weighted
        } else {
            ScoringMode::PointTariff
        }
    }

    pub fn score(&self, table: &CanonicalTable) -> ScoringOutcome {
        match self.try_score(table) {
            Ok(ranked) => {
                let totals = LeaderboardTotals::from_table(&ranked);
                info!(
                    data_type = %table.data_type,
                    mode = ?ranked.mode,
                    contributors = totals.contributors,
                    total_uploads = totals.total_uploads,
                    total_points = totals.total_points,
                    "scored contributors"
                );
                ScoringOutcome::Ranked(ranked)
            }
            Err(failure) => {
                error!(
                    data_type = %table.data_type,
                    mode = ?self.mode(),
                    %failure,
                    "analysis failed"
                );
                ScoringOutcome::Failed(failure)
            }
        }
    }

    fn try_score(&self, table: &CanonicalTable) -> Result<RankedTable, ScoringFailure> {
        if table.is_empty() {
            return Err(ScoringFailure::EmptyInput);
        }

        let (contributors, time_bonus_applied) = match &self.options.weights {
            Some(weights) => (weighted::score_weighted(table, weights)?, false),
            None => self.score_tariff(table),
        };

        if let Some(bad) = contributors.iter().find(|c| !c.score.is_finite()) {
            return Err(ScoringFailure::NonFiniteScore {
                username: bad.metrics.username.clone(),
            });
        }

        Ok(RankedTable {
            mode: self.mode(),
            time_bonus_applied,
            contributors: ranking::assign_ranks(contributors),
        })
    }

    fn score_tariff(&self, table: &CanonicalTable) -> (Vec<ScoredContributor>, bool) {
        let multipliers = if self.options.include_time_bonus {
            match time_bonus_multipliers(table) {
                Ok(multipliers) => Some(multipliers),
                Err(skipped) => {
                    debug!(reason = %skipped, "time bonus skipped");
                    None
                }
            }
        } else {
            None
        };

        let contributors = table
            .contributors
            .iter()
            .enumerate()
            .map(|(index, metrics)| {
                let points = PointBreakdown::for_contributor(metrics);
                let time_bonus = multipliers
                    .as_ref()
                    .map(|values| values[index])
                    .unwrap_or(1.0);
                ScoredContributor {
                    metrics: metrics.clone(),
                    article_creation_points: points.article_creation_points,
                    wikidata_points: points.wikidata_points,
                    upload_points: points.upload_points,
                    commons_usage_points: points.commons_usage_points,
                    time_bonus,
                    score: points.total() * time_bonus,
                    rank: 0,
                }
            })
            .collect();

        (contributors, multipliers.is_some())
    }
}

/// Two-decimal rounding used only when presenting or exporting values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
