use super::schema::{Advisory, ContributorMetrics};
use super::scoring::{round2, RankedTable, ScoredContributor};
use serde::Serialize;

/// A ranked contributor with points rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
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

impl From<&ScoredContributor> for LeaderboardRow {
    fn from(contributor: &ScoredContributor) -> Self {
        Self {
            metrics: contributor.metrics.clone(),
            article_creation_points: round2(contributor.article_creation_points),
            wikidata_points: round2(contributor.wikidata_points),
            upload_points: round2(contributor.upload_points),
            commons_usage_points: round2(contributor.commons_usage_points),
            time_bonus: round2(contributor.time_bonus),
            score: round2(contributor.score),
            rank: contributor.rank,
        }
    }
}

pub fn leaderboard_rows(table: &RankedTable) -> Vec<LeaderboardRow> {
    table.contributors.iter().map(LeaderboardRow::from).collect()
}

/// An advisory with its user-facing messages attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryView {
    #[serde(flatten)]
    pub advisory: Advisory,
    pub message: String,
    pub message_fr: String,
}

impl From<&Advisory> for AdvisoryView {
    fn from(advisory: &Advisory) -> Self {
        Self {
            advisory: advisory.clone(),
            message: advisory.message(),
            message_fr: advisory.message_fr(),
        }
    }
}

pub fn advisory_views(advisories: &[Advisory]) -> Vec<AdvisoryView> {
    advisories.iter().map(AdvisoryView::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rows_round_but_keep_rank() {
        let contributor = ScoredContributor {
            metrics: ContributorMetrics::new("Alice"),
            article_creation_points: 5.0,
            wikidata_points: 0.0,
            upload_points: 0.0,
            commons_usage_points: 0.0,
            time_bonus: 1.066_666,
            score: 5.333_33,
            rank: 3,
        };

        let row = LeaderboardRow::from(&contributor);
        assert_eq!(row.score, 5.33);
        assert_eq!(row.time_bonus, 1.07);
        assert_eq!(row.rank, 3);
        assert_eq!(contributor.score, 5.333_33);
    }
}
