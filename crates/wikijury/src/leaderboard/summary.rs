use super::schema::ContributorMetrics;
use super::scoring::RankedTable;
use serde::Serialize;

/// Campaign-wide figures shown above the leaderboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeaderboardTotals {
    pub contributors: usize,
    pub total_uploads: u64,
    pub total_points: f64,
}

impl LeaderboardTotals {
    pub fn from_table(table: &RankedTable) -> Self {
        table
            .contributors
            .iter()
            .fold(Self::default(), |mut totals, contributor| {
                totals.contributors += 1;
                totals.total_uploads = totals
                    .total_uploads
                    .saturating_add(contributor.metrics.upload_count);
                totals.total_points += contributor.score;
                totals
            })
    }
}

/// One contributor's line of the leaderboard; `rank == 0` means not ranked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorSummary {
    #[serde(flatten)]
    pub metrics: ContributorMetrics,
    pub score: f64,
    pub rank: usize,
}

impl ContributorSummary {
    pub fn is_ranked(&self) -> bool {
        self.rank > 0
    }
}

pub fn contributor_summary(table: &RankedTable, username: &str) -> ContributorSummary {
    match table.find(username) {
        Some(contributor) => ContributorSummary {
            metrics: contributor.metrics.clone(),
            score: contributor.score,
            rank: contributor.rank,
        },
        None => ContributorSummary {
            metrics: ContributorMetrics::new(username),
            score: 0.0,
            rank: 0,
        },
    }
}
