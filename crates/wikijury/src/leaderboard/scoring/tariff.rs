use super::super::schema::ContributorMetrics;

const LONG_ARTICLE_BYTES: f64 = 4000.0;
const MEDIUM_ARTICLE_BYTES: f64 = 1500.0;
const LONG_ARTICLE_POINTS: f64 = 5.0;
const MEDIUM_ARTICLE_POINTS: f64 = 3.0;
const WIKIDATA_POINTS: f64 = 3.0;
const UPLOAD_POINTS: f64 = 3.0;
const COMMONS_USAGE_POINTS: f64 = 1.0;

/// Points awarded by the campaign's fixed tariff.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointBreakdown {
    pub article_creation_points: f64,
    pub wikidata_points: f64,
    pub upload_points: f64,
    pub commons_usage_points: f64,
}

impl PointBreakdown {
    pub fn for_contributor(metrics: &ContributorMetrics) -> Self {
        Self {
            article_creation_points: article_creation_points(
                metrics.articles_created,
                metrics.bytes_added,
            ),
            wikidata_points: metrics.wikidata_edits as f64 * WIKIDATA_POINTS,
            upload_points: metrics.upload_count as f64 * UPLOAD_POINTS,
            // articles_edited carries the reuse count of uploaded files.
            commons_usage_points: metrics.articles_edited as f64 * COMMONS_USAGE_POINTS,
        }
    }

    pub fn total(&self) -> f64 {
        self.article_creation_points
            + self.wikidata_points
            + self.upload_points
            + self.commons_usage_points
    }
}

/// One tier per contributor, chosen from the average size of their creations.
pub fn article_creation_points(articles_created: u64, bytes_added: u64) -> f64 {
    if articles_created == 0 {
        return 0.0;
    }

    let created = articles_created as f64;
    let bytes_per_article = bytes_added as f64 / created;
    if bytes_per_article >= LONG_ARTICLE_BYTES {
        LONG_ARTICLE_POINTS * created
    } else if bytes_per_article >= MEDIUM_ARTICLE_BYTES {
        MEDIUM_ARTICLE_POINTS * created
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_tiers_follow_average_size() {
        assert_eq!(article_creation_points(2, 9000), 10.0);
        assert_eq!(article_creation_points(2, 3000), 6.0);
        assert_eq!(article_creation_points(2, 1000), 0.0);
        assert_eq!(article_creation_points(0, 50_000), 0.0);
        assert_eq!(article_creation_points(1, 4000), 5.0);
    }

    #[test]
    fn uploads_and_wikidata_score_three_points_each() {
        let mut metrics = ContributorMetrics::new("Alice");
        metrics.upload_count = 4;
        metrics.wikidata_edits = 2;
        metrics.articles_edited = 5;

        let points = PointBreakdown::for_contributor(&metrics);
        assert_eq!(points.upload_points, 12.0);
        assert_eq!(points.wikidata_points, 6.0);
        assert_eq!(points.commons_usage_points, 5.0);
        assert_eq!(points.article_creation_points, 0.0);
        assert_eq!(points.total(), 23.0);
    }
}
