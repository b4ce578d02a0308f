use super::common::*;

use crate::leaderboard::scoring::ScoringOutcome;
use crate::leaderboard::{
    AnalysisOptions, DataType, LeaderboardEngine, MetricField, ScoringFailure, ScoringMode,
};

fn close(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}

#[test]
fn point_tariff_with_time_bonus_rewards_early_enrollment() {
    let report = analyze(DataType::Editors, EDITORS_CSV, AnalysisOptions::default());
    let table = ranked(&report);

    assert_eq!(table.mode, ScoringMode::PointTariff);
    assert!(table.time_bonus_applied);
    assert_eq!(usernames(table), vec!["Alice", "Chloé", "Bruno"]);

    let alice = &table.contributors[0];
    assert_eq!(alice.article_creation_points, 10.0);
    assert_eq!(alice.wikidata_points, 6.0);
    assert_eq!(alice.upload_points, 12.0);
    assert_eq!(alice.commons_usage_points, 14.0);
    assert!(close(alice.time_bonus, 1.1));
    assert!(close(alice.score, 46.2));

    let chloe = &table.contributors[1];
    assert!(close(chloe.time_bonus, 1.05));
    assert!(close(chloe.score, 19.95));

    let bruno = &table.contributors[2];
    assert_eq!(bruno.article_creation_points, 6.0);
    assert_eq!(bruno.time_bonus, 1.0);
    assert_eq!(bruno.score, 9.0);
}

#[test]
fn disabling_the_time_bonus_keeps_raw_points() {
    let options = AnalysisOptions::default().with_time_bonus(false);
    let report = analyze(DataType::Editors, EDITORS_CSV, options);
    let table = ranked(&report);

    assert!(!table.time_bonus_applied);
    let scores: Vec<f64> = table.contributors.iter().map(|row| row.score).collect();
    assert_eq!(scores, vec![42.0, 19.0, 9.0]);
    assert!(table.contributors.iter().all(|row| row.time_bonus == 1.0));
}

#[test]
fn unparseable_enrollment_dates_leave_scores_neutral() {
    let csv = "username,upload_count,enrollment_timestamp\nA,1,2025-03-01\nB,2,bientôt\n";
    let report = analyze(DataType::Editors, csv, AnalysisOptions::default());
    let table = ranked(&report);

    assert!(!table.time_bonus_applied);
    assert_eq!(table.contributors[0].score, 6.0);
    assert_eq!(table.contributors[1].score, 3.0);
}

#[test]
fn ranks_are_dense_and_follow_descending_scores() {
    let report = analyze(DataType::Editors, EDITORS_CSV, AnalysisOptions::default());
    let table = ranked(&report);

    let ranks: Vec<usize> = table.contributors.iter().map(|row| row.rank).collect();
    assert_eq!(ranks, (1..=table.len()).collect::<Vec<_>>());
    assert!(table
        .contributors
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn commons_scenario_ranks_uploaders() {
    let report = analyze(DataType::Commons, COMMONS_CSV, AnalysisOptions::default());
    let table = ranked(&report);

    assert_eq!(usernames(table), vec!["A", "B"]);
    assert_eq!(table.contributors[0].score, 6.0);
    assert_eq!(table.contributors[0].rank, 1);
    assert_eq!(table.contributors[1].score, 3.0);
    assert_eq!(table.contributors[1].rank, 2);
}

#[test]
fn articles_export_scores_new_article_tiers() {
    let report = analyze(DataType::Articles, ARTICLES_CSV, AnalysisOptions::default());
    let table = ranked(&report);

    assert_eq!(usernames(table), vec!["Alice", "Bruno"]);
    assert_eq!(table.contributors[0].article_creation_points, 5.0);
    assert_eq!(table.contributors[1].article_creation_points, 3.0);
}

#[test]
fn overview_rows_are_ranked_by_wiki() {
    let report = analyze(DataType::Overview, OVERVIEW_CSV, AnalysisOptions::default());
    let table = ranked(&report);

    assert_eq!(usernames(table), vec!["fr.wikipedia.org", "www.wikidata.org"]);
    assert_eq!(table.contributors[0].score, 60.0);
}

#[test]
fn weighted_mode_blends_normalized_columns() {
    let options = AnalysisOptions::default()
        .with_weight("Octets ajoutés", 1.0)
        .with_weight("upload_count", 2.0);
    let report = analyze(DataType::Editors, EDITORS_CSV, options);
    let table = ranked(&report);

    assert_eq!(table.mode, ScoringMode::Weighted);
    assert!(!table.time_bonus_applied);
    // bytes: Alice 1.0, Bruno 0.25, Chloé 0.0; uploads: 1.0, 0.0, 0.25
    assert_eq!(usernames(table), vec!["Alice", "Chloé", "Bruno"]);
    assert_eq!(table.contributors[0].score, 3.0);
    assert_eq!(table.contributors[1].score, 0.5);
    assert_eq!(table.contributors[2].score, 0.25);
    assert!(table.contributors.iter().all(|row| row.upload_points == 0.0));
}

#[test]
fn unknown_weight_label_fails_without_panicking() {
    let options = AnalysisOptions::default().with_weight("popularité", 1.0);
    let report = analyze(DataType::Editors, EDITORS_CSV, options);

    assert!(!report.is_ranked());
    assert!(matches!(
        report.outcome,
        ScoringOutcome::Failed(ScoringFailure::UnknownCriterion { .. })
    ));
    assert!(report.table().is_empty());
}

#[test]
fn invalid_cells_become_a_failed_outcome() {
    let report = analyze(
        DataType::Editors,
        "username,upload_count\nAlice,deux\n",
        AnalysisOptions::default(),
    );

    match report.outcome.failure() {
        Some(ScoringFailure::InvalidCell(cell)) => assert_eq!(cell.value, "deux"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn header_only_upload_is_an_empty_input_failure() {
    let report = analyze(
        DataType::Editors,
        "username,upload_count\n",
        AnalysisOptions::default(),
    );

    assert_eq!(report.outcome.failure(), Some(&ScoringFailure::EmptyInput));
    assert_eq!(report.totals().contributors, 0);
}

#[test]
fn missing_upload_column_scores_zero_upload_points() {
    let report = analyze(
        DataType::Editors,
        "username,total_edits,www.wikidata.org_edits\nAlice,10,1\nBruno,4,0\n",
        AnalysisOptions::default(),
    );
    let table = ranked(&report);

    assert!(table
        .contributors
        .iter()
        .all(|row| row.metrics.upload_count == 0 && row.upload_points == 0.0));
    assert!(report
        .provenance
        .defaulted_fields()
        .contains(&MetricField::UploadCount));
}

#[test]
fn rerunning_the_engine_is_deterministic() {
    let engine = LeaderboardEngine::new(DataType::Editors);
    let table = raw(EDITORS_CSV);
    let options = AnalysisOptions::default();

    let first = engine.analyze(&table, &options).expect("analysis");
    let second = engine.analyze(&table, &options).expect("analysis");
    assert_eq!(first, second);
}

#[test]
fn thousands_separators_keep_the_article_tier() {
    let csv = "username,mainspace_bytes_added,total_articles_created\nAlice,\"12,500\",2\n";
    let report = analyze(DataType::Editors, csv, AnalysisOptions::default());
    let alice = &ranked(&report).contributors[0];

    assert_eq!(alice.metrics.bytes_added, 12_500);
    assert_eq!(alice.article_creation_points, 10.0);
}

#[test]
fn fractional_comma_counts_fail_the_analysis() {
    let report = analyze(
        DataType::Editors,
        "username,upload_count\nAlice,\"2,6\"\n",
        AnalysisOptions::default(),
    );

    match report.outcome.failure() {
        Some(ScoringFailure::InvalidCell(cell)) => assert_eq!(cell.value, "2,6"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn duplicate_weight_criteria_fail_the_analysis() {
    let options = AnalysisOptions::default()
        .with_weight("Octets ajoutés", 2.0)
        .with_weight("bytes_added", 1.0);
    let report = analyze(DataType::Editors, EDITORS_CSV, options);

    assert!(matches!(
        report.outcome,
        ScoringOutcome::Failed(ScoringFailure::DuplicateCriterion {
            criterion: MetricField::BytesAdded,
            ..
        })
    ));
}
