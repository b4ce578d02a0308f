use super::schema::MetricField;
use super::scoring::{RankedTable, ScoredContributor};
use std::io::Write;

pub const DEFAULT_EXPORT_FILE_NAME: &str = "classement_wikijury.csv";

const POINT_COLUMNS: [&str; 6] = [
    "article_creation_points",
    "wikidata_points",
    "upload_points",
    "commons_usage_points",
    "score",
    "rank",
];

/// Header row of the exported ranking.
pub fn export_columns() -> Vec<&'static str> {
    std::iter::once("username")
        .chain(MetricField::ALL.iter().map(|field| field.key()))
        .chain(POINT_COLUMNS)
        .collect()
}

/// Writes the ranking as UTF-8 comma-separated text with two-decimal points.
pub fn write_csv<W: Write>(table: &RankedTable, writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(export_columns())?;
    for contributor in &table.contributors {
        writer.write_record(export_record(contributor))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(table: &RankedTable) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(buffer)
}

fn export_record(contributor: &ScoredContributor) -> Vec<String> {
    let metrics = &contributor.metrics;
    let mut record = Vec::with_capacity(15);
    record.push(metrics.username.clone());
    record.extend(MetricField::ALL.iter().map(|field| metrics.get(*field).to_string()));
    record.extend(
        [
            contributor.article_creation_points,
            contributor.wikidata_points,
            contributor.upload_points,
            contributor.commons_usage_points,
            contributor.score,
        ]
        .iter()
        .map(|value| format!("{value:.2}")),
    );
    record.push(contributor.rank.to_string());
    record
}
