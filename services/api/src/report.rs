use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use wikijury::config::AppConfig;
use wikijury::error::AppError;
use wikijury::leaderboard::views::leaderboard_rows;
use wikijury::leaderboard::{
    contributor_summary, write_csv, AnalysisOptions, AnalysisReport, AnalysisSession,
    ContributorSummary, DataType, MetricField, RankedTable, ScoringOutcome,
    DEFAULT_EXPORT_FILE_NAME,
};

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Campaign export (.csv, .tsv, .xlsx, .xls or .ods)
    pub(crate) file: PathBuf,
    /// Shape of the export: editors, overview, articles or commons
    #[arg(long, value_parser = crate::infra::parse_data_type)]
    pub(crate) data_type: DataType,
    /// Switch to weighted scoring; repeat as criterion=value
    #[arg(long = "weight", value_parser = crate::infra::parse_weight)]
    pub(crate) weights: Vec<(String, f64)>,
    /// Skip the early-enrollment bonus
    #[arg(long)]
    pub(crate) no_time_bonus: bool,
    /// Write the full ranking as CSV to this file or directory
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
    /// Only print the first N contributors
    #[arg(long)]
    pub(crate) top: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// Campaign export (.csv, .tsv, .xlsx, .xls or .ods)
    pub(crate) file: PathBuf,
    /// Shape of the export: editors, overview, articles or commons
    #[arg(long, value_parser = crate::infra::parse_data_type)]
    pub(crate) data_type: DataType,
    /// Contributor to look up
    #[arg(long)]
    pub(crate) user: String,
    /// Skip the early-enrollment bonus
    #[arg(long)]
    pub(crate) no_time_bonus: bool,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        file,
        data_type,
        weights,
        no_time_bonus,
        export,
        top,
    } = args;

    let config = AppConfig::load()?;
    let mut options = AnalysisOptions::default()
        .with_time_bonus(config.scoring.include_time_bonus && !no_time_bonus);
    for (label, weight) in weights {
        options = options.with_weight(label, weight);
    }

    let mut session = AnalysisSession::new();
    session.load_path(&file, data_type)?;
    let report = session.analyze(&options)?;

    let mut out = io::stdout().lock();
    render_ranking(&mut out, &file, report, top)?;

    if let Some(target) = export {
        write_export(&mut out, report, &target)?;
    }

    Ok(())
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let SummaryArgs {
        file,
        data_type,
        user,
        no_time_bonus,
    } = args;

    let config = AppConfig::load()?;
    let options = AnalysisOptions::default()
        .with_time_bonus(config.scoring.include_time_bonus && !no_time_bonus);

    let mut session = AnalysisSession::new();
    session.load_path(&file, data_type)?;
    let report = session.analyze(&options)?;

    let mut out = io::stdout().lock();
    match report.ranked() {
        Some(table) => render_summary(&mut out, &contributor_summary(table, &user), table.len())?,
        None => render_failure(&mut out, report)?,
    }
    Ok(())
}

/// A directory target receives the default export file name.
pub(crate) fn export_path(target: &Path) -> PathBuf {
    if target.is_dir() {
        target.join(DEFAULT_EXPORT_FILE_NAME)
    } else {
        target.to_path_buf()
    }
}

/// Exports only a ranked report; a failed analysis has no results to write.
pub(crate) fn write_export<W: Write>(
    out: &mut W,
    report: &AnalysisReport,
    target: &Path,
) -> Result<Option<PathBuf>, AppError> {
    let Some(table) = report.ranked() else {
        writeln!(out, "\nNo export written: the analysis produced no results")?;
        return Ok(None);
    };

    let path = export_path(target);
    export_ranking(table, &path)?;
    writeln!(out, "\nRanking exported to {}", path.display())?;
    Ok(Some(path))
}

pub(crate) fn export_ranking(table: &RankedTable, path: &Path) -> Result<(), AppError> {
    let file = File::create(path)?;
    write_csv(table, BufWriter::new(file))?;
    Ok(())
}

pub(crate) fn render_ranking<W: Write>(
    out: &mut W,
    source: &Path,
    report: &AnalysisReport,
    top: Option<usize>,
) -> io::Result<()> {
    writeln!(out, "WikiJury leaderboard")?;
    writeln!(
        out,
        "Source: {} ({} export, {:?} scoring)",
        source.display(),
        report.data_type,
        report.mode
    )?;

    if !report.advisories.is_empty() {
        writeln!(out, "\nAdvisories")?;
        for advisory in &report.advisories {
            writeln!(out, "- {}", advisory.message())?;
        }
    }

    let table = match &report.outcome {
        ScoringOutcome::Ranked(table) => table,
        ScoringOutcome::Failed(_) => return render_failure(out, report),
    };

    let totals = report.totals();
    writeln!(
        out,
        "\n{} contributors, {} uploads, {:.2} points{}",
        totals.contributors,
        totals.total_uploads,
        totals.total_points,
        if table.time_bonus_applied {
            " (enrollment bonus applied)"
        } else {
            ""
        }
    )?;

    writeln!(out, "\nRanking")?;
    let rows = leaderboard_rows(table);
    let shown = top.unwrap_or(rows.len()).min(rows.len());
    for row in &rows[..shown] {
        writeln!(
            out,
            "{:>3}. {} - {:.2} pts (articles {:.2}, wikidata {:.2}, uploads {:.2}, reuse {:.2})",
            row.rank,
            row.metrics.username,
            row.score,
            row.article_creation_points,
            row.wikidata_points,
            row.upload_points,
            row.commons_usage_points
        )?;
    }
    if shown < rows.len() {
        writeln!(out, "... {} more", rows.len() - shown)?;
    }
    Ok(())
}

pub(crate) fn render_summary<W: Write>(
    out: &mut W,
    summary: &ContributorSummary,
    contributors: usize,
) -> io::Result<()> {
    if !summary.is_ranked() {
        writeln!(
            out,
            "{} does not appear in this export",
            summary.metrics.username
        )?;
        return Ok(());
    }

    writeln!(
        out,
        "{}: rank {} of {}, {:.2} points",
        summary.metrics.username, summary.rank, contributors, summary.score
    )?;
    for field in MetricField::ALL {
        writeln!(
            out,
            "- {}: {}",
            field.label_fr(),
            summary.metrics.get(field)
        )?;
    }
    Ok(())
}

fn render_failure<W: Write>(out: &mut W, report: &AnalysisReport) -> io::Result<()> {
    match report.outcome.failure() {
        Some(failure) => writeln!(out, "\nAnalysis failed: {failure}"),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use wikijury::leaderboard::{LeaderboardEngine, RawTable};

    const COMMONS_LOG: &str = "username,filename\nA,x.jpg\nA,y.jpg\nB,z.jpg\n";

    fn commons_report() -> AnalysisReport {
        let raw = RawTable::from_csv_reader(COMMONS_LOG.as_bytes()).expect("parses");
        LeaderboardEngine::new(DataType::Commons)
            .analyze(&raw, &AnalysisOptions::default())
            .expect("username present")
    }

    #[test]
    fn ranking_lists_contributors_and_advisories() {
        let mut out = Vec::new();
        render_ranking(&mut out, Path::new("uploads.csv"), &commons_report(), None)
            .expect("render");
        let text = String::from_utf8(out).expect("utf-8");

        assert!(text.contains("Advisories"));
        assert!(text.contains("  1. A - 6.00 pts"));
        assert!(text.contains("  2. B - 3.00 pts"));
        assert!(text.contains("2 contributors, 3 uploads, 9.00 points"));
    }

    #[test]
    fn top_limits_printed_rows() {
        let mut out = Vec::new();
        render_ranking(&mut out, Path::new("uploads.csv"), &commons_report(), Some(1))
            .expect("render");
        let text = String::from_utf8(out).expect("utf-8");

        assert!(text.contains("  1. A"));
        assert!(!text.contains("  2. B"));
        assert!(text.contains("... 1 more"));
    }

    #[test]
    fn failed_analysis_prints_the_reason() {
        let raw = RawTable::from_csv_reader("username,filename\n".as_bytes()).expect("parses");
        let report = LeaderboardEngine::new(DataType::Commons)
            .analyze(&raw, &AnalysisOptions::default())
            .expect("username present");

        let mut out = Vec::new();
        render_ranking(&mut out, Path::new("empty.csv"), &report, None).expect("render");
        let text = String::from_utf8(out).expect("utf-8");
        assert!(text.contains("Analysis failed: the uploaded table contains no contributor rows"));
    }

    #[test]
    fn failed_analysis_skips_the_export_and_says_so() {
        let raw = RawTable::from_csv_reader("username,filename\n".as_bytes()).expect("parses");
        let report = LeaderboardEngine::new(DataType::Commons)
            .analyze(&raw, &AnalysisOptions::default())
            .expect("username present");
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("ranking.csv");

        let mut out = Vec::new();
        let written = write_export(&mut out, &report, &target).expect("no io failure");
        assert!(written.is_none());
        assert!(!target.exists());
        assert!(String::from_utf8(out)
            .expect("utf-8")
            .contains("No export written: the analysis produced no results"));
    }

    #[test]
    fn ranked_analysis_is_exported_to_the_target() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("ranking.csv");

        let mut out = Vec::new();
        let written = write_export(&mut out, &commons_report(), &target).expect("export");
        assert_eq!(written.as_deref(), Some(target.as_path()));
        assert!(target.exists());
    }

    #[test]
    fn unknown_contributor_summary_says_so() {
        let report = commons_report();
        let table = report.ranked().expect("ranked");
        let mut out = Vec::new();
        render_summary(&mut out, &contributor_summary(table, "Zoé"), table.len())
            .expect("render");
        assert_eq!(
            String::from_utf8(out).expect("utf-8"),
            "Zoé does not appear in this export\n"
        );
    }

    #[test]
    fn export_into_a_directory_uses_the_default_name() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = export_path(dir.path());
        assert!(path.ends_with(DEFAULT_EXPORT_FILE_NAME));

        let report = commons_report();
        export_ranking(report.ranked().expect("ranked"), &path).expect("export written");
        let written = fs::read_to_string(&path).expect("read export");
        assert!(written.starts_with("username,total_edits,"));
        assert_eq!(written.lines().count(), 3);
    }
}
