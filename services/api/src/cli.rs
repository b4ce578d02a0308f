use crate::report::{run_rank, run_summary, RankArgs, SummaryArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use wikijury::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "WikiJury",
    about = "Rank the contributors of a Wikimedia campaign from its statistics exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score an export and print the leaderboard
    Rank(RankArgs),
    /// Show one contributor's line of the leaderboard
    Summary(SummaryArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rank(args) => run_rank(args),
        Command::Summary(args) => run_summary(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikijury::leaderboard::DataType;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["wikijury-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn rank_collects_repeated_weights() {
        let cli = Cli::try_parse_from([
            "wikijury-api",
            "rank",
            "editeurs.csv",
            "--data-type",
            "éditeurs",
            "--weight",
            "bytes_added=2",
            "--weight",
            "Images ajoutées=0.5",
            "--no-time-bonus",
            "--top",
            "5",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Rank(args)) => {
                assert_eq!(args.data_type, DataType::Editors);
                assert_eq!(
                    args.weights,
                    vec![
                        ("bytes_added".to_string(), 2.0),
                        ("Images ajoutées".to_string(), 0.5)
                    ]
                );
                assert!(args.no_time_bonus);
                assert_eq!(args.top, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_data_type_is_rejected() {
        let result = Cli::try_parse_from([
            "wikijury-api",
            "summary",
            "export.csv",
            "--data-type",
            "pageviews",
            "--user",
            "Alice",
        ]);
        assert!(result.is_err());
    }
}
