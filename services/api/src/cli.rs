use crate::demo::{run_csr_score, run_demo, CsrScoreArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use ropeline::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Ropeline Safety Rating",
    about = "Score rope-access companies on documentation, toolbox, harness and review compliance",
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
    /// Company Safety Rating utilities
    Csr {
        #[command(subcommand)]
        command: CsrCommand,
    },
    /// Rate the seeded demo companies and print a vendor comparison
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CsrCommand {
    /// Score a compliance snapshot file, optionally enriched with an activity CSV export
    Score(CsrScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed demo companies even when running in production
    #[arg(long)]
    pub(crate) seed_demo: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Csr {
            command: CsrCommand::Score(args),
        } => run_csr_score(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["ropeline-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn csr_score_accepts_snapshot_and_activity() {
        let cli = Cli::try_parse_from([
            "ropeline-api",
            "csr",
            "score",
            "--snapshot",
            "snapshot.json",
            "--activity-csv",
            "activity.csv",
            "--start",
            "2025-03-01",
            "--json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Csr {
                command: CsrCommand::Score(args),
            }) => {
                assert_eq!(args.snapshot.to_str(), Some("snapshot.json"));
                assert!(args.activity_csv.is_some());
                assert!(args.start.is_some());
                assert!(args.end.is_none());
                assert!(args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn csr_score_rejects_malformed_dates() {
        let result = Cli::try_parse_from([
            "ropeline-api",
            "csr",
            "score",
            "--snapshot",
            "snapshot.json",
            "--end",
            "March 31",
        ]);
        assert!(result.is_err());
    }
}
