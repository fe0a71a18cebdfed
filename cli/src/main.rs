mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use tree_diff::{ConfigError, DiffError};

#[derive(Parser)]
#[command(name = "tree-diff")]
#[command(about = "Compare two versions of hierarchical delimited data by key")]
#[command(version)]
pub struct Cli {
    #[arg(long, short, global = true, help = "Verbose mode: debug logging and row details")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DiffArgs {
    #[arg(help = "Path to the old/left file")]
    pub left: String,
    #[arg(help = "Path to the new/right file")]
    pub right: String,
    #[arg(long, value_delimiter = ',', help = "Key fields, parents first and child last (e.g. level1,level2,name)")]
    pub key: Vec<String>,
    #[arg(long, value_delimiter = ',', conflicts_with = "key", help = "Parent key fields")]
    pub parent: Vec<String>,
    #[arg(long, conflicts_with = "key", help = "Child key field")]
    pub child: Option<String>,
    #[arg(long, value_delimiter = ',', help = "Fields to skip when comparing (names or right-side indices)")]
    pub ignore_fields: Vec<String>,
    #[arg(long, help = "Do not report added rows")]
    pub ignore_adds: bool,
    #[arg(long, help = "Do not report deleted rows")]
    pub ignore_deletes: bool,
    #[arg(long, help = "Do not report updated rows")]
    pub ignore_updates: bool,
    #[arg(long, help = "Do not report moved rows")]
    pub ignore_moves: bool,
    #[arg(long, help = "Compare keys and values without regard to case")]
    pub ignore_case: bool,
    #[arg(long, help = "Strip leading and trailing whitespace before comparing")]
    pub trim: bool,
    #[arg(long, value_name = "FIELD=REGEX", help = "Only diff rows whose field matches the pattern")]
    pub include: Vec<String>,
    #[arg(long, value_name = "FIELD=REGEX", help = "Skip rows whose field matches the pattern")]
    pub exclude: Vec<String>,
    #[arg(long, help = "Report the fewest moves that explain a re-ordering")]
    pub minimal_moves: bool,
    #[arg(long, default_value = ",", help = "Field delimiter (single byte, `tab` for tab)")]
    pub delimiter: String,
    #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
    pub format: OutputFormat,
    #[arg(long, short, help = "Quiet mode: only show summary")]
    pub quiet: bool,
    #[arg(long, value_name = "PATH", help = "Load options from a JSON config file; flags override it")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compare two delimited files")]
    Diff(DiffArgs),
    #[command(about = "Show fields and row counts of a delimited file")]
    Info {
        #[arg(help = "Path to the file")]
        path: String,
        #[arg(long, default_value = ",", help = "Field delimiter (single byte, `tab` for tab)")]
        delimiter: String,
    },
}

#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::run(&args, cli.verbose),
        Commands::Info { path, delimiter } => commands::info::run(&path, &delimiter),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for_error(&e)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code_for_error(err: &anyhow::Error) -> ExitCode {
    if is_input_error(err) {
        ExitCode::from(3)
    } else {
        ExitCode::from(2)
    }
}

fn is_input_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if cause.is::<DiffError>() || cause.is::<ConfigError>() {
            return false;
        }
        cause.is::<csv::Error>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_diff::Side;

    #[test]
    fn only_csv_reader_failures_map_to_input_error() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated record");
        let csv_err = anyhow::Error::from(csv::Error::from(io)).context("Failed to parse file: a.csv");
        assert!(is_input_error(&csv_err));

        let diff_err = anyhow::Error::from(DiffError::EmptyKeySchema { side: Side::Left });
        assert!(!is_input_error(&diff_err));

        let missing = anyhow::anyhow!("Failed to open file: a.csv");
        assert!(!is_input_error(&missing));
    }
}
