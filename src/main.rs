use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use triage_etl::clean::{CleanOptions, REMAPPED_CATEGORY};
use triage_etl::pipeline::{self, DEFAULT_TABLE, PipelineConfig};
use triage_etl::telemetry;
use triage_etl::{Result, ToolError};

const USAGE_EXAMPLE: &str =
    "Example: triage-etl disaster_messages.csv disaster_categories.csv DisasterResponse.db";

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            if error.use_stderr() {
                eprintln!("\n{USAGE_EXAMPLE}");
            }
            std::process::exit(error.exit_code());
        }
    };
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    telemetry::init_logging()?;
    cli.check_inputs()?;

    let report_path = cli.report.clone();
    let config = cli.into_config();
    info!(
        messages = %config.messages_path.display(),
        categories = %config.categories_path.display(),
        database = %config.database_path.display(),
        "starting pipeline"
    );

    let report = pipeline::run(&config)?;
    if let Some(path) = report_path {
        pipeline::write_report(&report, &path)?;
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Load disaster response messages and their categories into SQLite.",
    after_help = USAGE_EXAMPLE
)]
struct Cli {
    /// Messages CSV file.
    messages: PathBuf,

    /// Categories CSV file.
    categories: PathBuf,

    /// SQLite database file to write the cleaned data to.
    database: PathBuf,

    /// Name of the table to (re)create.
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    /// Column joining the two files.
    #[arg(long, default_value = "id")]
    id_column: String,

    /// Column holding the packed category string.
    #[arg(long, default_value = "categories")]
    category_column: String,

    /// Keep rows that share an identifier but differ in content.
    #[arg(long)]
    keep_conflicting_ids: bool,

    /// Optional path receiving a JSON summary of the run.
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    fn check_inputs(&self) -> Result<()> {
        for input in [&self.messages, &self.categories] {
            if !input.exists() {
                return Err(ToolError::MissingInput(input.clone()));
            }
        }
        Ok(())
    }

    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            messages_path: self.messages,
            categories_path: self.categories,
            database_path: self.database,
            table_name: self.table,
            clean: CleanOptions {
                category_column: self.category_column,
                id_column: self.id_column,
                remapped_category: REMAPPED_CATEGORY.to_string(),
                unique_ids: !self.keep_conflicting_ids,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;
    use clap::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn single_positional_is_rejected() {
        let error = Cli::try_parse_from(["triage-etl", "only_one"]).expect_err("usage error");
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn three_positionals_build_default_config() {
        let cli = Cli::try_parse_from(["triage-etl", "m.csv", "c.csv", "out.db"])
            .expect("arguments parsed");
        let config = cli.into_config();

        assert_eq!(config.messages_path, PathBuf::from("m.csv"));
        assert_eq!(config.database_path, PathBuf::from("out.db"));
        assert_eq!(config.table_name, DEFAULT_TABLE);
        assert!(config.clean.unique_ids);
    }

    #[test]
    fn fourth_positional_is_rejected() {
        let error = Cli::try_parse_from(["triage-etl", "m.csv", "c.csv", "out.db", "extra"])
            .expect_err("usage error");
        assert_eq!(error.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn usage_errors_go_to_stderr() {
        let error = Cli::try_parse_from(["triage-etl"]).expect_err("usage error");
        assert!(error.use_stderr());
        assert_ne!(error.exit_code(), 0);
    }

    #[test]
    fn missing_input_is_reported() {
        let temp_dir = tempdir().expect("temporary directory");
        let messages = temp_dir.path().join("messages.csv");
        std::fs::write(&messages, "id,message\n").expect("messages written");
        let categories = temp_dir.path().join("absent.csv");
        let database = temp_dir.path().join("out.db");

        let cli = Cli::try_parse_from([
            OsStr::new("triage-etl"),
            messages.as_os_str(),
            categories.as_os_str(),
            database.as_os_str(),
        ])
        .expect("arguments parsed");

        let error = cli.check_inputs().expect_err("missing input");
        assert!(matches!(error, ToolError::MissingInput(ref path) if *path == categories));
    }
}
