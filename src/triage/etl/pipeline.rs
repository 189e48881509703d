use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::triage::etl::clean::{self, CleanOptions, CleanReport};
use crate::triage::etl::error::Result;
use crate::triage::etl::io::{csv_read, sqlite_write};
use crate::triage::etl::merge::{self, require_column};
use crate::triage::etl::model::{ColumnType, Table};

/// Table written when no other name is configured.
pub const DEFAULT_TABLE: &str = "tweets";

/// Everything a pipeline run needs to know.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub messages_path: PathBuf,
    pub categories_path: PathBuf,
    pub database_path: PathBuf,
    pub table_name: String,
    pub clean: CleanOptions,
}

impl PipelineConfig {
    /// Configuration with the default table name and cleaning options.
    pub fn new(
        messages_path: impl Into<PathBuf>,
        categories_path: impl Into<PathBuf>,
        database_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            messages_path: messages_path.into(),
            categories_path: categories_path.into(),
            database_path: database_path.into(),
            table_name: DEFAULT_TABLE.to_string(),
            clean: CleanOptions::default(),
        }
    }
}

/// Summary of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub messages_rows: usize,
    pub categories_rows: usize,
    pub merged_rows: usize,
    pub clean: CleanReport,
    pub table: String,
    pub columns: Vec<ColumnSummary>,
}

/// Name and storage type of an output column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Joined sources together with the size of each input file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedData {
    pub table: Table,
    pub messages_rows: usize,
    pub categories_rows: usize,
}

/// Reads the messages and categories files and joins them on `id_column`.
#[instrument(
    level = "info",
    skip_all,
    fields(messages = %messages.display(), categories = %categories.display())
)]
pub fn load_data(messages: &Path, categories: &Path, id_column: &str) -> Result<LoadedData> {
    let messages_table = csv_read::read_table(messages)?;
    let categories_table = csv_read::read_table(categories)?;
    debug!(
        messages_rows = messages_table.len(),
        categories_rows = categories_table.len(),
        "read source files"
    );

    require_column(&messages_table, id_column, &messages.display().to_string())?;
    require_column(&categories_table, id_column, &categories.display().to_string())?;
    let table = merge::inner_join(&messages_table, &categories_table, id_column)?;
    info!(rows = table.len(), columns = table.columns.len(), "merged sources");

    Ok(LoadedData {
        table,
        messages_rows: messages_table.len(),
        categories_rows: categories_table.len(),
    })
}

/// Expands the packed categories and removes duplicates.
#[instrument(level = "info", skip_all, fields(rows = table.len()))]
pub fn clean_data(table: Table, options: &CleanOptions) -> Result<(Table, CleanReport)> {
    let (table, report) = clean::clean_data(table, options)?;
    info!(
        rows_out = report.rows_out,
        exact_duplicates = report.exact_duplicates,
        conflicting_ids = report.conflicting_ids,
        "cleaned data"
    );
    Ok((table, report))
}

/// Persists the table into the SQLite database, replacing `table_name`.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %database.display(), table = %table_name, rows = table.len())
)]
pub fn save_data(table: &Table, database: &Path, table_name: &str) -> Result<()> {
    sqlite_write::write_table(database, table_name, table)?;
    info!("cleaned data saved to database");
    Ok(())
}

/// Runs load, clean and save in sequence.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %config.database_path.display(), table = %config.table_name)
)]
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    info!("loading data");
    let loaded = load_data(
        &config.messages_path,
        &config.categories_path,
        &config.clean.id_column,
    )?;
    let merged_rows = loaded.table.len();

    info!("cleaning data");
    let (table, clean) = clean_data(loaded.table, &config.clean)?;

    info!("saving data");
    save_data(&table, &config.database_path, &config.table_name)?;

    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, name)| ColumnSummary {
            name: name.clone(),
            column_type: table.column_type(index),
        })
        .collect();

    Ok(PipelineReport {
        messages_rows: loaded.messages_rows,
        categories_rows: loaded.categories_rows,
        merged_rows,
        clean,
        table: config.table_name.clone(),
        columns,
    })
}

/// Writes the report as pretty-printed JSON.
#[instrument(level = "debug", skip_all, fields(output = %output.display()))]
pub fn write_report(report: &PipelineReport, output: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(report)?;
    fs::write(output, json_string)?;
    Ok(())
}
