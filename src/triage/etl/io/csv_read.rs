use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::triage::etl::error::Result;
use crate::triage::etl::model::{CellValue, ColumnType, Table};

/// Reads a comma separated file with a header row into a typed [`Table`].
///
/// Column types are inferred from the whole file before any cell is parsed, so
/// a column holding a single non-numeric field is read as text throughout.
pub fn read_table(path: &Path) -> Result<Table> {
    let reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    read_from(reader)
}

/// Same as [`read_table`] but over an arbitrary reader.
pub fn read_table_from<R: std::io::Read>(source: R) -> Result<Table> {
    let reader = ReaderBuilder::new().has_headers(true).from_reader(source);
    read_from(reader)
}

fn read_from<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Table> {
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let records = reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, _>>()?;

    let column_types: Vec<ColumnType> = (0..columns.len())
        .map(|index| ColumnType::infer(records.iter().map(|record| &record[index])))
        .collect();

    let mut table = Table::new(columns);
    table.rows = records
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(&column_types)
                .map(|(raw, column_type)| CellValue::parse(raw, *column_type))
                .collect()
        })
        .collect();

    Ok(table)
}
