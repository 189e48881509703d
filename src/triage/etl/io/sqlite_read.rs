use std::path::Path;

use rusqlite::Connection;
use rusqlite::types::ValueRef;

use crate::triage::etl::error::Result;
use crate::triage::etl::io::sqlite_write::quote_identifier;
use crate::triage::etl::model::{CellValue, Table};

/// Reads a table previously produced by the
/// [`sqlite_write`](crate::io::sqlite_write) module back into memory, in rowid
/// order.
///
/// The pipeline itself never reads the database; this is the read-back side
/// used to verify written output.
pub fn read_table(path: &Path, table_name: &str) -> Result<Table> {
    let connection = Connection::open(path)?;
    read_table_from(&connection, table_name)
}

/// Same as [`read_table`] but over an open connection.
pub fn read_table_from(connection: &Connection, table_name: &str) -> Result<Table> {
    let mut statement = connection.prepare(&format!(
        "SELECT * FROM {} ORDER BY rowid",
        quote_identifier(table_name)
    ))?;
    let columns: Vec<String> = statement
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();

    let rows = statement
        .query_map([], |row| {
            (0..width)
                .map(|index| row.get_ref(index).map(cell_from_sql))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Table { columns, rows })
}

fn cell_from_sql(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(value) => CellValue::Integer(value),
        ValueRef::Real(value) => CellValue::Real(value),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            CellValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
