use std::path::Path;

use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{Connection, ToSql, params_from_iter};
use tracing::debug;

use crate::triage::etl::error::Result;
use crate::triage::etl::model::{CellValue, Table};

/// Writes the table into `table_name` inside the SQLite database at `path`,
/// replacing any table of the same name. Other tables are left untouched.
pub fn write_table(path: &Path, table_name: &str, table: &Table) -> Result<()> {
    let mut connection = Connection::open(path)?;
    write_table_to(&mut connection, table_name, table)
}

/// Same as [`write_table`] but over an open connection.
pub fn write_table_to(connection: &mut Connection, table_name: &str, table: &Table) -> Result<()> {
    let transaction = connection.transaction()?;

    transaction.execute_batch(&format!(
        "DROP TABLE IF EXISTS {};",
        quote_identifier(table_name)
    ))?;
    let create = create_statement(table_name, table);
    debug!(statement = %create, "creating table");
    transaction.execute_batch(&create)?;

    if !table.columns.is_empty() {
        let mut insert = transaction.prepare(&insert_statement(table_name, table))?;
        for row in &table.rows {
            insert.execute(params_from_iter(row.iter()))?;
        }
    }

    transaction.commit()?;
    Ok(())
}

fn create_statement(table_name: &str, table: &Table) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            format!(
                "{} {}",
                quote_identifier(name),
                table.column_type(index).sql_name()
            )
        })
        .collect();

    format!(
        "CREATE TABLE {} ({});",
        quote_identifier(table_name),
        columns.join(", ")
    )
}

fn insert_statement(table_name: &str, table: &Table) -> String {
    let names: Vec<String> = table.columns.iter().map(|c| quote_identifier(c)).collect();
    let placeholders: Vec<String> = (1..=table.columns.len()).map(|i| format!("?{i}")).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table_name),
        names.join(", "),
        placeholders.join(", ")
    )
}

/// Double-quotes an SQL identifier, escaping embedded quotes.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
            CellValue::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            CellValue::Real(value) => ToSqlOutput::Owned(Value::Real(*value)),
            CellValue::Text(value) => ToSqlOutput::from(value.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::etl::model::CellValue;

    fn sample() -> Table {
        let mut table = Table::new(vec!["id".into(), "message".into(), "water".into()]);
        table.rows.push(vec![
            CellValue::Integer(12),
            CellValue::Text("we need water".into()),
            CellValue::Integer(1),
        ]);
        table
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_identifier("tweets"), "\"tweets\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn replaces_existing_table() {
        let mut connection = Connection::open_in_memory().expect("in-memory database");
        connection
            .execute_batch("CREATE TABLE tweets (stale TEXT); INSERT INTO tweets VALUES ('x');")
            .expect("seed table");

        write_table_to(&mut connection, "tweets", &sample()).expect("table written");

        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM tweets", [], |row| row.get(0))
            .expect("count rows");
        let message: String = connection
            .query_row("SELECT message FROM tweets WHERE id = 12", [], |row| {
                row.get(0)
            })
            .expect("message read");
        assert_eq!(count, 1);
        assert_eq!(message, "we need water");
    }

    #[test]
    fn declares_inferred_column_types() {
        let statement = create_statement("tweets", &sample());
        assert_eq!(
            statement,
            "CREATE TABLE \"tweets\" (\"id\" INTEGER, \"message\" TEXT, \"water\" INTEGER);"
        );
    }
}
