use std::collections::{HashMap, HashSet};

use crate::triage::etl::error::{Result, ToolError};
use crate::triage::etl::model::{CellKey, Table};

/// Suffix appended to clashing column names coming from the left table.
pub const LEFT_SUFFIX: &str = "_x";
/// Suffix appended to clashing column names coming from the right table.
pub const RIGHT_SUFFIX: &str = "_y";

/// Inner-joins two tables on the column named `key`.
///
/// Output rows follow the order of `left`; a left row is repeated once per
/// matching right row, in right order. Output columns are the left columns
/// followed by the right columns minus the key. Non-key columns present on
/// both sides are disambiguated with [`LEFT_SUFFIX`] and [`RIGHT_SUFFIX`].
/// Null keys never match.
pub fn inner_join(left: &Table, right: &Table, key: &str) -> Result<Table> {
    let left_key = require_column(left, key, "left table")?;
    let right_key = require_column(right, key, "right table")?;

    let right_names: HashSet<&str> = right
        .columns
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != right_key)
        .map(|(_, name)| name.as_str())
        .collect();
    let left_names: HashSet<&str> = left
        .columns
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != left_key)
        .map(|(_, name)| name.as_str())
        .collect();

    let mut columns: Vec<String> = left
        .columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            if index != left_key && right_names.contains(name.as_str()) {
                format!("{name}{LEFT_SUFFIX}")
            } else {
                name.clone()
            }
        })
        .collect();
    columns.extend(
        right
            .columns
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != right_key)
            .map(|(_, name)| {
                if left_names.contains(name.as_str()) {
                    format!("{name}{RIGHT_SUFFIX}")
                } else {
                    name.clone()
                }
            }),
    );

    let mut right_index: HashMap<CellKey<'_>, Vec<usize>> = HashMap::new();
    for (position, row) in right.rows.iter().enumerate() {
        let cell = &row[right_key];
        if cell.is_null() {
            continue;
        }
        right_index.entry(cell.key()).or_default().push(position);
    }

    let mut joined = Table::new(columns);
    for left_row in &left.rows {
        let Some(matches) = right_index.get(&left_row[left_key].key()) else {
            continue;
        };
        for &position in matches {
            let right_row = &right.rows[position];
            let mut row = Vec::with_capacity(joined.columns.len());
            row.extend(left_row.iter().cloned());
            row.extend(
                right_row
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| *index != right_key)
                    .map(|(_, cell)| cell.clone()),
            );
            joined.rows.push(row);
        }
    }

    Ok(joined)
}

/// Returns the index of `column` in `table` or a [`ToolError::MissingColumn`]
/// naming `source_name`.
pub fn require_column(table: &Table, column: &str, source_name: &str) -> Result<usize> {
    table
        .column_index(column)
        .ok_or_else(|| ToolError::MissingColumn {
            column: column.to_string(),
            source_name: source_name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::etl::model::CellValue;

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table {
            columns: columns.iter().map(|name| name.to_string()).collect(),
            rows,
        }
    }

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    #[test]
    fn keeps_only_matching_ids_in_left_order() {
        let messages = table(
            &["id", "message"],
            vec![
                vec![CellValue::Integer(3), text("three")],
                vec![CellValue::Integer(1), text("one")],
                vec![CellValue::Integer(2), text("two")],
            ],
        );
        let categories = table(
            &["id", "categories"],
            vec![
                vec![CellValue::Integer(1), text("related-1")],
                vec![CellValue::Integer(3), text("related-0")],
                vec![CellValue::Integer(9), text("related-1")],
            ],
        );

        let joined = inner_join(&messages, &categories, "id").expect("join succeeds");

        assert_eq!(joined.columns, vec!["id", "message", "categories"]);
        assert_eq!(
            joined.rows,
            vec![
                vec![CellValue::Integer(3), text("three"), text("related-0")],
                vec![CellValue::Integer(1), text("one"), text("related-1")],
            ]
        );
    }

    #[test]
    fn repeated_right_ids_multiply_rows() {
        let messages = table(&["id"], vec![vec![CellValue::Integer(1)]]);
        let categories = table(
            &["id", "categories"],
            vec![
                vec![CellValue::Integer(1), text("a-1")],
                vec![CellValue::Integer(1), text("a-0")],
            ],
        );

        let joined = inner_join(&messages, &categories, "id").expect("join succeeds");
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.rows[1][1], text("a-0"));
    }

    #[test]
    fn clashing_columns_are_suffixed() {
        let lhs = table(&["id", "genre"], vec![vec![CellValue::Integer(1), text("news")]]);
        let rhs = table(&["id", "genre"], vec![vec![CellValue::Integer(1), text("social")]]);

        let joined = inner_join(&lhs, &rhs, "id").expect("join succeeds");
        assert_eq!(joined.columns, vec!["id", "genre_x", "genre_y"]);
    }

    #[test]
    fn missing_key_is_reported() {
        let lhs = table(&["id"], Vec::new());
        let rhs = table(&["message_id"], Vec::new());

        let error = inner_join(&lhs, &rhs, "id").expect_err("join fails");
        assert!(matches!(
            error,
            ToolError::MissingColumn { ref column, ref source_name }
                if column == "id" && source_name == "right table"
        ));
    }
}
