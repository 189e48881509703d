use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::triage::etl::error::{Result, ToolError};
use crate::triage::etl::merge::require_column;
use crate::triage::etl::model::{CellValue, Table, row_key};

/// Separator between the `name-value` pairs of a packed category string.
pub const CATEGORY_DELIMITER: char = ';';
/// Category whose source data encodes some positives as `2`.
pub const REMAPPED_CATEGORY: &str = "related";
/// The labels found in the disaster response message corpus, in source order.
pub const KNOWN_CATEGORIES: [&str; 36] = [
    "related",
    "request",
    "offer",
    "aid_related",
    "medical_help",
    "medical_products",
    "search_and_rescue",
    "security",
    "military",
    "child_alone",
    "water",
    "food",
    "shelter",
    "clothing",
    "money",
    "missing_people",
    "refugees",
    "death",
    "other_aid",
    "infrastructure_related",
    "transport",
    "buildings",
    "electricity",
    "tools",
    "hospitals",
    "shops",
    "aid_centers",
    "other_infrastructure",
    "weather_related",
    "floods",
    "storm",
    "fire",
    "earthquake",
    "cold",
    "other_weather",
    "direct_report",
];

/// Knobs of the cleaning stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOptions {
    /// Column holding the packed category string.
    pub category_column: String,
    /// Identifier column used to enforce uniqueness.
    pub id_column: String,
    /// Category whose `2` values are folded into `1`.
    pub remapped_category: String,
    /// Keep only the first row per identifier after exact duplicates are gone.
    pub unique_ids: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            category_column: "categories".to_string(),
            id_column: "id".to_string(),
            remapped_category: REMAPPED_CATEGORY.to_string(),
            unique_ids: true,
        }
    }
}

/// Counters describing what the cleaning stage did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub rows_in: usize,
    pub exact_duplicates: usize,
    pub conflicting_ids: usize,
    pub rows_out: usize,
    pub categories: Vec<String>,
}

/// Expands the packed category column into one 0/1 integer column per
/// category and removes duplicate rows.
///
/// Category names come from the first row. Derived columns replace the packed
/// column and are appended after the remaining columns.
pub fn clean_data(table: Table, options: &CleanOptions) -> Result<(Table, CleanReport)> {
    let rows_in = table.len();
    let packed_index = require_column(&table, &options.category_column, "merged table")?;

    let categories = category_names(&table, packed_index)?;
    let values = category_values(&table, packed_index, &categories, &options.remapped_category)?;
    report_unknown_categories(&categories);
    debug!(
        category_count = categories.len(),
        rows = rows_in,
        "split packed categories"
    );

    let Table { columns, rows } = table;
    let mut expanded = Table::new(
        columns
            .into_iter()
            .enumerate()
            .filter(|(index, _)| *index != packed_index)
            .map(|(_, name)| name)
            .chain(categories.iter().cloned())
            .collect(),
    );
    expanded.rows = rows
        .into_iter()
        .zip(values)
        .map(|(row, flags)| {
            row.into_iter()
                .enumerate()
                .filter(|(index, _)| *index != packed_index)
                .map(|(_, cell)| cell)
                .chain(flags.into_iter().map(CellValue::Integer))
                .collect()
        })
        .collect();

    let exact_duplicates = drop_duplicate_rows(&mut expanded);
    let conflicting_ids = if options.unique_ids {
        let id_index = require_column(&expanded, &options.id_column, "merged table")?;
        let removed = drop_repeated_ids(&mut expanded, id_index);
        if removed > 0 {
            warn!(
                removed,
                id_column = %options.id_column,
                "dropped rows sharing an identifier with an earlier row"
            );
        }
        removed
    } else {
        0
    };

    let report = CleanReport {
        rows_in,
        exact_duplicates,
        conflicting_ids,
        rows_out: expanded.len(),
        categories,
    };
    Ok((expanded, report))
}

/// Names of the categories encoded in the first row's packed string. An empty
/// table yields no categories.
pub fn category_names(table: &Table, packed_index: usize) -> Result<Vec<String>> {
    let Some(first) = table.rows.first() else {
        return Ok(Vec::new());
    };
    let packed = packed_text(first, packed_index, 0)?;
    Ok(packed
        .split(CATEGORY_DELIMITER)
        .map(|field| strip_flag(field).to_string())
        .collect())
}

fn category_values(
    table: &Table,
    packed_index: usize,
    categories: &[String],
    remapped: &str,
) -> Result<Vec<Vec<i64>>> {
    let remapped_position = categories.iter().position(|name| name == remapped);

    table
        .rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let packed = packed_text(row, packed_index, row_index)?;
            let fields: Vec<&str> = packed.split(CATEGORY_DELIMITER).collect();
            if fields.len() != categories.len() {
                return Err(ToolError::MalformedCategories {
                    row: row_index + 1,
                    expected: categories.len(),
                    found: fields.len(),
                });
            }

            fields
                .iter()
                .enumerate()
                .map(|(position, field)| {
                    let invalid = || ToolError::InvalidCategoryValue {
                        column: categories[position].clone(),
                        row: row_index + 1,
                        value: field.to_string(),
                    };
                    let mut flag = field
                        .chars()
                        .last()
                        .and_then(|digit| digit.to_digit(10))
                        .map(i64::from)
                        .ok_or_else(invalid)?;
                    if flag == 2 && Some(position) == remapped_position {
                        flag = 1;
                    }
                    if flag > 1 {
                        return Err(invalid());
                    }
                    Ok(flag)
                })
                .collect()
        })
        .collect()
}

fn packed_text(row: &[CellValue], packed_index: usize, row_index: usize) -> Result<&str> {
    row[packed_index]
        .as_text()
        .ok_or(ToolError::MissingCategories { row: row_index + 1 })
}

/// Drops the trailing `-<digit>` of a packed field.
fn strip_flag(field: &str) -> &str {
    match field.char_indices().rev().nth(1) {
        Some((cut, _)) => &field[..cut],
        None => "",
    }
}

fn report_unknown_categories(categories: &[String]) {
    let unknown: Vec<&str> = categories
        .iter()
        .map(String::as_str)
        .filter(|name| !KNOWN_CATEGORIES.contains(name))
        .collect();
    if !unknown.is_empty() {
        warn!(?unknown, "packed string contains unrecognised categories");
    }
}

/// Removes rows equal to an earlier row. Returns how many were dropped.
pub fn drop_duplicate_rows(table: &mut Table) -> usize {
    let mut seen = HashSet::new();
    let keep: Vec<bool> = table
        .rows
        .iter()
        .map(|row| seen.insert(row_key(row)))
        .collect();
    drop(seen);
    retain_marked(table, keep)
}

/// Removes rows whose identifier already appeared. Returns how many were
/// dropped.
pub fn drop_repeated_ids(table: &mut Table, id_index: usize) -> usize {
    let mut seen = HashSet::new();
    let keep: Vec<bool> = table
        .rows
        .iter()
        .map(|row| seen.insert(row[id_index].key()))
        .collect();
    drop(seen);
    retain_marked(table, keep)
}

fn retain_marked(table: &mut Table, keep: Vec<bool>) -> usize {
    let before = table.rows.len();
    let rows = std::mem::take(&mut table.rows);
    table.rows = rows
        .into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect();
    before - table.rows.len()
}
