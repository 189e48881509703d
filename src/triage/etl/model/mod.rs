use serde::Serialize;

/// Represents a single typed cell of a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Missing value, produced from empty CSV fields.
    Null,
    /// Signed integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Free text value.
    Text(String),
}

impl CellValue {
    /// Parses a raw CSV field according to the type inferred for its column.
    pub fn parse(raw: &str, column_type: ColumnType) -> Self {
        if raw.is_empty() {
            return CellValue::Null;
        }
        match column_type {
            ColumnType::Integer => raw
                .parse()
                .map(CellValue::Integer)
                .unwrap_or_else(|_| CellValue::Text(raw.to_string())),
            ColumnType::Real => raw
                .parse()
                .map(CellValue::Real)
                .unwrap_or_else(|_| CellValue::Text(raw.to_string())),
            ColumnType::Text => CellValue::Text(raw.to_string()),
        }
    }

    /// Returns the textual content when the cell holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer content when the cell holds an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Hashable view of the cell used for joins and duplicate detection.
    /// Floats compare by bit pattern.
    pub fn key(&self) -> CellKey<'_> {
        match self {
            CellValue::Null => CellKey::Null,
            CellValue::Integer(value) => CellKey::Integer(*value),
            CellValue::Real(value) => CellKey::Real(value.to_bits()),
            CellValue::Text(value) => CellKey::Text(value),
        }
    }
}

/// Borrowed, hashable counterpart of [`CellValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKey<'a> {
    Null,
    Integer(i64),
    Real(u64),
    Text(&'a str),
}

/// Hashable view over a whole row.
pub type RowKey<'a> = Vec<CellKey<'a>>;

/// Builds the [`RowKey`] of a row.
pub fn row_key(row: &[CellValue]) -> RowKey<'_> {
    row.iter().map(CellValue::key).collect()
}

/// Storage class of a column. Mirrors the SQLite type affinities the writer
/// declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Infers the narrowest type able to hold every non-empty raw field.
    pub fn infer<'a>(raw_values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut inferred = ColumnType::Integer;
        for raw in raw_values {
            if raw.is_empty() {
                continue;
            }
            if inferred == ColumnType::Integer && raw.parse::<i64>().is_err() {
                inferred = ColumnType::Real;
            }
            if inferred == ColumnType::Real && raw.parse::<f64>().is_err() {
                return ColumnType::Text;
            }
        }
        inferred
    }

    /// SQL type name used in `CREATE TABLE` statements.
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// In-memory table with ordered, named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Creates an empty table with the provided column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Iterates the cells of the column at `index`.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Type of the column at `index`, derived from the cells it holds. A
    /// column of nulls is reported as text.
    pub fn column_type(&self, index: usize) -> ColumnType {
        let mut inferred: Option<ColumnType> = None;
        for cell in self.column(index) {
            let cell_type = match cell {
                CellValue::Null => continue,
                CellValue::Integer(_) => ColumnType::Integer,
                CellValue::Real(_) => ColumnType::Real,
                CellValue::Text(_) => return ColumnType::Text,
            };
            inferred = Some(match (inferred, cell_type) {
                (Some(ColumnType::Real), _) | (_, ColumnType::Real) => ColumnType::Real,
                _ => ColumnType::Integer,
            });
        }
        inferred.unwrap_or(ColumnType::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_widens_integer_to_real_to_text() {
        assert_eq!(ColumnType::infer(["1", "", "2"]), ColumnType::Integer);
        assert_eq!(ColumnType::infer(["1", "2.5"]), ColumnType::Real);
        assert_eq!(ColumnType::infer(["1", "direct"]), ColumnType::Text);
        assert_eq!(ColumnType::infer(["", ""]), ColumnType::Integer);
    }

    #[test]
    fn empty_fields_parse_as_null() {
        assert_eq!(CellValue::parse("", ColumnType::Text), CellValue::Null);
        assert_eq!(
            CellValue::parse("42", ColumnType::Integer),
            CellValue::Integer(42)
        );
    }

    #[test]
    fn column_type_reflects_cells() {
        let mut table = Table::new(vec!["a".into(), "b".into(), "c".into()]);
        table.rows.push(vec![
            CellValue::Integer(1),
            CellValue::Null,
            CellValue::Integer(3),
        ]);
        table.rows.push(vec![
            CellValue::Real(1.5),
            CellValue::Null,
            CellValue::Text("x".into()),
        ]);

        assert_eq!(table.column_type(0), ColumnType::Real);
        assert_eq!(table.column_type(1), ColumnType::Text);
        assert_eq!(table.column_type(2), ColumnType::Text);
    }

    #[test]
    fn cells_serialize_with_type_tag() {
        let json = serde_json::to_value(CellValue::Integer(7)).expect("cell serialized");
        assert_eq!(json, serde_json::json!({"type": "Integer", "value": 7}));
        let json = serde_json::to_value(ColumnType::Real).expect("type serialized");
        assert_eq!(json, serde_json::json!("real"));
    }

    #[test]
    fn row_keys_match_for_equal_rows() {
        let lhs = vec![CellValue::Integer(2), CellValue::Text("flood".into())];
        let rhs = lhs.clone();
        assert_eq!(row_key(&lhs), row_key(&rhs));
    }
}
