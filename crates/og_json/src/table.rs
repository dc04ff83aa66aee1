//! Tabular values.
//!
//! A [`DataTable`] encodes as an array of row objects keyed by column name,
//! and a [`DataSet`] as an object of tables keyed by table name.

use og_reflect::derive::Reflect;
use og_reflect::{Reflect, Value};

// -----------------------------------------------------------------------------
// DataTable

/// Named columns over rows of loosely typed cells.
///
/// ```
/// use og_json::{DataTable, JsonSerializer};
/// use og_reflect::Value;
///
/// let mut table = DataTable::new("people", ["name", "age"]);
/// table.push_row([Value::new(String::from("Ada")), Value::new(36_i64)]);
/// table.push_row([Value::new(String::from("Alan"))]);
///
/// let json = JsonSerializer::default().serialize(&table).unwrap();
/// assert_eq!(json, r#"[{"name":"Ada","age":36},{"name":"Alan","age":null}]"#);
/// ```
#[derive(Reflect, Clone, Default)]
#[reflect(opaque, clone, type_path = "og_json::DataTable")]
pub struct DataTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Appends a column; existing rows get an empty cell.
    pub fn push_column(&mut self, name: impl Into<String>) -> usize {
        self.columns.push(name.into());
        for row in &mut self.rows {
            row.push(Value::empty());
        }
        self.columns.len() - 1
    }

    #[inline]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Appends a row, padded with empty cells or truncated to the columns.
    pub fn push_row(&mut self, cells: impl IntoIterator<Item = Value>) {
        let mut row: Vec<Value> = cells.into_iter().take(self.columns.len()).collect();
        row.resize_with(self.columns.len(), Value::empty);
        self.rows.push(row);
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// The cell at `row` in the named column, if it holds a value.
    pub fn get(&self, row: usize, column: &str) -> Option<&dyn Reflect> {
        let column = self.column_index(column)?;
        self.rows.get(row)?.get(column)?.get()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// -----------------------------------------------------------------------------
// DataSet

/// An ordered collection of named tables.
#[derive(Reflect, Clone, Default)]
#[reflect(opaque, clone, type_path = "og_json::DataSet")]
pub struct DataSet {
    tables: Vec<DataTable>,
}

impl DataSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing the one of the same name.
    pub fn push(&mut self, table: DataTable) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(slot) => *slot = table,
            None => self.tables.push(table),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DataTable> {
        self.tables.iter().find(|table| table.name == name)
    }

    #[inline]
    pub fn tables(&self) -> &[DataTable] {
        &self.tables
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use og_reflect::Value;

    use super::{DataSet, DataTable};

    #[test]
    fn rows_follow_columns() {
        let mut table = DataTable::new("t", ["a", "b"]);
        table.push_row([Value::new(1_i64), Value::new(2_i64), Value::new(3_i64)]);
        table.push_row([]);
        assert_eq!(table.rows()[0].len(), 2);
        assert!(table.rows()[1].iter().all(Value::is_empty));
        assert_eq!(table.get(0, "b").unwrap().downcast_ref::<i64>(), Some(&2));
        assert!(table.get(1, "a").is_none());

        table.push_column("c");
        assert_eq!(table.column_index("c"), Some(2));
        assert!(table.rows()[0][2].is_empty());
    }

    #[test]
    fn set_replaces_by_name() {
        let mut set = DataSet::new();
        set.push(DataTable::new("t", ["a"]));
        set.push(DataTable::new("t", ["b"]));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("t").unwrap().columns(), ["b"]);
    }
}
