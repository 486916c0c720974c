use crate::error::{ConsoleError, Result};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    /// Key used by every row of the owning result set.
    pub name: String,
    pub alias: Option<String>,
    pub column_type: Option<String>,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            column_type: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = Some(column_type.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "null"),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: HashMap<String, Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.add_cell(column, Cell::new(value));
        self
    }

    pub fn add_cell(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.insert(column.into(), cell);
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn column_names(&self) -> BTreeSet<&str> {
        self.cells.keys().map(String::as_str).collect()
    }
}

/// One page of query output. Every row carries exactly one cell per declared column.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    columns: Vec<ColumnMetadata>,
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnMetadata>, rows: Vec<Row>) -> Result<Self> {
        let mut rs = Self::empty(columns);
        for row in rows {
            rs.add_row(row)?;
        }
        Ok(rs)
    }

    pub fn empty(columns: Vec<ColumnMetadata>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Row) -> Result<()> {
        let declared: BTreeSet<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let actual = row.column_names();
        if declared != actual {
            let missing: Vec<&str> = declared.difference(&actual).copied().collect();
            let unknown: Vec<&str> = actual.difference(&declared).copied().collect();
            return Err(ConsoleError::InvalidResultSet(format!(
                "row {} does not match declared columns (missing: [{}], unknown: [{}])",
                self.rows.len(),
                missing.join(", "),
                unknown.join(", ")
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
