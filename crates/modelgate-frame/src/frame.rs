//! The [`Frame`] type: rows × named typed columns.

use crate::error::FrameError;
use modelgate_schema::{ColumnKind, DatasetSchema};
use serde_json::Value;

/// A single cell value.
///
/// `Null` models a present-but-missing value (JSON `null` or an empty CSV
/// field); a field absent from a fetched document is a schema violation, not
/// a null.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Floating-point value
    Float(f64),
    /// Integer value
    Int(i64),
    /// Categorical/text value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Missing value
    Null,
}

impl Cell {
    /// Whether the cell holds no value.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view: floats as-is, ints widened, bools as 0/1.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Bool(v) => Some(f64::from(u8::from(*v))),
            Self::Text(_) | Self::Null => None,
        }
    }

    /// Text view for categorical handling.
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Canonical string rendering used for labels and CSV fields.
    ///
    /// Null renders as the empty string.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Float(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Text(v) => v.clone(),
            Self::Bool(v) => v.to_string(),
            Self::Null => String::new(),
        }
    }

    /// Coerce a JSON value into a cell of the given kind.
    fn from_json(
        value: &Value,
        kind: ColumnKind,
        column: &str,
        row: usize,
    ) -> Result<Self, FrameError> {
        let mismatch = || FrameError::TypeMismatch {
            column: column.to_string(),
            row,
            expected: kind.as_str(),
            value: value.to_string(),
        };
        match (kind, value) {
            (_, Value::Null) => Ok(Self::Null),
            (ColumnKind::Float, Value::Number(n)) => n.as_f64().map(Self::Float).ok_or_else(mismatch),
            (ColumnKind::Int, Value::Number(n)) => n.as_i64().map(Self::Int).ok_or_else(mismatch),
            (ColumnKind::Categorical, Value::String(s)) => Ok(Self::Text(s.clone())),
            (ColumnKind::Bool, Value::Bool(b)) => Ok(Self::Bool(*b)),
            _ => Err(mismatch()),
        }
    }

    /// Parse a CSV field into a cell of the given kind.
    ///
    /// Empty fields are null.
    pub(crate) fn from_csv_field(
        field: &str,
        kind: ColumnKind,
        column: &str,
        row: usize,
    ) -> Result<Self, FrameError> {
        if field.is_empty() {
            return Ok(Self::Null);
        }
        let mismatch = || FrameError::TypeMismatch {
            column: column.to_string(),
            row,
            expected: kind.as_str(),
            value: field.to_string(),
        };
        match kind {
            ColumnKind::Float => field.parse().map(Self::Float).map_err(|_| mismatch()),
            ColumnKind::Int => field.parse().map(Self::Int).map_err(|_| mismatch()),
            ColumnKind::Categorical => Ok(Self::Text(field.to_string())),
            ColumnKind::Bool => field.parse().map(Self::Bool).map_err(|_| mismatch()),
        }
    }
}

/// A named, typed column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    cells: Vec<Cell>,
}

impl Column {
    pub(crate) fn new(name: String, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            cells: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Column name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the column has no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `row`, if in bounds.
    #[inline]
    #[must_use]
    pub fn cell(&self, row: usize) -> Option<&Cell> {
        self.cells.get(row)
    }

    /// All cells in order.
    #[inline]
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Non-null numeric values in order.
    pub fn numeric_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().filter_map(Cell::as_f64)
    }

    /// Count of null cells.
    #[must_use]
    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }
}

/// An in-memory table: equally long named typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Build a frame from fetched documents against the schema.
    ///
    /// Every schema column must be present in every document; JSON `null`
    /// becomes a null cell. Fields not declared in the schema are ignored
    /// (the document store may carry bookkeeping fields like `_id`).
    ///
    /// # Errors
    /// - [`FrameError::MissingField`] when a document lacks a declared column
    /// - [`FrameError::TypeMismatch`] when a value cannot be coerced
    pub fn from_documents(
        documents: &[serde_json::Map<String, Value>],
        schema: &DatasetSchema,
    ) -> Result<Self, FrameError> {
        let mut columns: Vec<Column> = schema
            .columns
            .iter()
            .map(|(name, kind)| Column {
                name: name.clone(),
                kind: *kind,
                cells: Vec::with_capacity(documents.len()),
            })
            .collect();

        for (row, doc) in documents.iter().enumerate() {
            for column in &mut columns {
                let value = doc.get(column.name()).ok_or_else(|| FrameError::MissingField {
                    row,
                    field: column.name.clone(),
                })?;
                let cell = Cell::from_json(value, column.kind, &column.name, row)?;
                column.cells.push(cell);
            }
        }

        Ok(Self {
            columns,
            n_rows: documents.len(),
        })
    }

    /// Construct from pre-built columns. Internal; callers guarantee equal
    /// lengths.
    pub(crate) fn from_columns(columns: Vec<Column>) -> Self {
        let n_rows = columns.first().map_or(0, Column::len);
        debug_assert!(columns.iter().all(|c| c.len() == n_rows));
        Self { columns, n_rows }
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Whether the frame has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column by name, as an error on absence.
    ///
    /// # Errors
    /// Returns [`FrameError::UnknownColumn`] if the column does not exist.
    pub fn require_column(&self, name: &str) -> Result<&Column, FrameError> {
        self.column(name)
            .ok_or_else(|| FrameError::UnknownColumn(name.to_string()))
    }

    /// All columns in order.
    #[inline]
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Column names in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// New frame containing the given rows, in the given order.
    ///
    /// Out-of-bounds indices are skipped; callers pass indices produced from
    /// this frame's own row range.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                cells: indices
                    .iter()
                    .filter_map(|&i| c.cells.get(i).cloned())
                    .collect(),
            })
            .collect();
        Self::from_columns(columns)
    }
}
