//! CSV persistence for frame partitions.

use crate::error::FrameError;
use crate::frame::{Cell, Column, Frame};
use modelgate_schema::DatasetSchema;
use std::path::Path;

impl Frame {
    /// Write the frame as CSV with a header row.
    ///
    /// Null cells become empty fields.
    ///
    /// # Errors
    /// Returns [`FrameError::Csv`] or [`FrameError::Io`] on write failure.
    pub fn write_csv(&self, path: &Path) -> Result<(), FrameError> {
        let mut writer = csv::Writer::from_path(path).map_err(|source| FrameError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        writer
            .write_record(self.column_names())
            .map_err(|source| FrameError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        for row in 0..self.n_rows() {
            let record: Vec<String> = self
                .columns()
                .map(|c| c.cell(row).map_or_else(String::new, Cell::render))
                .collect();
            writer.write_record(&record).map_err(|source| FrameError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        }
        writer.flush().map_err(|source| FrameError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a frame back from CSV, typed by the schema.
    ///
    /// Columns are taken in header order; every schema column must be
    /// present in the header. Empty fields become null cells.
    ///
    /// # Errors
    /// - [`FrameError::Csv`] on malformed CSV
    /// - [`FrameError::UnknownColumn`] if the header lacks a schema column
    /// - [`FrameError::TypeMismatch`] if a field cannot be parsed
    pub fn read_csv(path: &Path, schema: &DatasetSchema) -> Result<Self, FrameError> {
        let mut reader = csv::Reader::from_path(path).map_err(|source| FrameError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let header: Vec<String> = reader
            .headers()
            .map_err(|source| FrameError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(ToString::to_string)
            .collect();

        // Map each schema column to its position in the file.
        let mut layout = Vec::with_capacity(schema.columns.len());
        for (name, kind) in &schema.columns {
            let position = header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| FrameError::UnknownColumn(name.clone()))?;
            layout.push((name.clone(), *kind, position));
        }

        let mut columns: Vec<Column> = layout
            .iter()
            .map(|(name, kind, _)| Column::new(name.clone(), *kind))
            .collect();

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|source| FrameError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            for (column, (name, kind, position)) in columns.iter_mut().zip(&layout) {
                let field = record.get(*position).unwrap_or("");
                let cell = Cell::from_csv_field(field, *kind, name, row)?;
                column.push(cell);
            }
        }

        Ok(Self::from_columns(columns))
    }
}
