use std::sync::Arc;

use tracing::debug;

use super::{CustomDbRow, ResultSet};
use crate::client::{ExecuteStatementResponse, Field};
use crate::dialect::{Dialect, FieldDecoder, decode};
use crate::error::Result;
use crate::types::RowValues;

/// Records returned by a query, possibly spread across several result sets.
///
/// Every record is already in memory; decoding happens row by row as the caller advances.
/// [`Rows::next_row`] moves on to the next result set once the current one is exhausted, and
/// [`Rows::next_result_set`] skips whatever is left of the current one.
#[derive(Debug)]
pub struct Rows {
    dialect: Dialect,
    results: Vec<ExecuteStatementResponse>,
    set_idx: usize,
    record_idx: usize,
    column_names: Arc<Vec<String>>,
    column_types: Vec<String>,
    decoders: Vec<FieldDecoder>,
    closed: bool,
}

impl Rows {
    pub(crate) fn new(dialect: Dialect, results: Vec<ExecuteStatementResponse>) -> Self {
        let mut rows = Self {
            dialect,
            results,
            set_idx: 0,
            record_idx: 0,
            column_names: Arc::new(Vec::new()),
            column_types: Vec::new(),
            decoders: Vec::new(),
            closed: false,
        };
        rows.set_result_index(0);
        rows
    }

    fn set_result_index(&mut self, idx: usize) {
        self.set_idx = idx;
        self.record_idx = 0;
        let Some(current) = self.results.get(idx) else {
            return;
        };
        // statements without metadata keep the labels of the previous set
        if current.column_metadata.is_empty() && idx > 0 {
            return;
        }
        let metadata = &current.column_metadata;
        self.column_names = Arc::new(
            metadata
                .iter()
                .map(|col| {
                    if col.label.is_empty() {
                        col.name.clone()
                    } else {
                        col.label.clone()
                    }
                })
                .collect(),
        );
        self.column_types = metadata.iter().map(|col| col.type_name.clone()).collect();
        self.decoders = metadata
            .iter()
            .map(|col| self.dialect.field_decoder(&col.type_name))
            .collect();
    }

    /// Column labels of the current result set.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.column_names
    }

    /// Database type names of the current result set, as reported by the server.
    #[must_use]
    pub fn column_types(&self) -> &[String] {
        &self.column_types
    }

    #[must_use]
    pub fn has_next_result_set(&self) -> bool {
        self.set_idx + 1 < self.results.len()
    }

    /// Skip to the next result set. Returns false when there is none.
    pub fn next_result_set(&mut self) -> bool {
        if self.closed || !self.has_next_result_set() {
            return false;
        }
        self.set_result_index(self.set_idx + 1);
        true
    }

    /// Next record, crossing into later result sets as needed. `None` once everything is consumed.
    ///
    /// # Errors
    /// [`crate::RdsDataError::DecodeError`] naming the column that failed to decode.
    pub fn next_row(&mut self) -> Result<Option<CustomDbRow>> {
        loop {
            if let Some(row) = self.next_in_current_set()? {
                return Ok(Some(row));
            }
            if !self.next_result_set() {
                return Ok(None);
            }
        }
    }

    fn next_in_current_set(&mut self) -> Result<Option<CustomDbRow>> {
        if self.closed {
            return Ok(None);
        }
        let Some(current) = self.results.get(self.set_idx) else {
            return Ok(None);
        };
        let Some(record) = current.records.get(self.record_idx) else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(record.len());
        for (i, field) in record.iter().enumerate() {
            values.push(self.decode_field(current, i, field)?);
        }
        self.record_idx += 1;
        Ok(Some(CustomDbRow::new(self.column_names.clone(), values)))
    }

    fn decode_field(
        &self,
        current: &ExecuteStatementResponse,
        column: usize,
        field: &Field,
    ) -> Result<RowValues> {
        let decoded = match self.decoders.get(column) {
            Some(decoder) => decoder.decode(column, field),
            None => decode::generic(column, field),
        };
        decoded.inspect_err(|_| {
            debug!(
                column,
                metadata = ?current.column_metadata.get(column),
                "failed to decode column"
            );
        })
    }

    /// Stop iterating. Later calls to [`Rows::next_row`] return `None`.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Collect the remaining records of the current result set.
    ///
    /// # Errors
    /// Any decode error hit while collecting.
    pub fn into_result_set(mut self) -> Result<ResultSet> {
        let remaining = self
            .results
            .get(self.set_idx)
            .map_or(0, |r| r.records.len().saturating_sub(self.record_idx));
        let mut result_set = ResultSet::with_capacity(remaining);
        result_set.set_column_names(self.column_names.clone());
        while let Some(row) = self.next_in_current_set()? {
            result_set.add_row_values(row.values);
        }
        Ok(result_set)
    }
}
