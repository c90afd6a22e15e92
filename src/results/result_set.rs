use std::collections::HashMap;
use std::sync::Arc;

use super::row::{CustomDbRow, index_columns};
use crate::types::RowValues;

/// A fully collected result set.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub results: Vec<CustomDbRow>,
    /// Rows collected, or the remote update count for statements that return no records.
    pub rows_affected: usize,
    column_names: Option<Arc<Vec<String>>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            ..ResultSet::default()
        }
    }

    /// Set the labels shared by every row added afterwards.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index = Arc::new(index_columns(&column_names));
        self.column_names = Some(column_names);
    }

    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Append a row. Rows added before any column names are set get an empty label list.
    pub fn add_row_values(&mut self, values: Vec<RowValues>) {
        let column_names = self
            .column_names
            .get_or_insert_with(|| Arc::new(Vec::new()))
            .clone();
        self.results.push(CustomDbRow {
            column_names,
            values,
            column_index: self.column_index.clone(),
        });
        self.rows_affected += 1;
    }

    pub fn add_row(&mut self, row: CustomDbRow) {
        if self.column_names.is_none() {
            self.column_index = row.column_index.clone();
            self.column_names = Some(row.column_names.clone());
        }
        self.results.push(row);
        self.rows_affected += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_the_column_index() {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(Arc::new(vec!["a".to_string(), "b".to_string()]));
        rs.add_row_values(vec![RowValues::Int(1), RowValues::Null]);
        rs.add_row_values(vec![RowValues::Int(2), "x".into()]);

        assert_eq!(rs.rows_affected, 2);
        assert!(Arc::ptr_eq(&rs.results[0].column_index, &rs.results[1].column_index));
        assert_eq!(rs.results[1].get("b").and_then(RowValues::as_text), Some("x"));
    }
}
