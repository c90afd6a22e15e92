use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// One decoded record.
///
/// Column labels and the label-to-position index are shared by every row of the same result set.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomDbRow {
    pub column_names: Arc<Vec<String>>,
    pub values: Vec<RowValues>,
    #[doc(hidden)]
    pub(crate) column_index: Arc<HashMap<String, usize>>,
}

impl CustomDbRow {
    /// Build a row, indexing `column_names` on the spot.
    ///
    /// Prefer [`super::ResultSet::add_row_values`] when creating many rows with the same columns.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let column_index = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// Position of `column_name`; duplicate labels resolve to the first occurrence.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        index.entry(name.clone()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_label_and_position() {
        let names = Arc::new(vec!["id".to_string(), "name".to_string(), "id".to_string()]);
        let row = CustomDbRow::new(
            names,
            vec![RowValues::Int(1), "a".into(), RowValues::Int(2)],
        );
        assert_eq!(row.get("id"), Some(&RowValues::Int(1)));
        assert_eq!(row.get("name").and_then(RowValues::as_text), Some("a"));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_by_index(2), Some(&RowValues::Int(2)));
        assert_eq!(row.len(), 3);
    }
}
