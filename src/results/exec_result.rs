use crate::client::{ExecuteStatementResponse, Field};

/// Outcome of a statement that does not return records.
///
/// Aggregates every response of a multi-statement batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecResult {
    rows_affected: i64,
    last_insert_id: Option<i64>,
    generated_fields: Vec<Field>,
}

impl ExecResult {
    pub(crate) fn from_responses(responses: &[ExecuteStatementResponse]) -> Self {
        let rows_affected = responses.iter().map(|r| r.number_of_records_updated).sum();
        let generated = responses.iter().find_map(|r| match r.generated_fields.as_slice() {
            [Field::LongValue(id)] => Some((*id, r.generated_fields.clone())),
            _ => None,
        });
        let (last_insert_id, generated_fields) = match generated {
            Some((id, fields)) => (Some(id), fields),
            None => (None, Vec::new()),
        };
        Self {
            rows_affected,
            last_insert_id,
            generated_fields,
        }
    }

    /// Sum of the update counts of every statement in the batch.
    #[must_use]
    pub fn rows_affected(&self) -> i64 {
        self.rows_affected
    }

    /// Id from the first response reporting exactly one integer generated field.
    #[must_use]
    pub fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    #[must_use]
    pub fn generated_fields(&self) -> &[Field] {
        &self.generated_fields
    }
}
