use crate::client::ExecuteStatementResponse;
use crate::connection::Connection;
use crate::error::{RdsDataError, Result};
use crate::results::{ExecResult, Rows};
use crate::types::{NamedValue, RowValues};

/// One or more SQL texts prepared on a [`Connection`].
///
/// Preparing is purely local; each execution sends every text in order, each with the same
/// arguments and the connection's open transaction.
#[derive(Debug)]
pub struct Statement<'c> {
    conn: &'c Connection,
    texts: Vec<String>,
    closed: bool,
}

impl<'c> Statement<'c> {
    pub(crate) fn new(conn: &'c Connection, texts: Vec<String>) -> Self {
        Self {
            conn,
            texts,
            closed: false,
        }
    }

    #[must_use]
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Number of placeholders, which is not known without parsing: always `None`.
    #[must_use]
    pub fn num_input(&self) -> Option<usize> {
        None
    }

    /// Label positional values with their 1-based ordinals.
    #[must_use]
    pub fn convert_ordinal(values: &[RowValues]) -> Vec<NamedValue> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| NamedValue::ordinal(i + 1, value.clone()))
            .collect()
    }

    /// # Errors
    /// [`RdsDataError::Closed`] if the statement was already closed.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(RdsDataError::Closed);
        }
        self.closed = true;
        Ok(())
    }

    /// Run every text and aggregate update counts and the generated id.
    ///
    /// # Errors
    /// The first failure stops the batch; texts already sent are not undone.
    pub async fn execute(&self, args: &[NamedValue]) -> Result<ExecResult> {
        let responses = self.run(args).await?;
        Ok(ExecResult::from_responses(&responses))
    }

    /// Run every text and expose the records of each as a result set.
    ///
    /// # Errors
    /// As [`Statement::execute`].
    pub async fn query(&self, args: &[NamedValue]) -> Result<Rows> {
        let responses = self.run(args).await?;
        Ok(Rows::new(self.conn.dialect(), responses))
    }

    /// [`Statement::execute`] with positional values.
    ///
    /// # Errors
    /// As [`Statement::execute`].
    pub async fn execute_positional(&self, values: &[RowValues]) -> Result<ExecResult> {
        self.execute(&Self::convert_ordinal(values)).await
    }

    /// [`Statement::query`] with positional values.
    ///
    /// # Errors
    /// As [`Statement::execute`].
    pub async fn query_positional(&self, values: &[RowValues]) -> Result<Rows> {
        self.query(&Self::convert_ordinal(values)).await
    }

    async fn run(&self, args: &[NamedValue]) -> Result<Vec<ExecuteStatementResponse>> {
        if self.closed {
            return Err(RdsDataError::Closed);
        }
        self.conn.ensure_open()?;

        let dialect = self.conn.dialect();
        let mut responses = Vec::with_capacity(self.texts.len());
        for text in &self.texts {
            let request = dialect.migrate_query(text, args)?;
            responses.push(self.conn.execute_request(request).await?);
        }
        Ok(responses)
    }
}
