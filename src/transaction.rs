use tracing::info;

use crate::connection::Connection;
use crate::error::{RdsDataError, Result};
use crate::results::{ExecResult, Rows};
use crate::statement::Statement;
use crate::types::NamedValue;

/// An open transaction on a [`Connection`].
///
/// Statements run through the transaction (or through [`Transaction::connection`]) carry its id.
/// Dropping it without commit or rollback leaves the remote transaction open; the connection's
/// [`Connection::reset_session`] or [`Connection::close`] rolls it back.
#[derive(Debug)]
pub struct Transaction<'c> {
    conn: &'c mut Connection,
    id: String,
    done: bool,
}

impl<'c> Transaction<'c> {
    pub(crate) fn new(conn: &'c mut Connection, id: String) -> Self {
        Self {
            conn,
            id,
            done: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True once committed or rolled back.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &*self.conn
    }

    /// # Errors
    /// See [`Connection::prepare`].
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        self.conn.prepare(sql)
    }

    /// # Errors
    /// See [`Statement::execute`].
    pub async fn execute(&self, sql: &str, args: &[NamedValue]) -> Result<ExecResult> {
        self.conn.execute(sql, args).await
    }

    /// # Errors
    /// See [`Statement::query`].
    pub async fn query(&self, sql: &str, args: &[NamedValue]) -> Result<Rows> {
        self.conn.query(sql, args).await
    }

    /// Commit the transaction.
    ///
    /// # Errors
    /// [`RdsDataError::TxDone`] if already committed or rolled back, otherwise the transport
    /// failure (the transaction then stays open).
    pub async fn commit(&mut self) -> Result<()> {
        if self.done {
            return Err(RdsDataError::TxDone);
        }
        self.conn.commit_remote(&self.id).await?;
        self.finish();
        info!(transaction_id = %self.id, "transaction committed");
        Ok(())
    }

    /// Roll the transaction back.
    ///
    /// # Errors
    /// Same as [`Transaction::commit`].
    pub async fn rollback(&mut self) -> Result<()> {
        if self.done {
            return Err(RdsDataError::TxDone);
        }
        self.conn.rollback_remote(&self.id).await?;
        self.finish();
        info!(transaction_id = %self.id, "transaction rolled back");
        Ok(())
    }

    fn finish(&mut self) {
        self.conn.clear_transaction(&self.id);
        self.done = true;
    }
}
