use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{
    BeginTransactionRequest, DataApiClient, EndTransactionRequest, ExecuteStatementRequest,
    ExecuteStatementResponse,
};
use crate::config::Config;
use crate::dialect::Dialect;
use crate::error::{BoxError, RdsDataError, Result};
use crate::results::{ExecResult, Rows};
use crate::statement::Statement;
use crate::transaction::Transaction;
use crate::translation::split_statements;
use crate::types::{NamedValue, TxOptions};

const PING_SQL: &str = "/* ping */ SELECT 1";

/// A logical session against the statement-execution service.
///
/// No socket is held: the session is the pair of identities in [`Config`] plus the id of the
/// transaction currently open, if any. A connection serves one caller at a time; mutating
/// operations take `&mut self`.
pub struct Connection {
    client: Arc<dyn DataApiClient>,
    config: Arc<Config>,
    dialect: Dialect,
    current_tx: Option<String>,
    closed: bool,
    cancel: Option<CancellationToken>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("database", &self.config.database)
            .field("dialect", &self.dialect)
            .field("current_tx", &self.current_tx)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Connection {
    #[must_use]
    pub fn new(client: Arc<dyn DataApiClient>, config: Arc<Config>, dialect: Dialect) -> Self {
        Self {
            client,
            config,
            dialect,
            current_tx: None,
            closed: false,
            cancel: None,
        }
    }

    /// Abort in-flight remote calls with [`RdsDataError::Cancelled`] once `token` fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Id of the open transaction, attached to every statement run on this connection.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.current_tx.as_deref()
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(RdsDataError::Closed);
        }
        Ok(())
    }

    /// Parse `sql` into a statement. Nothing is sent to the server.
    ///
    /// With `split_multi` enabled the text is split on top-level `;` into separate statements.
    ///
    /// # Errors
    /// [`RdsDataError::Closed`] on a closed connection.
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        self.ensure_open()?;
        let texts = if self.config.split_multi {
            split_statements(sql, self.dialect.kind())
        } else {
            vec![sql.to_string()]
        };
        Ok(Statement::new(self, texts))
    }

    /// Prepare and execute in one step.
    ///
    /// # Errors
    /// See [`Statement::execute`].
    pub async fn execute(&self, sql: &str, args: &[NamedValue]) -> Result<ExecResult> {
        self.prepare(sql)?.execute(args).await
    }

    /// Prepare and query in one step.
    ///
    /// # Errors
    /// See [`Statement::query`].
    pub async fn query(&self, sql: &str, args: &[NamedValue]) -> Result<Rows> {
        self.prepare(sql)?.query(args).await
    }

    /// Round-trip a trivial statement.
    ///
    /// # Errors
    /// [`RdsDataError::Closed`] or the transport failure.
    pub async fn ping(&self) -> Result<()> {
        self.ensure_open()?;
        let request = ExecuteStatementRequest {
            sql: PING_SQL.to_string(),
            ..ExecuteStatementRequest::default()
        };
        self.execute_request(request).await.map(|_| ())
    }

    /// Start a transaction with default isolation, read-write.
    ///
    /// # Errors
    /// See [`Connection::begin_tx`].
    pub async fn begin(&mut self) -> Result<Transaction<'_>> {
        self.begin_tx(TxOptions::default()).await
    }

    /// Start a transaction.
    ///
    /// Unsupported isolation levels are rejected before anything is sent. Non-default options
    /// are applied with a `SET TRANSACTION` statement right after the remote begin; if that
    /// statement fails the new transaction is rolled back and the setup error returned.
    ///
    /// # Errors
    /// [`RdsDataError::Closed`], [`RdsDataError::TransactionAlreadyOpen`],
    /// [`RdsDataError::IsolationNotSupported`], or a transport failure.
    pub async fn begin_tx(&mut self, opts: TxOptions) -> Result<Transaction<'_>> {
        self.ensure_open()?;
        if self.current_tx.is_some() {
            return Err(RdsDataError::TransactionAlreadyOpen);
        }
        if !self.dialect.is_isolation_supported(opts.isolation) {
            return Err(RdsDataError::IsolationNotSupported(opts.isolation));
        }

        let request = BeginTransactionRequest {
            resource_arn: self.config.resource_arn.clone(),
            secret_arn: self.config.secret_arn.clone(),
            database: self.config.database.clone(),
        };
        debug!(database = %request.database, "begin transaction");
        let response = self.guarded(self.client.begin_transaction(request)).await?;
        let id = response.transaction_id;
        self.current_tx = Some(id.clone());

        if let Some(setup) = self.dialect.transaction_setup_clause(&opts) {
            let request = ExecuteStatementRequest {
                sql: setup,
                ..ExecuteStatementRequest::default()
            };
            if let Err(err) = self.execute_request(request).await {
                self.current_tx = None;
                if let Err(rollback_err) = self.rollback_remote(&id).await {
                    warn!(
                        transaction_id = %id,
                        error = %rollback_err,
                        "rollback after failed transaction setup failed"
                    );
                }
                return Err(err);
            }
        }

        info!(
            transaction_id = %id,
            isolation = %opts.isolation,
            read_only = opts.read_only,
            "transaction started"
        );
        Ok(Transaction::new(self, id))
    }

    /// Prepare the connection for reuse by a pool.
    ///
    /// # Errors
    /// [`RdsDataError::BadConnection`] when a transaction was left open (it is rolled back first),
    /// or the rollback failure itself.
    pub async fn reset_session(&mut self) -> Result<()> {
        if let Some(id) = self.current_tx.take() {
            self.rollback_remote(&id).await?;
            return Err(RdsDataError::BadConnection);
        }
        Ok(())
    }

    /// Whether a pool may hand this connection out again.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.closed
            && !self.config.database.is_empty()
            && !self.config.resource_arn.is_empty()
            && !self.config.secret_arn.is_empty()
    }

    /// Roll back any open transaction and mark the connection closed.
    ///
    /// # Errors
    /// [`RdsDataError::Closed`] when already closed, or the rollback failure (the connection then
    /// stays open).
    pub async fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        if let Some(id) = self.current_tx.clone() {
            self.rollback_remote(&id).await?;
            self.current_tx = None;
        }
        self.closed = true;
        Ok(())
    }

    /// Send one statement, filling in identities, the open transaction and the metadata flag.
    pub(crate) async fn execute_request(
        &self,
        mut request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse> {
        request.resource_arn.clone_from(&self.config.resource_arn);
        request.secret_arn.clone_from(&self.config.secret_arn);
        request.database.clone_from(&self.config.database);
        request.transaction_id.clone_from(&self.current_tx);
        request.include_result_metadata = true;

        debug!(
            sql = %request.sql,
            params = request.parameters.len(),
            in_transaction = request.transaction_id.is_some(),
            "execute statement"
        );
        self.guarded(self.client.execute_statement(request)).await
    }

    pub(crate) async fn commit_remote(&self, transaction_id: &str) -> Result<()> {
        debug!(transaction_id, "commit transaction");
        let request = self.end_request(transaction_id);
        self.guarded(self.client.commit_transaction(request)).await?;
        Ok(())
    }

    pub(crate) async fn rollback_remote(&self, transaction_id: &str) -> Result<()> {
        debug!(transaction_id, "rollback transaction");
        let request = self.end_request(transaction_id);
        self.guarded(self.client.rollback_transaction(request)).await?;
        Ok(())
    }

    /// Forget `transaction_id` if it is still the open one.
    pub(crate) fn clear_transaction(&mut self, transaction_id: &str) {
        if self.current_tx.as_deref() == Some(transaction_id) {
            self.current_tx = None;
        }
    }

    fn end_request(&self, transaction_id: &str) -> EndTransactionRequest {
        EndTransactionRequest {
            resource_arn: self.config.resource_arn.clone(),
            secret_arn: self.config.secret_arn.clone(),
            transaction_id: transaction_id.to_string(),
        }
    }

    async fn guarded<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, BoxError>>,
    {
        guarded(self.cancel.as_ref(), call).await
    }
}

/// Run a remote call, racing it against `cancel` when one is set.
pub(crate) async fn guarded<T, F>(cancel: Option<&CancellationToken>, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, BoxError>>,
{
    match cancel {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => Err(RdsDataError::Cancelled),
            res = call => res.map_err(RdsDataError::transport),
        },
        None => call.await.map_err(RdsDataError::transport),
    }
}
