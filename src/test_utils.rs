//! In-memory stand-ins for the remote service and the clock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::client::{
    BeginTransactionRequest, BeginTransactionResponse, ColumnMetadata, DataApiClient,
    EndTransactionRequest, EndTransactionResponse, ExecuteStatementRequest,
    ExecuteStatementResponse, Field,
};
use crate::error::BoxError;
use crate::retry::Clock;

/// A call received by [`ScriptedClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Execute(ExecuteStatementRequest),
    Begin(BeginTransactionRequest),
    Commit(EndTransactionRequest),
    Rollback(EndTransactionRequest),
}

#[derive(Debug, Default)]
struct Script {
    executes: VecDeque<Result<ExecuteStatementResponse, String>>,
    begins: VecDeque<Result<String, String>>,
    commits: VecDeque<Result<(), String>>,
    rollbacks: VecDeque<Result<(), String>>,
    calls: Vec<Call>,
    next_tx: u32,
}

/// Transport that replays queued answers and records every request.
///
/// Unscripted statements answer with an empty response, unscripted begins hand out
/// `tx-1`, `tx-2`, ... and unscripted commits and rollbacks succeed.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    script: Mutex<Script>,
}

impl ScriptedClient {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_response(&self, response: ExecuteStatementResponse) {
        self.script().executes.push_back(Ok(response));
    }

    /// Queue a response with one column per `(label, type)` and the given records.
    pub fn push_records(&self, columns: &[(&str, &str)], records: Vec<Vec<Field>>) {
        self.push_response(records_response(columns, records));
    }

    /// Queue a response reporting an update count and generated fields.
    pub fn push_update(&self, rows_updated: i64, generated_fields: Vec<Field>) {
        self.push_response(ExecuteStatementResponse {
            number_of_records_updated: rows_updated,
            generated_fields,
            ..ExecuteStatementResponse::default()
        });
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.script().executes.push_back(Err(message.into()));
    }

    pub fn push_begin(&self, transaction_id: impl Into<String>) {
        self.script().begins.push_back(Ok(transaction_id.into()));
    }

    pub fn fail_next_begin(&self, message: impl Into<String>) {
        self.script().begins.push_back(Err(message.into()));
    }

    pub fn fail_next_commit(&self, message: impl Into<String>) {
        self.script().commits.push_back(Err(message.into()));
    }

    pub fn fail_next_rollback(&self, message: impl Into<String>) {
        self.script().rollbacks.push_back(Err(message.into()));
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    /// Every statement request, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ExecuteStatementRequest> {
        self.script()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Execute(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn executed_sql(&self) -> Vec<String> {
        self.requests().into_iter().map(|req| req.sql).collect()
    }

    #[must_use]
    pub fn commits(&self) -> usize {
        self.count(|call| matches!(call, Call::Commit(_)))
    }

    #[must_use]
    pub fn rollbacks(&self) -> usize {
        self.count(|call| matches!(call, Call::Rollback(_)))
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.script().calls.iter().filter(|call| pred(call)).count()
    }
}

/// Response carrying metadata and records, as returned for a query.
#[must_use]
pub fn records_response(
    columns: &[(&str, &str)],
    records: Vec<Vec<Field>>,
) -> ExecuteStatementResponse {
    ExecuteStatementResponse {
        column_metadata: columns
            .iter()
            .map(|(label, type_name)| ColumnMetadata {
                name: (*label).to_string(),
                label: (*label).to_string(),
                type_name: (*type_name).to_string(),
                ..ColumnMetadata::default()
            })
            .collect(),
        records,
        ..ExecuteStatementResponse::default()
    }
}

#[async_trait]
impl DataApiClient for ScriptedClient {
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, BoxError> {
        let mut script = self.script();
        script.calls.push(Call::Execute(request));
        match script.executes.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(message.into()),
            None => Ok(ExecuteStatementResponse::default()),
        }
    }

    async fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, BoxError> {
        let mut script = self.script();
        script.calls.push(Call::Begin(request));
        let transaction_id = match script.begins.pop_front() {
            Some(Ok(id)) => id,
            Some(Err(message)) => return Err(message.into()),
            None => {
                script.next_tx += 1;
                format!("tx-{}", script.next_tx)
            }
        };
        Ok(BeginTransactionResponse { transaction_id })
    }

    async fn commit_transaction(
        &self,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, BoxError> {
        let mut script = self.script();
        script.calls.push(Call::Commit(request));
        match script.commits.pop_front() {
            Some(Err(message)) => Err(message.into()),
            _ => Ok(EndTransactionResponse {
                transaction_status: "Transaction Committed".to_string(),
            }),
        }
    }

    async fn rollback_transaction(
        &self,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, BoxError> {
        let mut script = self.script();
        script.calls.push(Call::Rollback(request));
        match script.rollbacks.pop_front() {
            Some(Err(message)) => Err(message.into()),
            _ => Ok(EndTransactionResponse {
                transaction_status: "Rollback Complete".to_string(),
            }),
        }
    }
}

/// Clock whose time only moves when slept on or advanced by hand.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
    sleeps: Mutex<Vec<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
            sleeps: Mutex::new(Vec::new()),
        }
    }
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Every duration slept so far.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        self.advance(duration);
    }
}
