use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::{DataApiClient, ExecuteStatementRequest, ExecuteStatementResponse, Field};
use crate::config::Config;
use crate::connection::{Connection, guarded};
use crate::dialect::Dialect;
use crate::error::{RdsDataError, Result};
use crate::retry::{Clock, RetryPolicy, SystemClock};
use crate::types::DialectKind;

const WAKEUP_SQL: &str = "/* wakeup */ SELECT VERSION()";

/// How long a successful wakeup is trusted before the next connect probes again.
pub const WAKEUP_TTL: Duration = Duration::from_secs(5 * 60);

lazy_static! {
    static ref POSTGRES_VERSION: Regex = Regex::new("(?i)postgres").expect("static regex");
}

#[derive(Debug, Default)]
struct ProbeState {
    last_success: Option<Instant>,
    dialect: Option<Dialect>,
}

/// Hands out [`Connection`]s for one database, probing the cluster before first use.
///
/// The probe wakes a paused serverless cluster and sniffs its engine from the version string.
/// Its result is cached for [`WAKEUP_TTL`].
pub struct Connector {
    client: Arc<dyn DataApiClient>,
    config: Arc<Config>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    cancel: Option<CancellationToken>,
    state: Mutex<ProbeState>,
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Connector {
    #[must_use]
    pub fn new(client: Arc<dyn DataApiClient>, config: Config) -> Self {
        Self {
            client,
            config: Arc::new(config),
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
            cancel: None,
            state: Mutex::new(ProbeState::default()),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Cancel the probe and every remote call of connections created from here on.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dialect found by the last successful probe.
    #[must_use]
    pub fn dialect(&self) -> Option<Dialect> {
        self.state().dialect
    }

    /// Open a connection, probing first when the cached dialect is missing or stale.
    ///
    /// # Errors
    /// [`RdsDataError::WakeupFailed`] when every probe attempt fails, or
    /// [`RdsDataError::Cancelled`].
    pub async fn connect(&self) -> Result<Connection> {
        let dialect = match self.fresh_dialect() {
            Some(dialect) => dialect,
            None => {
                let dialect = self.wakeup().await?;
                let mut state = self.state();
                state.dialect = Some(dialect);
                state.last_success = Some(self.clock.now());
                dialect
            }
        };

        let conn = Connection::new(Arc::clone(&self.client), Arc::clone(&self.config), dialect);
        Ok(match &self.cancel {
            Some(token) => conn.with_cancellation(token.clone()),
            None => conn,
        })
    }

    /// Run the version probe under the retry policy and pick the dialect from its answer.
    ///
    /// # Errors
    /// [`RdsDataError::WakeupFailed`] naming the attempt count and last error.
    pub async fn wakeup(&self) -> Result<Dialect> {
        let kind = self
            .retry
            .run(self.clock.as_ref(), |attempt| async move {
                debug!(attempt, "wakeup probe");
                let response = self.probe().await?;
                sniff_dialect(&response)
            })
            .await?;
        let dialect = Dialect::new(kind, self.config.parse_time);
        info!(dialect = ?kind, database = %self.config.database, "dialect detected");
        Ok(dialect)
    }

    async fn probe(&self) -> Result<ExecuteStatementResponse> {
        let request = ExecuteStatementRequest {
            resource_arn: self.config.resource_arn.clone(),
            secret_arn: self.config.secret_arn.clone(),
            database: self.config.database.clone(),
            sql: WAKEUP_SQL.to_string(),
            ..ExecuteStatementRequest::default()
        };
        guarded(self.cancel.as_ref(), self.client.execute_statement(request)).await
    }

    fn fresh_dialect(&self) -> Option<Dialect> {
        let state = self.state();
        let last = state.last_success?;
        if self.clock.now().saturating_duration_since(last) > WAKEUP_TTL {
            return None;
        }
        state.dialect
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ProbeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// First field of the first record decides: anything mentioning postgres is Postgres.
fn sniff_dialect(response: &ExecuteStatementResponse) -> Result<DialectKind> {
    let first = response
        .records
        .first()
        .and_then(|record| record.first())
        .ok_or(RdsDataError::InvalidVersionResponse)?;
    match first {
        Field::StringValue(version) if POSTGRES_VERSION.is_match(version) => {
            Ok(DialectKind::Postgres)
        }
        _ => Ok(DialectKind::MySql),
    }
}
