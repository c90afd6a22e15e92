use std::fmt;
use std::sync::Arc;

use deadpool::managed::{Manager, Metrics, Pool, RecycleError, RecycleResult};

use crate::connection::Connection;
use crate::connector::Connector;
use crate::error::{RdsDataError, Result};

/// deadpool manager backed by a [`Connector`].
///
/// Recycling resets the session; a connection that had a transaction left open, or that is no
/// longer valid, is discarded.
pub struct ConnectorManager {
    connector: Arc<Connector>,
}

impl ConnectorManager {
    #[must_use]
    pub fn new(connector: Arc<Connector>) -> Self {
        Self { connector }
    }

    #[must_use]
    pub fn connector(&self) -> &Arc<Connector> {
        &self.connector
    }
}

impl fmt::Debug for ConnectorManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorManager")
            .field("database", &self.connector.config().database)
            .finish()
    }
}

impl Manager for ConnectorManager {
    type Type = Connection;
    type Error = RdsDataError;

    async fn create(&self) -> Result<Connection> {
        self.connector.connect().await
    }

    async fn recycle(
        &self,
        conn: &mut Connection,
        _metrics: &Metrics,
    ) -> RecycleResult<RdsDataError> {
        conn.reset_session().await.map_err(RecycleError::Backend)?;
        if !conn.is_valid() {
            return Err(RecycleError::Backend(RdsDataError::Closed));
        }
        Ok(())
    }
}

pub type RdsPool = Pool<ConnectorManager>;

/// Build a pool of at most `max_size` connections.
///
/// # Errors
/// [`RdsDataError::ConfigError`] if deadpool rejects the settings.
pub fn build_pool(connector: Arc<Connector>, max_size: usize) -> Result<RdsPool> {
    Pool::builder(ConnectorManager::new(connector))
        .max_size(max_size)
        .build()
        .map_err(|e| RdsDataError::ConfigError(format!("Failed to create pool: {e}")))
}
