use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::client::DataApiClient;
use crate::config::{Config, DRIVER_NAME};
use crate::connection::Connection;
use crate::connector::Connector;
use crate::error::{RdsDataError, Result};

/// Builds the transport for a configuration. Credential and region loading live here, in the host.
pub trait ClientFactory: Send + Sync {
    /// # Errors
    /// Whatever prevents the host from building a client for `config`.
    fn create_client(&self, config: &Config) -> Result<Arc<dyn DataApiClient>>;
}

impl<F> ClientFactory for F
where
    F: Fn(&Config) -> Result<Arc<dyn DataApiClient>> + Send + Sync,
{
    fn create_client(&self, config: &Config) -> Result<Arc<dyn DataApiClient>> {
        self(config)
    }
}

/// Something that turns a connection string into connectors and connections.
#[async_trait]
pub trait Driver: Send + Sync {
    fn name(&self) -> &str;

    /// # Errors
    /// Parsing or client construction failures.
    fn open_connector(&self, dsn: &str) -> Result<Connector>;

    /// Open a connector and connect once.
    ///
    /// # Errors
    /// As [`Driver::open_connector`], plus [`Connector::connect`] failures.
    async fn open(&self, dsn: &str) -> Result<Connection> {
        self.open_connector(dsn)?.connect().await
    }
}

/// The `rds` driver.
pub struct RdsDriver {
    factory: Arc<dyn ClientFactory>,
}

impl RdsDriver {
    #[must_use]
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self { factory }
    }
}

impl fmt::Debug for RdsDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RdsDriver").finish_non_exhaustive()
    }
}

#[async_trait]
impl Driver for RdsDriver {
    fn name(&self) -> &str {
        DRIVER_NAME
    }

    fn open_connector(&self, dsn: &str) -> Result<Connector> {
        let config = Config::from_dsn(dsn)?;
        let client = self.factory.create_client(&config)?;
        Ok(Connector::new(client, config))
    }
}

/// Drivers available to the host, by name.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn Driver>>,
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}

impl DriverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// [`RdsDataError::ConfigError`] if a driver with the same name is already registered.
    pub fn register(&mut self, driver: Arc<dyn Driver>) -> Result<()> {
        let name = driver.name().to_string();
        if self.drivers.contains_key(&name) {
            return Err(RdsDataError::ConfigError(format!(
                "driver {name} is already registered"
            )));
        }
        self.drivers.insert(name, driver);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.get(name).cloned()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drivers.keys().cloned().collect();
        names.sort();
        names
    }

    /// # Errors
    /// [`RdsDataError::ConfigError`] for an unknown driver, otherwise as [`Driver::open_connector`].
    pub fn open_connector(&self, name: &str, dsn: &str) -> Result<Connector> {
        self.lookup(name)?.open_connector(dsn)
    }

    /// # Errors
    /// [`RdsDataError::ConfigError`] for an unknown driver, otherwise as [`Driver::open`].
    pub async fn open(&self, name: &str, dsn: &str) -> Result<Connection> {
        self.lookup(name)?.open(dsn).await
    }

    fn lookup(&self, name: &str) -> Result<&Arc<dyn Driver>> {
        self.drivers
            .get(name)
            .ok_or_else(|| RdsDataError::ConfigError(format!("unknown driver {name}")))
    }
}
