#![cfg(feature = "test-utils")]

mod common;

use std::error::Error;
use std::sync::Arc;

use rds_data_driver::prelude::*;
use rds_data_driver::test_utils::ScriptedClient;

use common::{config, version_row};

fn driver_over(client: Arc<ScriptedClient>) -> Arc<RdsDriver> {
    let factory = move |_: &Config| -> Result<Arc<dyn DataApiClient>, RdsDataError> {
        Ok(client.clone() as Arc<dyn DataApiClient>)
    };
    Arc::new(RdsDriver::new(Arc::new(factory)))
}

#[tokio::test]
async fn test04_registry_opens_by_name() -> Result<(), Box<dyn Error>> {
    let client = ScriptedClient::new();
    client.push_records(&[("VERSION()", "VARCHAR")], version_row("5.7.12"));

    let mut registry = DriverRegistry::new();
    registry.register(driver_over(client.clone()))?;
    assert_eq!(registry.names(), vec!["rds".to_string()]);
    assert!(registry.get("rds").is_some());

    let dsn = config().with_custom("x-trace", "on").to_dsn();
    let conn = registry.open("rds", &dsn).await?;
    assert_eq!(conn.config().database, "app");
    assert_eq!(conn.config().custom["x-trace"], vec!["on".to_string()]);
    assert_eq!(client.executed_sql(), vec!["/* wakeup */ SELECT VERSION()"]);
    Ok(())
}

#[tokio::test]
async fn test04_registry_rejects_duplicates_and_unknown_names() {
    let mut registry = DriverRegistry::new();
    registry.register(driver_over(ScriptedClient::new())).unwrap();
    assert!(matches!(
        registry.register(driver_over(ScriptedClient::new())),
        Err(RdsDataError::ConfigError(_))
    ));
    assert!(matches!(
        registry.open_connector("mysql", "rds://?database=app"),
        Err(RdsDataError::ConfigError(_))
    ));
}

#[tokio::test]
async fn test04_driver_rejects_foreign_scheme() {
    let driver = driver_over(ScriptedClient::new());
    let err = driver
        .open("postgres://?resource_arn=a&secret_arn=b&database=c")
        .await
        .unwrap_err();
    assert!(matches!(err, RdsDataError::InvalidDsnScheme { .. }));
}

#[tokio::test]
async fn test04_pool_discards_connections_left_in_a_transaction() -> Result<(), Box<dyn Error>> {
    let client = ScriptedClient::new();
    client.push_records(&[("VERSION()", "VARCHAR")], version_row("5.7.12"));
    let connector = Arc::new(Connector::new(client.clone(), config()));
    let pool = build_pool(connector, 2)?;

    {
        let mut conn = pool.get().await?;
        let tx = conn.begin().await?;
        drop(tx);
    }
    let conn = pool.get().await?;
    assert!(conn.transaction_id().is_none());
    assert_eq!(client.rollbacks(), 1);
    Ok(())
}
