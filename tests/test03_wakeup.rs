#![cfg(feature = "test-utils")]

mod common;

use std::error::Error;
use std::time::Duration;

use rds_data_driver::connector::WAKEUP_TTL;
use rds_data_driver::prelude::*;
use tokio_util::sync::CancellationToken;

use common::{config, connector, version_row};

#[tokio::test]
async fn test03_nine_failures_then_success() -> Result<(), Box<dyn Error>> {
    let (client, clock, connector) = connector(config());
    for _ in 0..9 {
        client.push_failure("cluster is resuming");
    }
    client.push_records(&[("VERSION()", "VARCHAR")], version_row("5.7.12"));

    let conn = connector.connect().await?;
    assert_eq!(conn.dialect().kind(), DialectKind::MySql);
    assert_eq!(client.executed_sql().len(), 10);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 9]);
    assert!(
        client
            .executed_sql()
            .iter()
            .all(|sql| sql == "/* wakeup */ SELECT VERSION()")
    );
    assert!(client.requests().iter().all(|req| req.parameters.is_empty()));
    Ok(())
}

#[tokio::test]
async fn test03_ten_failures_give_up() {
    let (client, clock, connector) = connector(config());
    for _ in 0..10 {
        client.push_failure("cluster is resuming");
    }
    client.push_records(&[("VERSION()", "VARCHAR")], version_row("never reached"));

    let err = connector.connect().await.unwrap_err();
    assert!(matches!(err, RdsDataError::WakeupFailed { attempts: 10, .. }));
    let message = err.to_string();
    assert!(message.contains("after 10 attempts"), "{message}");
    assert!(message.contains("cluster is resuming"), "{message}");
    assert_eq!(client.executed_sql().len(), 10);
    assert_eq!(clock.sleeps().len(), 9);
    assert!(connector.dialect().is_none());
}

#[tokio::test]
async fn test03_empty_version_answer_is_retried() -> Result<(), Box<dyn Error>> {
    let (client, _clock, connector) = connector(config());
    client.push_records(&[("VERSION()", "VARCHAR")], vec![]);
    client.push_records(&[("VERSION()", "VARCHAR")], version_row("8.0.23"));
    connector.connect().await?;
    assert_eq!(client.executed_sql().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test03_postgres_is_sniffed_from_version() -> Result<(), Box<dyn Error>> {
    let (client, _clock, connector) = connector(config().with_parse_time(true));
    client.push_records(&[("version", "text")], version_row("10.14 (postgres-flavored)"));
    let conn = connector.connect().await?;
    assert_eq!(
        conn.dialect(),
        Dialect::Postgres { parse_time: true }
    );
    Ok(())
}

#[tokio::test]
async fn test03_probe_result_is_cached_for_five_minutes() -> Result<(), Box<dyn Error>> {
    let (client, clock, connector) = connector(config());
    client.push_records(&[("version", "text")], version_row("PostgreSQL 10.14"));
    connector.connect().await?;
    assert_eq!(client.executed_sql().len(), 1);

    clock.advance(Duration::from_secs(60));
    let conn = connector.connect().await?;
    assert_eq!(conn.dialect().kind(), DialectKind::Postgres);
    assert_eq!(client.executed_sql().len(), 1);

    clock.advance(WAKEUP_TTL);
    client.push_records(&[("VERSION()", "VARCHAR")], version_row("5.7.12"));
    let conn = connector.connect().await?;
    assert_eq!(client.executed_sql().len(), 2);
    assert_eq!(conn.dialect().kind(), DialectKind::MySql);
    Ok(())
}

#[tokio::test]
async fn test03_cancelled_probe_is_not_retried() {
    let (client, clock, connector) = connector(config());
    let token = CancellationToken::new();
    let connector = connector.with_cancellation(token.clone());
    token.cancel();
    client.push_records(&[("VERSION()", "VARCHAR")], version_row("5.7.12"));

    let err = connector.connect().await.unwrap_err();
    assert!(matches!(err, RdsDataError::Cancelled));
    assert!(client.calls().is_empty());
    assert!(clock.sleeps().is_empty());
}
