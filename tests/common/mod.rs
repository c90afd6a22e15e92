#![allow(dead_code)]

use std::sync::Arc;

use rds_data_driver::prelude::*;
use rds_data_driver::test_utils::{ManualClock, ScriptedClient};

pub const RESOURCE_ARN: &str = "arn:aws:rds:us-east-1:123456789012:cluster:test";
pub const SECRET_ARN: &str = "arn:aws:secretsmanager:us-east-1:123456789012:secret:test";

pub fn config() -> Config {
    Config::new(RESOURCE_ARN, SECRET_ARN, "app", "us-east-1")
}

/// A connection over a fresh scripted client, skipping the wakeup probe.
pub fn connection(kind: DialectKind, config: Config) -> (Arc<ScriptedClient>, Connection) {
    let client = ScriptedClient::new();
    let dialect = Dialect::new(kind, config.parse_time);
    let conn = Connection::new(client.clone(), Arc::new(config), dialect);
    (client, conn)
}

pub fn mysql() -> (Arc<ScriptedClient>, Connection) {
    connection(DialectKind::MySql, config())
}

/// A connector whose probe sleeps on a manual clock.
pub fn connector(config: Config) -> (Arc<ScriptedClient>, Arc<ManualClock>, Connector) {
    let client = ScriptedClient::new();
    let clock = ManualClock::new();
    let connector = Connector::new(client.clone(), config).with_clock(clock.clone());
    (client, clock, connector)
}

pub fn version_row(version: &str) -> Vec<Vec<Field>> {
    vec![vec![Field::StringValue(version.to_string())]]
}
