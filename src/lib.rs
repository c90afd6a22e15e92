//! SQL driver for the stateless statement-execution (Data API) service.
//!
//! Each [`Connection`] turns statements and transactions into individual remote calls: the
//! [`Dialect`] rewrites placeholders and converts values, the connection carries the open
//! transaction id from call to call, and [`Rows`]/[`ExecResult`] stitch the responses of a
//! multi-statement batch back together.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rds_data_driver::prelude::*;
//!
//! # async fn demo(client: Arc<dyn DataApiClient>) -> Result<(), RdsDataError> {
//! let config = Config::from_dsn("rds://?resource_arn=arn&secret_arn=secret&database=app")?;
//! let connector = Connector::new(client, config);
//! let mut conn = connector.connect().await?;
//!
//! let mut rows = conn
//!     .prepare("SELECT id, name FROM users WHERE id = ?")?
//!     .query_positional(&[RowValues::Int(1)])
//!     .await?;
//! while let Some(row) = rows.next_row()? {
//!     println!("{:?}", row.get("name"));
//! }
//!
//! let mut tx = conn.begin().await?;
//! tx.execute("UPDATE users SET name = :name", &[NamedValue::named("name", "bob")]).await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod connector;
pub mod conversion;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod pool;
pub mod prelude;
pub mod results;
pub mod retry;
pub mod statement;
pub mod transaction;
pub mod translation;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{DataApiClient, Field};
pub use config::{Config, DRIVER_NAME};
pub use connection::Connection;
pub use connector::Connector;
pub use dialect::Dialect;
pub use driver::{ClientFactory, Driver, DriverRegistry, RdsDriver};
pub use error::{RdsDataError, Result};
pub use results::{CustomDbRow, ExecResult, ResultSet, Rows};
pub use statement::Statement;
pub use transaction::Transaction;
pub use types::{DialectKind, IsolationLevel, NamedValue, RowValues, TxOptions};
