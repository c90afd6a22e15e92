//! Convenient imports for common functionality.

pub use crate::client::{DataApiClient, Field};
pub use crate::config::Config;
pub use crate::connection::Connection;
pub use crate::connector::Connector;
pub use crate::dialect::Dialect;
pub use crate::driver::{ClientFactory, Driver, DriverRegistry, RdsDriver};
pub use crate::error::RdsDataError;
pub use crate::pool::{ConnectorManager, RdsPool, build_pool};
pub use crate::results::{CustomDbRow, ExecResult, ResultSet, Rows};
pub use crate::retry::{Clock, RetryPolicy, SystemClock};
pub use crate::statement::Statement;
pub use crate::transaction::Transaction;
pub use crate::types::{DialectKind, IsolationLevel, NamedValue, RowValues, TxOptions};
