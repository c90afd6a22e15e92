//! SQL variant strategy.
//!
//! A [`Dialect`] is fixed per connector once the liveness probe has sniffed the server version.
//! Everything here is pure: no remote calls are made.

pub(crate) mod decode;
mod mysql;
mod postgres;

pub use decode::{ColumnDecoder, FieldDecoder};

use crate::client::ExecuteStatementRequest;
use crate::conversion::convert_value;
use crate::error::{RdsDataError, Result};
use crate::translation::rewrite_placeholders;
use crate::types::{DialectKind, IsolationLevel, NamedValue, TxOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql { parse_time: bool },
    Postgres { parse_time: bool },
}

impl Dialect {
    #[must_use]
    pub fn new(kind: DialectKind, parse_time: bool) -> Self {
        match kind {
            DialectKind::MySql => Dialect::MySql { parse_time },
            DialectKind::Postgres => Dialect::Postgres { parse_time },
        }
    }

    #[must_use]
    pub fn kind(&self) -> DialectKind {
        match self {
            Dialect::MySql { .. } => DialectKind::MySql,
            Dialect::Postgres { .. } => DialectKind::Postgres,
        }
    }

    #[must_use]
    pub fn parse_time(&self) -> bool {
        match self {
            Dialect::MySql { parse_time } | Dialect::Postgres { parse_time } => *parse_time,
        }
    }

    /// Translate `sql` and `args` into the remote request shape.
    ///
    /// Positional arguments are renamed to their ordinal (`"1"`, `"2"`, ...) and the dialect's
    /// placeholders are rewritten to `:N`. Named arguments pass through with the SQL untouched.
    /// Only `sql` and `parameters` are filled in on the returned request.
    ///
    /// # Errors
    /// [`RdsDataError::MixedParameters`] when named and positional arguments are combined, or any
    /// conversion error from the argument values.
    pub fn migrate_query(&self, sql: &str, args: &[NamedValue]) -> Result<ExecuteStatementRequest> {
        let named = args.iter().any(NamedValue::is_named);
        let ordinal = args.iter().any(NamedValue::is_ordinal);
        if named && ordinal {
            return Err(RdsDataError::MixedParameters);
        }

        let (sql, parameters) = if ordinal {
            let parameters = args
                .iter()
                .map(|arg| convert_value(&arg.ordinal.to_string(), &arg.value))
                .collect::<Result<Vec<_>>>()?;
            (rewrite_placeholders(sql, self.kind()).into_owned(), parameters)
        } else {
            let parameters = args
                .iter()
                .map(|arg| convert_value(&arg.name, &arg.value))
                .collect::<Result<Vec<_>>>()?;
            (sql.to_string(), parameters)
        };

        Ok(ExecuteStatementRequest {
            sql,
            parameters,
            ..ExecuteStatementRequest::default()
        })
    }

    /// Decoder for a column of the reported database type.
    #[must_use]
    pub fn field_decoder(&self, type_name: &str) -> FieldDecoder {
        let kind = match self {
            Dialect::MySql { .. } => mysql::column_decoder(type_name),
            Dialect::Postgres { .. } => postgres::column_decoder(type_name),
        };
        FieldDecoder::new(kind, self.parse_time())
    }

    #[must_use]
    pub fn is_isolation_supported(&self, level: IsolationLevel) -> bool {
        let supported = match self {
            Dialect::MySql { .. } => mysql::SUPPORTED_ISOLATION_LEVELS,
            Dialect::Postgres { .. } => postgres::SUPPORTED_ISOLATION_LEVELS,
        };
        supported.contains(&level)
    }

    /// `SET TRANSACTION ...` statement to run right after begin, if the options need one.
    #[must_use]
    pub fn transaction_setup_clause(&self, opts: &TxOptions) -> Option<String> {
        let mut modes = Vec::with_capacity(2);
        if opts.isolation != IsolationLevel::Default {
            modes.push(format!("ISOLATION LEVEL {}", opts.isolation.to_sql()));
        }
        if opts.read_only {
            modes.push("READ ONLY".to_string());
        }
        if modes.is_empty() {
            return None;
        }
        Some(format!("SET TRANSACTION {}", modes.join(", ")))
    }
}
