use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::ValueEnum;
use serde_json::Value as JsonValue;

/// Values that can be bound as statement parameters or decoded from a result row.
///
/// Parameters are built from ordinary Rust values through `From`:
/// ```rust
/// use rds_data_driver::prelude::*;
///
/// let params: Vec<RowValues> = vec![1_i32.into(), "alice".into(), true.into(), None::<i64>.into()];
/// assert!(params[3].is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Signed integer value (64-bit)
    Int(i64),
    /// Unsigned integer value; must fit a signed 64-bit integer when sent as a parameter
    UInt(u64),
    /// Single unsigned byte, sent as a one-byte blob
    Byte(u8),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// Array value, only produced when decoding results
    Array(Vec<RowValues>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RowValues::Int(value) => Some(*value),
            RowValues::UInt(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            RowValues::UInt(value) => Some(*value),
            RowValues::Int(value) => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RowValues::Bool(value) => Some(*value),
            RowValues::Int(1) => Some(true),
            RowValues::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS" with an optional fraction
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    /// Short type label used in error messages.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            RowValues::Int(_) => "Int",
            RowValues::UInt(_) => "UInt",
            RowValues::Byte(_) => "Byte",
            RowValues::Float(_) => "Float",
            RowValues::Text(_) => "Text",
            RowValues::Bool(_) => "Bool",
            RowValues::Timestamp(_) => "Timestamp",
            RowValues::Date(_) => "Date",
            RowValues::Time(_) => "Time",
            RowValues::Null => "Null",
            RowValues::JSON(_) => "JSON",
            RowValues::Blob(_) => "Blob",
            RowValues::Array(_) => "Array",
        }
    }
}

macro_rules! row_values_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for RowValues {
            fn from(value: $ty) -> Self {
                RowValues::Int(i64::from(value))
            }
        })*
    };
}

macro_rules! row_values_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for RowValues {
            fn from(value: $ty) -> Self {
                RowValues::UInt(u64::from(value))
            }
        })*
    };
}

row_values_from_signed!(i8, i16, i32, i64);
row_values_from_unsigned!(u16, u32, u64);

impl From<isize> for RowValues {
    fn from(value: isize) -> Self {
        // isize is at most 64 bits on every supported target
        RowValues::Int(value as i64)
    }
}

impl From<usize> for RowValues {
    fn from(value: usize) -> Self {
        RowValues::UInt(value as u64)
    }
}

impl From<u8> for RowValues {
    fn from(value: u8) -> Self {
        RowValues::Byte(value)
    }
}

impl From<f32> for RowValues {
    fn from(value: f32) -> Self {
        RowValues::Float(f64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl From<&[u8]> for RowValues {
    fn from(value: &[u8]) -> Self {
        RowValues::Blob(value.to_vec())
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for RowValues {
    fn from(value: DateTime<Utc>) -> Self {
        RowValues::Timestamp(value.naive_utc())
    }
}

impl From<NaiveDate> for RowValues {
    fn from(value: NaiveDate) -> Self {
        RowValues::Date(value)
    }
}

impl From<NaiveTime> for RowValues {
    fn from(value: NaiveTime) -> Self {
        RowValues::Time(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl<T> From<Option<T>> for RowValues
where
    T: Into<RowValues>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// The SQL variant behind the remote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DialectKind {
    /// MySQL 5.7 compatible
    #[value(name = "mysql")]
    MySql,
    /// `PostgreSQL` 10 compatible
    Postgres,
}

/// A statement argument: either named (`name` non-empty) or positional (`ordinal` > 0).
///
/// A single call must use one style for every argument.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    pub name: String,
    /// 1-based position, or 0 for a named argument.
    pub ordinal: usize,
    pub value: RowValues,
}

impl NamedValue {
    #[must_use]
    pub fn named(name: impl Into<String>, value: impl Into<RowValues>) -> Self {
        Self {
            name: name.into(),
            ordinal: 0,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn ordinal(ordinal: usize, value: impl Into<RowValues>) -> Self {
        Self {
            name: String::new(),
            ordinal,
            value: value.into(),
        }
    }

    pub(crate) fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    pub(crate) fn is_ordinal(&self) -> bool {
        self.ordinal > 0
    }
}

/// Transaction isolation levels a caller may request.
///
/// Not every level is accepted by every dialect; see [`crate::Dialect::is_isolation_supported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsolationLevel {
    /// Whatever the server is configured to use
    #[default]
    Default,
    ReadUncommitted,
    ReadCommitted,
    WriteCommitted,
    RepeatableRead,
    Snapshot,
    Serializable,
    Linearizable,
}

impl IsolationLevel {
    /// SQL spelling for `SET TRANSACTION ISOLATION LEVEL ...`
    #[must_use]
    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::WriteCommitted => "WRITE COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Snapshot => "SNAPSHOT",
            Self::Serializable => "SERIALIZABLE",
            Self::Linearizable => "LINEARIZABLE",
        }
    }
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

/// Options for [`crate::Connection::begin_tx`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxOptions {
    pub isolation: IsolationLevel,
    pub read_only: bool,
}

impl TxOptions {
    #[must_use]
    pub fn with_isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
