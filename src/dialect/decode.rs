use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::client::{ArrayValue, Field};
use crate::error::{RdsDataError, Result};
use crate::types::RowValues;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// How a column's fields are turned into native values, chosen from the column's type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDecoder {
    /// Integer field reinterpreted as unsigned; negative values are rejected.
    Unsigned,
    /// Integer field passed through.
    Signed,
    /// Exact numeric sent as a string, parsed as a float.
    Exact,
    /// Boolean field coerced to 0/1.
    Bit,
    Date,
    Time,
    DateTime,
    /// Year column; the remote side sends a full date string.
    Year,
    /// Whatever the field carries.
    Generic,
}

/// A [`ColumnDecoder`] bound to the dialect's time-parsing flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecoder {
    pub kind: ColumnDecoder,
    pub parse_time: bool,
}

impl FieldDecoder {
    #[must_use]
    pub fn new(kind: ColumnDecoder, parse_time: bool) -> Self {
        Self { kind, parse_time }
    }

    /// Decode `field` from column position `column`.
    ///
    /// # Errors
    /// Returns [`RdsDataError::DecodeError`] when the field's shape does not fit the column type
    /// or its text cannot be parsed.
    pub fn decode(&self, column: usize, field: &Field) -> Result<RowValues> {
        if field.is_null() {
            return Ok(RowValues::Null);
        }
        match self.kind {
            ColumnDecoder::Unsigned => {
                let v = expect_long(column, field)?;
                u64::try_from(v).map(RowValues::UInt).map_err(|_| {
                    RdsDataError::decode(column, format!("negative value {v} in unsigned column"))
                })
            }
            ColumnDecoder::Signed => expect_long(column, field).map(RowValues::Int),
            ColumnDecoder::Exact => {
                let s = expect_string(column, field)?;
                s.trim()
                    .parse::<f64>()
                    .map(RowValues::Float)
                    .map_err(|e| RdsDataError::decode(column, format!("{s:?}: {e}")))
            }
            ColumnDecoder::Bit => match field {
                Field::BooleanValue(b) => Ok(RowValues::Int(i64::from(*b))),
                other => generic(column, other),
            },
            ColumnDecoder::Date => self.temporal(column, field, |s| {
                NaiveDate::parse_from_str(s, DATE_FORMAT).map(RowValues::Date)
            }),
            ColumnDecoder::Time => self.temporal(column, field, |s| {
                NaiveTime::parse_from_str(s, TIME_FORMAT).map(RowValues::Time)
            }),
            ColumnDecoder::DateTime => self.temporal(column, field, |s| {
                NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map(RowValues::Timestamp)
            }),
            ColumnDecoder::Year => self.temporal(column, field, |s| {
                NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01-01"), DATE_FORMAT))
                    .map(RowValues::Date)
            }),
            ColumnDecoder::Generic => generic(column, field),
        }
    }

    fn temporal<F>(&self, column: usize, field: &Field, parse: F) -> Result<RowValues>
    where
        F: FnOnce(&str) -> chrono::ParseResult<RowValues>,
    {
        let s = expect_string(column, field)?;
        if !self.parse_time {
            return Ok(RowValues::Text(s.to_string()));
        }
        parse(s).map_err(|e| RdsDataError::decode(column, format!("{s:?}: {e}")))
    }
}

/// Fallback for column types without a dedicated decoder.
///
/// # Errors
/// Returns [`RdsDataError::DecodeError`] for unrecognized field shapes.
pub fn generic(column: usize, field: &Field) -> Result<RowValues> {
    let value = match field {
        Field::IsNull(_) => RowValues::Null,
        Field::StringValue(s) => RowValues::Text(s.clone()),
        Field::BlobValue(b) => RowValues::Blob(b.clone()),
        Field::BooleanValue(b) => RowValues::Bool(*b),
        Field::DoubleValue(d) => RowValues::Float(*d),
        Field::LongValue(l) => RowValues::Int(*l),
        Field::ArrayValue(array) => decode_array(array),
        Field::Unknown(tag) => {
            return Err(RdsDataError::decode(
                column,
                format!("Unrecognized field type: {tag}"),
            ));
        }
    };
    Ok(value)
}

fn decode_array(array: &ArrayValue) -> RowValues {
    let values = match array {
        ArrayValue::BooleanValues(v) => v.iter().copied().map(RowValues::Bool).collect(),
        ArrayValue::LongValues(v) => v.iter().copied().map(RowValues::Int).collect(),
        ArrayValue::DoubleValues(v) => v.iter().copied().map(RowValues::Float).collect(),
        ArrayValue::StringValues(v) => v.iter().cloned().map(RowValues::Text).collect(),
        ArrayValue::ArrayValues(v) => v.iter().map(decode_array).collect(),
    };
    RowValues::Array(values)
}

fn expect_long(column: usize, field: &Field) -> Result<i64> {
    match field {
        Field::LongValue(v) => Ok(*v),
        other => Err(mismatch(column, "longValue", other)),
    }
}

fn expect_string(column: usize, field: &Field) -> Result<&str> {
    match field {
        Field::StringValue(s) => Ok(s),
        other => Err(mismatch(column, "stringValue", other)),
    }
}

fn mismatch(column: usize, expected: &str, field: &Field) -> RdsDataError {
    RdsDataError::decode(column, format!("expected {expected}, got {}", field.kind()))
}
