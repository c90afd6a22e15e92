//! Parameter conversion utilities.
//!
//! Turns caller arguments into the remote side's tagged [`SqlParameter`] representation.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::client::{Field, SqlParameter, TypeHint};
use crate::error::{RdsDataError, Result};
use crate::types::{NamedValue, RowValues};

/// Convert every argument, failing on the first one that cannot be represented.
///
/// # Errors
///
/// Returns [`RdsDataError::UnsupportedType`] or [`RdsDataError::Overflow`] for the first argument
/// that has no remote representation.
pub fn convert_named_values(args: &[NamedValue]) -> Result<Vec<SqlParameter>> {
    let mut params = Vec::with_capacity(args.len());
    for arg in args {
        params.push(convert_named_value(arg)?);
    }
    Ok(params)
}

/// Convert a single argument into a [`SqlParameter`].
///
/// # Errors
///
/// Returns [`RdsDataError::Overflow`] for unsigned values above `i64::MAX` and
/// [`RdsDataError::UnsupportedType`] for arrays.
pub fn convert_named_value(arg: &NamedValue) -> Result<SqlParameter> {
    convert_value(&arg.name, &arg.value)
}

/// Convert `native` into a parameter called `name`.
///
/// # Errors
///
/// See [`convert_named_value`].
pub fn convert_value(name: &str, native: &RowValues) -> Result<SqlParameter> {
    let name = name.to_string();
    let (value, type_hint) = match native {
        RowValues::Null => (Field::null(), None),
        RowValues::Text(s) => (Field::StringValue(s.clone()), None),
        RowValues::Blob(bytes) => (Field::BlobValue(bytes.clone()), None),
        RowValues::Bool(b) => (Field::BooleanValue(*b), None),
        RowValues::Float(f) => (Field::DoubleValue(*f), None),
        RowValues::Int(i) => (Field::LongValue(*i), None),
        RowValues::UInt(u) => match i64::try_from(*u) {
            Ok(i) => (Field::LongValue(i), None),
            Err(_) => {
                return Err(RdsDataError::Overflow { name, value: *u });
            }
        },
        // Single bytes travel as one-byte blobs, matching how BIT/byte columns round-trip.
        RowValues::Byte(b) => (Field::BlobValue(vec![*b]), None),
        RowValues::Timestamp(ts) => (
            Field::StringValue(format_timestamp(ts)),
            Some(TypeHint::Timestamp),
        ),
        RowValues::Date(d) => (
            Field::StringValue(d.format("%Y-%m-%d").to_string()),
            Some(TypeHint::Date),
        ),
        RowValues::Time(t) => (Field::StringValue(format_time(t)), Some(TypeHint::Time)),
        RowValues::JSON(json) => (Field::StringValue(json.to_string()), Some(TypeHint::Json)),
        RowValues::Array(_) => {
            return Err(RdsDataError::UnsupportedType {
                name,
                value: native.type_name().to_string(),
            });
        }
    };

    Ok(SqlParameter {
        name,
        value,
        type_hint,
    })
}

/// `YYYY-MM-DD HH:MM:SS[.fff]`, fraction trimmed of trailing zeros and omitted when zero.
pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    let mut out = ts.format("%Y-%m-%d %H:%M:%S").to_string();
    push_millis(&mut out, ts.nanosecond());
    out
}

fn format_time(t: &NaiveTime) -> String {
    let mut out = t.format("%H:%M:%S").to_string();
    push_millis(&mut out, t.nanosecond());
    out
}

fn push_millis(out: &mut String, nanos: u32) {
    // Leap-second representations carry nanos >= 1e9.
    let millis = (nanos % 1_000_000_000) / 1_000_000;
    if millis == 0 {
        return;
    }
    let fraction = format!("{millis:03}");
    out.push('.');
    out.push_str(fraction.trim_end_matches('0'));
}
