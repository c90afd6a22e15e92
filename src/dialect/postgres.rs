use super::ColumnDecoder;
use crate::types::IsolationLevel;

pub(super) const SUPPORTED_ISOLATION_LEVELS: &[IsolationLevel] = &[
    IsolationLevel::Default,
    IsolationLevel::RepeatableRead,
    IsolationLevel::ReadCommitted,
    IsolationLevel::ReadUncommitted,
    IsolationLevel::Serializable,
];

/// Postgres type names (`int4`, `timestamp`) compared case-insensitively.
pub(super) fn column_decoder(type_name: &str) -> ColumnDecoder {
    match type_name.trim().to_ascii_lowercase().as_str() {
        "int2" | "int4" | "int8" | "smallserial" | "serial" | "bigserial" => ColumnDecoder::Signed,
        "numeric" => ColumnDecoder::Exact,
        "date" => ColumnDecoder::Date,
        "time" => ColumnDecoder::Time,
        "timestamp" => ColumnDecoder::DateTime,
        _ => ColumnDecoder::Generic,
    }
}
