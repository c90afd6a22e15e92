use super::ColumnDecoder;
use crate::types::IsolationLevel;

pub(super) const SUPPORTED_ISOLATION_LEVELS: &[IsolationLevel] = &[
    IsolationLevel::Default,
    IsolationLevel::RepeatableRead,
    IsolationLevel::ReadCommitted,
    IsolationLevel::ReadUncommitted,
    IsolationLevel::Serializable,
];

/// MySQL reports upper-case type names such as `INT UNSIGNED`.
pub(super) fn column_decoder(type_name: &str) -> ColumnDecoder {
    match type_name.trim().to_ascii_uppercase().as_str() {
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => ColumnDecoder::Unsigned,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" => {
            ColumnDecoder::Signed
        }
        "DECIMAL" | "NUMERIC" => ColumnDecoder::Exact,
        "BIT" => ColumnDecoder::Bit,
        "DATE" => ColumnDecoder::Date,
        "TIME" => ColumnDecoder::Time,
        "DATETIME" | "TIMESTAMP" => ColumnDecoder::DateTime,
        "YEAR" => ColumnDecoder::Year,
        _ => ColumnDecoder::Generic,
    }
}
