//! The remote statement-execution boundary.
//!
//! These types mirror the JSON envelope of the statement-execution service. The driver never
//! talks HTTP itself: the host supplies a [`DataApiClient`] that carries requests over whatever
//! transport and credentials it uses.

use async_trait::async_trait;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::BoxError;

/// A single value as the remote side represents it.
///
/// Deserialization accepts any single-member object; members the driver does not know become
/// [`Field::Unknown`] so that decoding can report them against their column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    IsNull(bool),
    StringValue(String),
    BlobValue(Vec<u8>),
    BooleanValue(bool),
    DoubleValue(f64),
    LongValue(i64),
    ArrayValue(ArrayValue),
    /// A member the driver does not understand; carries the member's tag.
    #[serde(skip_serializing)]
    Unknown(String),
}

/// The recognised members of [`Field`], used to deserialize known shapes.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum KnownField {
    IsNull(bool),
    StringValue(String),
    BlobValue(Vec<u8>),
    BooleanValue(bool),
    DoubleValue(f64),
    LongValue(i64),
    ArrayValue(ArrayValue),
}

impl From<KnownField> for Field {
    fn from(known: KnownField) -> Self {
        match known {
            KnownField::IsNull(v) => Field::IsNull(v),
            KnownField::StringValue(v) => Field::StringValue(v),
            KnownField::BlobValue(v) => Field::BlobValue(v),
            KnownField::BooleanValue(v) => Field::BooleanValue(v),
            KnownField::DoubleValue(v) => Field::DoubleValue(v),
            KnownField::LongValue(v) => Field::LongValue(v),
            KnownField::ArrayValue(v) => Field::ArrayValue(v),
        }
    }
}

const KNOWN_FIELDS: &[&str] = &[
    "isNull",
    "stringValue",
    "blobValue",
    "booleanValue",
    "doubleValue",
    "longValue",
    "arrayValue",
];

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let tag = match value.as_object() {
            Some(members) if members.len() == 1 => members.keys().next().cloned(),
            _ => None,
        }
        .ok_or_else(|| de::Error::custom("expected an object with exactly one member"))?;

        if KNOWN_FIELDS.contains(&tag.as_str()) {
            serde_json::from_value::<KnownField>(value)
                .map(Field::from)
                .map_err(de::Error::custom)
        } else {
            Ok(Field::Unknown(tag))
        }
    }
}

impl Field {
    #[must_use]
    pub fn null() -> Self {
        Field::IsNull(true)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Field::IsNull(_))
    }

    pub(crate) fn kind(&self) -> &str {
        match self {
            Field::IsNull(_) => "isNull",
            Field::StringValue(_) => "stringValue",
            Field::BlobValue(_) => "blobValue",
            Field::BooleanValue(_) => "booleanValue",
            Field::DoubleValue(_) => "doubleValue",
            Field::LongValue(_) => "longValue",
            Field::ArrayValue(_) => "arrayValue",
            Field::Unknown(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrayValue {
    BooleanValues(Vec<bool>),
    LongValues(Vec<i64>),
    DoubleValues(Vec<f64>),
    StringValues(Vec<String>),
    ArrayValues(Vec<ArrayValue>),
}

/// Hint telling the remote side how to interpret a string parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeHint {
    Date,
    Decimal,
    Json,
    Time,
    Timestamp,
    Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlParameter {
    pub name: String,
    pub value: Field,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<TypeHint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnMetadata {
    pub name: String,
    pub label: String,
    pub type_name: String,
    pub nullable: i32,
    pub precision: i32,
    pub scale: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStatementRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub database: String,
    pub sql: String,
    pub parameters: Vec<SqlParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub include_result_metadata: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecuteStatementResponse {
    pub column_metadata: Vec<ColumnMetadata>,
    pub records: Vec<Vec<Field>>,
    pub number_of_records_updated: i64,
    pub generated_fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginTransactionRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub database: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginTransactionResponse {
    pub transaction_id: String,
}

/// Shared shape of the commit and rollback calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndTransactionRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndTransactionResponse {
    pub transaction_status: String,
}

/// The four remote capabilities the driver needs.
///
/// Errors are opaque to the driver and surface as [`crate::RdsDataError::Transport`].
#[async_trait]
pub trait DataApiClient: Send + Sync {
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, BoxError>;

    async fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, BoxError>;

    async fn commit_transaction(
        &self,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, BoxError>;

    async fn rollback_transaction(
        &self,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::error::RdsDataError;
    use crate::results::Rows;
    use crate::types::DialectKind;

    #[test]
    fn response_deserializes_from_service_json() {
        let body = r#"{
            "columnMetadata": [{"name": "id", "label": "id", "typeName": "INT UNSIGNED"}],
            "records": [[{"longValue": 7}], [{"isNull": true}]],
            "numberOfRecordsUpdated": 0
        }"#;
        let out: ExecuteStatementResponse = serde_json::from_str(body).unwrap();
        assert_eq!(out.column_metadata[0].type_name, "INT UNSIGNED");
        assert_eq!(out.records[0][0], Field::LongValue(7));
        assert!(out.records[1][0].is_null());
        assert!(out.generated_fields.is_empty());
    }

    #[test]
    fn unknown_member_reaches_the_decoder() {
        let body = r#"{
            "columnMetadata": [
                {"label": "id", "typeName": "INT"},
                {"label": "s", "typeName": "STRUCT"}
            ],
            "records": [[{"longValue": 1}, {"structValue": {"attributes": []}}]]
        }"#;
        let out: ExecuteStatementResponse = serde_json::from_str(body).unwrap();
        assert_eq!(out.records[0][1], Field::Unknown("structValue".into()));

        let mut rows = Rows::new(Dialect::new(DialectKind::MySql, false), vec![out]);
        let err = rows.next_row().unwrap_err();
        assert!(matches!(err, RdsDataError::DecodeError { column: 1, .. }));
        assert!(err.to_string().starts_with("convertValue(col=1)"), "{err}");
    }

    #[test]
    fn malformed_known_member_is_rejected() {
        assert!(serde_json::from_str::<Field>(r#"{"longValue": "seven"}"#).is_err());
        assert!(serde_json::from_str::<Field>(r#"{}"#).is_err());
    }

    #[test]
    fn request_serializes_type_hint_and_skips_missing_transaction() {
        let request = ExecuteStatementRequest {
            sql: "SELECT :1".into(),
            parameters: vec![SqlParameter {
                name: "1".into(),
                value: Field::StringValue("2021-01-02 03:04:05".into()),
                type_hint: Some(TypeHint::Timestamp),
            }],
            include_result_metadata: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["parameters"][0]["typeHint"], "TIMESTAMP");
        assert_eq!(json["parameters"][0]["value"]["stringValue"], "2021-01-02 03:04:05");
        assert!(json.get("transactionId").is_none());
        assert_eq!(json["includeResultMetadata"], true);
    }
}
