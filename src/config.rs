use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::{Url, form_urlencoded};

use crate::error::{RdsDataError, Result};

/// Scheme every connection string must carry; also the registered driver name.
pub const DRIVER_NAME: &str = "rds";

const RESOURCE_ARN: &str = "resource_arn";
const SECRET_ARN: &str = "secret_arn";
const DATABASE: &str = "database";
const AWS_REGION: &str = "aws_region";
const PARSE_TIME: &str = "parse_time";
const SPLIT_MULTI: &str = "split_multi";

const RECOGNIZED_KEYS: [&str; 6] = [
    AWS_REGION,
    DATABASE,
    PARSE_TIME,
    RESOURCE_ARN,
    SECRET_ARN,
    SPLIT_MULTI,
];

/// Connection settings for the statement-execution service.
///
/// Serializes to and from `rds://?resource_arn=...&secret_arn=...&database=...`. Query keys the
/// driver does not recognize are kept in [`Config::custom`] and written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub resource_arn: String,
    pub secret_arn: String,
    pub database: String,
    pub aws_region: String,
    /// Decode date/time columns into chrono values instead of strings.
    pub parse_time: bool,
    /// Split prepared SQL on top-level `;` and run each statement separately.
    pub split_multi: bool,
    pub custom: BTreeMap<String, Vec<String>>,
}

impl Config {
    #[must_use]
    pub fn new(
        resource_arn: impl Into<String>,
        secret_arn: impl Into<String>,
        database: impl Into<String>,
        aws_region: impl Into<String>,
    ) -> Self {
        Self {
            resource_arn: resource_arn.into(),
            secret_arn: secret_arn.into(),
            database: database.into(),
            aws_region: aws_region.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parse_time(mut self, parse_time: bool) -> Self {
        self.parse_time = parse_time;
        self
    }

    #[must_use]
    pub fn with_split_multi(mut self, split_multi: bool) -> Self {
        self.split_multi = split_multi;
        self
    }

    /// Append a value to an extension key.
    ///
    /// Recognized key names are not valid extension keys; such calls are ignored and logged.
    #[must_use]
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if is_recognized(&key) {
            warn!(key = %key, "ignoring extension value for a recognized connection key");
            return self;
        }
        self.custom.entry(key).or_default().push(value.into());
        self
    }

    /// Parse a connection string.
    ///
    /// # Errors
    /// [`RdsDataError::InvalidDsnScheme`] when the scheme is not `rds`, or
    /// [`RdsDataError::ConfigError`] when the string is not a URL at all.
    pub fn from_dsn(dsn: &str) -> Result<Self> {
        let url = Url::parse(dsn)
            .map_err(|e| RdsDataError::ConfigError(format!("invalid connection string: {e}")))?;
        if url.scheme() != DRIVER_NAME {
            return Err(RdsDataError::InvalidDsnScheme {
                expected: DRIVER_NAME.to_string(),
                found: url.scheme().to_string(),
            });
        }

        let mut config = Config::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                RESOURCE_ARN => config.resource_arn = value.into_owned(),
                SECRET_ARN => config.secret_arn = value.into_owned(),
                DATABASE => config.database = value.into_owned(),
                AWS_REGION => config.aws_region = value.into_owned(),
                PARSE_TIME => config.parse_time = parse_flag(&value),
                SPLIT_MULTI => config.split_multi = parse_flag(&value),
                _ => config
                    .custom
                    .entry(key.into_owned())
                    .or_default()
                    .push(value.into_owned()),
            }
        }
        Ok(config)
    }

    /// Serialize to a connection string with keys in sorted order.
    ///
    /// Extension entries with no values, or named like a recognized key, are not written.
    #[must_use]
    pub fn to_dsn(&self) -> String {
        let parse_time = self.parse_time.to_string();
        let split_multi = self.split_multi.to_string();
        let mut pairs: Vec<(&str, &str)> = vec![
            (AWS_REGION, &self.aws_region),
            (DATABASE, &self.database),
            (PARSE_TIME, &parse_time),
            (RESOURCE_ARN, &self.resource_arn),
            (SECRET_ARN, &self.secret_arn),
            (SPLIT_MULTI, &split_multi),
        ];
        for (key, values) in self.custom.iter().filter(|(key, _)| !is_recognized(key)) {
            pairs.extend(values.iter().map(|v| (key.as_str(), v.as_str())));
        }
        // stable: repeated values of one key keep their order
        pairs.sort_by_key(|(key, _)| *key);

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{DRIVER_NAME}://?{query}")
    }
}

fn is_recognized(key: &str) -> bool {
    RECOGNIZED_KEYS.contains(&key)
}

/// Absent or malformed flags read as false.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "t" | "true"
    )
}

impl FromStr for Config {
    type Err = RdsDataError;

    fn from_str(s: &str) -> Result<Self> {
        Config::from_dsn(s)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dsn())
    }
}
