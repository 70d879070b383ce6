#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use crate::TableError;

/// A qualified name in `prefix:local` form (the prefix is optional).
///
/// Namespace resolution happens upstream; the engine only compares names.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct QName(String);

impl QName {
    pub fn new(value: impl Into<String>) -> Result<Self, TableError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.starts_with(':') || trimmed.ends_with(':') {
            return Err(TableError::InvalidQName(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn prefix(&self) -> Option<&str> {
        self.0.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn local_name(&self) -> &str {
        self.0
            .split_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for QName {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for QName {
    type Error = TableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QName> for String {
    fn from(value: QName) -> Self {
        value.0
    }
}
