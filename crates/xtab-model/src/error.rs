use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    /// No axis of the table produced a single header level.
    #[error("invalid table definition {table}: {reason}")]
    InvalidTableDefinition { table: String, reason: String },
    #[error("invalid qname: {0:?}")]
    InvalidQName(String),
    #[error("invalid aspect: {0:?}")]
    InvalidAspect(String),
}

impl TableError {
    pub fn invalid_definition(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTableDefinition {
            table: table.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
