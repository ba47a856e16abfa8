use thiserror::Error;

#[derive(Error, Debug)]
pub enum LendingError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Business rule violated: {0}")]
    BusinessRule(String),
    #[error("Conflict on '{key}': expected version {expected}, found {found}")]
    Conflict {
        key: String,
        expected: u64,
        found: u64,
    },
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of a [`LendingError`], used by hosts to map failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    NotFound,
    BusinessRule,
    Conflict,
    Infrastructure,
}

impl LendingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LendingError::ValidationError(_) => ErrorKind::Validation,
            LendingError::Unauthorized(_) => ErrorKind::Authorization,
            LendingError::NotFound(_) => ErrorKind::NotFound,
            LendingError::BusinessRule(_) => ErrorKind::BusinessRule,
            LendingError::Conflict { .. } => ErrorKind::Conflict,
            _ => ErrorKind::Infrastructure,
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        LendingError::InternalError(Box::new(std::io::Error::other(message.into())))
    }
}

pub type Result<T> = std::result::Result<T, LendingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            LendingError::ValidationError("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LendingError::Unauthorized("x".into()).kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            LendingError::Conflict {
                key: "k".into(),
                expected: 1,
                found: 2
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            LendingError::internal("boom").kind(),
            ErrorKind::Infrastructure
        );
    }
}
