use thiserror::Error;

use crate::domain::id::OrderId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Part of an order aggregate that lives in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatePart {
    Payment,
    Delivery,
    Item,
}

impl std::fmt::Display for AggregatePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Payment => "payment",
            Self::Delivery => "delivery",
            Self::Item => "item",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("malformed order payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to persist order: {0}")]
    Persistence(String),

    #[error("order {uid} already stored as {id}")]
    DuplicateOrder { uid: String, id: OrderId },

    #[error("order {0} not found")]
    NotFound(OrderId),

    #[error("cache index is empty for app key {app_key}")]
    EmptyCacheIndex { app_key: String },

    #[error("order {order_id} is missing its {part} row")]
    DependentRow {
        order_id: OrderId,
        part: AggregatePart,
    },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl Error {
    /// True when the error means the requested aggregate does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependent_row_names_the_missing_part() {
        let err = Error::DependentRow {
            order_id: OrderId::new(7),
            part: AggregatePart::Payment,
        };
        assert_eq!(err.to_string(), "order 7 is missing its payment row");
    }

    #[test]
    fn empty_index_is_distinct_from_database_failure() {
        let empty = Error::EmptyCacheIndex {
            app_key: "WB-1".into(),
        };
        let db = Error::Database("disk I/O error".into());
        assert!(matches!(empty, Error::EmptyCacheIndex { .. }));
        assert!(!matches!(db, Error::EmptyCacheIndex { .. }));
    }

    #[test]
    fn config_error_converts_transparently() {
        let err: Error = ConfigError::MissingField { field: "app_key" }.into();
        assert_eq!(err.to_string(), "missing required field: app_key");
    }

    #[test]
    fn is_not_found_only_matches_not_found() {
        assert!(Error::NotFound(OrderId::new(1)).is_not_found());
        assert!(!Error::Database("x".into()).is_not_found());
    }
}
