//! Error types for tagorm

use thiserror::Error;

/// Result type alias for tagorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Boxed error produced by a driver implementation.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for builder and database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Malformed builder call (bad order keyword, `or` before any filter, ...)
    #[error("Usage error: {0}")]
    Usage(String),

    /// Prepare/execute/query/transaction failure reported by the driver
    #[error("Driver error during {context}: {source}")]
    Driver {
        context: String,
        #[source]
        source: DriverError,
    },

    /// A column value could not be parsed into the destination field
    #[error("Conversion error on column '{column}' (value {value:?}): {message}")]
    Conversion {
        column: String,
        value: String,
        message: String,
    },

    /// Single-row fetch returned no rows
    #[error("Not found: {0}")]
    NotFound(String),
}

impl OrmError {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Wrap a driver failure with the call-site context
    pub fn driver(context: impl Into<String>, source: impl Into<DriverError>) -> Self {
        Self::Driver {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Create a conversion error for a specific column
    pub fn conversion(
        column: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            column: column.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a usage error
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Check if this is a driver error
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver { .. })
    }

    /// Check if this is a conversion error
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
