//! Settings carried by an `Orm` handle.

/// Severity used for statement log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

/// Configuration for an [`Orm`](crate::Orm) handle.
#[derive(Debug, Clone)]
pub struct OrmConfig {
    /// Field list used by `select` when none is given.
    pub default_fields: String,
    /// Whether to keep the debug rendering of the last statement.
    pub record_last_sql: bool,
    /// Level of the per-statement log event.
    pub log_level: LogLevel,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            default_fields: "*".to_string(),
            record_last_sql: true,
            log_level: LogLevel::Debug,
            max_sql_length: Some(200),
        }
    }
}

impl OrmConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default field selection.
    pub fn default_fields(mut self, fields: impl Into<String>) -> Self {
        self.default_fields = fields.into();
        self
    }

    /// Enable or disable `last_sql()` tracking.
    pub fn record_last_sql(mut self, enabled: bool) -> Self {
        self.record_last_sql = enabled;
        self
    }

    /// Override the statement log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }
}
