//! `tracing` events for executed statements and transaction transitions.
//!
//! With the `tracing` feature disabled every function here is a no-op.

use crate::config::OrmConfig;
use crate::error::OrmError;
use crate::statement::StatementKind;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn shorten(config: &OrmConfig, sql: &str) -> String {
    match config.max_sql_length {
        Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
        _ => sql.to_string(),
    }
}

/// Emit the statement about to be sent to the driver.
#[cfg(feature = "tracing")]
pub(crate) fn statement(config: &OrmConfig, kind: StatementKind, debug_sql: &str, param_count: usize) {
    use crate::config::LogLevel;

    /// Dispatch a tracing event at a runtime-determined level.
    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                LogLevel::Error => tracing::error!($($field)*),
                LogLevel::Warn  => tracing::warn!($($field)*),
                LogLevel::Info  => tracing::info!($($field)*),
                LogLevel::Debug => tracing::debug!($($field)*),
                LogLevel::Trace => tracing::trace!($($field)*),
            }
        };
    }

    let sql = shorten(config, debug_sql);
    emit_at_level!(
        config.log_level,
        target: "tagorm.sql",
        kind = %kind,
        param_count,
        sql = %sql,
        "statement"
    );
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn statement(_: &OrmConfig, _: StatementKind, _: &str, _: usize) {}

/// Report a driver failure before it is returned to the caller.
#[cfg(feature = "tracing")]
pub(crate) fn driver_failure(error: &OrmError) {
    tracing::warn!(target: "tagorm.sql", error = %error, "driver call failed");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn driver_failure(_: &OrmError) {}

#[cfg(feature = "tracing")]
pub(crate) fn transaction(event: &'static str) {
    tracing::debug!(target: "tagorm.tx", event);
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn transaction(_: &'static str) {}

/// The SQL kept for `last_sql()`, respecting the configuration.
pub(crate) fn last_sql(config: &OrmConfig, debug_sql: String) -> Option<String> {
    config.record_last_sql.then_some(debug_sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("select", 10), "select");
        assert_eq!(truncate_sql_bytes("select", 3), "sel");
        assert_eq!(truncate_sql_bytes("é", 1), "");
    }

    #[test]
    fn shorten_appends_ellipsis() {
        let config = OrmConfig::new().max_sql_length(6);
        assert_eq!(shorten(&config, "select * from t"), "select...");
        assert_eq!(shorten(&config.no_truncate(), "select * from t"), "select * from t");
    }

    #[test]
    fn last_sql_follows_config() {
        let off = OrmConfig::new().record_last_sql(false);
        assert_eq!(last_sql(&off, "x".into()), None);
        assert_eq!(last_sql(&OrmConfig::new(), "x".into()), Some("x".to_string()));
    }
}
