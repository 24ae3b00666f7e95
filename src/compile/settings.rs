use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;
use crate::fragment::ConnectionProperty;

// ================
// ENUMS
// ================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionIsolation {
    None,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl TransactionIsolation {
    /// Isolation level constant understood by the driver.
    pub fn code(self) -> i32 {
        match self {
            TransactionIsolation::None => 0,
            TransactionIsolation::ReadUncommitted => 1,
            TransactionIsolation::ReadCommitted => 2,
            TransactionIsolation::RepeatableRead => 4,
            TransactionIsolation::Serializable => 8,
        }
    }
}

impl FromStr for TransactionIsolation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(TransactionIsolation::None),
            "READ_UNCOMMITTED" => Ok(TransactionIsolation::ReadUncommitted),
            "READ_COMMITTED" => Ok(TransactionIsolation::ReadCommitted),
            "REPEATABLE_READ" => Ok(TransactionIsolation::RepeatableRead),
            "SERIALIZABLE" => Ok(TransactionIsolation::Serializable),
            other => Err(ConfigError::unsupported("transactionIsolation", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum QueueDiscipline {
    #[default]
    Lifo,
    Fifo,
}

impl FromStr for QueueDiscipline {
    type Err = ConfigError;

    // documents spell these lowercase
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIFO" | "lifo" => Ok(QueueDiscipline::Lifo),
            "FIFO" | "fifo" => Ok(QueueDiscipline::Fifo),
            other => Err(ConfigError::unsupported("queueDiscipline", other)),
        }
    }
}

/// When abandoned connections are reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbandonedRemoval {
    OnBorrow,
    OnMaintenance,
}

impl FromStr for AbandonedRemoval {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BORROW" | "borrow" => Ok(AbandonedRemoval::OnBorrow),
            "MAINTENANCE" | "maintenance" => Ok(AbandonedRemoval::OnMaintenance),
            other => Err(ConfigError::unsupported("removeAbandoned.on", other)),
        }
    }
}

/// Parses a `logging.level` literal. Only the five level names are accepted,
/// all uppercase or all lowercase.
pub fn parse_level(literal: &str) -> Result<tracing::Level, ConfigError> {
    match literal {
        "TRACE" | "trace" => Ok(tracing::Level::TRACE),
        "DEBUG" | "debug" => Ok(tracing::Level::DEBUG),
        "INFO" | "info" => Ok(tracing::Level::INFO),
        "WARN" | "warn" => Ok(tracing::Level::WARN),
        "ERROR" | "error" => Ok(tracing::Level::ERROR),
        other => Err(ConfigError::unsupported("logging.level", other)),
    }
}

// ================
// SETTINGS
// ================

/// Final values handed to the pool library.
///
/// Millisecond and count knobs use `-1` (`defaults::UNBOUNDED`) for "no
/// bound". Optional subsystems are `None` when never configured, in which
/// case the pool keeps its own implicit behaviour.
#[derive(Clone, PartialEq, Serialize)]
pub struct PoolSettings {
    pub driver_class_name: String,
    pub url: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,

    pub default_catalog: Option<String>,
    pub default_auto_commit: bool,
    pub default_read_only: bool,
    pub default_query_timeout_seconds: Option<u32>,
    pub default_transaction_isolation: Option<TransactionIsolation>,

    pub connection_properties: Vec<ConnectionProperty>,
    pub connection_init_sqls: Vec<String>,

    pub initial_size: u32,
    pub min_idle: u32,
    pub max_idle: i64,
    pub max_total: i64,
    pub pool_prepared_statements: bool,
    pub max_open_prepared_statements: i64,

    pub queue_discipline: QueueDiscipline,
    pub cache_state: bool,
    pub max_wait_millis: i64,
    pub max_conn_lifetime_millis: i64,
    pub auto_commit_on_return: bool,
    pub rollback_on_return: bool,
    pub remove_abandoned: Option<RemoveAbandonedSettings>,
    pub abandoned_usage_tracking: bool,
    pub access_to_underlying_connection_allowed: bool,

    pub eviction: Option<EvictionSettings>,
    pub validation: Option<ValidationSettings>,
    pub logging: Option<LoggingSettings>,
    pub jmx_name: Option<String>,
}

impl PoolSettings {
    pub fn lifo(&self) -> bool {
        self.queue_discipline == QueueDiscipline::Lifo
    }
}

impl fmt::Debug for PoolSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolSettings")
            .field("driver_class_name", &self.driver_class_name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("default_catalog", &self.default_catalog)
            .field("default_auto_commit", &self.default_auto_commit)
            .field("default_read_only", &self.default_read_only)
            .field("default_query_timeout_seconds", &self.default_query_timeout_seconds)
            .field("default_transaction_isolation", &self.default_transaction_isolation)
            .field("connection_properties", &self.connection_properties)
            .field("connection_init_sqls", &self.connection_init_sqls)
            .field("initial_size", &self.initial_size)
            .field("min_idle", &self.min_idle)
            .field("max_idle", &self.max_idle)
            .field("max_total", &self.max_total)
            .field("pool_prepared_statements", &self.pool_prepared_statements)
            .field("max_open_prepared_statements", &self.max_open_prepared_statements)
            .field("queue_discipline", &self.queue_discipline)
            .field("cache_state", &self.cache_state)
            .field("max_wait_millis", &self.max_wait_millis)
            .field("max_conn_lifetime_millis", &self.max_conn_lifetime_millis)
            .field("auto_commit_on_return", &self.auto_commit_on_return)
            .field("rollback_on_return", &self.rollback_on_return)
            .field("remove_abandoned", &self.remove_abandoned)
            .field("abandoned_usage_tracking", &self.abandoned_usage_tracking)
            .field(
                "access_to_underlying_connection_allowed",
                &self.access_to_underlying_connection_allowed,
            )
            .field("eviction", &self.eviction)
            .field("validation", &self.validation)
            .field("logging", &self.logging)
            .field("jmx_name", &self.jmx_name)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveAbandonedSettings {
    pub on: AbandonedRemoval,
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvictionSettings {
    pub time_between_runs_millis: i64,
    pub num_tests_per_run: u32,
    pub min_evictable_idle_time_millis: i64,
    pub soft_min_evictable_idle_time_millis: i64,
    pub eviction_policy_class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSettings {
    pub query: Option<String>,
    pub timeout_seconds: i64,
    pub test_on_create: bool,
    pub test_on_borrow: bool,
    pub test_on_return: bool,
    pub test_while_idle: bool,
    pub fast_fail: Option<FastFailSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FastFailSettings {
    pub disconnection_codes: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingSettings {
    #[serde(serialize_with = "serialize_level")]
    pub level: tracing::Level,
    pub log_expired_connections: bool,
    pub log_abandoned: bool,
}

fn serialize_level<S: serde::Serializer>(level: &tracing::Level, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(level.as_str())
}
