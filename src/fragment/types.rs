use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::limit::Limit;

// ================
// FRAGMENT
// ================

/// One partial pool configuration, as delivered by a document parser.
///
/// Every scalar is optional and every section is optional: a field that was
/// not written in the source document stays `None` and never takes a default
/// here. Enum-valued fields keep the literal from the document so that an
/// unknown token is reported when the configuration is compiled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFragment {
    pub id: Option<String>,
    pub jdbc: Option<JdbcFragment>,
    pub defaults: Option<DefaultsFragment>,
    pub connection_properties: Vec<ConnectionProperty>,
    pub init_statements: Vec<String>,
    pub size: Option<SizeFragment>,
    pub pool: Option<PoolFragment>,
    pub validation: Option<ValidationFragment>,
    pub logging: Option<LoggingFragment>,
    pub jmx_name: Option<String>,
}

impl ConfigFragment {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JdbcFragment {
    pub driver_class_name: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsFragment {
    pub catalog: Option<String>,
    pub auto_commit: Option<bool>,
    pub read_only: Option<bool>,
    pub query_timeout_seconds: Option<u32>,
    pub transaction_isolation: Option<String>, // NONE | READ_UNCOMMITTED | READ_COMMITTED | REPEATABLE_READ | SERIALIZABLE
}

/// Duplicates are allowed; properties accumulate in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProperty {
    pub name: String,
    pub value: String,
}

impl ConnectionProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ================
// SIZE
// ================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeFragment {
    pub initial_size: Option<u32>,
    pub min_idle: Option<u32>,
    pub max_idle: Option<Limit>,
    pub max_total: Option<Limit>,
    pub prepared_statement_pooling: Option<PreparedStatementPoolingFragment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreparedStatementPoolingFragment {
    pub max_open: Option<Limit>,
}

// ================
// POOL
// ================

/// Durations are milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolFragment {
    pub queue_discipline: Option<String>, // LIFO | FIFO
    pub cache_state: Option<bool>,
    pub max_wait: Option<Limit>,
    pub max_conn_lifetime: Option<Limit>,
    pub auto_commit_on_return: Option<bool>,
    pub rollback_on_return: Option<bool>,
    pub remove_abandoned: Option<RemoveAbandonedFragment>,
    pub abandoned_usage_tracking: Option<bool>,
    pub allow_access_to_underlying_connection: Option<bool>,
    pub eviction: Option<EvictionFragment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoveAbandonedFragment {
    pub on: Option<String>, // BORROW | MAINTENANCE
    pub timeout_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvictionFragment {
    pub time_between_runs: Option<Limit>,
    pub num_tests_per_run: Option<u32>,
    pub min_idle_time: Option<u64>,
    pub soft_min_idle_time: Option<Limit>,
    pub eviction_policy_class_name: Option<String>,
}

// ================
// VALIDATION
// ================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationFragment {
    pub query: Option<String>,
    pub timeout_seconds: Option<Limit>,
    pub test_on_create: Option<bool>,
    pub test_on_borrow: Option<bool>,
    pub test_on_return: Option<bool>,
    pub test_while_idle: Option<bool>,
    pub fast_fail: Option<FastFailFragment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FastFailFragment {
    pub disconnection_codes: Option<BTreeSet<String>>,
}

// ================
// LOGGING
// ================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingFragment {
    pub level: Option<String>, // TRACE | DEBUG | INFO | WARN | ERROR
    pub log_expired_connections: Option<bool>,
    pub log_abandoned: Option<bool>,
}
