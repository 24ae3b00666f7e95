use std::collections::{BTreeMap, BTreeSet};

use crate::fragment::{
    ConfigFragment, ConnectionProperty, DefaultsFragment, JdbcFragment, Limit, LoggingFragment,
    PoolFragment, SizeFragment, ValidationFragment,
};

/// Accumulated result of folding every matching fragment.
///
/// Scalars are `None` until some fragment sets them. Sections whose mere
/// presence switches on a pool subsystem carry an explicit `present` flag, so
/// an empty `[validation]` block is distinguishable from no block at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    pub jdbc: ResolvedJdbc,
    pub defaults: ResolvedDefaults,
    pub connection_properties: Vec<ConnectionProperty>,
    pub init_statements: Vec<String>,
    pub size: ResolvedSize,
    pub pool: ResolvedPool,
    pub validation: ResolvedValidation,
    pub logging: ResolvedLogging,
    pub jmx_name: Option<String>,
    matched: usize,
    provenance: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedJdbc {
    pub driver_class_name: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedDefaults {
    pub catalog: Option<String>,
    pub auto_commit: Option<bool>,
    pub read_only: Option<bool>,
    pub query_timeout_seconds: Option<u32>,
    pub transaction_isolation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSize {
    pub initial_size: Option<u32>,
    pub min_idle: Option<u32>,
    pub max_idle: Option<Limit>,
    pub max_total: Option<Limit>,
    pub prepared_statement_pooling: bool,
    pub max_open_prepared_statements: Option<Limit>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedPool {
    pub queue_discipline: Option<String>,
    pub cache_state: Option<bool>,
    pub max_wait: Option<Limit>,
    pub max_conn_lifetime: Option<Limit>,
    pub auto_commit_on_return: Option<bool>,
    pub rollback_on_return: Option<bool>,
    pub remove_abandoned: bool,
    pub remove_abandoned_on: Option<String>,
    pub remove_abandoned_timeout_seconds: Option<u32>,
    pub abandoned_usage_tracking: Option<bool>,
    pub allow_access_to_underlying_connection: Option<bool>,
    pub eviction: ResolvedEviction,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedEviction {
    pub present: bool,
    pub time_between_runs: Option<Limit>,
    pub num_tests_per_run: Option<u32>,
    pub min_idle_time: Option<u64>,
    pub soft_min_idle_time: Option<Limit>,
    pub eviction_policy_class_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedValidation {
    pub present: bool,
    pub query: Option<String>,
    pub timeout_seconds: Option<Limit>,
    pub test_on_create: Option<bool>,
    pub test_on_borrow: Option<bool>,
    pub test_on_return: Option<bool>,
    pub test_while_idle: Option<bool>,
    pub fast_fail: bool,
    pub disconnection_codes: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLogging {
    pub present: bool,
    pub level: Option<String>,
    pub log_expired_connections: Option<bool>,
    pub log_abandoned: Option<bool>,
}

/// Copies present scalars into the accumulator and records which fragment
/// wrote them.
struct Overlay<'a> {
    provenance: &'a mut BTreeMap<&'static str, usize>,
    index: usize,
}

impl Overlay<'_> {
    fn set<T: Clone>(&mut self, path: &'static str, slot: &mut Option<T>, incoming: &Option<T>) {
        if let Some(value) = incoming {
            *slot = Some(value.clone());
            self.provenance.insert(path, self.index);
        }
    }

    fn mark(&mut self, path: &'static str, flag: &mut bool) {
        *flag = true;
        self.provenance.insert(path, self.index);
    }
}

impl ResolvedConfig {
    /// Number of fragments folded into this configuration.
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// Input position of the fragment that last wrote `path`, e.g.
    /// `"size.maxIdle"` or `"validation"` for a section marker.
    pub fn origin(&self, path: &str) -> Option<usize> {
        self.provenance.get(path).copied()
    }

    /// Folds one matching fragment. `index` is its position in the input.
    pub(crate) fn absorb(&mut self, index: usize, fragment: &ConfigFragment) {
        self.matched += 1;

        if let Some(jdbc) = &fragment.jdbc {
            self.absorb_jdbc(index, jdbc);
        }
        if let Some(defaults) = &fragment.defaults {
            self.absorb_defaults(index, defaults);
        }

        // lists accumulate across fragments, never replace
        self.connection_properties
            .extend(fragment.connection_properties.iter().cloned());
        self.init_statements
            .extend(fragment.init_statements.iter().cloned());

        if let Some(size) = &fragment.size {
            self.absorb_size(index, size);
        }
        if let Some(pool) = &fragment.pool {
            self.absorb_pool(index, pool);
        }
        if let Some(validation) = &fragment.validation {
            self.absorb_validation(index, validation);
        }
        if let Some(logging) = &fragment.logging {
            self.absorb_logging(index, logging);
        }

        let mut o = Overlay {
            provenance: &mut self.provenance,
            index,
        };
        o.set("jmxName", &mut self.jmx_name, &fragment.jmx_name);
    }

    fn absorb_jdbc(&mut self, index: usize, jdbc: &JdbcFragment) {
        let mut o = Overlay {
            provenance: &mut self.provenance,
            index,
        };
        let r = &mut self.jdbc;
        o.set("jdbc.driverClassName", &mut r.driver_class_name, &jdbc.driver_class_name);
        o.set("jdbc.url", &mut r.url, &jdbc.url);
        o.set("jdbc.username", &mut r.username, &jdbc.username);
        o.set("jdbc.password", &mut r.password, &jdbc.password);
    }

    fn absorb_defaults(&mut self, index: usize, defaults: &DefaultsFragment) {
        let mut o = Overlay {
            provenance: &mut self.provenance,
            index,
        };
        let r = &mut self.defaults;
        o.set("defaults.catalog", &mut r.catalog, &defaults.catalog);
        o.set("defaults.autoCommit", &mut r.auto_commit, &defaults.auto_commit);
        o.set("defaults.readOnly", &mut r.read_only, &defaults.read_only);
        o.set(
            "defaults.queryTimeoutSeconds",
            &mut r.query_timeout_seconds,
            &defaults.query_timeout_seconds,
        );
        o.set(
            "defaults.transactionIsolation",
            &mut r.transaction_isolation,
            &defaults.transaction_isolation,
        );
    }

    fn absorb_size(&mut self, index: usize, size: &SizeFragment) {
        let mut o = Overlay {
            provenance: &mut self.provenance,
            index,
        };
        let r = &mut self.size;
        o.set("size.initialSize", &mut r.initial_size, &size.initial_size);
        o.set("size.minIdle", &mut r.min_idle, &size.min_idle);
        o.set("size.maxIdle", &mut r.max_idle, &size.max_idle);
        o.set("size.maxTotal", &mut r.max_total, &size.max_total);

        if let Some(pooling) = &size.prepared_statement_pooling {
            o.mark(
                "size.preparedStatementPooling",
                &mut r.prepared_statement_pooling,
            );
            o.set(
                "size.preparedStatementPooling.maxOpen",
                &mut r.max_open_prepared_statements,
                &pooling.max_open,
            );
        }
    }

    fn absorb_pool(&mut self, index: usize, pool: &PoolFragment) {
        let mut o = Overlay {
            provenance: &mut self.provenance,
            index,
        };
        let r = &mut self.pool;
        o.set("pool.queueDiscipline", &mut r.queue_discipline, &pool.queue_discipline);
        o.set("pool.cacheState", &mut r.cache_state, &pool.cache_state);
        o.set("pool.maxWait", &mut r.max_wait, &pool.max_wait);
        o.set("pool.maxConnLifetime", &mut r.max_conn_lifetime, &pool.max_conn_lifetime);
        o.set(
            "pool.autoCommitOnReturn",
            &mut r.auto_commit_on_return,
            &pool.auto_commit_on_return,
        );
        o.set(
            "pool.rollbackOnReturn",
            &mut r.rollback_on_return,
            &pool.rollback_on_return,
        );
        o.set(
            "pool.abandonedUsageTracking",
            &mut r.abandoned_usage_tracking,
            &pool.abandoned_usage_tracking,
        );
        o.set(
            "pool.allowAccessToUnderlyingConnection",
            &mut r.allow_access_to_underlying_connection,
            &pool.allow_access_to_underlying_connection,
        );

        if let Some(removal) = &pool.remove_abandoned {
            o.mark("pool.removeAbandoned", &mut r.remove_abandoned);
            o.set("pool.removeAbandoned.on", &mut r.remove_abandoned_on, &removal.on);
            o.set(
                "pool.removeAbandoned.timeoutSeconds",
                &mut r.remove_abandoned_timeout_seconds,
                &removal.timeout_seconds,
            );
        }

        if let Some(eviction) = &pool.eviction {
            let e = &mut r.eviction;
            o.mark("pool.eviction", &mut e.present);
            o.set(
                "pool.eviction.timeBetweenRuns",
                &mut e.time_between_runs,
                &eviction.time_between_runs,
            );
            o.set(
                "pool.eviction.numTestsPerRun",
                &mut e.num_tests_per_run,
                &eviction.num_tests_per_run,
            );
            o.set(
                "pool.eviction.minIdleTime",
                &mut e.min_idle_time,
                &eviction.min_idle_time,
            );
            o.set(
                "pool.eviction.softMinIdleTime",
                &mut e.soft_min_idle_time,
                &eviction.soft_min_idle_time,
            );
            o.set(
                "pool.eviction.evictionPolicyClassName",
                &mut e.eviction_policy_class_name,
                &eviction.eviction_policy_class_name,
            );
        }
    }

    fn absorb_validation(&mut self, index: usize, validation: &ValidationFragment) {
        let mut o = Overlay {
            provenance: &mut self.provenance,
            index,
        };
        let r = &mut self.validation;
        o.mark("validation", &mut r.present);
        o.set("validation.query", &mut r.query, &validation.query);
        o.set("validation.timeoutSeconds", &mut r.timeout_seconds, &validation.timeout_seconds);
        o.set("validation.testOnCreate", &mut r.test_on_create, &validation.test_on_create);
        o.set("validation.testOnBorrow", &mut r.test_on_borrow, &validation.test_on_borrow);
        o.set("validation.testOnReturn", &mut r.test_on_return, &validation.test_on_return);
        o.set("validation.testWhileIdle", &mut r.test_while_idle, &validation.test_while_idle);

        if let Some(fast_fail) = &validation.fast_fail {
            o.mark("validation.fastFail", &mut r.fast_fail);
            o.set(
                "validation.fastFail.disconnectionCodes",
                &mut r.disconnection_codes,
                &fast_fail.disconnection_codes,
            );
        }
    }

    fn absorb_logging(&mut self, index: usize, logging: &LoggingFragment) {
        let mut o = Overlay {
            provenance: &mut self.provenance,
            index,
        };
        let r = &mut self.logging;
        o.mark("logging", &mut r.present);
        o.set("logging.level", &mut r.level, &logging.level);
        o.set(
            "logging.logExpiredConnections",
            &mut r.log_expired_connections,
            &logging.log_expired_connections,
        );
        o.set("logging.logAbandoned", &mut r.log_abandoned, &logging.log_abandoned);
    }
}
