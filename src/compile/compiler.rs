use std::collections::BTreeSet;

use super::defaults::*;
use super::error::ConfigError;
use super::settings::*;
use crate::fragment::Limit;
use crate::resolve::{
    ResolvedConfig, ResolvedEviction, ResolvedLogging, ResolvedPool, ResolvedValidation,
};

/// `INDEFINITE` and absent both yield `fallback`.
fn bounded(limit: Option<Limit>, fallback: i64) -> i64 {
    limit
        .and_then(|limit| limit.finite())
        .map_or(fallback, |n| i64::try_from(n).unwrap_or(i64::MAX))
}

/// Turns a resolved configuration into concrete pool settings.
///
/// Fields are checked in declaration order and the first violation is
/// returned. Compilation is pure: the same input always yields the same
/// output.
pub fn compile(cfg: &ResolvedConfig) -> Result<PoolSettings, ConfigError> {
    let driver_class_name = cfg
        .jdbc
        .driver_class_name
        .clone()
        .ok_or_else(|| ConfigError::missing("jdbc.driverClassName"))?;
    let url = cfg
        .jdbc
        .url
        .clone()
        .ok_or_else(|| ConfigError::missing("jdbc.url"))?;

    let default_transaction_isolation = cfg
        .defaults
        .transaction_isolation
        .as_deref()
        .map(str::parse::<TransactionIsolation>)
        .transpose()?;

    let size = &cfg.size;
    let pool = &cfg.pool;

    let queue_discipline = match pool.queue_discipline.as_deref() {
        Some(literal) => literal.parse::<QueueDiscipline>()?,
        None => QueueDiscipline::default(),
    };

    Ok(PoolSettings {
        driver_class_name,
        url,
        username: cfg.jdbc.username.clone(),
        password: cfg.jdbc.password.clone(),

        default_catalog: cfg.defaults.catalog.clone(),
        default_auto_commit: cfg.defaults.auto_commit.unwrap_or(true),
        default_read_only: cfg.defaults.read_only.unwrap_or(false),
        default_query_timeout_seconds: cfg.defaults.query_timeout_seconds,
        default_transaction_isolation,

        connection_properties: cfg.connection_properties.clone(),
        connection_init_sqls: cfg.init_statements.clone(),

        initial_size: size.initial_size.unwrap_or(DEFAULT_INITIAL_SIZE),
        min_idle: size.min_idle.unwrap_or(DEFAULT_MIN_IDLE),
        max_idle: bounded(size.max_idle, UNBOUNDED),
        max_total: bounded(size.max_total, UNBOUNDED),
        pool_prepared_statements: size.prepared_statement_pooling,
        max_open_prepared_statements: bounded(size.max_open_prepared_statements, UNBOUNDED),

        queue_discipline,
        cache_state: pool.cache_state.unwrap_or(false),
        max_wait_millis: bounded(pool.max_wait, DEFAULT_MAX_WAIT_MILLIS),
        max_conn_lifetime_millis: bounded(pool.max_conn_lifetime, DEFAULT_MAX_CONN_LIFETIME_MILLIS),
        auto_commit_on_return: pool.auto_commit_on_return.unwrap_or(true),
        rollback_on_return: pool.rollback_on_return.unwrap_or(true),
        remove_abandoned: compile_remove_abandoned(pool)?,
        abandoned_usage_tracking: pool.abandoned_usage_tracking.unwrap_or(false),
        access_to_underlying_connection_allowed: pool
            .allow_access_to_underlying_connection
            .unwrap_or(false),

        eviction: compile_eviction(&pool.eviction),
        validation: compile_validation(&cfg.validation),
        logging: compile_logging(&cfg.logging)?,
        jmx_name: cfg.jmx_name.clone(),
    })
}

fn compile_remove_abandoned(pool: &ResolvedPool) -> Result<Option<RemoveAbandonedSettings>, ConfigError> {
    if !pool.remove_abandoned {
        return Ok(None);
    }

    let on = pool
        .remove_abandoned_on
        .as_deref()
        .ok_or_else(|| ConfigError::missing("pool.removeAbandoned.on"))?
        .parse::<AbandonedRemoval>()?;

    Ok(Some(RemoveAbandonedSettings {
        on,
        timeout_seconds: pool
            .remove_abandoned_timeout_seconds
            .unwrap_or(DEFAULT_REMOVE_ABANDONED_TIMEOUT_SECONDS),
    }))
}

fn compile_eviction(eviction: &ResolvedEviction) -> Option<EvictionSettings> {
    if !eviction.present {
        return None;
    }

    Some(EvictionSettings {
        time_between_runs_millis: bounded(
            eviction.time_between_runs,
            DEFAULT_TIME_BETWEEN_EVICTION_RUNS_MILLIS,
        ),
        num_tests_per_run: eviction
            .num_tests_per_run
            .unwrap_or(DEFAULT_NUM_TESTS_PER_EVICTION_RUN),
        min_evictable_idle_time_millis: eviction
            .min_idle_time
            .map(|ms| i64::try_from(ms).unwrap_or(i64::MAX))
            .unwrap_or(DEFAULT_MIN_EVICTABLE_IDLE_TIME_MILLIS),
        soft_min_evictable_idle_time_millis: bounded(
            eviction.soft_min_idle_time,
            DEFAULT_SOFT_MIN_EVICTABLE_IDLE_TIME_MILLIS,
        ),
        eviction_policy_class_name: eviction.eviction_policy_class_name.clone(),
    })
}

fn compile_validation(validation: &ResolvedValidation) -> Option<ValidationSettings> {
    if !validation.present {
        return None;
    }

    let fast_fail = validation.fast_fail.then(|| FastFailSettings {
        disconnection_codes: validation.disconnection_codes.clone().unwrap_or_else(|| {
            DEFAULT_DISCONNECTION_CODES
                .iter()
                .map(|code| code.to_string())
                .collect::<BTreeSet<_>>()
        }),
    });

    Some(ValidationSettings {
        query: validation.query.clone(),
        timeout_seconds: bounded(validation.timeout_seconds, DEFAULT_VALIDATION_TIMEOUT_SECONDS),
        test_on_create: validation.test_on_create.unwrap_or(false),
        test_on_borrow: validation.test_on_borrow.unwrap_or(true),
        test_on_return: validation.test_on_return.unwrap_or(false),
        test_while_idle: validation.test_while_idle.unwrap_or(false),
        fast_fail,
    })
}

fn compile_logging(logging: &ResolvedLogging) -> Result<Option<LoggingSettings>, ConfigError> {
    if !logging.present {
        return Ok(None);
    }

    let level = match logging.level.as_deref() {
        Some(literal) => parse_level(literal)?,
        None => DEFAULT_LOG_LEVEL,
    };

    Ok(Some(LoggingSettings {
        level,
        log_expired_connections: logging.log_expired_connections.unwrap_or(true),
        log_abandoned: logging.log_abandoned.unwrap_or(false),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{
        ConfigFragment, DefaultsFragment, EvictionFragment, FastFailFragment, JdbcFragment,
        LoggingFragment, PoolFragment, PreparedStatementPoolingFragment, RemoveAbandonedFragment,
        SizeFragment, ValidationFragment,
    };
    use crate::resolve::resolve;

    fn jdbc() -> ConfigFragment {
        ConfigFragment {
            jdbc: Some(JdbcFragment {
                driver_class_name: Some("org.apache.derby.jdbc.EmbeddedDriver".to_string()),
                url: Some("jdbc:derby:memory:dbcp;create=true".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn compile_all(fragments: &[ConfigFragment]) -> Result<PoolSettings, ConfigError> {
        compile(&resolve(fragments, None).unwrap())
    }

    #[test]
    fn test_defaults_for_bare_configuration() {
        let s = compile_all(&[jdbc()]).unwrap();

        assert!(s.default_auto_commit);
        assert!(!s.default_read_only);
        assert_eq!(s.default_transaction_isolation, None);
        assert!(s.lifo());
        assert_eq!(s.initial_size, 0);
        assert_eq!(s.min_idle, 0);
        assert_eq!(s.max_idle, UNBOUNDED);
        assert_eq!(s.max_total, UNBOUNDED);
        assert!(!s.pool_prepared_statements);
        assert_eq!(s.max_wait_millis, DEFAULT_MAX_WAIT_MILLIS);
        assert_eq!(s.max_conn_lifetime_millis, -1);
        assert!(s.rollback_on_return);
        assert!(s.auto_commit_on_return);
        assert!(!s.cache_state);
        assert!(!s.abandoned_usage_tracking);
        assert!(s.remove_abandoned.is_none());
        assert!(s.eviction.is_none());
        assert!(s.validation.is_none());
        assert!(s.logging.is_none());
    }

    #[test]
    fn test_indefinite_wait_is_unbounded_not_zero() {
        let f = ConfigFragment {
            pool: Some(PoolFragment {
                max_wait: Some(Limit::Indefinite),
                max_conn_lifetime: Some(Limit::Indefinite),
                ..Default::default()
            }),
            ..jdbc()
        };

        let s = compile_all(&[f]).unwrap();
        assert_eq!(s.max_wait_millis, DEFAULT_MAX_WAIT_MILLIS);
        assert_ne!(s.max_wait_millis, 0);
        assert_eq!(s.max_conn_lifetime_millis, -1);
    }

    #[test]
    fn test_finite_limits_pass_through() {
        let f = ConfigFragment {
            size: Some(SizeFragment {
                initial_size: Some(2),
                min_idle: Some(1),
                max_idle: Some(Limit::Finite(4)),
                max_total: Some(Limit::Finite(16)),
                prepared_statement_pooling: Some(PreparedStatementPoolingFragment {
                    max_open: Some(Limit::Finite(50)),
                }),
            }),
            pool: Some(PoolFragment {
                max_wait: Some(Limit::Finite(2500)),
                queue_discipline: Some("fifo".to_string()),
                ..Default::default()
            }),
            ..jdbc()
        };

        let s = compile_all(&[f]).unwrap();
        assert_eq!(s.initial_size, 2);
        assert_eq!(s.min_idle, 1);
        assert_eq!(s.max_idle, 4);
        assert_eq!(s.max_total, 16);
        assert!(s.pool_prepared_statements);
        assert_eq!(s.max_open_prepared_statements, 50);
        assert_eq!(s.max_wait_millis, 2500);
        assert!(!s.lifo());
    }

    #[test]
    fn test_missing_url_fails() {
        let f = ConfigFragment {
            jdbc: Some(JdbcFragment {
                driver_class_name: Some("org.postgresql.Driver".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(compile_all(&[f]), Err(ConfigError::missing("jdbc.url")));
        assert_eq!(
            compile_all(&[ConfigFragment::default()]),
            Err(ConfigError::missing("jdbc.driverClassName"))
        );
    }

    #[test]
    fn test_jdbc_identity_may_come_from_different_fragments() {
        let driver = ConfigFragment {
            jdbc: Some(JdbcFragment {
                driver_class_name: Some("org.postgresql.Driver".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let url = ConfigFragment {
            jdbc: Some(JdbcFragment {
                url: Some("jdbc:postgresql://db/app".to_string()),
                username: Some("app".to_string()),
                password: Some("hunter2".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let s = compile_all(&[driver, url]).unwrap();
        assert_eq!(s.driver_class_name, "org.postgresql.Driver");
        assert_eq!(s.url, "jdbc:postgresql://db/app");
        assert!(!format!("{:?}", s).contains("hunter2"));
    }

    #[test]
    fn test_unsupported_transaction_isolation() {
        let f = ConfigFragment {
            defaults: Some(DefaultsFragment {
                transaction_isolation: Some("BOGUS".to_string()),
                ..Default::default()
            }),
            ..jdbc()
        };

        assert_eq!(
            compile_all(&[f]),
            Err(ConfigError::UnsupportedValue {
                field: "transactionIsolation".to_string(),
                value: "BOGUS".to_string(),
            })
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let f = ConfigFragment {
            defaults: Some(DefaultsFragment {
                transaction_isolation: Some("BOGUS".to_string()),
                ..Default::default()
            }),
            pool: Some(PoolFragment {
                queue_discipline: Some("RANDOM".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        // jdbc is checked before any enum
        assert_eq!(
            compile_all(&[f.clone()]),
            Err(ConfigError::missing("jdbc.driverClassName"))
        );

        let f = ConfigFragment { jdbc: jdbc().jdbc, ..f };
        assert_eq!(
            compile_all(&[f]),
            Err(ConfigError::unsupported("transactionIsolation", "BOGUS"))
        );
    }

    #[test]
    fn test_unsupported_queue_and_removal_trigger() {
        let queue = ConfigFragment {
            pool: Some(PoolFragment {
                queue_discipline: Some("STACK".to_string()),
                ..Default::default()
            }),
            ..jdbc()
        };
        assert_eq!(
            compile_all(&[queue]),
            Err(ConfigError::unsupported("queueDiscipline", "STACK"))
        );

        let removal = ConfigFragment {
            pool: Some(PoolFragment {
                remove_abandoned: Some(RemoveAbandonedFragment {
                    on: Some("idle".to_string()),
                    timeout_seconds: None,
                }),
                ..Default::default()
            }),
            ..jdbc()
        };
        assert_eq!(
            compile_all(&[removal]),
            Err(ConfigError::unsupported("removeAbandoned.on", "idle"))
        );

        let untriggered = ConfigFragment {
            pool: Some(PoolFragment {
                remove_abandoned: Some(RemoveAbandonedFragment::default()),
                ..Default::default()
            }),
            ..jdbc()
        };
        assert_eq!(
            compile_all(&[untriggered]),
            Err(ConfigError::missing("pool.removeAbandoned.on"))
        );
    }

    #[test]
    fn test_remove_abandoned() {
        let f = ConfigFragment {
            pool: Some(PoolFragment {
                remove_abandoned: Some(RemoveAbandonedFragment {
                    on: Some("borrow".to_string()),
                    timeout_seconds: None,
                }),
                ..Default::default()
            }),
            ..jdbc()
        };

        let s = compile_all(&[f]).unwrap();
        assert_eq!(
            s.remove_abandoned,
            Some(RemoveAbandonedSettings {
                on: AbandonedRemoval::OnBorrow,
                timeout_seconds: DEFAULT_REMOVE_ABANDONED_TIMEOUT_SECONDS,
            })
        );
    }

    #[test]
    fn test_empty_validation_section_activates_defaults() {
        let f = ConfigFragment {
            validation: Some(ValidationFragment::default()),
            ..jdbc()
        };

        let v = compile_all(&[f]).unwrap().validation.unwrap();
        assert_eq!(v.query, None);
        assert_eq!(v.timeout_seconds, -1);
        assert!(v.test_on_borrow);
        assert!(!v.test_on_create);
        assert!(!v.test_on_return);
        assert!(!v.test_while_idle);
        assert!(v.fast_fail.is_none());
    }

    #[test]
    fn test_fast_fail_codes() {
        let requested = ConfigFragment {
            validation: Some(ValidationFragment {
                query: Some("SELECT 1".to_string()),
                timeout_seconds: Some(Limit::Finite(5)),
                fast_fail: Some(FastFailFragment::default()),
                ..Default::default()
            }),
            ..jdbc()
        };

        let v = compile_all(&[requested.clone()]).unwrap().validation.unwrap();
        assert_eq!(v.timeout_seconds, 5);
        let codes = v.fast_fail.unwrap().disconnection_codes;
        assert_eq!(codes.len(), DEFAULT_DISCONNECTION_CODES.len());
        assert!(codes.contains("57P01"));

        let explicit = ConfigFragment {
            validation: Some(ValidationFragment {
                fast_fail: Some(FastFailFragment {
                    disconnection_codes: Some(["08S01".to_string()].into_iter().collect()),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let v = compile_all(&[requested, explicit]).unwrap().validation.unwrap();
        // query from the first fragment survives the second
        assert_eq!(v.query.as_deref(), Some("SELECT 1"));
        let codes = v.fast_fail.unwrap().disconnection_codes;
        assert_eq!(codes.into_iter().collect::<Vec<_>>(), vec!["08S01"]);
    }

    #[test]
    fn test_eviction_only_when_declared() {
        let f = ConfigFragment {
            pool: Some(PoolFragment {
                eviction: Some(EvictionFragment {
                    soft_min_idle_time: Some(Limit::Indefinite),
                    eviction_policy_class_name: Some("com.example.Policy".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..jdbc()
        };

        let e = compile_all(&[f]).unwrap().eviction.unwrap();
        assert_eq!(e.time_between_runs_millis, DEFAULT_TIME_BETWEEN_EVICTION_RUNS_MILLIS);
        assert_eq!(e.num_tests_per_run, DEFAULT_NUM_TESTS_PER_EVICTION_RUN);
        assert_eq!(e.min_evictable_idle_time_millis, 1_800_000);
        assert_eq!(e.soft_min_evictable_idle_time_millis, -1);
        assert_eq!(e.eviction_policy_class_name.as_deref(), Some("com.example.Policy"));
    }

    #[test]
    fn test_indefinite_eviction_interval_and_validation_timeout() {
        let f = ConfigFragment {
            pool: Some(PoolFragment {
                eviction: Some(EvictionFragment {
                    time_between_runs: Some(Limit::Indefinite),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            validation: Some(ValidationFragment {
                timeout_seconds: Some(Limit::Indefinite),
                ..Default::default()
            }),
            ..jdbc()
        };

        let s = compile_all(&[f]).unwrap();
        assert_eq!(s.eviction.unwrap().time_between_runs_millis, UNBOUNDED);
        assert_eq!(s.validation.unwrap().timeout_seconds, UNBOUNDED);
    }

    #[test]
    fn test_logging_level() {
        let f = ConfigFragment {
            logging: Some(LoggingFragment {
                level: Some("debug".to_string()),
                log_abandoned: Some(true),
                ..Default::default()
            }),
            ..jdbc()
        };
        let l = compile_all(&[f]).unwrap().logging.unwrap();
        assert_eq!(l.level, tracing::Level::DEBUG);
        assert!(l.log_expired_connections);
        assert!(l.log_abandoned);

        let bad = ConfigFragment {
            logging: Some(LoggingFragment {
                level: Some("LOUD".to_string()),
                ..Default::default()
            }),
            ..jdbc()
        };
        assert_eq!(
            compile_all(&[bad]),
            Err(ConfigError::unsupported("logging.level", "LOUD"))
        );
    }

    #[test]
    fn test_logging_level_rejects_numerals_and_mixed_case() {
        for literal in ["3", "1", "wArN", "Info"] {
            let f = ConfigFragment {
                logging: Some(LoggingFragment {
                    level: Some(literal.to_string()),
                    ..Default::default()
                }),
                ..jdbc()
            };
            assert_eq!(
                compile_all(&[f]),
                Err(ConfigError::unsupported("logging.level", literal))
            );
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let cfg = resolve(&[jdbc()], None).unwrap();
        assert_eq!(compile(&cfg), compile(&cfg));
    }
}
