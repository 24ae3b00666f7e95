use thiserror::Error;
use tracing::{debug, info, warn};

use crate::compile::{compile, ConfigError, PoolSettings};
use crate::fragment::ConfigFragment;
use crate::guard::{DeferredInitGuard, LogSink, PoolError, PooledResource};
use crate::resolve::{resolve, ResolvedConfig};

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),
}

fn compile_logged(resolved: &ResolvedConfig, id: Option<&str>) -> Result<PoolSettings, ConfigError> {
    compile(resolved).map_err(|err| {
        warn!(
            id = id.unwrap_or("-"),
            error = %err,
            fragment = ?resolved.origin(err.path()),
            "Rejected pool configuration"
        );
        err
    })
}

/// Resolves and compiles the fragments selected by `id`.
///
/// `Ok(None)` when no fragment matches.
pub fn pool_settings(
    fragments: &[ConfigFragment],
    id: Option<&str>,
) -> Result<Option<PoolSettings>, ConfigError> {
    match resolve(fragments, id) {
        Some(resolved) => compile_logged(&resolved, id).map(Some),
        None => Ok(None),
    }
}

/// Builds a guarded pool from the fragments selected by `id`.
///
/// `build` constructs the caller's pool handle from the compiled settings. If
/// the configuration has a logging section, the log sink is attached through
/// the guard, so it stays pending until the first `acquire`. With
/// `log_abandoned` the same sink also receives abandoned-connection traces.
pub fn create_pool<P, F>(
    fragments: &[ConfigFragment],
    id: Option<&str>,
    build: F,
) -> Result<Option<DeferredInitGuard<P>>, DataSourceError>
where
    P: PooledResource,
    F: FnOnce(&PoolSettings) -> Result<P, PoolError>,
{
    let Some(settings) = pool_settings(fragments, id)? else {
        debug!(id = id.unwrap_or("-"), "No pool configuration matched");
        return Ok(None);
    };

    let guard = DeferredInitGuard::new(build(&settings)?);

    if let Some(logging) = &settings.logging {
        let sink = match id {
            Some(id) => LogSink::named(logging.level, id),
            None => LogSink::new(logging.level),
        };
        if logging.log_abandoned {
            guard.set_abandoned_sink(sink.clone())?;
        }
        guard.set_sink(sink)?;
    }

    info!(
        id = id.unwrap_or("-"),
        url = %settings.url,
        max_total = settings.max_total,
        validation = settings.validation.is_some(),
        eviction = settings.eviction.is_some(),
        "Pool configured"
    );

    Ok(Some(guard))
}
