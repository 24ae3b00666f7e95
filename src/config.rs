use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::fragment::ConfigFragment;

/// TOML binding of a pool configuration document.
///
/// ```toml
/// [[dbcp]]
/// id = "primary"
///
/// [dbcp.jdbc]
/// driver_class_name = "org.postgresql.Driver"
/// url = "jdbc:postgresql://localhost/app"
/// ```
///
/// Fragments keep document order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbcpDocument {
    #[serde(default)]
    pub dbcp: Vec<ConfigFragment>,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pool configuration document: {0}")]
    Toml(#[from] toml::de::Error),
}

pub fn load_fragments(document: &str) -> Result<Vec<ConfigFragment>, SourceError> {
    let doc: DbcpDocument = toml::from_str(document)?;
    debug!(fragments = doc.dbcp.len(), "Pool configuration document parsed");
    Ok(doc.dbcp)
}

pub fn load_fragments_from_path(path: impl AsRef<Path>) -> Result<Vec<ConfigFragment>, SourceError> {
    let path = path.as_ref();
    let document = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), "Loading pool configuration");
    load_fragments(&document)
}
