use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required field: {path}")]
    MissingRequiredField { path: String },

    #[error("Unsupported value for {field}: {value:?}")]
    UnsupportedValue { field: String, value: String },
}

impl ConfigError {
    pub fn missing(path: &str) -> Self {
        ConfigError::MissingRequiredField {
            path: path.to_string(),
        }
    }

    pub fn unsupported(field: &str, value: &str) -> Self {
        ConfigError::UnsupportedValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Dotted path of the offending field, as recorded in
    /// `ResolvedConfig::origin`.
    pub fn path(&self) -> &str {
        match self {
            ConfigError::MissingRequiredField { path } => path,
            ConfigError::UnsupportedValue { field, .. } => match field.as_str() {
                "transactionIsolation" => "defaults.transactionIsolation",
                "queueDiscipline" => "pool.queueDiscipline",
                "removeAbandoned.on" => "pool.removeAbandoned.on",
                other => other,
            },
        }
    }
}
