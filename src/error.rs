use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be set in .env file or environment")]
    Missing { name: &'static str },

    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("SLA thresholds must satisfy 0 < critical ({critical}) < warning ({warning}) < 1")]
    Thresholds { warning: f64, critical: f64 },
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read job snapshot '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse job snapshot '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
