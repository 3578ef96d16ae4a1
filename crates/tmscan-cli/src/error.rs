use crate::utils::parser::ParseError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tmscan::engine::config::ConfigError;
use tmscan::engine::error::EngineError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    TmscanCore(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write '{path}': {source}", path = path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(#[from] ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl CliError {
    pub fn file_parsing(path: &Path, source: impl Into<anyhow::Error>) -> Self {
        CliError::FileParsing {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub fn output(path: &Path, source: impl Into<anyhow::Error>) -> Self {
        CliError::Output {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

