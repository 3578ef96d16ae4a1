use thiserror::Error;

use super::config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No residues are selected for the membrane search")]
    NoSelectedResidues,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
