//! Error types for signum-edit

use thiserror::Error;

use crate::formula::FormulaError;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),
}

pub type Result<T> = std::result::Result<T, EditError>;
