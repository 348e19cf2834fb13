use pde_issue::TableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid preprocessor options: {0}")]
    Options(#[from] serde_json::Error),
    #[error("invalid import `{0}`")]
    InvalidImport(String),
    #[error(transparent)]
    Messages(#[from] TableError),
}

pub type Result<T> = std::result::Result<T, Error>;
