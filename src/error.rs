use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("invalid root directory: {0:?}")]
    InvalidRoot(PathBuf),

    #[error("path {path:?} is outside root {root:?}")]
    PathOutsideRoot { root: PathBuf, path: PathBuf },

    #[error("image {0} not found")]
    ImageNotFound(i64),

    #[error("tag not found: {0}")]
    TagNotFound(String),

    #[error("tag name already exists: {0}")]
    TagNameTaken(String),

    #[error("tag name required")]
    EmptyTagName,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;
