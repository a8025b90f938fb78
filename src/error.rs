//! Crate-wide error taxonomy.
//!
//! One enum, one kind per failure mode named in the object/index/ref model.
//! `RepoIO` absorbs every filesystem failure that isn't itself one of the
//! more specific kinds below.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("path is invalid: {0}")]
    PathInvalid(PathBuf),

    #[error("repository I/O error: {0}")]
    RepoIO(#[from] io::Error),

    #[error("object kind mismatch: expected `{expected}`, found `{found}`")]
    ObjectKindMismatch { expected: &'static str, found: String },

    #[error("malformed object: {0}")]
    MalformedObject(String),

    #[error("corrupt compressed object stream")]
    CorruptObject,

    #[error("object id {expected} does not match recomputed id {actual}: store corruption")]
    InconsistentObjectId { expected: String, actual: String },

    #[error("no data to persist")]
    NoData,

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}
