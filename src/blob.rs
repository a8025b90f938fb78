//! Blobs: the content-addressed leaf object. A blob is nothing but a file's
//! raw bytes under the object envelope.

use std::path::Path;

use crate::error::{Error, Result};
use crate::object;
use crate::repo::Repository;

/// Writes the contents of `path` as a blob and returns its hex id. Fails
/// with [`Error::NoData`] for zero-byte content; callers treat that as
/// recoverable (skip and report) rather than aborting the whole operation.
pub fn write_from_file(repo: &Repository, path: &Path) -> Result<String> {
    let content = std::fs::read(path)?;
    if content.is_empty() {
        return Err(Error::NoData);
    }
    object::write(repo, object::BLOB, &content)
}

/// Reads a blob's raw content back out, by id.
pub fn read(repo: &Repository, id: &str) -> Result<Vec<u8>> {
    object::read(repo, object::BLOB, id)
}

/// The id a blob for `content` would have, without writing anything.
pub fn id_of(content: &[u8]) -> String {
    object::id_of(object::BLOB, content)
}
