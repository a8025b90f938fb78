//! Object envelope: the `header 0x20 u32-be(len) 0x00 payload` framing
//! shared by blobs, trees and commits, and the on-disk read/write/addressing
//! built on top of it.

use tracing::trace;

use crate::codec;
use crate::error::{Error, Result};
use crate::hash;
use crate::repo::Repository;

pub const BLOB: &str = "blob";
pub const TREE: &str = "tree";
pub const COMMIT: &str = "commit";

/// Wraps `payload` in the `header 0x20 u32-be(len) 0x00` envelope.
pub fn build(header: &str, payload: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(header.len() + payload.len() + 9);
    framed.extend_from_slice(header.as_bytes());
    framed.push(b' ');
    framed.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    framed.push(0);
    framed.extend_from_slice(payload);
    framed
}

/// Content id of an envelope built from `header` and `payload`, without
/// touching disk.
pub fn id_of(header: &str, payload: &[u8]) -> String {
    hash::sha1_hex(&build(header, payload))
}

/// Compresses and writes the envelope, skipping the write if an object with
/// the same id already exists. Returns the object's hex id.
pub fn write(repo: &Repository, header: &str, payload: &[u8]) -> Result<String> {
    let framed = build(header, payload);
    let id = hash::sha1_hex(&framed);
    let path = repo.object_path(&id);
    if path.exists() {
        trace!(%id, header, "object already present, skipping write");
        return Ok(id);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, codec::compress(&framed)?)?;
    trace!(%id, header, "object written");
    Ok(id)
}

/// Reads and decompresses the object `id`, verifies its header matches
/// `expected_header`, and returns the payload (envelope stripped). Extra
/// trailing bytes beyond the declared length are ignored.
pub fn read(repo: &Repository, expected_header: &str, id: &str) -> Result<Vec<u8>> {
    let bytes = std::fs::read(repo.object_path(id))?;
    let framed = codec::decompress(&bytes)?;

    let space = framed
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| Error::MalformedObject("missing header separator".into()))?;
    let kind = std::str::from_utf8(&framed[..space])
        .map_err(|_| Error::MalformedObject("envelope header is not utf-8".into()))?;
    if kind != expected_header {
        return Err(Error::ObjectKindMismatch { expected: leak_kind(expected_header), found: kind.to_string() });
    }

    let len_start = space + 1;
    let len_end = len_start + 4;
    if framed.len() < len_end + 1 {
        return Err(Error::MalformedObject("envelope truncated before length field".into()));
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&framed[len_start..len_end]);
    let len = u32::from_be_bytes(len_bytes) as usize;

    if framed[len_end] != 0 {
        return Err(Error::MalformedObject("missing NUL terminator after length".into()));
    }
    let payload_start = len_end + 1;
    let payload_end = payload_start + len;
    if framed.len() < payload_end {
        return Err(Error::MalformedObject(format!(
            "envelope declares length {len} but only {} bytes remain",
            framed.len() - payload_start
        )));
    }
    let payload = &framed[payload_start..payload_end];

    let recomputed = hash::sha1_hex(&framed);
    if recomputed != id {
        return Err(Error::InconsistentObjectId { expected: id.to_string(), actual: recomputed });
    }

    Ok(payload.to_vec())
}

/// `expected_header` is always one of the crate's own `'static` constants, so
/// this never allocates a new leak; it just recovers the `'static` lifetime
/// for the error variant.
fn leak_kind(expected_header: &str) -> &'static str {
    match expected_header {
        BLOB => BLOB,
        TREE => TREE,
        COMMIT => COMMIT,
        _ => "unknown",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn build_matches_envelope_layout() {
        let framed = build(BLOB, b"hi");
        let mut expected = b"blob ".to_vec();
        expected.extend_from_slice(&2u32.to_be_bytes());
        expected.push(0);
        expected.extend_from_slice(b"hi");
        assert_eq!(framed, expected);
    }

    #[test]
    fn write_then_read_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::find_or_create(tmp.path()).unwrap();
        let id = write(&repo, BLOB, b"hello world").unwrap();
        let payload = read(&repo, BLOB, &id).unwrap();
        assert_eq!(payload, b"hello world");
    }

    #[test]
    fn write_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::find_or_create(tmp.path()).unwrap();
        let id1 = write(&repo, BLOB, b"same content").unwrap();
        let id2 = write(&repo, BLOB, b"same content").unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn read_rejects_kind_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::find_or_create(tmp.path()).unwrap();
        let id = write(&repo, BLOB, b"payload").unwrap();
        let err = read(&repo, TREE, &id).unwrap_err();
        assert!(matches!(err, Error::ObjectKindMismatch { .. }));
    }
}
