//! The staging index: a persisted binary list of tracked-file entries plus
//! a transient cache of pending (compressed) content, keyed by path.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec;
use crate::error::{Error, Result};
use crate::hash;
use crate::object;
use crate::repo::Repository;

const MAGIC: &[u8; 4] = b"DIRC";
const VERSION: &[u8; 4] = b"1112";
const CACHE_MARKER: u8 = 0x13;
const MAX_12BIT: usize = 0x0FFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub ctime: u32,
    pub mtime: u32,
    pub filesize: u32,
    pub hash: [u8; 20],
    pub pathname: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRow {
    pub pathname: String,
    pub hash: [u8; 20],
    pub compressed_content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Index {
    pub entries: Vec<Entry>,
    pub cache: Vec<CacheRow>,
}

impl Index {
    pub fn new_empty() -> Index {
        Index::default()
    }

    pub fn load(repo: &Repository) -> Result<Index> {
        match repo.read_file("index") {
            Ok(bytes) => Index::deserialize(&bytes),
            Err(Error::RepoIO(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(Index::new_empty()),
            Err(e) => Err(e),
        }
    }

    pub fn persist(&self, repo: &Repository) -> Result<()> {
        repo.write_file("index", &self.serialize()?)
    }

    pub fn find_entry(&self, path: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.pathname == path)
    }

    pub fn find_cache(&self, path: &str) -> Option<&CacheRow> {
        self.cache.iter().find(|r| r.pathname == path)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Stages each path in `paths`: computes its would-be blob hash, upserts
    /// an entry row, and upserts a cache row holding its compressed content.
    /// A path whose hash is unchanged since the last entry is left alone
    /// entirely (no entry touch, no cache write).
    pub fn add_or_modify(&mut self, repo: &Repository, paths: &[String]) -> Result<()> {
        for path in paths {
            let abs = repo.root.join(path);
            let content = std::fs::read(&abs)?;
            let would_be_hash = hash::sha1_raw(&object::build(object::BLOB, &content));
            let metadata = std::fs::metadata(&abs)?;
            let mtime = system_time_to_u32(metadata.modified()?);
            let filesize = content.len() as u32;

            if let Some(existing) = self.entries.iter_mut().find(|e| &e.pathname == path) {
                if existing.hash == would_be_hash {
                    continue;
                }
                existing.mtime = mtime;
                existing.filesize = filesize;
                existing.hash = would_be_hash;
            } else {
                self.entries.push(Entry {
                    ctime: mtime,
                    mtime,
                    filesize,
                    hash: would_be_hash,
                    pathname: path.clone(),
                });
            }

            let compressed_content = codec::compress(&content)?;
            if let Some(row) = self.cache.iter_mut().find(|r| &r.pathname == path) {
                row.hash = would_be_hash;
                row.compressed_content = compressed_content;
            } else {
                self.cache.push(CacheRow { pathname: path.clone(), hash: would_be_hash, compressed_content });
            }
        }
        Ok(())
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(VERSION);
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());

        for entry in &self.entries {
            out.extend_from_slice(&entry.ctime.to_be_bytes());
            out.extend_from_slice(&entry.mtime.to_be_bytes());
            out.extend_from_slice(&entry.filesize.to_be_bytes());
            out.extend_from_slice(&entry.hash);
            let path_bytes = entry.pathname.as_bytes();
            if path_bytes.len() > MAX_12BIT {
                return Err(Error::CorruptIndex(format!(
                    "pathname exceeds {MAX_12BIT} bytes: {}",
                    entry.pathname
                )));
            }
            out.extend_from_slice(&((path_bytes.len() as u16) & 0x0FFF).to_be_bytes());
            out.extend_from_slice(path_bytes);
            out.push(0);
        }

        if !self.cache.is_empty() {
            out.push(CACHE_MARKER);
            let last = self.cache.len() - 1;
            for (i, row) in self.cache.iter().enumerate() {
                out.extend_from_slice(row.pathname.as_bytes());
                out.push(b' ');
                out.extend_from_slice(&row.hash);
                if row.compressed_content.len() > MAX_12BIT {
                    return Err(Error::CorruptIndex(format!(
                        "cache content for {} exceeds {MAX_12BIT} bytes",
                        row.pathname
                    )));
                }
                out.extend_from_slice(&((row.compressed_content.len() as u16) & 0x0FFF).to_be_bytes());
                out.extend_from_slice(&row.compressed_content);
                if i != last {
                    out.push(0);
                }
            }
        }

        Ok(out)
    }

    /// Missing or empty bytes yield an empty index. The low-12-bit length
    /// fields are read back verbatim (full 16 bits), not re-masked: a
    /// conforming encoder already guarantees the high nibble is zero.
    pub fn deserialize(bytes: &[u8]) -> Result<Index> {
        if bytes.is_empty() {
            return Ok(Index::new_empty());
        }
        if bytes.len() < 12 || &bytes[0..4] != MAGIC || &bytes[4..8] != VERSION {
            return Err(Error::CorruptIndex("bad magic or version".into()));
        }

        let count = u32::from_be_bytes(bytes[8..12].try_into().unwrap()) as usize;
        let mut cursor = 12;
        let mut entries = Vec::with_capacity(count);

        for _ in 0..count {
            if bytes.len() < cursor + 4 + 4 + 4 + 20 + 2 {
                return Err(Error::CorruptIndex("truncated entry header".into()));
            }
            let ctime = u32::from_be_bytes(bytes[cursor..cursor + 4].try_into().unwrap());
            cursor += 4;
            let mtime = u32::from_be_bytes(bytes[cursor..cursor + 4].try_into().unwrap());
            cursor += 4;
            let filesize = u32::from_be_bytes(bytes[cursor..cursor + 4].try_into().unwrap());
            cursor += 4;
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&bytes[cursor..cursor + 20]);
            cursor += 20;
            let path_len = u16::from_be_bytes(bytes[cursor..cursor + 2].try_into().unwrap()) as usize;
            cursor += 2;

            if bytes.len() < cursor + path_len + 1 {
                return Err(Error::CorruptIndex("truncated entry pathname".into()));
            }
            let pathname = std::str::from_utf8(&bytes[cursor..cursor + path_len])
                .map_err(|_| Error::CorruptIndex("entry pathname is not utf-8".into()))?
                .to_string();
            cursor += path_len;
            if bytes[cursor] != 0 {
                return Err(Error::CorruptIndex("missing entry terminator".into()));
            }
            cursor += 1;

            entries.push(Entry { ctime, mtime, filesize, hash, pathname });
        }

        let mut cache = Vec::new();
        if cursor < bytes.len() {
            if bytes[cursor] != CACHE_MARKER {
                return Err(Error::CorruptIndex("expected cache section marker".into()));
            }
            cursor += 1;

            while cursor < bytes.len() {
                let space = bytes[cursor..]
                    .iter()
                    .position(|&b| b == b' ')
                    .ok_or_else(|| Error::CorruptIndex("cache row missing path separator".into()))?
                    + cursor;
                let pathname = std::str::from_utf8(&bytes[cursor..space])
                    .map_err(|_| Error::CorruptIndex("cache pathname is not utf-8".into()))?
                    .to_string();
                cursor = space + 1;

                if bytes.len() < cursor + 20 + 2 {
                    return Err(Error::CorruptIndex("truncated cache row header".into()));
                }
                let mut hash = [0u8; 20];
                hash.copy_from_slice(&bytes[cursor..cursor + 20]);
                cursor += 20;
                let len = u16::from_be_bytes(bytes[cursor..cursor + 2].try_into().unwrap()) as usize;
                cursor += 2;

                if bytes.len() < cursor + len {
                    return Err(Error::CorruptIndex("truncated cache content".into()));
                }
                let compressed_content = bytes[cursor..cursor + len].to_vec();
                cursor += len;

                cache.push(CacheRow { pathname, hash, compressed_content });

                if cursor < bytes.len() {
                    if bytes[cursor] != 0 {
                        return Err(Error::CorruptIndex("expected cache row separator".into()));
                    }
                    cursor += 1;
                }
            }
        }

        Ok(Index { entries, cache })
    }
}

fn system_time_to_u32(t: SystemTime) -> u32 {
    t.duration_since(UNIX_EPOCH).map(|d| d.as_secs() as u32).unwrap_or(0)
}
