//! Repository layout: locating/creating the `.got/` skeleton and the small
//! set of paths every other module needs.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::Index;

const GOT_DIR: &str = ".got";
const MAX_WALK_UP: usize = 4;

#[derive(Debug, Clone)]
pub struct Repository {
    /// The working-tree root (the directory containing `.got`).
    pub root: PathBuf,
}

impl Repository {
    /// Walks up at most [`MAX_WALK_UP`] directory levels from `start` looking
    /// for a `.got` directory. Opens it if found; otherwise creates a fresh
    /// repository rooted at `start`.
    pub fn find_or_create(start: &Path) -> Result<Self> {
        if !start.exists() || !start.is_dir() {
            return Err(Error::PathInvalid(start.to_path_buf()));
        }
        let start = start.canonicalize()?;

        let mut cursor = start.clone();
        for _ in 0..=MAX_WALK_UP {
            if cursor.join(GOT_DIR).is_dir() {
                debug!(root = %cursor.display(), "opened existing repository");
                return Ok(Repository { root: cursor });
            }
            match cursor.parent() {
                Some(parent) => cursor = parent.to_path_buf(),
                None => break,
            }
        }

        Self::create(&start)
    }

    fn create(root: &Path) -> Result<Self> {
        let got = root.join(GOT_DIR);
        fs::create_dir_all(got.join("refs").join("heads"))?;
        fs::create_dir_all(got.join("refs").join("tags"))?;
        fs::create_dir_all(got.join("objects"))?;

        let repo = Repository { root: root.to_path_buf() };
        repo.write_file("version", b"version: v1.0.0")?;
        repo.write_file("HEAD", b"ref: refs/heads/main")?;
        repo.write_file("config", &Config::default().marshal()?)?;
        Index::new_empty().persist(&repo)?;

        debug!(root = %repo.root.display(), "created repository");
        Ok(repo)
    }

    /// The `.got` directory itself.
    pub fn got_path(&self) -> PathBuf {
        self.root.join(GOT_DIR)
    }

    /// Truncating write of a single file under `.got/`. `name` may itself be
    /// a relative multi-component path (e.g. `refs/heads/main`).
    pub fn write_file(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.got_path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Reads a single file under `.got/`.
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.got_path().join(name))?)
    }

    /// On-disk path of the object identified by `hex` (40-char hex id).
    pub fn object_path(&self, hex: &str) -> PathBuf {
        self.got_path().join("objects").join(&hex[0..2]).join(&hex[2..])
    }

    pub fn index(&self) -> Result<Index> {
        Index::load(self)
    }

    pub fn config(&self) -> Result<Config> {
        match self.read_file("config") {
            Ok(bytes) => Config::unmarshal(&bytes),
            Err(Error::RepoIO(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Config::default())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn create_then_reopen_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::find_or_create(tmp.path()).unwrap();
        assert!(repo.got_path().join("objects").is_dir());
        assert!(repo.got_path().join("refs").join("heads").is_dir());
        assert!(repo.got_path().join("refs").join("tags").is_dir());
        assert_eq!(repo.read_file("HEAD").unwrap(), b"ref: refs/heads/main");

        // reopening must not wipe the existing repo.
        repo.write_file("marker", b"present").unwrap();
        let repo2 = Repository::find_or_create(tmp.path()).unwrap();
        assert_eq!(repo2.read_file("marker").unwrap(), b"present");
    }

    #[test]
    fn finds_repo_from_nested_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        Repository::find_or_create(tmp.path()).unwrap();
        let nested = tmp.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();
        let repo = Repository::find_or_create(&nested).unwrap();
        assert_eq!(repo.root, tmp.path().canonicalize().unwrap());
    }

    #[test]
    fn rejects_nonexistent_start_path() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("does-not-exist");
        assert!(Repository::find_or_create(&missing).is_err());
    }
}
