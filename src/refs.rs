//! Ref resolution: HEAD indirection through at most one `refs/heads/<name>`
//! file, down to a commit hash or "invalid".

use regex::Regex;

use crate::error::Result;
use crate::repo::Repository;

const INDIRECT_PATTERN: &str = r"^ref: (refs/heads/[A-Za-z-]{1,16}(?:/[A-Za-z-]{1,16})?)$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub valid: bool,
    pub is_direct: bool,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefValue {
    /// A 40-char hex commit hash.
    Hash(String),
    /// A branch name under `refs/heads/`.
    Branch(String),
}

/// Writes `value` to `<repo>/.got/<file_name>`.
pub fn write(repo: &Repository, file_name: &str, value: &RefValue) -> Result<()> {
    let bytes = match value {
        RefValue::Hash(hash) => hash.clone().into_bytes(),
        RefValue::Branch(name) => format!("ref: refs/heads/{name}").into_bytes(),
    };
    repo.write_file(file_name, &bytes)
}

/// Resolves HEAD's current contents.
pub fn resolve_head(repo: &Repository) -> Result<Resolution> {
    let head_bytes = repo.read_file("HEAD")?;
    resolve(repo, &head_bytes)
}

/// Resolves arbitrary ref bytes (the contents of HEAD, or of a
/// `refs/heads/<name>` file), recursing at most one level of indirection.
pub fn resolve(repo: &Repository, bytes: &[u8]) -> Result<Resolution> {
    let text = std::str::from_utf8(bytes).unwrap_or("").trim();
    let indirect = Regex::new(INDIRECT_PATTERN).expect("static regex is valid");

    if let Some(caps) = indirect.captures(text) {
        let target = caps[1].to_string();
        let path = repo.got_path().join(&target);
        if !path.is_file() {
            return Ok(Resolution { valid: false, is_direct: false, reference: String::new() });
        }
        let contents = std::fs::read(&path)?;
        return resolve(repo, &contents);
    }

    if text.len() == 40 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        let valid = repo.object_path(text).exists();
        return Ok(Resolution { valid, is_direct: true, reference: text.to_string() });
    }

    Ok(Resolution { valid: false, is_direct: false, reference: String::new() })
}

/// The `refs/heads/<name>` file HEAD currently points at, read straight off
/// HEAD without following further indirection. Used to know where a new
/// commit hash should be written.
pub fn head_branch_file(repo: &Repository) -> Result<String> {
    let head_bytes = repo.read_file("HEAD")?;
    let text = std::str::from_utf8(&head_bytes).unwrap_or("").trim();
    let indirect = Regex::new(INDIRECT_PATTERN).expect("static regex is valid");
    match indirect.captures(text) {
        Some(caps) => Ok(caps[1].to_string()),
        None => Err(crate::error::Error::MalformedObject("HEAD is not an indirect ref".into())),
    }
}
