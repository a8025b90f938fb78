//! Commits: six tagged fields in fixed order, persisted as a `commit`
//! object.

use chrono::Local;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::object;
use crate::repo::Repository;

/// Tag order is part of the wire contract; it is not alphabetical.
const TAGS: [&str; 6] = ["author", "committer", "tree", "date", "description", "parent"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub author: String,
    pub committer: String,
    pub tree: String,
    pub date: String,
    pub description: String,
    pub parent: String,
}

impl Commit {
    /// Builds a commit record stamped with the current local time and the
    /// author/committer identity from `config`. `author`/`committer` both
    /// take the configured `user.name`, falling back to `"unknown"`.
    pub fn new(config: &Config, tree: String, description: String, parent: String) -> Commit {
        let who = config.user_name.clone().unwrap_or_else(|| "unknown".to_string());
        Commit {
            author: who.clone(),
            committer: who,
            tree,
            date: Local::now().format("%a %b %d %H:%M:%S %Y").to_string(),
            description,
            parent,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let values = [
            &self.author,
            &self.committer,
            &self.tree,
            &self.date,
            &self.description,
            &self.parent,
        ];
        let lines: Vec<String> =
            TAGS.iter().zip(values.iter()).map(|(tag, value)| format!("{tag}\t{value}")).collect();
        lines.join("\n").into_bytes()
    }

    pub fn parse(payload: &[u8]) -> Result<Commit> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| Error::MalformedObject("commit is not utf-8".into()))?;

        let mut fields: std::collections::HashMap<&str, String> = std::collections::HashMap::new();
        for line in text.split('\n') {
            let (tag, value) = line
                .split_once('\t')
                .ok_or_else(|| Error::MalformedObject(format!("commit line missing tab: {line:?}")))?;
            fields.insert(tag, value.to_string());
        }

        let mut get = |tag: &str| {
            fields
                .remove(tag)
                .ok_or_else(|| Error::MalformedObject(format!("commit missing tag `{tag}`")))
        };

        Ok(Commit {
            author: get("author")?,
            committer: get("committer")?,
            tree: get("tree")?,
            date: get("date")?,
            description: get("description")?,
            parent: get("parent")?,
        })
    }

    pub fn persist(&self, repo: &Repository) -> Result<String> {
        object::write(repo, object::COMMIT, &self.serialize())
    }
}

/// Framing-aware read of a commit object, then parse.
pub fn read(repo: &Repository, id: &str) -> Result<Commit> {
    let payload = object::read(repo, object::COMMIT, id)?;
    Commit::parse(&payload)
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Commit {
        Commit {
            author: "ada".into(),
            committer: "ada".into(),
            tree: "a".repeat(40),
            date: "2026-07-27 10:00:00".into(),
            description: "first commit".into(),
            parent: String::new(),
        }
    }

    #[test]
    fn serialize_parse_round_trips() {
        let commit = sample();
        let back = Commit::parse(&commit.serialize()).unwrap();
        assert_eq!(commit, back);
    }

    #[test]
    fn serialize_uses_fixed_tag_order_with_no_trailing_newline() {
        let bytes = sample().serialize();
        let text = String::from_utf8(bytes).unwrap();
        let tags: Vec<&str> = text.lines().map(|l| l.split('\t').next().unwrap()).collect();
        assert_eq!(tags, vec!["author", "committer", "tree", "date", "description", "parent"]);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn persist_then_read_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::find_or_create(tmp.path()).unwrap();
        let commit = sample();
        let id = commit.persist(&repo).unwrap();
        let back = read(&repo, &id).unwrap();
        assert_eq!(commit, back);
    }

    #[test]
    fn rejects_missing_tag() {
        assert!(Commit::parse(b"author\tada\ncommitter\tada").is_err());
    }
}
