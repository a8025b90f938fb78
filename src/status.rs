//! Status: a three-way reconciliation of the HEAD tree, the staging cache,
//! and the working tree.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::commit;
use crate::error::Result;
use crate::hash;
use crate::object;
use crate::refs;
use crate::repo::Repository;
use crate::tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifiedKind {
    NotStaged,
    AfterStaging,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSets {
    pub untracked: Vec<String>,
    pub clean: Vec<String>,
    pub staged: Vec<String>,
    pub modified: Vec<(String, ModifiedKind)>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// HEAD does not resolve to a commit yet; there is nothing to diff
    /// against.
    NoCommitsYet { untracked: Vec<String>, tracked: Vec<String> },
    Committed(StatusSets),
}

/// Classifies every working-tree file under `repo.root` (excluding `.got`).
pub fn run(repo: &Repository) -> Result<Report> {
    let index = repo.index()?;
    let working_paths = enumerate_working_tree(&repo.root)?;

    let (tracked, untracked): (Vec<String>, Vec<String>) =
        working_paths.into_iter().partition(|p| index.find_entry(p).is_some());

    let resolution = refs::resolve_head(repo)?;
    if !resolution.valid {
        debug!(tracked = tracked.len(), untracked = untracked.len(), "status: no commits yet");
        return Ok(Report::NoCommitsYet { untracked, tracked });
    }

    let head_commit = commit::read(repo, &resolution.reference)?;
    let head_tree = tree::read_recursive(repo, ".", &head_commit.tree)?;
    let tree_map: HashMap<String, [u8; 20]> = tree::flatten(&head_tree).into_iter().collect();

    let mut sets = StatusSets { untracked, ..Default::default() };

    for path in tracked {
        let abs = repo.root.join(&path);
        if !abs.is_file() {
            sets.missing.push(path);
            continue;
        }
        let content = std::fs::read(&abs)?;
        let now_hash = hash::sha1_raw(&object::build(object::BLOB, &content));

        match tree_map.get(&path) {
            Some(tree_hash) if *tree_hash == now_hash => {
                debug!(%path, "status: clean");
                sets.clean.push(path);
            }
            Some(_) => match index.find_cache(&path) {
                Some(cache_row) if cache_row.hash == now_hash => {
                    debug!(%path, "status: staged");
                    sets.staged.push(path);
                }
                Some(_) => {
                    debug!(%path, "status: modified after staging");
                    sets.modified.push((path, ModifiedKind::AfterStaging));
                }
                None => {
                    debug!(%path, "status: modified, not staged");
                    sets.modified.push((path, ModifiedKind::NotStaged));
                }
            },
            // In the index but absent from HEAD's tree: staged for the next commit.
            None => {
                debug!(%path, "status: newly tracked, staged");
                sets.staged.push(path);
            }
        }
    }

    Ok(Report::Committed(sets))
}

fn enumerate_working_tree(root: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    walk(root, root, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.file_name().map(|n| n == ".got").unwrap_or(false) {
            continue;
        }
        if path.is_dir() {
            walk(root, &path, out)?;
        } else if path.is_file() {
            let rel = path.strip_prefix(root).expect("walked path is under root");
            let rel_str: Vec<String> =
                rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
            out.push(rel_str.join("/"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{blob, config, refs as refs_mod, tree as tree_mod};

    fn commit_one_file(repo: &Repository, rel_path: &str, content: &str) -> String {
        std::fs::write(repo.root.join(rel_path), content).unwrap();
        let mut idx = repo.index().unwrap();
        idx.add_or_modify(repo, &[rel_path.to_string()]).unwrap();
        idx.persist(repo).unwrap();

        let idx = repo.index().unwrap();
        let paths: Vec<String> = idx.entries.iter().map(|e| e.pathname.clone()).collect();
        let graph = tree_mod::build(".", &paths, &repo.root).unwrap();
        for (leaf_path, _) in tree_mod::flatten(&graph) {
            blob::write_from_file(repo, &repo.root.join(&leaf_path)).unwrap();
        }
        let tree_id = tree_mod::persist(&graph, repo).unwrap();

        let cfg = config::Config::default();
        let commit = crate::commit::Commit::new(&cfg, tree_id, "msg".into(), String::new());
        let commit_id = commit.persist(repo).unwrap();
        refs_mod::write(repo, "refs/heads/main", &refs_mod::RefValue::Hash(commit_id.clone())).unwrap();

        let mut idx = repo.index().unwrap();
        idx.clear_cache();
        idx.persist(repo).unwrap();

        commit_id
    }

    #[test]
    fn first_commit_reports_clean() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::find_or_create(tmp.path()).unwrap();
        commit_one_file(&repo, "src/readme.md", "some-readme");

        match run(&repo).unwrap() {
            Report::Committed(sets) => {
                assert_eq!(sets.clean, vec!["src/readme.md".to_string()]);
                assert!(sets.modified.is_empty());
                assert!(sets.staged.is_empty());
            }
            Report::NoCommitsYet { .. } => panic!("expected a committed report"),
        }
    }

    #[test]
    fn edit_after_commit_is_modified_not_staged() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::find_or_create(tmp.path()).unwrap();
        commit_one_file(&repo, "src/readme.md", "some-readme");
        std::fs::write(repo.root.join("src/readme.md"), "edited").unwrap();

        match run(&repo).unwrap() {
            Report::Committed(sets) => {
                assert_eq!(sets.modified, vec![("src/readme.md".to_string(), ModifiedKind::NotStaged)]);
            }
            Report::NoCommitsYet { .. } => panic!("expected a committed report"),
        }
    }

    #[test]
    fn stage_then_edit_again_is_modified_after_staging() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::find_or_create(tmp.path()).unwrap();
        commit_one_file(&repo, "src/readme.md", "some-readme");
        std::fs::write(repo.root.join("src/readme.md"), "edited").unwrap();

        let mut idx = repo.index().unwrap();
        idx.add_or_modify(&repo, &["src/readme.md".to_string()]).unwrap();
        idx.persist(&repo).unwrap();

        std::fs::write(repo.root.join("src/readme.md"), "edited twice").unwrap();

        match run(&repo).unwrap() {
            Report::Committed(sets) => {
                assert_eq!(sets.modified, vec![("src/readme.md".to_string(), ModifiedKind::AfterStaging)]);
            }
            Report::NoCommitsYet { .. } => panic!("expected a committed report"),
        }
    }

    #[test]
    fn no_commits_yet_before_first_commit() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::find_or_create(tmp.path()).unwrap();
        std::fs::write(repo.root.join("a.txt"), "a").unwrap();
        let mut idx = repo.index().unwrap();
        idx.add_or_modify(&repo, &["a.txt".to_string()]).unwrap();
        idx.persist(&repo).unwrap();

        match run(&repo).unwrap() {
            Report::NoCommitsYet { tracked, .. } => assert_eq!(tracked, vec!["a.txt".to_string()]),
            Report::Committed(_) => panic!("expected no commits yet"),
        }
    }
}
