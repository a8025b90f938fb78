//! Trees: directory graphs built from a working-tree path set, serialized
//! deterministically, and read back recursively.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{Error, Result};
use crate::hash;
use crate::object;
use crate::repo::Repository;

const BLOB_MODE: &[u8; 6] = b"100644";
const TREE_MODE: &[u8; 6] = b"040000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Blob,
    Tree,
}

impl Mode {
    fn bytes(self) -> &'static [u8; 6] {
        match self {
            Mode::Blob => BLOB_MODE,
            Mode::Tree => TREE_MODE,
        }
    }

    fn from_bytes(b: &[u8]) -> Result<Mode> {
        match b {
            b"100644" => Ok(Mode::Blob),
            b"040000" => Ok(Mode::Tree),
            other => Err(Error::MalformedObject(format!("unknown tree mode: {other:?}"))),
        }
    }
}

/// One parsed `mode path hash` row, before its kind has been recursed into.
#[derive(Debug, Clone)]
pub struct Entry {
    pub mode: Mode,
    pub path: String,
    pub hash: [u8; 20],
}

#[derive(Debug, Clone)]
pub enum ChildNode {
    Blob { path: String, hash: [u8; 20] },
    Tree(Node),
}

impl ChildNode {
    fn path(&self) -> &str {
        match self {
            ChildNode::Blob { path, .. } => path,
            ChildNode::Tree(node) => &node.path,
        }
    }

    fn hash(&self) -> &[u8; 20] {
        match self {
            ChildNode::Blob { hash, .. } => hash,
            ChildNode::Tree(node) => &node.hash,
        }
    }

    fn mode(&self) -> Mode {
        match self {
            ChildNode::Blob { .. } => Mode::Blob,
            ChildNode::Tree(_) => Mode::Tree,
        }
    }
}

/// A materialized directory node: its own path, its sorted children, and
/// its content hash (would-be, until [`persist`] confirms it on disk).
#[derive(Debug, Clone)]
pub struct Node {
    pub path: String,
    pub children: Vec<ChildNode>,
    pub hash: [u8; 20],
}

/// Builds an in-memory tree graph from `paths` (working-tree-relative,
/// `/`-separated) rooted at `root_name`. Computes would-be blob and tree
/// hashes by reading file content from `root_dir`, but writes nothing.
pub fn build(root_name: &str, paths: &[String], root_dir: &Path) -> Result<Node> {
    let mut adjacency: HashMap<String, BTreeSet<String>> = HashMap::new();

    for raw_path in paths {
        let comps: Vec<&str> = raw_path.split('/').filter(|c| !c.is_empty()).collect();
        let mut fulls = Vec::with_capacity(comps.len());
        let mut acc = String::new();
        for comp in &comps {
            if !acc.is_empty() {
                acc.push('/');
            }
            acc.push_str(comp);
            fulls.push(acc.clone());
        }

        for i in (0..fulls.len()).rev() {
            let child = &fulls[i];
            if child == root_name {
                break;
            }
            let parent = if i == 0 { root_name.to_string() } else { fulls[i - 1].clone() };
            adjacency.entry(parent).or_default().insert(child.clone());
        }
    }

    materialize(root_name, &adjacency, root_dir)
}

fn materialize(
    node_path: &str,
    adjacency: &HashMap<String, BTreeSet<String>>,
    root_dir: &Path,
) -> Result<Node> {
    let mut children = Vec::new();

    if let Some(child_paths) = adjacency.get(node_path) {
        for child_path in child_paths {
            let disk_path = root_dir.join(child_path);
            if disk_path.is_file() {
                let content = std::fs::read(&disk_path)?;
                let hash = hash::sha1_raw(&object::build(object::BLOB, &content));
                children.push(ChildNode::Blob { path: child_path.clone(), hash });
            } else {
                let subtree = materialize(child_path, adjacency, root_dir)?;
                children.push(ChildNode::Tree(subtree));
            }
        }
    }

    children.sort_by(|a, b| a.path().cmp(b.path()));
    let payload = serialize(&children);
    let hash = hash::sha1_raw(&object::build(object::TREE, &payload));
    Ok(Node { path: node_path.to_string(), children, hash })
}

fn serialize(children: &[ChildNode]) -> Vec<u8> {
    let mut out = Vec::new();
    for child in children {
        out.extend_from_slice(child.mode().bytes());
        out.push(b' ');
        out.extend_from_slice(child.path().as_bytes());
        out.push(0);
        out.extend_from_slice(child.hash());
    }
    out
}

/// Persists every subtree (post-order, children before parents) and then
/// this node itself, verifying the on-disk id matches the would-be hash
/// computed at build time. Returns the root tree's hex id.
pub fn persist(node: &Node, repo: &Repository) -> Result<String> {
    for child in &node.children {
        if let ChildNode::Tree(subtree) = child {
            persist(subtree, repo)?;
        }
    }

    let payload = serialize(&node.children);
    let id = object::write(repo, object::TREE, &payload)?;
    let expected = hash::raw_to_hex(&node.hash);
    if id != expected {
        return Err(Error::InconsistentObjectId { expected, actual: id });
    }
    Ok(id)
}

/// All blob descendants of `node`, in depth-first traversal order.
pub fn flatten(node: &Node) -> Vec<(String, [u8; 20])> {
    let mut out = Vec::new();
    traverse(node, &mut out);
    out
}

fn traverse(node: &Node, out: &mut Vec<(String, [u8; 20])>) {
    for child in &node.children {
        match child {
            ChildNode::Blob { path, hash } => out.push((path.clone(), *hash)),
            ChildNode::Tree(subtree) => traverse(subtree, out),
        }
    }
}

/// Parses a tree payload into its direct child rows. Does not recurse into
/// tree children; see [`read_recursive`].
pub fn parse(payload: &[u8]) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut i = 0;
    while i < payload.len() {
        let space = i + 6;
        if payload.len() < space + 1 || payload[space] != b' ' {
            return Err(Error::MalformedObject("tree: expected 6-byte mode".into()));
        }
        let mode = Mode::from_bytes(&payload[i..space])?;

        let nul = payload[space + 1..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::MalformedObject("tree: missing path terminator".into()))?
            + space
            + 1;
        let path = std::str::from_utf8(&payload[space + 1..nul])
            .map_err(|_| Error::MalformedObject("tree: path is not utf-8".into()))?
            .to_string();

        let hash_start = nul + 1;
        let hash_end = hash_start + 20;
        if payload.len() < hash_end {
            return Err(Error::MalformedObject("tree: truncated child hash".into()));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[hash_start..hash_end]);

        entries.push(Entry { mode, path, hash });
        i = hash_end;
    }
    Ok(entries)
}

/// Reads tree object `id` and recursively materializes its full graph,
/// reading subordinate tree objects as needed.
pub fn read_recursive(repo: &Repository, path: &str, id: &str) -> Result<Node> {
    let payload = object::read(repo, object::TREE, id)?;
    let entries = parse(&payload)?;

    let mut children = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.mode {
            Mode::Blob => children.push(ChildNode::Blob { path: entry.path, hash: entry.hash }),
            Mode::Tree => {
                let sub_id = hash::raw_to_hex(&entry.hash);
                let subtree = read_recursive(repo, &entry.path, &sub_id)?;
                children.push(ChildNode::Tree(subtree));
            }
        }
    }

    let hash = hash::hex_to_raw(id)?;
    Ok(Node { path: path.to_string(), children, hash })
}
