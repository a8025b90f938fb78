use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use knot::repo::Repository;
use knot::{Error, Result};

mod add;
mod cat_tree;
mod commit;
mod init;
mod status;

/// Converts `path` (relative to the current directory, or absolute) into a
/// `/`-separated path relative to `repo`'s working-tree root.
pub(crate) fn relativize(repo: &Repository, path: &Path) -> Result<String> {
    let cwd = std::env::current_dir()?;
    let absolute = if path.is_absolute() { path.to_path_buf() } else { cwd.join(path) };
    let canonical = absolute
        .canonicalize()
        .map_err(|_| Error::PathInvalid(path.to_path_buf()))?;
    let relative = canonical
        .strip_prefix(&repo.root)
        .map_err(|_| Error::PathInvalid(path.to_path_buf()))?;
    let parts: Vec<String> =
        relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    Ok(parts.join("/"))
}

/// A minimal content-addressed version control store.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Command::Init { path } => init::run(path.as_deref()),
            Command::Add { paths } => add::run(paths),
            Command::Status => status::run(),
            Command::Commit { message } => commit::run(message),
            Command::CatTree { commit_hash } => cat_tree::run(commit_hash),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a repository at `path` (default: the current directory).
    Init { path: Option<PathBuf> },
    /// Stage one or more working-tree-relative files.
    Add {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },
    /// Print tracked / untracked / modified / staged groupings.
    Status,
    /// Write blobs, trees, and a commit; advance HEAD.
    Commit {
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Read a commit and print its tree.
    CatTree { commit_hash: String },
}
