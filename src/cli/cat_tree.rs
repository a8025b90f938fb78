use knot::repo::Repository;
use knot::{commit, hash, tree, Result};

pub fn run(commit_hash: &str) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let repo = Repository::find_or_create(&cwd)?;

    let commit = commit::read(&repo, commit_hash)?;
    let root = tree::read_recursive(&repo, ".", &commit.tree)?;

    for (path, child_hash) in tree::flatten(&root) {
        println!("{}\t{path}", hash::raw_to_hex(&child_hash));
    }
    Ok(())
}
