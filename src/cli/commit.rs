use knot::repo::Repository;
use knot::{blob, refs, tree, Error, Result};
use tracing::{info, warn};

pub fn run(message: &Option<String>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let repo = Repository::find_or_create(&cwd)?;

    let index = repo.index()?;
    let paths: Vec<String> = index.entries.iter().map(|e| e.pathname.clone()).collect();

    let graph = tree::build(".", &paths, &repo.root)?;
    for (leaf_path, _hash) in tree::flatten(&graph) {
        match blob::write_from_file(&repo, &repo.root.join(&leaf_path)) {
            Ok(_) => {}
            Err(Error::NoData) => warn!(path = %leaf_path, "skipping zero-byte blob"),
            Err(e) => return Err(e),
        }
    }
    let tree_id = tree::persist(&graph, &repo)?;

    let parent = refs::resolve_head(&repo)?;
    let parent_hash = if parent.valid { parent.reference } else { String::new() };

    let config = repo.config()?;
    let description = message.clone().unwrap_or_default();
    let commit = knot::commit::Commit::new(&config, tree_id.clone(), description, parent_hash);
    let commit_id = commit.persist(&repo)?;

    let branch_file = refs::head_branch_file(&repo)?;
    refs::write(&repo, &branch_file, &refs::RefValue::Hash(commit_id.clone()))?;

    let mut index = repo.index()?;
    index.clear_cache();
    index.persist(&repo)?;

    info!(commit = %commit_id, tree = %tree_id, "committed");
    println!("{commit_id}");
    Ok(())
}
