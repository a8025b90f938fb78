use std::path::Path;

use knot::repo::Repository;
use knot::Result;
use tracing::info;

pub fn run(path: Option<&Path>) -> Result<()> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if !target.exists() {
        std::fs::create_dir_all(&target)?;
    }

    let repo = Repository::find_or_create(&target)?;
    info!(root = %repo.root.display(), "initialized repository");
    println!("Initialized empty repository in {}", repo.got_path().display());
    Ok(())
}
