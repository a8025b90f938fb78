use std::path::PathBuf;

use knot::repo::Repository;
use knot::Result;
use tracing::debug;

pub fn run(paths: &[PathBuf]) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let repo = Repository::find_or_create(&cwd)?;

    let relative: Vec<String> =
        paths.iter().map(|p| super::relativize(&repo, p)).collect::<Result<_>>()?;

    let mut index = repo.index()?;
    index.add_or_modify(&repo, &relative)?;
    index.persist(&repo)?;

    for path in &relative {
        debug!(%path, "staged");
    }
    Ok(())
}
