use knot::repo::Repository;
use knot::status::{self, ModifiedKind, Report};
use knot::Result;

pub fn run() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let repo = Repository::find_or_create(&cwd)?;

    match status::run(&repo)? {
        Report::NoCommitsYet { untracked, tracked } => {
            println!("No commits yet.");
            print_section("Tracked", &tracked);
            print_section("Untracked", &untracked);
        }
        Report::Committed(sets) => {
            print_section("Clean", &sets.clean);
            print_section("Staged", &sets.staged);
            let modified: Vec<String> = sets
                .modified
                .iter()
                .map(|(path, kind)| match kind {
                    ModifiedKind::NotStaged => format!("{path} (not staged)"),
                    ModifiedKind::AfterStaging => format!("{path} (modified after staging)"),
                })
                .collect();
            print_section("Modified", &modified);
            print_section("Missing", &sets.missing);
            print_section("Untracked", &sets.untracked);
        }
    }
    Ok(())
}

fn print_section(title: &str, paths: &[String]) {
    if paths.is_empty() {
        return;
    }
    println!("{title}:");
    for path in paths {
        println!("  {path}");
    }
}
