//! End-to-end init → add → commit → status flows, exercising the library
//! API the way `src/cli/*.rs` wires it together, without going through the
//! binary itself.

use knot::repo::Repository;
use knot::status::{ModifiedKind, Report};
use knot::{blob, commit, config, refs, tree};

fn commit_all(repo: &Repository, message: &str) -> String {
    let index = repo.index().unwrap();
    let paths: Vec<String> = index.entries.iter().map(|e| e.pathname.clone()).collect();

    let graph = tree::build(".", &paths, &repo.root).unwrap();
    for (leaf_path, _) in tree::flatten(&graph) {
        blob::write_from_file(repo, &repo.root.join(&leaf_path)).unwrap();
    }
    let tree_id = tree::persist(&graph, repo).unwrap();

    let parent = refs::resolve_head(repo).unwrap();
    let parent_hash = if parent.valid { parent.reference } else { String::new() };

    let cfg = config::Config::default();
    let commit = commit::Commit::new(&cfg, tree_id, message.to_string(), parent_hash);
    let commit_id = commit.persist(repo).unwrap();
    refs::write(repo, "refs/heads/main", &refs::RefValue::Hash(commit_id.clone())).unwrap();

    let mut idx = repo.index().unwrap();
    idx.clear_cache();
    idx.persist(repo).unwrap();

    commit_id
}

#[test]
fn first_commit_produces_one_blob_one_tree_and_a_resolving_head() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("src")).unwrap();
    std::fs::write(tmp.path().join("src/readme.md"), "some-readme").unwrap();

    let repo = Repository::find_or_create(tmp.path()).unwrap();
    let mut index = repo.index().unwrap();
    index.add_or_modify(&repo, &["src/readme.md".to_string()]).unwrap();
    index.persist(&repo).unwrap();

    let commit_id = commit_all(&repo, "first commit");

    let expected_blob_id = blob::id_of(b"some-readme");
    assert!(repo.object_path(&expected_blob_id).exists());

    let committed = commit::read(&repo, &commit_id).unwrap();
    let root = tree::read_recursive(&repo, ".", &committed.tree).unwrap();
    let leaves = tree::flatten(&root);
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].0, "src/readme.md");

    let resolution = refs::resolve_head(&repo).unwrap();
    assert!(resolution.valid);
    assert_eq!(resolution.reference, commit_id);

    match knot::status::run(&repo).unwrap() {
        Report::Committed(sets) => {
            assert_eq!(sets.clean, vec!["src/readme.md".to_string()]);
            assert!(sets.staged.is_empty());
            assert!(sets.modified.is_empty());
        }
        Report::NoCommitsYet { .. } => panic!("HEAD should resolve after a commit"),
    }
}

#[test]
fn unchanged_re_add_is_a_no_op() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("a.txt"), "content").unwrap();
    let repo = Repository::find_or_create(tmp.path()).unwrap();

    let mut index = repo.index().unwrap();
    index.add_or_modify(&repo, &["a.txt".to_string()]).unwrap();
    let after_first_add = index.clone();

    index.add_or_modify(&repo, &["a.txt".to_string()]).unwrap();
    assert_eq!(index, after_first_add);
}

#[test]
fn staging_transitions_follow_the_full_edit_cycle() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("a.txt"), "v1").unwrap();
    let repo = Repository::find_or_create(tmp.path()).unwrap();

    let mut index = repo.index().unwrap();
    index.add_or_modify(&repo, &["a.txt".to_string()]).unwrap();
    index.persist(&repo).unwrap();

    match knot::status::run(&repo).unwrap() {
        Report::NoCommitsYet { tracked, .. } => assert_eq!(tracked, vec!["a.txt".to_string()]),
        Report::Committed(_) => panic!("no HEAD yet"),
    }

    commit_all(&repo, "v1");
    match knot::status::run(&repo).unwrap() {
        Report::Committed(sets) => assert_eq!(sets.clean, vec!["a.txt".to_string()]),
        Report::NoCommitsYet { .. } => panic!("should resolve after commit"),
    }

    std::fs::write(tmp.path().join("a.txt"), "v2").unwrap();
    match knot::status::run(&repo).unwrap() {
        Report::Committed(sets) => {
            assert_eq!(sets.modified, vec![("a.txt".to_string(), ModifiedKind::NotStaged)])
        }
        Report::NoCommitsYet { .. } => panic!("should resolve after commit"),
    }

    let mut index = repo.index().unwrap();
    index.add_or_modify(&repo, &["a.txt".to_string()]).unwrap();
    index.persist(&repo).unwrap();
    match knot::status::run(&repo).unwrap() {
        Report::Committed(sets) => assert_eq!(sets.staged, vec!["a.txt".to_string()]),
        Report::NoCommitsYet { .. } => panic!("should resolve after commit"),
    }
}

#[test]
fn tree_hash_is_independent_of_path_enumeration_order() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("src")).unwrap();
    std::fs::write(tmp.path().join("src/a.txt"), "a").unwrap();
    std::fs::write(tmp.path().join("src/b.txt"), "b").unwrap();
    std::fs::write(tmp.path().join("src/c.txt"), "c").unwrap();

    let forward = vec!["src/a.txt".to_string(), "src/b.txt".to_string(), "src/c.txt".to_string()];
    let shuffled = vec!["src/c.txt".to_string(), "src/a.txt".to_string(), "src/b.txt".to_string()];

    let t1 = tree::build("src", &forward, tmp.path()).unwrap();
    let t2 = tree::build("src", &shuffled, tmp.path()).unwrap();
    assert_eq!(t1.hash, t2.hash);
}

#[test]
fn ref_indirection_resolves_through_exactly_one_file() {
    let tmp = tempfile::tempdir().unwrap();
    let repo = Repository::find_or_create(tmp.path()).unwrap();
    std::fs::write(tmp.path().join("a.txt"), "a").unwrap();

    let mut index = repo.index().unwrap();
    index.add_or_modify(&repo, &["a.txt".to_string()]).unwrap();
    index.persist(&repo).unwrap();
    let commit_id = commit_all(&repo, "only commit");

    let resolution = refs::resolve_head(&repo).unwrap();
    assert_eq!(resolution, refs::Resolution { valid: true, is_direct: true, reference: commit_id });
}
