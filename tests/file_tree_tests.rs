use quanta_shell::config::FsConfig;
use quanta_shell::fs::{join_path, DirId, FileTree};
use quanta_shell::ShellError;

/// `/docs/{old/, a.txt (10)}` and `/top.txt (5)`
fn sample_tree(config: FsConfig) -> FileTree {
    let mut tree = FileTree::new(config);
    tree.create_directory("/", "docs").unwrap();
    tree.create_directory("/docs", "old").unwrap();
    tree.create_file("/docs", "a.txt", 10).unwrap();
    tree.create_file("/", "top.txt", 5).unwrap();
    tree
}

/// Every reachable node's path is its parent's path plus its name, and
/// nothing unreachable is still allocated.
fn assert_consistent(tree: &FileTree) {
    let mut dirs = 0;
    let mut files = 0;
    let mut stack: Vec<DirId> = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let dir = tree.directory(id).expect("reachable directory is live");
        dirs += 1;
        if let Some(parent) = dir.parent {
            let parent = tree.directory(parent).unwrap();
            assert_eq!(dir.path, join_path(&parent.path, &dir.name));
        }
        for &file_id in &dir.files {
            let file = tree.file(file_id).expect("reachable file is live");
            assert_eq!(file.parent, id);
            assert_eq!(file.path, join_path(&dir.path, &file.name));
            files += 1;
        }
        for &sub in &dir.subdirs {
            assert_eq!(tree.directory(sub).unwrap().parent, Some(id));
            stack.push(sub);
        }
    }
    assert_eq!(dirs, tree.directory_count());
    assert_eq!(files, tree.file_count());
}

#[test]
fn test_new_tree_has_only_root() {
    let tree = FileTree::default();
    let root = tree.directory(tree.root()).unwrap();
    assert_eq!(root.name, "/");
    assert_eq!(root.path, "/");
    assert!(root.parent.is_none());
    assert_eq!(tree.find_directory("/"), Some(tree.root()));
    assert_eq!(tree.directory_count(), 1);
    assert_eq!(tree.file_count(), 0);
}

#[test]
fn test_create_nested_directories() {
    let mut tree = FileTree::default();
    assert_eq!(tree.create_directory("/", "a").unwrap(), "/a");
    assert_eq!(tree.create_directory("/a", "b").unwrap(), "/a/b");
    assert_eq!(tree.create_directory("/a/b", "c").unwrap(), "/a/b/c");

    let c = tree.find_directory("/a/b/c").unwrap();
    let b = tree.find_directory("/a/b").unwrap();
    assert_eq!(tree.directory(c).unwrap().parent, Some(b));
    assert_consistent(&tree);

    let err = tree.create_directory("/missing", "x").unwrap_err();
    assert!(matches!(err, ShellError::NotFound(ref p) if p == "/missing"));
}

#[test]
fn test_lookup_is_exact_string_match() {
    let mut tree = FileTree::default();
    tree.create_directory("/", "docs").unwrap();

    assert!(tree.find_directory("/docs").is_some());
    assert!(tree.find_directory("/docs/").is_none());
    assert!(tree.find_directory("docs").is_none());
    assert!(tree.find_directory("//docs").is_none());
}

#[test]
fn test_duplicate_names_depend_on_config() {
    let mut literal = FileTree::default();
    literal.create_directory("/", "docs").unwrap();
    literal.create_directory("/", "docs").unwrap();
    literal.create_file("/", "docs", 1).unwrap();
    assert_eq!(literal.list_directory("/").unwrap().subdirs, vec!["docs", "docs"]);

    let mut strict = FileTree::new(FsConfig::strict());
    strict.create_directory("/", "docs").unwrap();
    let err = strict.create_directory("/", "docs").unwrap_err();
    assert!(matches!(err, ShellError::AlreadyExists(ref p) if p == "/docs"));
    // Files and directories share one namespace
    let err = strict.create_file("/", "docs", 1).unwrap_err();
    assert!(matches!(err, ShellError::AlreadyExists(_)));
}

#[test]
fn test_invalid_names_are_rejected() {
    let mut tree = FileTree::default();
    for name in ["", "a/b", "/"] {
        assert!(matches!(
            tree.create_directory("/", name),
            Err(ShellError::InvalidOperation(_))
        ));
        assert!(matches!(
            tree.create_file("/", name, 1),
            Err(ShellError::InvalidOperation(_))
        ));
    }
    assert_eq!(tree.directory_count(), 1);
}

#[test]
fn test_literal_rename_leaves_descendants_stale() {
    let mut tree = sample_tree(FsConfig::default());

    assert_eq!(tree.rename_directory("/docs", "papers").unwrap(), "/papers");
    assert!(tree.find_directory("/papers").is_some());
    assert!(tree.find_directory("/docs").is_none());

    // Descendants keep the paths they were created with
    assert!(tree.find_directory("/docs/old").is_some());
    assert!(tree.find_directory("/papers/old").is_none());
    assert_eq!(tree.find_file("/papers", "a.txt").unwrap().path, "/docs/a.txt");
}

#[test]
fn test_cascading_rename_updates_descendants() {
    let config = FsConfig {
        cascade_rename: true,
        ..FsConfig::default()
    };
    let mut tree = sample_tree(config);
    tree.create_directory("/docs/old", "deep").unwrap();
    tree.create_file("/docs/old/deep", "z.txt", 1).unwrap();

    tree.rename_directory("/docs", "papers").unwrap();

    assert!(tree.find_directory("/papers/old/deep").is_some());
    assert!(tree.find_directory("/docs/old").is_none());
    assert_eq!(
        tree.find_file("/papers/old/deep", "z.txt").unwrap().path,
        "/papers/old/deep/z.txt"
    );
    assert_consistent(&tree);
}

#[test]
fn test_rename_errors() {
    let mut tree = sample_tree(FsConfig::strict());

    assert!(matches!(
        tree.rename_directory("/", "x"),
        Err(ShellError::InvalidOperation(_))
    ));
    assert!(matches!(
        tree.rename_directory("/nope", "x"),
        Err(ShellError::NotFound(_))
    ));
    assert!(matches!(
        tree.rename_directory("/docs", "top.txt"),
        Err(ShellError::AlreadyExists(_))
    ));
    // Renaming to its own name is not a clash
    assert_eq!(tree.rename_directory("/docs", "docs").unwrap(), "/docs");
}

#[test]
fn test_rmdir_requires_recursive_for_non_empty() {
    let mut tree = sample_tree(FsConfig::default());

    let err = tree.delete_directory("/docs", false).unwrap_err();
    assert!(matches!(err, ShellError::NotEmpty(ref p) if p == "/docs"));
    assert_eq!(tree.directory_count(), 3);

    tree.delete_directory("/docs", true).unwrap();
    assert!(tree.find_directory("/docs").is_none());
    assert!(tree.find_directory("/docs/old").is_none());
    // The whole subtree is released, only root and /top.txt remain
    assert_eq!(tree.directory_count(), 1);
    assert_eq!(tree.file_count(), 1);
    assert_consistent(&tree);
}

#[test]
fn test_rmdir_empty_directory() {
    let mut tree = FileTree::default();
    tree.create_directory("/", "tmp").unwrap();
    tree.delete_directory("/tmp", false).unwrap();
    assert_eq!(tree.directory_count(), 1);
    assert!(tree.list_directory("/").unwrap().subdirs.is_empty());
}

#[test]
fn test_rmdir_depth_depends_on_config() {
    let mut literal = sample_tree(FsConfig::default());
    let err = literal.delete_directory("/docs/old", false).unwrap_err();
    assert!(matches!(err, ShellError::NotFound(_)));
    assert!(literal.find_directory("/docs/old").is_some());

    let mut deep = sample_tree(FsConfig::strict());
    deep.delete_directory("/docs/old", false).unwrap();
    assert!(deep.find_directory("/docs/old").is_none());
    assert!(deep.find_directory("/docs").is_some());

    assert!(matches!(
        deep.delete_directory("/", true),
        Err(ShellError::InvalidOperation(_))
    ));
}

#[test]
fn test_slots_are_reused_after_delete() {
    let mut tree = sample_tree(FsConfig::default());
    tree.delete_directory("/docs", true).unwrap();

    tree.create_directory("/", "new").unwrap();
    tree.create_file("/new", "n.txt", 3).unwrap();
    assert_eq!(tree.directory_count(), 2);
    assert_eq!(tree.file_count(), 2);
    assert_consistent(&tree);
}

#[test]
fn test_create_and_delete_file() {
    let mut tree = FileTree::default();
    tree.create_directory("/", "docs").unwrap();

    assert_eq!(tree.create_file("/docs", "a.txt", 42).unwrap(), "/docs/a.txt");
    let file = tree.find_file("/docs", "a.txt").unwrap();
    assert_eq!(file.size, 42);

    tree.delete_file("/docs", "a.txt").unwrap();
    assert_eq!(tree.file_count(), 0);

    let err = tree.delete_file("/docs", "a.txt").unwrap_err();
    assert!(matches!(
        err,
        ShellError::FileNotFound { ref dir, ref name } if dir == "/docs" && name == "a.txt"
    ));
    assert!(matches!(
        tree.create_file("/nope", "a.txt", 1),
        Err(ShellError::NotFound(_))
    ));
}

#[test]
fn test_move_file_relinks_node() {
    let mut tree = sample_tree(FsConfig::default());

    assert_eq!(tree.move_file("/docs", "a.txt", "/").unwrap(), "/a.txt");
    assert!(tree.find_file("/docs", "a.txt").is_err());

    let moved = tree.find_file("/", "a.txt").unwrap();
    assert_eq!(moved.size, 10);
    assert_eq!(moved.parent, tree.root());
    assert_eq!(tree.file_count(), 2);
    assert_consistent(&tree);
}

#[test]
fn test_move_file_errors() {
    let mut tree = sample_tree(FsConfig::strict());

    assert!(matches!(
        tree.move_file("/docs", "missing.txt", "/"),
        Err(ShellError::FileNotFound { .. })
    ));
    assert!(matches!(
        tree.move_file("/docs", "a.txt", "/nope"),
        Err(ShellError::NotFound(_))
    ));
    // Source unchanged after a failed move
    assert!(tree.find_file("/docs", "a.txt").is_ok());

    tree.create_file("/", "a.txt", 1).unwrap();
    assert!(matches!(
        tree.move_file("/docs", "a.txt", "/"),
        Err(ShellError::AlreadyExists(_))
    ));
}

#[test]
fn test_duplicate_file_in_same_directory() {
    let mut tree = sample_tree(FsConfig::default());

    assert_eq!(
        tree.duplicate_file("/docs", "a.txt", "b.txt").unwrap(),
        "/docs/b.txt"
    );
    assert_eq!(tree.find_file("/docs", "b.txt").unwrap().size, 10);
    assert_eq!(tree.find_file("/docs", "a.txt").unwrap().size, 10);
    assert!(matches!(
        tree.duplicate_file("/docs", "zzz", "b.txt"),
        Err(ShellError::FileNotFound { .. })
    ));
}

#[test]
fn test_duplicate_directory_copies_subtree() {
    let mut tree = sample_tree(FsConfig::default());
    tree.create_directory("/", "backup").unwrap();

    assert_eq!(
        tree.duplicate_directory("/docs", "/backup").unwrap(),
        "/backup/docs"
    );

    let original = tree.list_directory("/docs").unwrap();
    let copy = tree.list_directory("/backup/docs").unwrap();
    assert_eq!(copy.subdirs, original.subdirs);
    assert_eq!(copy.files.len(), 1);
    assert_eq!(copy.files[0].name, "a.txt");
    assert_eq!(copy.files[0].path, "/backup/docs/a.txt");
    assert_eq!(copy.files[0].size, original.files[0].size);
    assert!(tree.find_directory("/backup/docs/old").is_some());

    // Copies are independent of their source
    tree.delete_file("/docs", "a.txt").unwrap();
    assert!(tree.find_file("/backup/docs", "a.txt").is_ok());
    assert_consistent(&tree);
}

#[test]
fn test_duplicate_directory_into_own_descendant_terminates() {
    let mut tree = FileTree::default();
    tree.create_directory("/", "a").unwrap();
    tree.create_directory("/a", "b").unwrap();

    assert_eq!(tree.duplicate_directory("/a", "/a/b").unwrap(), "/a/b/a");
    assert!(tree.find_directory("/a/b/a/b").is_some());
    assert!(tree.find_directory("/a/b/a/b/a").is_none());
    assert_eq!(tree.directory_count(), 5);
    assert_consistent(&tree);
}

#[test]
fn test_duplicate_root_is_rejected() {
    let mut tree = sample_tree(FsConfig::default());
    assert!(matches!(
        tree.duplicate_directory("/", "/docs"),
        Err(ShellError::InvalidOperation(_))
    ));
}

#[test]
fn test_search_finds_every_match_in_walk_order() {
    let mut tree = sample_tree(FsConfig::default());
    tree.create_file("/docs/old", "a.txt", 3).unwrap();
    tree.create_file("/", "a.txt", 1).unwrap();

    let hits = tree.search_file("/", "a.txt").unwrap();
    let paths: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
    assert_eq!(paths, vec!["/docs/old/a.txt", "/docs/a.txt", "/a.txt"]);

    let scoped = tree.search_file("/docs/old", "a.txt").unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].size, 3);

    assert!(tree.search_file("/", "nothing").unwrap().is_empty());
    assert!(matches!(
        tree.search_file("/nope", "a.txt"),
        Err(ShellError::NotFound(_))
    ));
}

#[test]
fn test_list_directory_text() {
    let tree = sample_tree(FsConfig::default());
    let listing = tree.list_directory("/").unwrap();
    assert_eq!(
        listing.to_string(),
        "Directory: /\n  Directory: docs\n  File: top.txt (5 bytes)"
    );
}

#[test]
fn test_display_tree_is_preorder_dirs_first() {
    let tree = sample_tree(FsConfig::default());
    let view = tree.display_tree("/").unwrap();

    let depths: Vec<usize> = view.entries.iter().map(|e| e.depth).collect();
    assert_eq!(depths, vec![0, 1, 2, 2, 1]);
    assert_eq!(
        view.to_string(),
        "/\n  docs/\n    old/\n    a.txt (10 bytes)\n  top.txt (5 bytes)"
    );

    let sub = tree.display_tree("/docs").unwrap();
    assert_eq!(sub.to_string(), "/docs\n  old/\n  a.txt (10 bytes)");
}

#[test]
fn test_file_info_views() {
    let tree = sample_tree(FsConfig::default());

    let short = tree.file_info("/docs", "a.txt", false).unwrap();
    assert_eq!(short.to_string(), "File: /docs/a.txt\n  Name: a.txt\n  Size: 10 bytes");

    let detailed = tree.file_info("/docs", "a.txt", true).unwrap();
    let text = detailed.to_string();
    assert!(text.contains("Directory: /docs"));
    assert!(text.contains("Created: unknown"));
    assert!(text.contains("Modified: unknown"));

    assert!(matches!(
        tree.file_info("/docs", "zzz", false),
        Err(ShellError::FileNotFound { .. })
    ));
}

#[test]
fn test_dir_info_totals() {
    let tree = sample_tree(FsConfig::default());

    let info = tree.dir_info("/", true).unwrap();
    assert_eq!(info.files, 1);
    assert_eq!(info.subdirs, 1);
    assert_eq!(info.total_size, 15);
    let detail = info.detail.as_ref().unwrap();
    assert_eq!(detail.total_files, 2);
    assert_eq!(detail.total_subdirs, 2);
    assert!(detail.parent.is_none());

    let docs = tree.dir_info("/docs", true).unwrap();
    assert_eq!(docs.total_size, 10);
    let text = docs.to_string();
    assert!(text.contains("Parent: /"));
    assert!(text.contains("Created: unknown"));

    let short = tree.dir_info("/docs", false).unwrap();
    assert!(short.detail.is_none());
    assert!(!short.to_string().contains("Parent"));
}

#[test]
fn test_dir_info_total_size_saturates() {
    let mut tree = FileTree::default();
    tree.create_file("/", "huge", u64::MAX).unwrap();
    tree.create_file("/", "one", 1).unwrap();

    let info = tree.dir_info("/", false).unwrap();
    assert_eq!(info.total_size, u64::MAX);
}

#[test]
fn test_deep_tree_walks_without_recursion() {
    const DEPTH: usize = 3000;

    let mut tree = FileTree::default();
    let mut path = "/".to_string();
    for _ in 0..DEPTH {
        path = tree.create_directory(&path, "d").unwrap();
    }
    tree.create_file(&path, "leaf.txt", 7).unwrap();

    let view = tree.display_tree("/").unwrap();
    assert_eq!(view.entries.len(), DEPTH + 2);
    assert_eq!(view.entries[DEPTH].depth, DEPTH);
    assert_eq!(view.entries[DEPTH + 1].name, "leaf.txt");

    let info = tree.dir_info("/", true).unwrap();
    let detail = info.detail.unwrap();
    assert_eq!(detail.total_subdirs, DEPTH);
    assert_eq!(detail.total_files, 1);
    assert_eq!(info.total_size, 7);

    let hits = tree.search_file("/", "leaf.txt").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, path.clone() + "/leaf.txt");

    tree.create_directory("/", "backup").unwrap();
    assert_eq!(tree.duplicate_directory("/d", "/backup").unwrap(), "/backup/d");
    assert_eq!(tree.directory_count(), 2 * DEPTH + 2);
    assert_eq!(tree.file_count(), 2);
    assert_eq!(tree.search_file("/backup", "leaf.txt").unwrap().len(), 1);
    assert_consistent(&tree);
}
