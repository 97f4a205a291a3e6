//! End-to-end session workflow tests: prepare a real file, apply a
//! specification, and check what lands on disk (or provably does not).

use context_patcher::{
    apply_to_file, AnchorSpec, Edit, PatchError, PatchSession, PatchSpecification, Pattern,
    SessionError,
};
use std::fs;
use tempfile::TempDir;

fn write_target(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn pat(text: &str) -> Pattern {
    Pattern::from_text(text)
}

#[test]
fn test_replace_block_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_target(&dir, "app.py", "def f():\n    x = 1\n    return x\n");

    let spec = PatchSpecification::new(vec![Edit::ReplaceBlock {
        anchor: AnchorSpec::between(pat("def f():"), pat("    return x")),
        new_content: pat("def f():\n    y = 2\n    return y"),
    }]);

    let changelog = apply_to_file(&path, &spec).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "def f():\n    y = 2\n    return y\n"
    );
    assert_eq!(changelog.len(), 1);
    assert_eq!(changelog[0].original.len(), 3);
}

#[test]
fn test_reapplying_spec_raises_missing_anchor() {
    // Idempotence boundary: after a successful run the old anchors are gone,
    // so the same specification must fail rather than silently re-match.
    let dir = TempDir::new().unwrap();
    let path = write_target(&dir, "app.py", "def f():\n    x = 1\n    return x\n");

    let spec = PatchSpecification::new(vec![Edit::ReplaceBlock {
        anchor: AnchorSpec::between(pat("def f():"), pat("    return x")),
        new_content: pat("def f():\n    y = 2\n    return y"),
    }]);

    apply_to_file(&path, &spec).unwrap();
    let err = apply_to_file(&path, &spec).unwrap_err();
    match err {
        SessionError::EditsFailed { failures, .. } => {
            assert!(matches!(
                failures[0].error,
                PatchError::MissingAnchor { .. }
            ));
        }
        other => panic!("expected aggregated failure, got {other}"),
    }
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "def f():\n    y = 2\n    return y\n"
    );
}

#[test]
fn test_failed_spec_leaves_file_byte_identical() {
    let dir = TempDir::new().unwrap();
    let original = "a\nb\nc\n";
    let path = write_target(&dir, "doc.txt", original);

    // The first edit succeeds, the second cannot locate its anchor; nothing
    // may be written.
    let spec = PatchSpecification::new(vec![
        Edit::AppendAtEnd {
            new_content: pat("d"),
        },
        Edit::DeleteBlock {
            anchor: AnchorSpec::before(pat("no such line")),
        },
    ]);

    let err = apply_to_file(&path, &spec).unwrap_err();
    assert!(matches!(err, SessionError::EditsFailed { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_uniformly_reindented_anchor_transposes_replacement() {
    // The anchor block sits 4 columns deeper than declared; the replacement
    // follows it there.
    let dir = TempDir::new().unwrap();
    let path = write_target(
        &dir,
        "app.py",
        "class C:\n    def f(self):\n        x = 1\n        return x\n",
    );

    let spec = PatchSpecification::new(vec![Edit::ReplaceBlock {
        anchor: AnchorSpec::between(pat("def f(self):"), pat("    return x")),
        new_content: pat("def f(self):\n    return 2"),
    }]);

    apply_to_file(&path, &spec).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "class C:\n    def f(self):\n        return 2\n"
    );
}

#[test]
fn test_delete_block_single_side_rule() {
    let dir = TempDir::new().unwrap();
    let path = write_target(&dir, "doc.txt", "a\n# marker\nb\nc\n");

    let spec = PatchSpecification::new(vec![Edit::DeleteBlock {
        anchor: AnchorSpec::before(pat("# marker")),
    }]);

    apply_to_file(&path, &spec).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\nc\n");
}

#[test]
fn test_append_at_end_separator_rule() {
    let dir = TempDir::new().unwrap();
    let path = write_target(&dir, "doc.txt", "a\n");

    let spec = PatchSpecification::new(vec![Edit::AppendAtEnd {
        new_content: pat("b"),
    }]);

    apply_to_file(&path, &spec).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
}

#[test]
fn test_ambiguous_search_replace_fails_with_both_positions() {
    let dir = TempDir::new().unwrap();
    let path = write_target(&dir, "doc.txt", "old()\nmid\nold()\n");

    let spec = PatchSpecification::new(vec![Edit::SearchReplace {
        pattern: pat("old()"),
        replacement: Some(pat("new()")),
        allow_multiple: false,
    }]);

    let err = apply_to_file(&path, &spec).unwrap_err();
    match err {
        SessionError::EditsFailed { failures, .. } => match &failures[0].error {
            PatchError::AmbiguousMatch { lines } => assert_eq!(lines, &vec![0, 2]),
            other => panic!("expected ambiguity, got {other}"),
        },
        other => panic!("expected aggregated failure, got {other}"),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), "old()\nmid\nold()\n");
}

#[test]
fn test_search_replace_all_occurrences() {
    let dir = TempDir::new().unwrap();
    let path = write_target(&dir, "doc.txt", "old()\nmid\nold()\n");

    let spec = PatchSpecification::new(vec![Edit::SearchReplace {
        pattern: pat("old()"),
        replacement: Some(pat("new()")),
        allow_multiple: true,
    }]);

    apply_to_file(&path, &spec).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "new()\nmid\nnew()\n");
}

#[test]
fn test_noop_edit_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let original = "x = 1\n";
    let path = write_target(&dir, "doc.txt", original);

    let spec = PatchSpecification::new(vec![Edit::SearchReplace {
        pattern: pat("x = 1"),
        replacement: Some(pat("x = 1")),
        allow_multiple: false,
    }]);

    let err = apply_to_file(&path, &spec).unwrap_err();
    match err {
        SessionError::EditsFailed { failures, .. } => {
            assert!(matches!(failures[0].error, PatchError::NoOp { .. }));
        }
        other => panic!("expected aggregated failure, got {other}"),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_dry_run_preview_leaves_disk_untouched() {
    let dir = TempDir::new().unwrap();
    let original = "a\n";
    let path = write_target(&dir, "doc.txt", original);

    let mut session = PatchSession::prepare(&path).unwrap();
    session
        .apply(&PatchSpecification::new(vec![Edit::AppendAtEnd {
            new_content: pat("b"),
        }]))
        .unwrap();

    let (buffer, changelog) = session.into_preview();
    assert_eq!(buffer.to_text(), "a\nb\n");
    assert_eq!(changelog.len(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_later_edits_resolve_against_mutated_buffer() {
    let dir = TempDir::new().unwrap();
    let path = write_target(&dir, "doc.txt", "one\n");

    // The second edit's anchor only exists because the first edit ran.
    let spec = PatchSpecification::new(vec![
        Edit::AppendAtEnd {
            new_content: pat("two"),
        },
        Edit::SearchReplace {
            pattern: pat("two"),
            replacement: Some(pat("three")),
            allow_multiple: false,
        },
    ]);

    apply_to_file(&path, &spec).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "one\nthree\n");
}

#[test]
fn test_adapt_block_rewrites_interior_only() {
    let dir = TempDir::new().unwrap();
    let path = write_target(
        &dir,
        "app.py",
        "def g():\n    a = 1\n    b = 2\n    return a + b\n",
    );

    let spec = PatchSpecification::new(vec![Edit::AdaptBlock {
        anchor: AnchorSpec::between(pat("def g():"), pat("    return a + b")),
        new_content: pat("    a = 10\n    b = 20"),
    }]);

    apply_to_file(&path, &spec).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "def g():\n    a = 10\n    b = 20\n    return a + b\n"
    );
}

#[test]
fn test_syntax_aware_matching_for_source_files() {
    // .rs targets get the syntax-aware canonicalizer: a pattern written
    // without the return annotation still finds the annotated definition.
    let dir = TempDir::new().unwrap();
    let path = write_target(&dir, "lib.rs", "fn f(x: u8) -> u8 {\n    x\n}\n");

    let spec = PatchSpecification::new(vec![Edit::AdaptBlock {
        anchor: AnchorSpec::before(pat("fn f(x: u8) {\n    x\n}")),
        new_content: pat("// appended"),
    }]);

    apply_to_file(&path, &spec).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "fn f(x: u8) -> u8 {\n    x\n}\n// appended\n"
    );
}
