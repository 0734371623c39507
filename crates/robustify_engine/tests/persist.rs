use std::fs;

use robustify_engine::{write_atomic, PersistError};
use tempfile::TempDir;

#[test]
fn missing_parent_directories_are_created() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("reports").join("2026").join("results.html");

    let written = write_atomic(&target, "<p>one</p>").unwrap();
    assert_eq!(written, target);
    assert_eq!(fs::read_to_string(&target).unwrap(), "<p>one</p>");
}

#[test]
fn rewriting_replaces_the_page() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("results.html");

    write_atomic(&target, "<p>one</p>").unwrap();
    write_atomic(&target, "<p>two</p>").unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), "<p>two</p>");
    let leftovers = fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn parent_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let err = write_atomic(&file_path.join("results.html"), "data").unwrap_err();
    assert!(matches!(err, PersistError::NotADirectory { .. }));
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}
