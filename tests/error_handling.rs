// tests/error_handling.rs
//
// The result-integrity taxonomy: missing pairs, duplicate pairs, malformed
// lines. Partial batch failures are the dominant real-world failure mode,
// so each of these must fail loudly and name its culprit.

mod common;

use std::fs;

use tempfile::TempDir;

use pairdag::collect::ResultSet;
use pairdag::collect::results::collect_from_file;
use pairdag::discover::ItemSet;
use pairdag::errors::PairdagError;
use pairdag::pairs::Pair;

use common::{diagram_dir, write_results_excluding};

#[test]
fn missing_result_fails_the_completion_check_naming_the_pair() {
    let (_dir, paths) = diagram_dir(4);
    let items = ItemSet::from_paths(paths.clone());

    let work = TempDir::new().unwrap();
    let results_file = write_results_excluding(work.path(), &paths, Some((1, 3)));

    match collect_from_file(&results_file, &items) {
        Err(PairdagError::CompletionCheck(msg)) => {
            // Pair (1,3) is index 4 in the enumeration over 4 items.
            assert!(msg.contains("4 (pair 1,3)"), "message was: {msg}");
            assert!(msg.contains("1 of 6"), "message was: {msg}");
        }
        other => panic!("expected CompletionCheck error, got {:?}", other),
    }
}

#[test]
fn conflicting_duplicate_is_an_inconsistent_result() {
    let mut set = ResultSet::new(3);
    set.insert(Pair::new(0, 1), 2.5).unwrap();

    match set.insert(Pair::new(0, 1), 2.6) {
        Err(PairdagError::InconsistentResult {
            a,
            b,
            existing,
            conflicting,
        }) => {
            assert_eq!((a, b), (0, 1));
            assert_eq!(existing, 2.5);
            assert_eq!(conflicting, 2.6);
        }
        other => panic!("expected InconsistentResult error, got {:?}", other),
    }
}

#[test]
fn identical_duplicate_is_tolerated() {
    let mut set = ResultSet::new(3);
    set.insert(Pair::new(0, 1), 2.5).unwrap();
    set.insert(Pair::new(0, 1), 2.5).unwrap();
    assert_eq!(set.len(), 1);
}

#[test]
fn malformed_line_names_the_artifact_and_line() {
    let (_dir, paths) = diagram_dir(2);
    let items = ItemSet::from_paths(paths.clone());

    let work = TempDir::new().unwrap();
    let results_file = work.path().join("results.tsv");
    fs::write(
        &results_file,
        format!(
            "{}\t{}\tnot-a-number\n",
            paths[0].display(),
            paths[1].display()
        ),
    )
    .unwrap();

    match collect_from_file(&results_file, &items) {
        Err(PairdagError::MalformedResult {
            artifact,
            line,
            reason,
        }) => {
            assert_eq!(artifact, results_file);
            assert_eq!(line, 1);
            assert!(reason.contains("not-a-number"), "reason was: {reason}");
        }
        other => panic!("expected MalformedResult error, got {:?}", other),
    }
}

#[test]
fn unknown_item_path_is_malformed() {
    let (_dir, paths) = diagram_dir(2);
    let items = ItemSet::from_paths(paths.clone());

    let work = TempDir::new().unwrap();
    let results_file = work.path().join("results.tsv");
    fs::write(
        &results_file,
        format!("/nowhere/else.txt\t{}\t1.0\n", paths[1].display()),
    )
    .unwrap();

    match collect_from_file(&results_file, &items) {
        Err(PairdagError::MalformedResult { reason, .. }) => {
            assert!(reason.contains("/nowhere/else.txt"), "reason was: {reason}");
        }
        other => panic!("expected MalformedResult error, got {:?}", other),
    }
}

#[test]
fn negative_distance_is_rejected_at_parse_time() {
    let (_dir, paths) = diagram_dir(2);
    let items = ItemSet::from_paths(paths.clone());

    let work = TempDir::new().unwrap();
    let results_file = work.path().join("results.tsv");
    fs::write(
        &results_file,
        format!(
            "{}\t{}\t-1.0\n",
            paths[0].display(),
            paths[1].display()
        ),
    )
    .unwrap();

    match collect_from_file(&results_file, &items) {
        Err(PairdagError::MalformedResult { reason, .. }) => {
            assert!(reason.contains("non-negative"), "reason was: {reason}");
        }
        other => panic!("expected MalformedResult error, got {:?}", other),
    }
}

#[test]
fn exit_codes_split_config_from_result_integrity() {
    assert_eq!(PairdagError::Config("x".into()).exit_code(), 1);
    assert_eq!(PairdagError::MissingDependency("x".into()).exit_code(), 1);
    assert_eq!(PairdagError::CompletionCheck("x".into()).exit_code(), 2);
    assert_eq!(
        PairdagError::InconsistentResult {
            a: 0,
            b: 1,
            existing: 1.0,
            conflicting: 2.0
        }
        .exit_code(),
        2
    );
}
