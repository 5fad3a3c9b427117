// tests/collect_merge.rs
//
// The cleanup node's merge step, and order-independence of collection from
// a directory of per-batch artifacts.

mod common;

use std::fs;

use tempfile::TempDir;

use pairdag::collect::results::{collect_from_dir, merge_artifacts};
use pairdag::discover::ItemSet;
use pairdag::errors::PairdagError;

use common::{diagram_dir, synthetic_distance};

/// Scatter the full result set for `paths` across `.out` artifacts, one per
/// batch of `chunk` pairs, in reversed pair order inside each artifact.
fn scatter_artifacts(dir: &std::path::Path, paths: &[std::path::PathBuf], chunk: usize) {
    let mut lines = Vec::new();
    for i in 0..paths.len() {
        for j in (i + 1)..paths.len() {
            lines.push(format!(
                "{}\t{}\t{}",
                paths[i].display(),
                paths[j].display(),
                synthetic_distance(i, j)
            ));
        }
    }

    for (b, batch_lines) in lines.chunks(chunk).enumerate() {
        let mut shuffled: Vec<&String> = batch_lines.iter().collect();
        shuffled.reverse();
        let body: String = shuffled
            .iter()
            .map(|l| format!("{l}\n"))
            .collect();
        fs::write(dir.join(format!("job.batch.{b}.out")), body).unwrap();
    }
}

#[test]
fn merge_concatenates_every_artifact_line() {
    common::init_tracing();
    let (_dir, paths) = diagram_dir(5); // 10 pairs
    let work = TempDir::new().unwrap();
    scatter_artifacts(work.path(), &paths, 3);

    let merged = work.path().join("results.tsv");
    let count = merge_artifacts(work.path(), &merged).unwrap();
    assert_eq!(count, 10);

    let contents = fs::read_to_string(&merged).unwrap();
    assert_eq!(contents.lines().count(), 10);
    for line in contents.lines() {
        assert_eq!(line.split('\t').count(), 3);
    }
}

#[test]
fn collection_is_independent_of_artifact_order() {
    let (_dir, paths) = diagram_dir(5);
    let items = ItemSet::from_paths(paths.clone());
    let work = TempDir::new().unwrap();
    scatter_artifacts(work.path(), &paths, 4);

    let results = collect_from_dir(work.path(), &items).unwrap();
    assert_eq!(results.len(), 10);
    for (pair, distance) in results.iter() {
        assert_eq!(distance, synthetic_distance(pair.a, pair.b));
    }
}

#[test]
fn merge_failure_names_the_offending_artifact() {
    let (_dir, paths) = diagram_dir(3);
    let work = TempDir::new().unwrap();
    scatter_artifacts(work.path(), &paths, 2);

    let bad = work.path().join("job.batch.9.out");
    fs::write(&bad, "only-one-field\n").unwrap();

    match merge_artifacts(work.path(), &work.path().join("results.tsv")) {
        Err(PairdagError::MalformedResult { artifact, line, .. }) => {
            assert_eq!(artifact, bad);
            assert_eq!(line, 1);
        }
        other => panic!("expected MalformedResult error, got {:?}", other),
    }
}

#[test]
fn retried_merge_ignores_the_collect_nodes_own_stdout() {
    let (_dir, paths) = diagram_dir(3);
    let work = TempDir::new().unwrap();
    scatter_artifacts(work.path(), &paths, 10);

    let merged = work.path().join("job.results.tsv");
    assert_eq!(merge_artifacts(work.path(), &merged).unwrap(), 3);

    // The scheduler captured the first attempt's stdout next to the batch
    // artifacts; a retried collect must not parse it as results.
    fs::write(
        work.path().join("job.collect.out"),
        format!("merged 3 results into {}\n", merged.display()),
    )
    .unwrap();
    fs::write(work.path().join("job.matrix.out"), "matrix written: x (3x3)\n").unwrap();

    assert_eq!(merge_artifacts(work.path(), &merged).unwrap(), 3);

    let items = ItemSet::from_paths(paths.clone());
    let results = collect_from_dir(work.path(), &items).unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn non_out_files_are_ignored() {
    let (_dir, paths) = diagram_dir(3);
    let work = TempDir::new().unwrap();
    scatter_artifacts(work.path(), &paths, 10);
    fs::write(work.path().join("job.batch.0.log"), "scheduler noise\n").unwrap();
    fs::write(work.path().join("job.batch.0.error"), "stderr noise\n").unwrap();

    let merged = work.path().join("results.tsv");
    let count = merge_artifacts(work.path(), &merged).unwrap();
    assert_eq!(count, 3);
}

#[test]
fn duplicated_artifact_with_identical_values_still_collects() {
    let (_dir, paths) = diagram_dir(3);
    let items = ItemSet::from_paths(paths.clone());
    let work = TempDir::new().unwrap();
    scatter_artifacts(work.path(), &paths, 10);

    // A retried batch leaves a second, identical artifact behind.
    let original = fs::read_to_string(work.path().join("job.batch.0.out")).unwrap();
    fs::write(work.path().join("job.batch.0.retry.out"), original).unwrap();

    let results = collect_from_dir(work.path(), &items).unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn missing_artifact_fails_collection() {
    let (_dir, paths) = diagram_dir(4); // 6 pairs across 3 artifacts of 2
    let items = ItemSet::from_paths(paths.clone());
    let work = TempDir::new().unwrap();
    scatter_artifacts(work.path(), &paths, 2);

    fs::remove_file(work.path().join("job.batch.1.out")).unwrap();

    match collect_from_dir(work.path(), &items) {
        Err(PairdagError::CompletionCheck(msg)) => {
            assert!(msg.contains("2 of 6"), "message was: {msg}");
        }
        other => panic!("expected CompletionCheck error, got {:?}", other),
    }
}
