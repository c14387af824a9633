use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use docsim::{run_with_sources, PairReport, TokenizeConfig};

fn write_doc(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write fixture");
    path
}

fn read_report(run_dir: &Path, artifact: &str) -> PairReport {
    let data = fs::read(run_dir.join(artifact)).expect("read artifact");
    serde_json::from_slice(&data).expect("parse artifact")
}

#[test]
fn repeated_runs_agree_on_everything_but_identity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = write_doc(
        dir.path(),
        "target.txt",
        "the quick brown fox jumps over the lazy dog",
    );
    let a = write_doc(dir.path(), "a.txt", "the quick brown fox");
    let b = write_doc(dir.path(), "b.txt", "a lazy dog sleeps in the sun");
    let out = dir.path().join("results");
    let sources = [a, b];
    let cfg = TokenizeConfig::default();

    let first = run_with_sources(&target, &sources, &out, 2, &cfg).expect("first run");
    let second = run_with_sources(&target, &sources, &out, 2, &cfg).expect("second run");

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.target_name, second.target_name);
    assert_eq!(first.pairs.len(), second.pairs.len());

    for (p1, p2) in first.pairs.iter().zip(&second.pairs) {
        assert_eq!(p1.source_name, p2.source_name);
        assert_eq!(p1.index, p2.index);
        assert_eq!(p1.score, p2.score);

        let r1 = read_report(&out.join(&first.run_id), &p1.artifact);
        let r2 = read_report(&out.join(&second.run_id), &p2.artifact);
        assert_eq!(r1.score, r2.score);
        assert_eq!(r1.target.blocks, r2.target.blocks);
        assert_eq!(r1.source.blocks, r2.source.blocks);
    }
}

#[test]
fn source_order_permutes_indices_not_scores() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = write_doc(
        dir.path(),
        "target.txt",
        "comparing documents block by block finds reused passages",
    );
    let a = write_doc(dir.path(), "a.txt", "comparing documents block by block");
    let b = write_doc(dir.path(), "b.txt", "finds reused passages quickly");
    let out = dir.path().join("results");
    let cfg = TokenizeConfig::default();

    let forward =
        run_with_sources(&target, &[a.clone(), b.clone()], &out, 2, &cfg).expect("forward run");
    let reversed = run_with_sources(&target, &[b, a], &out, 2, &cfg).expect("reversed run");

    let forward_scores: HashMap<&str, f64> = forward
        .pairs
        .iter()
        .map(|p| (p.source_name.as_str(), p.score))
        .collect();
    let reversed_scores: HashMap<&str, f64> = reversed
        .pairs
        .iter()
        .map(|p| (p.source_name.as_str(), p.score))
        .collect();
    assert_eq!(forward_scores, reversed_scores);

    assert_eq!(forward.pairs[0].source_name, "a");
    assert_eq!(reversed.pairs[0].source_name, "b");
    assert_eq!(forward.pairs[0].index, 0);
    assert_eq!(reversed.pairs[1].source_name, "a");
    assert_eq!(reversed.pairs[1].index, 1);
}
