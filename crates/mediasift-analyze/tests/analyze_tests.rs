use std::fs;
use std::sync::Mutex;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use mediasift_analyze::{ContentHasher, DuplicateDetector, IntakeResolver};
use mediasift_core::{
    FileCatalog, MediaRecord, Phase, ProgressEvent, ProgressReporter, kind_for_path,
};

fn add_file(catalog: &mut FileCatalog, temp: &TempDir, rel: &str, content: &[u8]) {
    let path = temp.path().join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    catalog.add(MediaRecord::new(
        path.clone(),
        kind_for_path(&path),
        content.len() as u64,
        None,
    ));
}

#[test]
fn test_intake_then_detection_shares_fingerprints() {
    let temp = TempDir::new().unwrap();
    let mut catalog = FileCatalog::new();
    add_file(&mut catalog, &temp, "a/x.jpg", b"shared content");

    // Intake of b/x.jpg (same bytes) caches a/x.jpg's fingerprint.
    let other = temp.path().join("b/x.jpg");
    fs::create_dir_all(other.parent().unwrap()).unwrap();
    fs::write(&other, b"shared content").unwrap();

    let resolver = IntakeResolver::new(ContentHasher::new());
    let decision = resolver.resolve(&[other], &mut catalog);
    assert_eq!(decision.identical, vec!["x.jpg"]);

    let cached = *catalog
        .get(&temp.path().join("a/x.jpg"))
        .unwrap()
        .fingerprint()
        .unwrap();

    // Detection keeps the cached fingerprint instead of recomputing.
    let detector = DuplicateDetector::new(ContentHasher::new());
    let sink = |_ev: ProgressEvent| {};
    let reporter = ProgressReporter::new(Phase::Hash, catalog.len(), &sink);
    detector
        .detect(&mut catalog, &reporter, &CancellationToken::new())
        .unwrap();

    assert_eq!(
        catalog
            .get(&temp.path().join("a/x.jpg"))
            .unwrap()
            .fingerprint(),
        Some(&cached)
    );
}

#[test]
fn test_conflicting_then_fresh_batch() {
    let temp = TempDir::new().unwrap();
    let mut catalog = FileCatalog::new();
    add_file(&mut catalog, &temp, "a/x.jpg", b"version one");

    let conflicting = temp.path().join("b/x.jpg");
    fs::create_dir_all(conflicting.parent().unwrap()).unwrap();
    fs::write(&conflicting, b"version two").unwrap();

    let fresh = temp.path().join("b/y.jpg");
    fs::write(&fresh, b"brand new").unwrap();

    let resolver = IntakeResolver::new(ContentHasher::new());
    let decision = resolver.resolve(&[conflicting.clone(), fresh.clone()], &mut catalog);

    assert_eq!(decision.conflicts.len(), 1);
    assert_eq!(decision.conflicts[0].candidate, conflicting);
    assert_eq!(decision.to_process, vec![fresh]);
}

#[test]
fn test_progress_events_cover_every_record() {
    let temp = TempDir::new().unwrap();
    let mut catalog = FileCatalog::new();
    add_file(&mut catalog, &temp, "a.jpg", b"one");
    add_file(&mut catalog, &temp, "b.jpg", b"two");
    add_file(&mut catalog, &temp, "c.jpg", b"three");

    let events: Mutex<Vec<ProgressEvent>> = Mutex::new(Vec::new());
    let sink = |ev: ProgressEvent| events.lock().unwrap().push(ev);
    let reporter = ProgressReporter::new(Phase::Hash, catalog.len(), &sink);

    DuplicateDetector::sequential(ContentHasher::new())
        .detect(&mut catalog, &reporter, &CancellationToken::new())
        .unwrap();

    let events = events.into_inner().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].index, 1);
    assert_eq!(events[2].index, 3);
    assert_eq!(events[2].percent(), 100);
    let percents: Vec<u8> = events.iter().map(|e| e.percent()).collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
}
