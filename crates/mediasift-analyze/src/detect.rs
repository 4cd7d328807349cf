//! Duplicate detection over the catalog.

use std::path::PathBuf;

use compact_str::CompactString;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use mediasift_core::{Error, FileCatalog, Fingerprint, MediaKind, ProgressReporter, Result};

use crate::hash::ContentHasher;

/// A lightweight snapshot of one group member, in catalog order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    /// Full path of the member.
    pub path: PathBuf,
    /// File name, for display and progress labels.
    pub name: CompactString,
    /// Byte size at load time; drives survivor selection.
    pub size: u64,
}

/// A set of records sharing (kind, fingerprint), size 2+.
///
/// Transient: recomputed on each detection pass, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Kind shared by all members.
    pub kind: MediaKind,
    /// Content fingerprint shared by all members.
    pub fingerprint: Fingerprint,
    /// Members in catalog (insertion) order.
    pub members: Vec<GroupMember>,
}

impl DuplicateGroup {
    /// Number of members in the group.
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// How many members could be deleted while keeping one survivor.
    pub fn redundant_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }
}

/// Outcome of one detection pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DetectSummary {
    /// Records flagged as duplicates.
    pub duplicate_count: usize,
    /// Number of duplicate groups.
    pub group_count: usize,
    /// Records whose content could not be hashed this pass. They keep an
    /// empty fingerprint, sit out of grouping, and are retried next pass.
    pub hash_failures: usize,
}

/// Ensures fingerprints, groups records by (kind, fingerprint), and flags
/// every member of a group of 2+.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateDetector {
    hasher: ContentHasher,
    parallel: bool,
}

impl DuplicateDetector {
    /// Create a detector that hashes independent files in parallel.
    pub fn new(hasher: ContentHasher) -> Self {
        Self {
            hasher,
            parallel: true,
        }
    }

    /// Create a detector that hashes strictly in catalog order. Progress
    /// events then arrive in file order as well.
    pub fn sequential(hasher: ContentHasher) -> Self {
        Self {
            hasher,
            parallel: false,
        }
    }

    /// Run one detection pass over the whole catalog.
    ///
    /// Every record gets a fresh `is_duplicate` verdict. Records without a
    /// fingerprint are hashed; a failure for one file never aborts the
    /// batch, it just leaves that record out of grouping for this pass.
    /// One progress event is emitted per record, so callers should size
    /// the reporter with `catalog.len()`.
    pub fn detect(
        &self,
        catalog: &mut FileCatalog,
        reporter: &ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> Result<DetectSummary> {
        for record in catalog.iter_mut() {
            record.is_duplicate = false;
        }

        let pending: Vec<(PathBuf, CompactString)> = catalog
            .iter()
            .filter(|r| !r.has_fingerprint())
            .map(|r| (r.path.clone(), r.name.clone()))
            .collect();

        // Already-fingerprinted records count toward progress immediately.
        for record in catalog.iter().filter(|r| r.has_fingerprint()) {
            reporter.file_done(&record.name);
        }

        let hashed = self.hash_pending(&pending, reporter, cancel)?;

        let mut hash_failures = 0usize;
        for (path, outcome) in hashed {
            match outcome {
                Ok(fp) => {
                    if let Some(record) = catalog.get_mut(&path) {
                        record.set_fingerprint(fp);
                    }
                }
                Err(e) => {
                    tracing::warn!("detect: cannot hash {}: {e}", path.display());
                    hash_failures += 1;
                }
            }
        }

        // Group by (kind, fingerprint), ignoring records without one.
        let mut groups: IndexMap<(MediaKind, Fingerprint), Vec<PathBuf>> = IndexMap::new();
        for record in catalog.iter() {
            if let Some(fp) = record.fingerprint() {
                groups
                    .entry((record.kind, *fp))
                    .or_default()
                    .push(record.path.clone());
            }
        }

        let mut duplicate_count = 0usize;
        let mut group_count = 0usize;
        for paths in groups.values().filter(|p| p.len() >= 2) {
            group_count += 1;
            duplicate_count += paths.len();
            for path in paths {
                if let Some(record) = catalog.get_mut(path) {
                    record.is_duplicate = true;
                }
            }
        }

        tracing::debug!(
            duplicates = duplicate_count,
            groups = group_count,
            failures = hash_failures,
            "detection pass complete"
        );

        Ok(DetectSummary {
            duplicate_count,
            group_count,
            hash_failures,
        })
    }

    /// Build the current duplicate groups from flagged records.
    ///
    /// Groups appear in first-seen catalog order and members in catalog
    /// order, which makes the deletion survivor tie-break stable across
    /// repeated runs on the same input.
    pub fn groups(&self, catalog: &FileCatalog) -> Vec<DuplicateGroup> {
        let mut by_key: IndexMap<(MediaKind, Fingerprint), Vec<GroupMember>> = IndexMap::new();

        for record in catalog.iter() {
            if !record.is_duplicate {
                continue;
            }
            let Some(fp) = record.fingerprint() else {
                continue;
            };
            by_key
                .entry((record.kind, *fp))
                .or_default()
                .push(GroupMember {
                    path: record.path.clone(),
                    name: record.name.clone(),
                    size: record.size,
                });
        }

        by_key
            .into_iter()
            .filter(|(_, members)| members.len() >= 2)
            .map(|((kind, fingerprint), members)| DuplicateGroup {
                kind,
                fingerprint,
                members,
            })
            .collect()
    }

    /// Hash all pending files, reporting each attempt.
    ///
    /// Fingerprints are applied to the catalog only after the whole batch
    /// resolves, so a cancelled run never leaves a record half-mutated.
    fn hash_pending(
        &self,
        pending: &[(PathBuf, CompactString)],
        reporter: &ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<(PathBuf, Result<Fingerprint>)>> {
        let results: Vec<(PathBuf, Result<Fingerprint>)> = if self.parallel {
            pending
                .par_iter()
                .map(|(path, name)| {
                    if cancel.is_cancelled() {
                        return (path.clone(), Err(Error::Cancelled));
                    }
                    let outcome = self.hasher.hash(path);
                    reporter.file_done(name);
                    (path.clone(), outcome)
                })
                .collect()
        } else {
            let mut out = Vec::with_capacity(pending.len());
            for (path, name) in pending {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let outcome = self.hasher.hash(path);
                reporter.file_done(name);
                out.push((path.clone(), outcome));
            }
            out
        };

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediasift_core::{MediaRecord, NullSink, Phase};
    use std::fs;
    use tempfile::TempDir;

    fn load_dir(paths: &[(&str, &[u8])], temp: &TempDir) -> FileCatalog {
        let mut catalog = FileCatalog::new();
        for (name, content) in paths {
            let path = temp.path().join(name);
            fs::write(&path, content).unwrap();
            let kind = mediasift_core::kind_for_path(&path);
            catalog.add(MediaRecord::new(path, kind, content.len() as u64, None));
        }
        catalog
    }

    fn run_detect(detector: &DuplicateDetector, catalog: &mut FileCatalog) -> DetectSummary {
        let reporter = ProgressReporter::new(Phase::Hash, catalog.len(), &NullSink);
        detector
            .detect(catalog, &reporter, &CancellationToken::new())
            .unwrap()
    }

    #[test]
    fn test_identical_content_grouped() {
        let temp = TempDir::new().unwrap();
        let mut catalog = load_dir(
            &[
                ("a.jpg", b"same bytes"),
                ("b.jpg", b"same bytes"),
                ("c.jpg", b"unique bytes twice as big"),
            ],
            &temp,
        );

        let detector = DuplicateDetector::new(ContentHasher::new());
        let summary = run_detect(&detector, &mut catalog);

        assert_eq!(summary.duplicate_count, 2);
        assert_eq!(summary.group_count, 1);
        assert_eq!(summary.hash_failures, 0);

        let groups = detector.groups(&catalog);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count(), 2);
        assert_eq!(groups[0].redundant_count(), 1);
    }

    #[test]
    fn test_same_content_different_kind_not_grouped() {
        let temp = TempDir::new().unwrap();
        let mut catalog = load_dir(&[("a.jpg", b"payload"), ("a.mp4", b"payload")], &temp);

        let detector = DuplicateDetector::sequential(ContentHasher::new());
        let summary = run_detect(&detector, &mut catalog);

        assert_eq!(summary.duplicate_count, 0);
        assert_eq!(summary.group_count, 0);
    }

    #[test]
    fn test_hash_failure_excluded_but_batch_continues() {
        let temp = TempDir::new().unwrap();
        let mut catalog = load_dir(&[("a.jpg", b"same"), ("b.jpg", b"same")], &temp);
        // A tracked file that no longer exists on disk.
        catalog.add(MediaRecord::new(
            temp.path().join("ghost.jpg"),
            MediaKind::Image,
            4,
            None,
        ));

        let detector = DuplicateDetector::sequential(ContentHasher::new());
        let summary = run_detect(&detector, &mut catalog);

        assert_eq!(summary.hash_failures, 1);
        assert_eq!(summary.duplicate_count, 2);

        let ghost = catalog.get(&temp.path().join("ghost.jpg")).unwrap();
        assert!(!ghost.has_fingerprint());
        assert!(!ghost.is_duplicate);
    }

    #[test]
    fn test_redetection_keeps_fingerprints_and_refreshes_flags() {
        let temp = TempDir::new().unwrap();
        let mut catalog = load_dir(&[("a.jpg", b"same"), ("b.jpg", b"same")], &temp);

        let detector = DuplicateDetector::new(ContentHasher::new());
        run_detect(&detector, &mut catalog);

        let before: Vec<Fingerprint> = catalog
            .iter()
            .map(|r| *r.fingerprint().unwrap())
            .collect();

        // Drop one copy and re-run: flags clear, fingerprints untouched.
        catalog.remove(&temp.path().join("b.jpg"));
        let summary = run_detect(&detector, &mut catalog);

        assert_eq!(summary.duplicate_count, 0);
        let survivor = catalog.get(&temp.path().join("a.jpg")).unwrap();
        assert!(!survivor.is_duplicate);
        assert_eq!(survivor.fingerprint(), Some(&before[0]));
    }

    #[test]
    fn test_cancelled_before_hashing() {
        let temp = TempDir::new().unwrap();
        let mut catalog = load_dir(&[("a.jpg", b"one"), ("b.jpg", b"two")], &temp);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let detector = DuplicateDetector::sequential(ContentHasher::new());
        let reporter = ProgressReporter::new(Phase::Hash, catalog.len(), &NullSink);
        let err = detector.detect(&mut catalog, &reporter, &cancel).unwrap_err();
        assert!(matches!(err, Error::Cancelled));

        // No fingerprint was applied mid-flight.
        assert!(catalog.iter().all(|r| !r.has_fingerprint()));
    }
}
