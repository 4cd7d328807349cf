//! Intake resolution: the gatekeeper before anything enters the catalog.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use mediasift_core::{FileCatalog, Fingerprint, Result};

use crate::hash::ContentHasher;

/// A candidate whose file name collides with a tracked record of
/// different content. The caller decides: replace the existing record or
/// skip the candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameConflict {
    /// The colliding file name.
    pub name: CompactString,
    /// Path of the record already in the catalog.
    pub existing: PathBuf,
    /// Path of the incoming candidate.
    pub candidate: PathBuf,
}

/// Classification of a batch of candidate paths. Transient, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeDecision {
    /// Names already tracked with the same content (or the same path);
    /// nothing to do for these.
    pub identical: Vec<CompactString>,
    /// Name collisions with differing content, awaiting a caller decision.
    pub conflicts: Vec<NameConflict>,
    /// Genuinely new paths, cleared for loading.
    pub to_process: Vec<PathBuf>,
}

impl IntakeDecision {
    /// Check if any candidate was classified as already present.
    pub fn has_identical(&self) -> bool {
        !self.identical.is_empty()
    }

    /// Check if any candidate conflicts with a tracked record.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Classifies candidate paths against the current catalog.
///
/// Fingerprints computed while comparing colliding files are written back
/// to the existing record (set-once), so a later detection pass does not
/// hash the same file again.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeResolver {
    hasher: ContentHasher,
}

impl IntakeResolver {
    /// Create a resolver using the given hasher.
    pub fn new(hasher: ContentHasher) -> Self {
        Self { hasher }
    }

    /// Classify each candidate as identical, conflicting, or new.
    ///
    /// A hash failure on either side of a name collision classifies the
    /// candidate as conflicting: content equality cannot be proven, so the
    /// caller gets to decide, and the batch continues.
    pub fn resolve(&self, candidates: &[PathBuf], catalog: &mut FileCatalog) -> IntakeDecision {
        let mut decision = IntakeDecision::default();

        for candidate in candidates {
            let name = file_name_of(candidate);

            let Some(existing) = catalog.find_by_name(&name).map(|r| r.path.clone()) else {
                decision.to_process.push(candidate.clone());
                continue;
            };

            // The exact same file is already tracked; no hashing needed.
            if existing == *candidate {
                decision.identical.push(name);
                continue;
            }

            let existing_fp = match self.ensure_fingerprint(catalog, &existing) {
                Ok(fp) => fp,
                Err(e) => {
                    tracing::warn!("intake: cannot hash tracked file {}: {e}", existing.display());
                    decision.conflicts.push(NameConflict {
                        name,
                        existing,
                        candidate: candidate.clone(),
                    });
                    continue;
                }
            };

            let candidate_fp = match self.hasher.hash(candidate) {
                Ok(fp) => fp,
                Err(e) => {
                    tracing::warn!("intake: cannot hash candidate {}: {e}", candidate.display());
                    decision.conflicts.push(NameConflict {
                        name,
                        existing,
                        candidate: candidate.clone(),
                    });
                    continue;
                }
            };

            if existing_fp == candidate_fp {
                // Same content at a different location: treat as already present.
                decision.identical.push(name);
            } else {
                decision.conflicts.push(NameConflict {
                    name,
                    existing,
                    candidate: candidate.clone(),
                });
            }
        }

        decision
    }

    /// Get the fingerprint of a tracked record, computing and caching it
    /// on the record when absent.
    fn ensure_fingerprint(&self, catalog: &mut FileCatalog, path: &Path) -> Result<Fingerprint> {
        if let Some(fp) = catalog.get(path).and_then(|r| r.fingerprint().copied()) {
            return Ok(fp);
        }

        let fp = self.hasher.hash(path)?;
        if let Some(record) = catalog.get_mut(path) {
            record.set_fingerprint(fp);
        }
        Ok(fp)
    }
}

/// File name of a path as a `CompactString`, tolerating non-UTF-8 names.
pub(crate) fn file_name_of(path: &Path) -> CompactString {
    path.file_name()
        .map(|n| CompactString::from(n.to_string_lossy()))
        .unwrap_or_else(|| CompactString::from(path.to_string_lossy()))
}
