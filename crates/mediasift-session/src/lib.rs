//! Command surface for mediasift.
//!
//! A [`Session`] owns the catalog and the pipeline components and exposes
//! the four commands a UI shell drives: load files, check duplicates,
//! delete duplicates, clear. Each batch command takes a progress sink and
//! a cancellation token and returns an immutable report value.
//!
//! The [`events`] module wraps the same commands in spawned tasks that
//! stream [`events::SessionEvent`]s through a channel, for shells that
//! prefer subscribing over calling.

pub mod events;

use std::fs;
use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use mediasift_analyze::{ContentHasher, DuplicateDetector, DuplicateGroup, IntakeResolver};
use mediasift_core::{
    FileCatalog, FileError, MediaRecord, Phase, ProgressReporter, ProgressSink, Result,
    kind_for_path,
};
use mediasift_ops::DeletionPlanner;

pub use mediasift_analyze::{DetectSummary, IntakeDecision, NameConflict};
pub use mediasift_ops::{DeletionOutcome, DeletionPlan};

/// What to do with candidates whose name collides with a tracked record
/// of different content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConflictPolicy {
    /// Keep the tracked record, drop the candidate.
    #[default]
    Skip,
    /// Remove the tracked record and load the candidate in its place.
    Replace,
}

/// Report for a load batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Records added to the catalog.
    pub added: usize,
    /// Names rejected for an unrecognized extension; never added.
    pub unsupported: Vec<CompactString>,
    /// Names already tracked with identical content (or identical path).
    pub identical: Vec<CompactString>,
    /// Names that collided with different content; resolution depends on
    /// the [`ConflictPolicy`] the batch ran with.
    pub conflicting: Vec<CompactString>,
    /// Per-file metadata failures; those candidates were skipped.
    pub errors: Vec<FileError>,
}

/// Report for a duplicate check.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CheckReport {
    /// Records flagged as duplicates.
    pub duplicate_count: usize,
    /// Number of duplicate groups.
    pub group_count: usize,
    /// Records skipped because their content could not be hashed.
    pub hash_failures: usize,
}

/// Report for a deletion batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteReport {
    /// Files deleted (including targets that had already vanished).
    pub deleted: usize,
    /// Per-file deletion failures; those records stay in the catalog.
    pub errors: Vec<FileError>,
    /// Duplicates still flagged after the post-deletion re-check.
    pub remaining_duplicates: usize,
}

/// Owns the catalog and pipeline components for one user session.
///
/// Operations are not re-entrant; the shell is expected to serialize user
/// actions (one batch at a time), which is why the commands take
/// `&mut self` rather than locking internally.
#[derive(Debug)]
pub struct Session {
    catalog: FileCatalog,
    resolver: IntakeResolver,
    detector: DuplicateDetector,
    planner: DeletionPlanner,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with parallel hashing.
    pub fn new() -> Self {
        let hasher = ContentHasher::new();
        Self {
            catalog: FileCatalog::new(),
            resolver: IntakeResolver::new(hasher),
            detector: DuplicateDetector::new(hasher),
            planner: DeletionPlanner::new(),
        }
    }

    /// Create a session that hashes strictly in catalog order, for callers
    /// that want progress events in file order.
    pub fn with_sequential_hashing() -> Self {
        Self {
            detector: DuplicateDetector::sequential(ContentHasher::new()),
            ..Self::new()
        }
    }

    /// The current catalog, in insertion order.
    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    /// Number of tracked files.
    pub fn file_count(&self) -> usize {
        self.catalog.len()
    }

    /// Resolve and load a batch of candidate paths.
    ///
    /// Candidates run through intake first: already-tracked content is
    /// skipped, name conflicts are settled by `policy`. Surviving
    /// candidates are classified by extension (unsupported kinds are
    /// reported, never added), stat'ed, and added to the catalog. Per-file
    /// failures are reported and do not stop the batch. An empty `paths`
    /// is a no-op.
    pub fn load_files(
        &mut self,
        paths: &[PathBuf],
        policy: ConflictPolicy,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        if paths.is_empty() {
            return Ok(report);
        }

        let decision = self.resolver.resolve(paths, &mut self.catalog);
        report.identical = decision.identical;
        report.conflicting = decision.conflicts.iter().map(|c| c.name.clone()).collect();

        let mut to_process = decision.to_process;
        if policy == ConflictPolicy::Replace {
            for conflict in &decision.conflicts {
                self.catalog.remove(&conflict.existing);
                to_process.push(conflict.candidate.clone());
            }
        }

        let reporter = ProgressReporter::new(Phase::Load, to_process.len(), sink);
        for path in &to_process {
            if cancel.is_cancelled() {
                return Err(mediasift_core::Error::Cancelled);
            }

            let name = path
                .file_name()
                .map(|n| CompactString::from(n.to_string_lossy()))
                .unwrap_or_else(|| CompactString::from(path.to_string_lossy()));

            let kind = kind_for_path(path);
            if !kind.is_media() {
                report.unsupported.push(name.clone());
                reporter.file_done(&name);
                continue;
            }

            match fs::metadata(path) {
                Ok(metadata) => {
                    let record =
                        MediaRecord::new(path.clone(), kind, metadata.len(), metadata.created().ok());
                    if self.catalog.add(record) {
                        report.added += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("load: cannot stat {}: {e}", path.display());
                    report.errors.push(FileError::new(path, e.to_string()));
                }
            }
            reporter.file_done(&name);
        }

        Ok(report)
    }

    /// Run a detection pass over the full catalog.
    pub fn check_duplicates(
        &mut self,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<CheckReport> {
        if self.catalog.is_empty() {
            return Ok(CheckReport::default());
        }

        let reporter = ProgressReporter::new(Phase::Hash, self.catalog.len(), sink);
        let summary = self.detector.detect(&mut self.catalog, &reporter, cancel)?;

        Ok(CheckReport {
            duplicate_count: summary.duplicate_count,
            group_count: summary.group_count,
            hash_failures: summary.hash_failures,
        })
    }

    /// Current duplicate groups, from the flags of the last detection pass.
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        self.detector.groups(&self.catalog)
    }

    /// Preview what a deletion pass would remove, without touching disk.
    pub fn deletion_plan(&self) -> DeletionPlan {
        self.planner.plan(&self.duplicate_groups())
    }

    /// Delete redundant copies, keeping one survivor per group, then
    /// re-run detection so the flags match the new catalog state.
    pub fn delete_duplicates(
        &mut self,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<DeleteReport> {
        let plan = self.deletion_plan();
        if plan.is_empty() {
            return Ok(DeleteReport::default());
        }

        let reporter = ProgressReporter::new(Phase::Delete, plan.len(), sink);
        let outcome = self
            .planner
            .execute(&plan, &mut self.catalog, &reporter, cancel)?;

        // Groups shrink or disappear once copies are gone; refresh flags.
        let remaining_duplicates = if outcome.deleted > 0 {
            let reporter = ProgressReporter::new(Phase::Hash, self.catalog.len(), sink);
            self.detector
                .detect(&mut self.catalog, &reporter, cancel)?
                .duplicate_count
        } else {
            self.catalog.iter().filter(|r| r.is_duplicate).count()
        };

        Ok(DeleteReport {
            deleted: outcome.deleted,
            errors: outcome.errors,
            remaining_duplicates,
        })
    }

    /// Empty the catalog. No filesystem effect.
    pub fn clear_catalog(&mut self) {
        self.catalog.clear();
    }
}
