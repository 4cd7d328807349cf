//! Deletion execution.

use std::fs;
use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use mediasift_core::{Error, FileCatalog, FileError, ProgressReporter, Result};

use crate::plan::{DeletionPlan, DeletionPlanner};

/// Result of executing a deletion plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletionOutcome {
    /// Files removed from disk and from the catalog.
    pub deleted: usize,
    /// Per-file failures; those records stay in the catalog.
    pub errors: Vec<FileError>,
}

impl DeletionOutcome {
    /// Check if every scheduled deletion succeeded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl DeletionPlanner {
    /// Execute a deletion plan against the file system and the catalog.
    ///
    /// Deletions run in plan (group) order. A failed deletion is reported
    /// and skipped, never aborting the rest of the batch; its record stays
    /// in the catalog. A target that already vanished counts as deleted -
    /// the goal state is "file gone", and the record is removed either
    /// way. One progress event per attempt.
    pub fn execute(
        &self,
        plan: &DeletionPlan,
        catalog: &mut FileCatalog,
        reporter: &ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> Result<DeletionOutcome> {
        let mut outcome = DeletionOutcome::default();

        for doomed in &plan.doomed {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            match fs::remove_file(&doomed.path) {
                Ok(()) => {
                    catalog.remove(&doomed.path);
                    outcome.deleted += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("delete: {} already gone", doomed.path.display());
                    catalog.remove(&doomed.path);
                    outcome.deleted += 1;
                }
                Err(e) => {
                    tracing::warn!("delete: cannot remove {}: {e}", doomed.path.display());
                    outcome.errors.push(FileError::new(&doomed.path, e.to_string()));
                }
            }

            reporter.file_done(&doomed.name);
        }

        tracing::debug!(
            deleted = outcome.deleted,
            failed = outcome.errors.len(),
            "deletion batch complete"
        );

        Ok(outcome)
    }
}
