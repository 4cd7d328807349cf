//! Analysis layer for mediasift.
//!
//! Three components, leaf-first:
//!
//! - [`ContentHasher`] - streaming BLAKE3 fingerprints, the only code that
//!   reads file bytes for identity purposes
//! - [`IntakeResolver`] - classifies candidate paths against the catalog
//!   before anything is loaded (identical / name conflict / new)
//! - [`DuplicateDetector`] - fills in missing fingerprints, groups records
//!   by (kind, fingerprint) and flags every member of a group of 2+
//!
//! ```rust,ignore
//! use mediasift_analyze::{ContentHasher, DuplicateDetector};
//! use mediasift_core::{FileCatalog, Phase, ProgressReporter};
//! use tokio_util::sync::CancellationToken;
//!
//! let detector = DuplicateDetector::new(ContentHasher::new());
//! let sink = |_ev| {};
//! let reporter = ProgressReporter::new(Phase::Hash, catalog.len(), &sink);
//! let summary = detector.detect(&mut catalog, &reporter, &CancellationToken::new())?;
//! println!("{} duplicates in {} groups", summary.duplicate_count, summary.group_count);
//! ```

mod detect;
mod hash;
mod intake;

pub use detect::{DetectSummary, DuplicateDetector, DuplicateGroup, GroupMember};
pub use hash::ContentHasher;
pub use intake::{IntakeDecision, IntakeResolver, NameConflict};

// Re-export core types
pub use mediasift_core::{FileCatalog, Fingerprint, MediaKind, MediaRecord};
