//! Core types and traits for mediasift.
//!
//! This crate provides the fundamental data structures shared by the
//! mediasift pipeline: media records, the in-memory catalog, extension
//! based classification, and progress reporting plumbing.

mod catalog;
pub mod classify;
mod error;
mod progress;
mod record;

pub use catalog::FileCatalog;
pub use classify::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS, is_media_path, kind_for_path};
pub use error::{Error, FileError, Result};
pub use progress::{NullSink, Phase, ProgressEvent, ProgressReporter, ProgressSink};
pub use record::{Fingerprint, MediaKind, MediaRecord};
