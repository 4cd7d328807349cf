//! Deletion engine for mediasift.
//!
//! Turns duplicate groups into a delete-list that keeps exactly one
//! survivor per group, then executes it with per-file error reporting and
//! progress, keeping the catalog consistent with the file system.

mod delete;
mod plan;

pub use delete::DeletionOutcome;
pub use plan::{DeletionPlan, DeletionPlanner};
