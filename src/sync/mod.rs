//! Download planning and reconciliation module

pub mod downloader;
pub mod engine;
pub mod errors;
pub mod format;
pub mod planner;
pub mod report;
pub mod size;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{SyncEngine, SyncOptions};
pub use errors::TransferError;
pub use format::FormatMode;
pub use report::TracingReporter;
pub use source::select_best_source;
