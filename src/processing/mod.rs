//! Media library scanning and orphan removal

pub mod detect;
pub mod prune;
pub mod walk;

pub use detect::{OrphanDetector, OrphanRecord, ScanReport};
pub use prune::{delete_orphans, DeleteSummary};
pub use walk::MediaWalker;
