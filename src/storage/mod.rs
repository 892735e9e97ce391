//! Backup archives, restore and the audit log

pub mod archive;
pub mod audit;
pub mod manifest;
pub mod restore;

pub use archive::{BackupArchiver, BackupArtifact};
pub use audit::{AuditEntry, AuditLog, Operation, Status};
pub use manifest::{BackupManifest, ManifestEntry};
pub use restore::{ArchiveDisposition, RestoreEngine, RestoreSummary};
