//! Error types for scanning, backup and restore

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
	#[error("scan root '{}' is not accessible: {source}", .path.display())]
	ScanRoot { path: PathBuf, source: io::Error },

	#[error("cannot read directory '{}': {source}", .path.display())]
	ScanDirectory { path: PathBuf, source: io::Error },

	#[error("cannot list '{}' to resolve parents: {source}", .path.display())]
	SiblingLookup { path: PathBuf, source: io::Error },

	#[error("failed to stage '{}' for backup: {reason}", .path.display())]
	BackupStaging { path: PathBuf, reason: String },

	#[error("failed to write backup archive '{}': {source}", .path.display())]
	ArchiveWrite { path: PathBuf, source: io::Error },

	#[error("backup archive '{}' is unreadable: {reason}", .path.display())]
	ArchiveFormat { path: PathBuf, reason: String },

	#[error("{0}")]
	ArchiveLocate(String),

	#[error("failed to delete '{}': {source}", .path.display())]
	FileDelete { path: PathBuf, source: io::Error },

	#[error("failed to restore '{relative_path}': {reason}")]
	FileRestore { relative_path: String, reason: String },

	#[error("audit log '{}': {source}", .path.display())]
	AuditLog { path: PathBuf, source: csv::Error },
}

impl SweepError {
	pub fn staging(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
		Self::BackupStaging { path: path.into(), reason: reason.to_string() }
	}

	pub fn archive_format(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
		Self::ArchiveFormat { path: path.into(), reason: reason.to_string() }
	}

	pub fn audit(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
		Self::AuditLog { path: path.into(), source: source.into() }
	}
}

pub type Result<T> = std::result::Result<T, SweepError>;
