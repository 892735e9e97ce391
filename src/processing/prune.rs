//! Delete pass over backed-up orphans

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, SweepError};
use crate::processing::detect::{OrphanDetector, OrphanRecord};
use crate::storage::audit::{AuditEntry, AuditLog, Operation, Status};
use crate::ui;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeleteSummary {
	pub deleted: usize,
	pub failed: usize,
	pub freed_bytes: u64,
}

/// Remove each record independently. Only audit-log failures stop the batch.
///
/// Every record is re-checked against its directory right before removal, so a
/// parent that reappeared after the scan keeps its variants.
pub fn delete_orphans(
	records: &[OrphanRecord],
	detector: &OrphanDetector,
	audit: &mut AuditLog,
) -> Result<DeleteSummary> {
	delete_with(records, detector, audit, |path| fs::remove_file(path))
}

fn delete_with<F>(
	records: &[OrphanRecord],
	detector: &OrphanDetector,
	audit: &mut AuditLog,
	mut remove: F,
) -> Result<DeleteSummary>
where
	F: FnMut(&Path) -> io::Result<()>,
{
	let mut summary = DeleteSummary::default();

	for record in records {
		match delete_one(record, detector, &mut remove) {
			Ok(()) => {
				summary.deleted += 1;
				summary.freed_bytes += record.size;
				ui::debug(&format!("Deleted: {}", record.relative_path));
				audit.record(AuditEntry::for_orphan(Operation::FileDeleted, Status::Success, record))?;
			}
			Err(err) => {
				summary.failed += 1;
				ui::error(&err.to_string());
				audit.record(
					AuditEntry::for_orphan(Operation::FileDeleteFailed, Status::Error, record).error(&err),
				)?;
			}
		}
	}

	audit.record(
		AuditEntry::new(Operation::DeleteSummary, Status::Success)
			.size(summary.freed_bytes)
			.error(format!("{} deleted, {} failed", summary.deleted, summary.failed)),
	)?;
	Ok(summary)
}

fn delete_one<F>(record: &OrphanRecord, detector: &OrphanDetector, remove: &mut F) -> Result<()>
where
	F: FnMut(&Path) -> io::Result<()>,
{
	if !detector.confirm(record)? {
		return Err(SweepError::FileDelete {
			path: record.path.clone(),
			source: io::Error::other("no longer an orphan, left in place"),
		});
	}
	remove(&record.path).map_err(|source| SweepError::FileDelete {
		path: record.path.clone(),
		source,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Config;
	use crate::core::RunStamp;
	use crate::processing::MediaWalker;
	use tempfile::tempdir;

	#[test]
	fn one_failure_does_not_stop_the_batch() {
		let dir = tempdir().unwrap();
		let month = dir.path().join("2024/05");
		fs::create_dir_all(&month).unwrap();
		for name in ["a-10x10.jpg", "b-10x10.jpg", "c-10x10.jpg"] {
			fs::write(month.join(name), b"12345").unwrap();
		}

		let config = Config::new(dir.path());
		let walker = MediaWalker::open(dir.path()).unwrap();
		let detector = OrphanDetector::new(&config);
		let report = detector.scan(&walker);
		assert_eq!(report.orphan_count(), 3);

		// b cannot be removed as a file any more
		fs::remove_file(month.join("b-10x10.jpg")).unwrap();
		fs::create_dir(month.join("b-10x10.jpg")).unwrap();
		fs::write(month.join("b-10x10.jpg/keep"), b"x").unwrap();

		let mut audit = AuditLog::create(&config.log_dir, &RunStamp::now()).unwrap();
		let summary = delete_orphans(&report.orphans, &detector, &mut audit).unwrap();

		assert_eq!(summary, DeleteSummary { deleted: 2, failed: 1, freed_bytes: 10 });
		assert!(!month.join("a-10x10.jpg").exists());
		assert!(!month.join("c-10x10.jpg").exists());

		let rows = AuditLog::read(audit.path()).unwrap();
		let ops: Vec<_> = rows.iter().map(|r| r.operation).collect();
		assert_eq!(
			ops,
			vec![
				Operation::FileDeleted,
				Operation::FileDeleteFailed,
				Operation::FileDeleted,
				Operation::DeleteSummary
			]
		);
	}

	#[test]
	fn reappeared_parent_blocks_deletion() {
		let dir = tempdir().unwrap();
		let month = dir.path().join("2024/05");
		fs::create_dir_all(&month).unwrap();
		fs::write(month.join("photo-300x200.jpg"), b"v").unwrap();

		let config = Config::new(dir.path());
		let walker = MediaWalker::open(dir.path()).unwrap();
		let detector = OrphanDetector::new(&config);
		let report = detector.scan(&walker);

		fs::write(month.join("photo.jpg"), b"original").unwrap();

		let mut audit = AuditLog::create(&config.log_dir, &RunStamp::now()).unwrap();
		let summary = delete_orphans(&report.orphans, &detector, &mut audit).unwrap();
		assert_eq!(summary.deleted, 0);
		assert_eq!(summary.failed, 1);
		assert!(month.join("photo-300x200.jpg").exists());
	}

	#[test]
	fn removal_error_after_confirmation_is_recorded() {
		let dir = tempdir().unwrap();
		let month = dir.path().join("2024/05");
		fs::create_dir_all(&month).unwrap();
		for name in ["a-10x10.jpg", "b-10x10.jpg", "c-10x10.jpg"] {
			fs::write(month.join(name), b"12345").unwrap();
		}

		let config = Config::new(dir.path());
		let walker = MediaWalker::open(dir.path()).unwrap();
		let detector = OrphanDetector::new(&config);
		let report = detector.scan(&walker);

		// b vanishes between confirmation and unlink
		let contested = month.join("b-10x10.jpg");
		let mut audit = AuditLog::create(&config.log_dir, &RunStamp::now()).unwrap();
		let summary = delete_with(&report.orphans, &detector, &mut audit, |path| {
			if path == contested {
				fs::remove_file(path)?;
			}
			fs::remove_file(path)
		})
		.unwrap();

		assert_eq!(summary, DeleteSummary { deleted: 2, failed: 1, freed_bytes: 10 });

		let rows = AuditLog::read(audit.path()).unwrap();
		let failed: Vec<_> = rows.iter().filter(|r| r.operation == Operation::FileDeleteFailed).collect();
		assert_eq!(failed.len(), 1);
		assert_eq!(failed[0].file_path, contested.display().to_string());
		assert_eq!(failed[0].status, Status::Error);
		assert!(failed[0].error_message.starts_with("failed to delete"));
		assert!(!failed[0].error_message.contains("no longer an orphan"));
	}
}
