//! Clean command - back up orphaned variants, then remove them

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::Config;
use crate::core::{format_size, RunStamp};
use crate::processing::{delete_orphans, DeleteSummary, MediaWalker, OrphanDetector, ScanReport};
use crate::storage::{AuditEntry, AuditLog, BackupArchiver, Operation, Status};
use crate::ui;

#[derive(Debug)]
pub struct CleanSummary {
	pub report: ScanReport,
	pub archive: PathBuf,
	pub deleted: DeleteSummary,
	pub staging_removed: bool,
}

#[derive(Debug)]
pub enum CleanOutcome {
	NothingToClean(ScanReport),
	Cancelled(ScanReport),
	Cleaned(CleanSummary),
}

pub fn run(config: &Config, auto_confirm: bool) -> Result<CleanOutcome> {
	let stamp = RunStamp::now();
	let walker = MediaWalker::open(&config.root)?;
	let mut audit = AuditLog::create(&config.log_dir, &stamp)?;

	let report = super::scan_library(config, &walker, &mut audit)?;
	if !report.has_orphans() {
		return Ok(CleanOutcome::NothingToClean(report));
	}

	if !auto_confirm && !confirm(report.orphan_count())? {
		ui::info("Cancelled");
		return Ok(CleanOutcome::Cancelled(report));
	}

	ui::info("Creating backup...");
	let archiver = BackupArchiver::new(config);
	let artifact = match archiver.create(&report.orphans, &stamp) {
		Ok(artifact) => artifact,
		Err(err) => {
			audit.record(
				AuditEntry::new(Operation::BackupCreated, Status::Error)
					.path(archiver.archive_path(&stamp).display())
					.error(&err),
			)?;
			ui::error("Backup failed, no files were deleted");
			return Err(err.into());
		}
	};

	let archive = fs::canonicalize(&artifact.archive_path).unwrap_or_else(|_| artifact.archive_path.clone());
	audit.record(
		AuditEntry::new(Operation::BackupCreated, Status::Success)
			.path(archive.display())
			.size(artifact.manifest.total_size),
	)?;
	ui::success(&format!(
		"Backed up {} files ({}) to {}",
		artifact.manifest.file_count,
		format_size(artifact.manifest.total_size),
		ui::path_link(&archive, &archive.display().to_string())
	));

	let detector = OrphanDetector::new(config);
	let deleted = delete_orphans(&report.orphans, &detector, &mut audit).context("Delete pass aborted")?;
	ui::batch_summary("Deleted", deleted.deleted, deleted.failed);
	if deleted.freed_bytes > 0 {
		ui::info(&format!("Freed {}", format_size(deleted.freed_bytes)));
	}

	let staging_removed = if config.cleanup {
		match archiver.discard_staging(&artifact) {
			Ok(()) => {
				audit.record(
					AuditEntry::new(Operation::BackupDeleted, Status::Success).path(artifact.staging_dir.display()),
				)?;
				true
			}
			Err(e) => {
				ui::warn(&format!("Failed to remove staging directory: {}", e));
				audit.record(
					AuditEntry::new(Operation::BackupDeleteFailed, Status::Error)
						.path(artifact.staging_dir.display())
						.error(&e),
				)?;
				false
			}
		}
	} else {
		audit.record(
			AuditEntry::new(Operation::BackupPreserved, Status::Success).path(artifact.staging_dir.display()),
		)?;
		ui::debug(&format!("Staging kept at {}", artifact.staging_dir.display()));
		false
	};

	ui::debug(&format!("Audit log: {}", audit.path().display()));

	Ok(CleanOutcome::Cleaned(CleanSummary {
		report,
		archive,
		deleted,
		staging_removed,
	}))
}

fn confirm(count: usize) -> Result<bool> {
	print!("\nBack up and delete {} files? [y/N]: ", count);
	io::stdout().flush()?;

	let mut input = String::new();
	io::stdin().read_line(&mut input)?;

	Ok(input.trim().eq_ignore_ascii_case("y"))
}
