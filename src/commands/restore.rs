//! Restore command - put a backup's files back in place

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::core::{format_size, RunStamp};
use crate::storage::{ArchiveDisposition, AuditLog, RestoreEngine, RestoreSummary};
use crate::ui;

#[derive(Debug)]
pub struct RestoreOutcome {
	pub archive: PathBuf,
	pub summary: RestoreSummary,
	pub disposition: ArchiveDisposition,
}

pub fn run(config: &Config, archive: Option<&str>) -> Result<RestoreOutcome> {
	let engine = RestoreEngine::new(config);

	// Nothing is written until an archive has been found
	let archive = engine.locate(archive)?;
	ui::info(&format!("Backup: {}", ui::path_link(&archive, &archive.display().to_string())));

	let mut audit = AuditLog::create(&config.log_dir, &RunStamp::now())?;
	let summary = engine.restore(&archive, &mut audit)?;

	ui::batch_summary("Restored", summary.restored, summary.failed);
	if summary.restored_bytes > 0 {
		ui::info(&format!("Wrote back {}", format_size(summary.restored_bytes)));
	}

	let disposition = engine.finish(&archive, &mut audit)?;
	match disposition {
		ArchiveDisposition::Preserved => ui::debug("Backup archive kept (use --cleanup to remove it)"),
		ArchiveDisposition::Deleted => ui::info("Backup archive removed"),
		ArchiveDisposition::DeleteFailed => {}
	}
	ui::debug(&format!("Audit log: {}", audit.path().display()));

	Ok(RestoreOutcome { archive, summary, disposition })
}
