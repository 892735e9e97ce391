//! Preview command - report orphans without touching them

use anyhow::Result;

use crate::config::Config;
use crate::core::RunStamp;
use crate::processing::{MediaWalker, ScanReport};
use crate::storage::AuditLog;
use crate::ui;

pub fn run(config: &Config) -> Result<ScanReport> {
	let walker = MediaWalker::open(&config.root)?;
	let mut audit = AuditLog::create(&config.log_dir, &RunStamp::now())?;

	let report = super::scan_library(config, &walker, &mut audit)?;

	if report.has_orphans() {
		ui::info("Dry run, nothing was changed. Use `clean` to back up and remove them");
	}
	ui::debug(&format!("Audit log: {}", audit.path().display()));

	Ok(report)
}
