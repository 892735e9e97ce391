//! # Command Implementations
//!
//! Each submodule handles one CLI command (preview, clean, restore).

pub mod clean;
pub mod preview;
pub mod restore;

use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::config::Config;
use crate::core::format_size;
use crate::processing::{MediaWalker, OrphanDetector, ScanReport};
use crate::storage::{AuditEntry, AuditLog, Operation, Status};
use crate::ui;

/// Detect orphans, record them in the audit log and print the report
pub(crate) fn scan_library(config: &Config, walker: &MediaWalker, audit: &mut AuditLog) -> Result<ScanReport> {
	ui::info(&format!("Scanning: {}", config.root.display()));
	let start = Instant::now();

	let report = OrphanDetector::new(config).scan(walker);

	for orphan in &report.orphans {
		audit.record(AuditEntry::for_orphan(Operation::OrphanFound, Status::Found, orphan))?;
	}
	audit.record(
		AuditEntry::new(Operation::ScanComplete, Status::Success)
			.path(config.root.display())
			.size(report.total_size)
			.error(format!("{} scanned, {} orphans", report.scanned, report.orphan_count())),
	)?;

	print_report(&report, start.elapsed().as_secs_f32());
	Ok(report)
}

fn print_report(report: &ScanReport, seconds: f32) {
	ui::debug(&format!(
		"{} images, {} variants checked in {:.2}s",
		report.scanned, report.classified, seconds
	));

	if !report.lookup_failures.is_empty() {
		ui::warn(&format!(
			"{} directories could not be listed while resolving parents",
			report.lookup_failures.len()
		));
		for dir in &report.lookup_failures {
			ui::debug(&format!("Unlisted: {}", dir.display()));
		}
	}

	if !report.has_orphans() {
		ui::success(&format!("No orphaned variants among {} images", report.scanned));
		return;
	}

	ui::header("─── Orphans ───");
	for orphan in &report.orphans {
		ui::orphan_line(
			&orphan.path,
			&orphan.relative_path,
			&orphan.dimension_tag,
			&format_size(orphan.size),
		);
	}
	println!();
	ui::warn(&format!(
		"Found {} orphaned variants ({})",
		report.orphan_count().to_string().bold(),
		format_size(report.total_size)
	));
}
