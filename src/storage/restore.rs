//! Restore: replay a backup archive's manifest onto the media tree

use flate2::bufread::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tar::Archive;
use tempfile::NamedTempFile;

use crate::config::{Config, ARCHIVE_EXT, ARCHIVE_PREFIX, MANIFEST_NAME};
use crate::core::format_size;
use crate::error::{Result, SweepError};
use crate::storage::audit::{list_logs, AuditEntry, AuditLog, Operation, Status};
use crate::storage::manifest::{BackupManifest, ManifestEntry};
use crate::ui;

/// Name prefix of the temporary extraction directory
pub const EXTRACT_PREFIX: &str = "thumbsweep-restore-";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
	pub restored: usize,
	pub failed: usize,
	pub restored_bytes: u64,
}

/// What happened to the source archive after a restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveDisposition {
	Preserved,
	Deleted,
	DeleteFailed,
}

pub struct RestoreEngine<'a> {
	config: &'a Config,
}

impl<'a> RestoreEngine<'a> {
	pub fn new(config: &'a Config) -> Self {
		Self { config }
	}

	/// Resolve an archive by name/path, or the newest one recorded in the audit logs.
	///
	/// Touches nothing on disk.
	pub fn locate(&self, name: Option<&str>) -> Result<PathBuf> {
		match name {
			Some(name) => self.locate_named(name),
			None => self.locate_latest(),
		}
	}

	fn locate_named(&self, name: &str) -> Result<PathBuf> {
		let backup_dir = &self.config.backup_dir;
		let candidates = [
			PathBuf::from(name),
			backup_dir.join(name),
			backup_dir.join(format!("{}.{}", name, ARCHIVE_EXT)),
			backup_dir.join(format!("{}{}.{}", ARCHIVE_PREFIX, name, ARCHIVE_EXT)),
		];

		candidates.into_iter().find(|p| p.is_file()).ok_or_else(|| {
			SweepError::ArchiveLocate(format!(
				"Backup archive '{}' not found in {}",
				name,
				backup_dir.display()
			))
		})
	}

	/// Walk audit logs newest first and take the first archive still on disk
	fn locate_latest(&self) -> Result<PathBuf> {
		for (stamp, log) in list_logs(&self.config.log_dir) {
			let rows = match AuditLog::read(&log) {
				Ok(rows) => rows,
				Err(err) => {
					ui::debug(&format!("Skipping unreadable log: {}", err));
					continue;
				}
			};

			let created = rows
				.iter()
				.rev()
				.find(|r| r.operation == Operation::BackupCreated && r.status == Status::Success);
			let Some(row) = created else { continue };

			let archive = PathBuf::from(&row.file_path);
			if archive.is_file() {
				ui::debug(&format!("Using backup from run {}", stamp));
				return Ok(archive);
			}
			ui::debug(&format!("Backup from run {} is gone: {}", stamp, archive.display()));
		}

		Err(SweepError::ArchiveLocate(format!(
			"No backup archive found via logs in {}; run `clean` first or name an archive",
			self.config.log_dir.display()
		)))
	}

	/// Extract `archive` to a temporary directory and copy every manifest entry
	/// back under the root. Per-entry failures are recorded and skipped.
	pub fn restore(&self, archive: &Path, audit: &mut AuditLog) -> Result<RestoreSummary> {
		audit.record(AuditEntry::new(Operation::RestoreStart, Status::Success).path(archive.display()))?;

		// Extract next to the archive so leftovers stay with the backups
		let parent = archive
			.parent()
			.filter(|p| !p.as_os_str().is_empty())
			.unwrap_or(Path::new("."));
		let extracted = tempfile::Builder::new()
			.prefix(EXTRACT_PREFIX)
			.tempdir_in(parent)
			.map_err(|e| SweepError::archive_format(archive, format!("cannot create extraction directory: {}", e)))?;

		// `extracted` is removed on drop, whichever way this returns
		unpack(archive, extracted.path())?;
		let manifest = BackupManifest::load(&extracted.path().join(MANIFEST_NAME))
			.map_err(|e| SweepError::archive_format(archive, format!("{:#}", e)))?;

		ui::info(&format!(
			"Restoring {} files ({}) from {}",
			manifest.file_count,
			format_size(manifest.total_size),
			archive.display()
		));

		let mut summary = RestoreSummary::default();
		for entry in &manifest.files {
			let row = AuditEntry::new(Operation::FileRestored, Status::Success)
				.path(self.config.root.join(&entry.relative_path).display())
				.size(entry.size)
				.variant(&entry.dimensions, &entry.base_name);

			match self.replay(entry, extracted.path()) {
				Ok(bytes) => {
					summary.restored += 1;
					summary.restored_bytes += bytes;
					ui::debug(&format!("Restored: {}", entry.relative_path));
					audit.record(row)?;
				}
				Err(err) => {
					summary.failed += 1;
					ui::error(&err.to_string());
					audit.record(AuditEntry {
						operation: Operation::FileRestoreFailed,
						status: Status::Error,
						..row.error(&err)
					})?;
				}
			}
		}

		if let Err(e) = extracted.close() {
			ui::warn(&format!("Failed to remove extraction directory: {}", e));
		}

		audit.record(
			AuditEntry::new(Operation::RestoreComplete, Status::Success)
				.path(archive.display())
				.size(summary.restored_bytes)
				.error(format!("{} restored, {} failed", summary.restored, summary.failed)),
		)?;
		Ok(summary)
	}

	fn replay(&self, entry: &ManifestEntry, extracted: &Path) -> Result<u64> {
		let fail = |reason: String| SweepError::FileRestore {
			relative_path: entry.relative_path.clone(),
			reason,
		};

		let relative = entry
			.safe_relative_path()
			.ok_or_else(|| fail("path escapes the media root".to_string()))?;
		let source = extracted.join(&relative);
		let target = self.config.root.join(&relative);

		copy_atomic(&source, &target, entry.size).map_err(|e| fail(e.to_string()))?;
		Ok(entry.size)
	}

	/// Keep or delete the source archive, depending on `Config::cleanup`
	pub fn finish(&self, archive: &Path, audit: &mut AuditLog) -> Result<ArchiveDisposition> {
		if !self.config.cleanup {
			audit.record(AuditEntry::new(Operation::BackupPreserved, Status::Success).path(archive.display()))?;
			return Ok(ArchiveDisposition::Preserved);
		}

		match fs::remove_file(archive) {
			Ok(()) => {
				audit.record(AuditEntry::new(Operation::BackupDeleted, Status::Success).path(archive.display()))?;
				Ok(ArchiveDisposition::Deleted)
			}
			Err(e) => {
				ui::warn(&format!("Failed to delete {}: {}", archive.display(), e));
				audit.record(
					AuditEntry::new(Operation::BackupDeleteFailed, Status::Error)
						.path(archive.display())
						.error(&e),
				)?;
				Ok(ArchiveDisposition::DeleteFailed)
			}
		}
	}
}

fn unpack(archive: &Path, dest: &Path) -> Result<()> {
	let file = File::open(archive).map_err(|e| SweepError::archive_format(archive, e))?;
	let mut tar = Archive::new(GzDecoder::new(BufReader::new(file)));
	tar.unpack(dest).map_err(|e| SweepError::archive_format(archive, e))
}

/// Copy through a temporary sibling and rename into place, so the target either
/// keeps its old content or gets the whole new file.
fn copy_atomic(source: &Path, target: &Path, expected: u64) -> io::Result<()> {
	let parent = target
		.parent()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "target has no parent"))?;
	fs::create_dir_all(parent)?;

	let mut reader = File::open(source)?;
	let permissions = reader.metadata()?.permissions();
	let mut tmp = NamedTempFile::new_in(parent)?;
	let copied = io::copy(&mut reader, tmp.as_file_mut())?;
	if copied != expected {
		return Err(io::Error::new(
			io::ErrorKind::InvalidData,
			format!("archive holds {} bytes, manifest says {}", copied, expected),
		));
	}
	tmp.as_file().sync_all()?;

	fs::set_permissions(tmp.path(), permissions)?;
	tmp.persist(target).map_err(|e| e.error)?;
	Ok(())
}
