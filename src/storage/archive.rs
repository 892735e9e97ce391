//! Backup archives: stage orphans into a mirrored tree, then tar + gzip it

use flate2::{write::GzEncoder, Compression};
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use crate::config::{Config, ARCHIVE_EXT, ARCHIVE_PREFIX, MANIFEST_NAME};
use crate::core::RunStamp;
use crate::error::{Result, SweepError};
use crate::processing::OrphanRecord;
use crate::storage::manifest::BackupManifest;
use crate::ui;

/// Everything a finished backup left on disk
#[derive(Debug, Clone)]
pub struct BackupArtifact {
	pub archive_path: PathBuf,
	pub staging_dir: PathBuf,
	pub manifest: BackupManifest,
}

pub struct BackupArchiver<'a> {
	config: &'a Config,
}

impl<'a> BackupArchiver<'a> {
	pub fn new(config: &'a Config) -> Self {
		Self { config }
	}

	pub fn archive_path(&self, stamp: &RunStamp) -> PathBuf {
		self.config
			.backup_dir
			.join(format!("{}{}.{}", ARCHIVE_PREFIX, stamp.slug(), ARCHIVE_EXT))
	}

	pub fn staging_dir(&self, stamp: &RunStamp) -> PathBuf {
		self.config.backup_dir.join(format!("{}{}", ARCHIVE_PREFIX, stamp.slug()))
	}

	/// Stage, write the manifest and compress. Nothing may be deleted unless this
	/// returns `Ok`.
	pub fn create(&self, records: &[OrphanRecord], stamp: &RunStamp) -> Result<BackupArtifact> {
		let manifest = BackupManifest::from_records(records, stamp.time());
		let staging_dir = self.staging_dir(stamp);

		if let Err(err) = self.stage(records, &staging_dir) {
			// A partial mirror is worthless and could be mistaken for a backup
			if staging_dir.exists() {
				let _ = fs::remove_dir_all(&staging_dir);
			}
			return Err(err);
		}

		manifest
			.save(&staging_dir.join(MANIFEST_NAME))
			.map_err(|e| SweepError::staging(&staging_dir, format!("{:#}", e)))?;
		ui::debug(&format!("Staged {} files in {}", manifest.file_count, staging_dir.display()));

		let archive_path = self.archive_path(stamp);
		compress(&staging_dir, &manifest, &archive_path)?;

		Ok(BackupArtifact { archive_path, staging_dir, manifest })
	}

	fn stage(&self, records: &[OrphanRecord], staging_dir: &Path) -> Result<()> {
		fs::create_dir_all(&self.config.backup_dir)
			.map_err(|e| SweepError::staging(&self.config.backup_dir, e))?;
		fs::create_dir(staging_dir).map_err(|e| SweepError::staging(staging_dir, e))?;

		for record in records {
			let target = staging_dir.join(&record.relative_path);
			if let Some(parent) = target.parent() {
				fs::create_dir_all(parent).map_err(|e| SweepError::staging(parent, e))?;
			}

			let copied = fs::copy(&record.path, &target).map_err(|e| SweepError::staging(&record.path, e))?;
			if copied != record.size {
				return Err(SweepError::staging(
					&record.path,
					format!("copied {} of {} bytes", copied, record.size),
				));
			}
		}
		Ok(())
	}

	/// Remove the staging mirror of a finished backup
	pub fn discard_staging(&self, artifact: &BackupArtifact) -> io::Result<()> {
		fs::remove_dir_all(&artifact.staging_dir)
	}
}

/// Manifest first, then the staged files in manifest order
fn compress(staging_dir: &Path, manifest: &BackupManifest, archive_path: &Path) -> Result<()> {
	let write = || -> io::Result<()> {
		let file = OpenOptions::new().write(true).create_new(true).open(archive_path)?;
		let mut tar = tar::Builder::new(GzEncoder::new(BufWriter::new(file), Compression::default()));

		tar.append_path_with_name(staging_dir.join(MANIFEST_NAME), MANIFEST_NAME)?;
		for entry in &manifest.files {
			tar.append_path_with_name(staging_dir.join(&entry.relative_path), &entry.relative_path)?;
		}

		let file = tar
			.into_inner()?
			.finish()?
			.into_inner()
			.map_err(|e| e.into_error())?;
		file.sync_all()
	};

	write().map_err(|source| {
		if source.kind() != ErrorKind::AlreadyExists {
			let _ = fs::remove_file(archive_path);
		}
		SweepError::ArchiveWrite { path: archive_path.to_path_buf(), source }
	})
}
