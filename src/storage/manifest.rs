//! Backup manifest, the authoritative list of what an archive holds

use anyhow::Context;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::processing::OrphanRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
	pub relative_path: String,
	pub size: u64,
	pub base_name: String,
	pub dimensions: String,
}

impl ManifestEntry {
	/// Relative path as a filesystem path, refusing anything that escapes the root
	pub fn safe_relative_path(&self) -> Option<PathBuf> {
		let path = Path::new(&self.relative_path);
		let mut clean = PathBuf::new();
		for component in path.components() {
			match component {
				Component::Normal(part) => clean.push(part),
				Component::CurDir => {}
				_ => return None,
			}
		}
		(!clean.as_os_str().is_empty()).then_some(clean)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
	pub created_at: DateTime<Local>,
	pub file_count: usize,
	pub total_size: u64,
	pub files: Vec<ManifestEntry>,
}

impl BackupManifest {
	pub fn from_records(records: &[OrphanRecord], created_at: DateTime<Local>) -> Self {
		let files: Vec<ManifestEntry> = records
			.iter()
			.map(|r| ManifestEntry {
				relative_path: r.relative_path.clone(),
				size: r.size,
				base_name: r.base_name.clone(),
				dimensions: r.dimension_tag.clone(),
			})
			.collect();

		Self {
			created_at,
			file_count: files.len(),
			total_size: files.iter().map(|f| f.size).sum(),
			files,
		}
	}

	pub fn save(&self, path: &Path) -> anyhow::Result<()> {
		let json = serde_json::to_vec_pretty(self).context("Failed to serialize manifest")?;
		fs::write(path, json).context("Failed to write manifest")?;
		Ok(())
	}

	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let bytes = fs::read(path).context("Failed to read manifest")?;
		serde_json::from_slice(&bytes).context("Failed to parse manifest")
	}
}
