//! Application configuration and constants

use std::path::{Path, PathBuf};

use clap::ValueEnum;

// === File Extensions ===
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

// === Library Layout ===
pub const MONTH_DEPTH: usize = 2;

// === Backups ===
pub const MANIFEST_NAME: &str = "manifest.json";
pub const ARCHIVE_PREFIX: &str = "orphan-backup-";
pub const ARCHIVE_EXT: &str = "tar.gz";
pub const DEFAULT_BACKUP_DIR: &str = "orphan-backups";

// === Audit Log ===
pub const LOG_PREFIX: &str = "orphan-cleanup-";
pub const LOG_EXT: &str = "csv";
pub const DEFAULT_LOG_DIR: &str = "orphan-logs";

// === Environment ===
pub const ENV_ROOT: &str = "THUMBSWEEP_ROOT";
pub const ENV_LOG_DIR: &str = "THUMBSWEEP_LOG_DIR";
pub const ENV_BACKUP_DIR: &str = "THUMBSWEEP_BACKUP_DIR";

/// What to conclude when a directory cannot be listed while resolving parents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LookupFailurePolicy {
	/// Treat every file in the directory as having a parent (never deleted)
	#[default]
	AssumeParent,
	/// Treat the directory as empty, so variants in it count as orphans
	AssumeOrphan,
}

/// Run configuration, built once and handed to every component by reference
#[derive(Debug, Clone)]
pub struct Config {
	pub root: PathBuf,
	pub log_dir: PathBuf,
	pub backup_dir: PathBuf,
	/// Remove staging directories / archives once they are no longer needed
	pub cleanup: bool,
	pub lookup_policy: LookupFailurePolicy,
	/// Evaluate month directories on the rayon pool
	pub parallel: bool,
}

impl Config {
	/// Config rooted at `root` with log and backup directories inside it
	pub fn new(root: impl Into<PathBuf>) -> Self {
		let root = root.into();
		Self {
			log_dir: root.join(DEFAULT_LOG_DIR),
			backup_dir: root.join(DEFAULT_BACKUP_DIR),
			root,
			cleanup: false,
			lookup_policy: LookupFailurePolicy::default(),
			parallel: true,
		}
	}

	pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.log_dir = dir.into();
		self
	}

	pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.backup_dir = dir.into();
		self
	}

	pub fn with_cleanup(mut self, cleanup: bool) -> Self {
		self.cleanup = cleanup;
		self
	}

	pub fn with_lookup_policy(mut self, policy: LookupFailurePolicy) -> Self {
		self.lookup_policy = policy;
		self
	}

	pub fn with_parallel(mut self, parallel: bool) -> Self {
		self.parallel = parallel;
		self
	}

	/// Build from CLI values, falling back to the THUMBSWEEP_* environment variables
	pub fn resolve(
		root: Option<PathBuf>,
		log_dir: Option<PathBuf>,
		backup_dir: Option<PathBuf>,
	) -> Self {
		let root = root
			.or_else(|| env_dir(ENV_ROOT))
			.unwrap_or_else(|| PathBuf::from("."));
		let root = root.canonicalize().unwrap_or(root);

		let mut config = Self::new(root);
		if let Some(dir) = log_dir.or_else(|| env_dir(ENV_LOG_DIR)) {
			config.log_dir = dir;
		}
		if let Some(dir) = backup_dir.or_else(|| env_dir(ENV_BACKUP_DIR)) {
			config.backup_dir = dir;
		}
		config
	}

	/// Path of `path` relative to the scan root, with `/` separators
	pub fn relative_path(&self, path: &Path) -> String {
		let relative = path.strip_prefix(&self.root).unwrap_or(path);
		relative
			.components()
			.map(|c| c.as_os_str().to_string_lossy())
			.collect::<Vec<_>>()
			.join("/")
	}
}

fn env_dir(var: &str) -> Option<PathBuf> {
	let value = std::env::var(var).ok()?;
	if value.trim().is_empty() {
		return None;
	}
	crate::ui::debug(&format!("Using {}: {}", var, value));
	Some(PathBuf::from(value))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_live_under_root() {
		let config = Config::new("/srv/uploads");
		assert_eq!(config.log_dir, PathBuf::from("/srv/uploads/orphan-logs"));
		assert_eq!(config.backup_dir, PathBuf::from("/srv/uploads/orphan-backups"));
		assert!(!config.cleanup);
		assert!(config.parallel);
		assert_eq!(config.lookup_policy, LookupFailurePolicy::AssumeParent);
	}

	#[test]
	fn relative_path_uses_forward_slashes() {
		let config = Config::new("/srv/uploads");
		let path = Path::new("/srv/uploads/2024/05/photo-300x200.jpg");
		assert_eq!(config.relative_path(path), "2024/05/photo-300x200.jpg");
	}
}
