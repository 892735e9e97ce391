//! Orphan detection: classified files without a parent in their directory

use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, LookupFailurePolicy};
use crate::core::pattern::{classify, is_unclassified, VariantMatch};
use crate::core::MediaFile;
use crate::error::{Result, SweepError};
use crate::processing::walk::MediaWalker;
use crate::ui;

/// A variant proven to have no parent file next to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanRecord {
	pub path: PathBuf,
	pub filename: String,
	pub size: u64,
	pub base_name: String,
	pub dimension_tag: String,
	pub relative_path: String,
}

#[derive(Debug, Default)]
pub struct ScanReport {
	/// Image files visited
	pub scanned: usize,
	/// Files that matched a variant rule
	pub classified: usize,
	pub orphans: Vec<OrphanRecord>,
	pub total_size: u64,
	/// Directories whose listing failed while resolving parents
	pub lookup_failures: Vec<PathBuf>,
}

impl ScanReport {
	pub fn orphan_count(&self) -> usize {
		self.orphans.len()
	}

	pub fn has_orphans(&self) -> bool {
		!self.orphans.is_empty()
	}
}

/// Result for one month directory, merged into the report by the caller
#[derive(Default)]
struct DirOutcome {
	scanned: usize,
	classified: usize,
	orphans: Vec<OrphanRecord>,
	lookup_failed: Option<PathBuf>,
}

pub struct OrphanDetector<'a> {
	config: &'a Config,
}

impl<'a> OrphanDetector<'a> {
	pub fn new(config: &'a Config) -> Self {
		Self { config }
	}

	pub fn scan(&self, walker: &MediaWalker) -> ScanReport {
		let mut groups: BTreeMap<PathBuf, Vec<MediaFile>> = BTreeMap::new();
		for file in walker.iter() {
			let dir = file.path.parent().unwrap_or(walker.root()).to_path_buf();
			groups.entry(dir).or_default().push(file);
		}
		let groups: Vec<_> = groups.into_iter().collect();

		ui::debug(&format!("Evaluating {} month directories", groups.len()));

		let outcomes: Vec<DirOutcome> = if self.config.parallel {
			groups.par_iter().map(|(dir, files)| self.evaluate_dir(dir, files)).collect()
		} else {
			groups.iter().map(|(dir, files)| self.evaluate_dir(dir, files)).collect()
		};

		let mut report = ScanReport::default();
		for outcome in outcomes {
			report.scanned += outcome.scanned;
			report.classified += outcome.classified;
			report.lookup_failures.extend(outcome.lookup_failed);
			report.orphans.extend(outcome.orphans);
		}
		report.total_size = report.orphans.iter().map(|o| o.size).sum();
		report
	}

	fn evaluate_dir(&self, dir: &Path, files: &[MediaFile]) -> DirOutcome {
		let candidates: Vec<(&MediaFile, VariantMatch)> = files
			.iter()
			.filter_map(|file| classify(&file.filename).map(|m| (file, m)))
			.collect();

		let mut outcome = DirOutcome {
			scanned: files.len(),
			classified: candidates.len(),
			..Default::default()
		};
		if candidates.is_empty() {
			return outcome;
		}

		let siblings = match Siblings::list(dir) {
			Ok(siblings) => siblings,
			Err(err) => {
				ui::warn(&err.to_string());
				match self.config.lookup_policy {
					LookupFailurePolicy::AssumeParent => {
						ui::warn(&format!("Skipping {} variants in {}", candidates.len(), dir.display()));
						outcome.lookup_failed = Some(dir.to_path_buf());
						return outcome;
					}
					LookupFailurePolicy::AssumeOrphan => {
						outcome.lookup_failed = Some(dir.to_path_buf());
						Siblings::default()
					}
				}
			}
		};

		for (file, found) in candidates {
			if siblings.has_parent(&found) {
				continue;
			}
			ui::debug(&format!("Orphan: {} ({})", file.filename, found.rule));
			outcome.orphans.push(self.record(file, found));
		}
		outcome
	}

	fn record(&self, file: &MediaFile, found: VariantMatch) -> OrphanRecord {
		OrphanRecord {
			path: file.path.clone(),
			filename: file.filename.clone(),
			size: file.size,
			base_name: found.base_name,
			dimension_tag: found.dimension_tag,
			relative_path: self.config.relative_path(&file.path),
		}
	}

	/// Re-check a record against a fresh listing of its directory.
	///
	/// `Ok(false)` when the file is gone, no longer classifies, or a parent has
	/// appeared since the scan.
	pub fn confirm(&self, record: &OrphanRecord) -> Result<bool> {
		let Some(found) = classify(&record.filename) else {
			return Ok(false);
		};
		let dir = record.path.parent().unwrap_or(&self.config.root);
		let siblings = Siblings::list(dir)?;
		Ok(siblings.contains(&record.filename) && !siblings.has_parent(&found))
	}
}

/// Non-directory entry names of one directory
#[derive(Debug, Default)]
struct Siblings {
	names: HashSet<String>,
}

impl Siblings {
	fn list(dir: &Path) -> Result<Self> {
		let lookup = |source: std::io::Error| SweepError::SiblingLookup { path: dir.to_path_buf(), source };

		let mut names = HashSet::new();
		for entry in fs::read_dir(dir).map_err(lookup)? {
			let entry = entry.map_err(lookup)?;
			if entry.file_type().map_err(lookup)?.is_dir() {
				continue;
			}
			if let Some(name) = entry.file_name().to_str() {
				names.insert(name.to_string());
			}
		}
		Ok(Self { names })
	}

	fn contains(&self, name: &str) -> bool {
		self.names.contains(name)
	}

	fn has_parent(&self, found: &VariantMatch) -> bool {
		match found.source_extension() {
			// `.jpg.webp` copies: the original or its own webp copy
			Some(source_ext) => {
				let original = format!("{}{}", found.base_name, source_ext);
				[original, found.base_filename()]
					.iter()
					.any(|name| self.contains(name) && is_unclassified(name))
			}
			None => self.names.iter().any(|name| {
				name.starts_with(&found.base_name)
					&& name.ends_with(&found.extension)
					&& is_unclassified(name)
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::{tempdir, TempDir};

	fn library(files: &[&str]) -> (TempDir, Config) {
		let dir = tempdir().unwrap();
		for name in files {
			let path = dir.path().join("2024/05").join(name);
			fs::create_dir_all(path.parent().unwrap()).unwrap();
			fs::write(path, name.as_bytes()).unwrap();
		}
		let config = Config::new(dir.path());
		(dir, config)
	}

	fn orphans(config: &Config) -> Vec<(String, String)> {
		let walker = MediaWalker::open(&config.root).unwrap();
		OrphanDetector::new(config)
			.scan(&walker)
			.orphans
			.into_iter()
			.map(|o| (o.filename, o.dimension_tag))
			.collect()
	}

	#[test]
	fn variant_with_original_is_kept() {
		let (_dir, config) = library(&["photo.jpg", "photo-300x200.jpg"]);
		assert!(orphans(&config).is_empty());
	}

	#[test]
	fn variant_without_original_is_orphaned() {
		let (_dir, config) = library(&["photo-300x200.jpg"]);
		assert_eq!(orphans(&config), vec![("photo-300x200.jpg".into(), "300x200".into())]);
	}

	#[test]
	fn scaled_parent_needs_original() {
		let (_dir, config) = library(&["photo-scaled.jpg"]);
		assert_eq!(orphans(&config), vec![("photo-scaled.jpg".into(), "parent".into())]);

		let (_dir, config) = library(&["photo-scaled.jpg", "photo.jpg"]);
		assert!(orphans(&config).is_empty());
	}

	#[test]
	fn webp_copy_accepts_either_parent() {
		let (_dir, config) = library(&["photo-300x200.jpg.webp", "photo.jpg"]);
		assert!(orphans(&config).is_empty());

		let (_dir, config) = library(&["photo-300x200.jpg.webp", "photo.jpg.webp"]);
		assert!(orphans(&config).is_empty());

		let (_dir, config) = library(&["photo-300x200.jpg.webp", "photo.png"]);
		assert_eq!(orphans(&config).len(), 1);
	}

	#[test]
	fn classified_siblings_are_not_parents() {
		let (_dir, config) = library(&["photo-300x200.jpg", "photo-scaled.jpg", "photo-1024x768.jpg"]);
		let found = orphans(&config);
		assert_eq!(found.len(), 3);
	}

	#[test]
	fn parent_match_is_per_directory() {
		let (dir, config) = library(&["photo-300x200.jpg"]);
		let other = dir.path().join("2024/06");
		fs::create_dir_all(&other).unwrap();
		fs::write(other.join("photo.jpg"), b"x").unwrap();
		assert_eq!(orphans(&config).len(), 1);
	}

	#[test]
	fn totals_follow_orphans() {
		let (_dir, config) = library(&["a-10x10.jpg", "b-20x20.png", "c.jpg", "c-30x30.jpg"]);
		let walker = MediaWalker::open(&config.root).unwrap();
		let report = OrphanDetector::new(&config).scan(&walker);
		assert_eq!(report.scanned, 4);
		assert_eq!(report.classified, 3);
		assert_eq!(report.orphan_count(), 2);
		assert_eq!(report.total_size, ("a-10x10.jpg".len() + "b-20x20.png".len()) as u64);
		assert_eq!(report.orphans[0].relative_path, "2024/05/a-10x10.jpg");
	}

	#[test]
	fn parallel_and_sequential_agree() {
		let (_dir, config) = library(&["a-10x10.jpg", "b.jpg", "b-10x10.jpg", "c-scaled.gif", "d-5x5.jpg.webp"]);
		let sequential = config.clone().with_parallel(false);
		assert_eq!(orphans(&config), orphans(&sequential));
	}

	#[test]
	fn confirm_sees_a_reappearing_parent() {
		let (dir, config) = library(&["photo-300x200.jpg"]);
		let walker = MediaWalker::open(&config.root).unwrap();
		let detector = OrphanDetector::new(&config);
		let report = detector.scan(&walker);
		let record = &report.orphans[0];

		assert!(detector.confirm(record).unwrap());
		fs::write(dir.path().join("2024/05/photo.jpg"), b"back").unwrap();
		assert!(!detector.confirm(record).unwrap());
	}

	#[test]
	fn unreadable_directory_follows_policy() {
		let dir = tempdir().unwrap();
		let missing = dir.path().join("2024/05");
		let files = vec![MediaFile {
			path: missing.join("photo-300x200.jpg"),
			filename: "photo-300x200.jpg".into(),
			size: 10,
		}];

		let config = Config::new(dir.path());
		let outcome = OrphanDetector::new(&config).evaluate_dir(&missing, &files);
		assert!(outcome.orphans.is_empty());
		assert_eq!(outcome.lookup_failed.as_deref(), Some(missing.as_path()));

		let config = Config::new(dir.path()).with_lookup_policy(LookupFailurePolicy::AssumeOrphan);
		let outcome = OrphanDetector::new(&config).evaluate_dir(&missing, &files);
		assert_eq!(outcome.orphans.len(), 1);
		assert_eq!(outcome.lookup_failed.as_deref(), Some(missing.as_path()));
	}
}
