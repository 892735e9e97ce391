//! Year/month restricted discovery of image files

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::MONTH_DEPTH;
use crate::core::{is_image_name, MediaFile};
use crate::error::{Result, SweepError};
use crate::ui;

/// Walks `<root>/<YYYY>/<MM>/` and yields the image files found there.
///
/// Each call to [`MediaWalker::iter`] starts a fresh walk, entries come back in
/// file-name order.
#[derive(Debug, Clone)]
pub struct MediaWalker {
	root: PathBuf,
}

impl MediaWalker {
	/// Fails when the root itself cannot be read
	pub fn open(root: &Path) -> Result<Self> {
		fs::read_dir(root).map_err(|source| SweepError::ScanRoot {
			path: root.to_path_buf(),
			source,
		})?;
		Ok(Self { root: root.to_path_buf() })
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn iter(&self) -> impl Iterator<Item = MediaFile> + '_ {
		// No min_depth: entries above it would bypass `in_scope`
		WalkDir::new(&self.root)
			.max_depth(MONTH_DEPTH + 1)
			.sort_by_file_name()
			.into_iter()
			.filter_entry(in_scope)
			.filter_map(|entry| match entry {
				Ok(entry) => Some(entry),
				Err(err) => {
					let path = err.path().unwrap_or(&self.root).to_path_buf();
					let source = err
						.into_io_error()
						.unwrap_or_else(|| std::io::Error::other("filesystem loop"));
					ui::warn(&SweepError::ScanDirectory { path, source }.to_string());
					None
				}
			})
			.filter(|entry| entry.depth() == MONTH_DEPTH + 1 && entry.file_type().is_file())
			.filter_map(media_file)
	}
}

fn in_scope(entry: &DirEntry) -> bool {
	let name = entry.file_name().to_str().unwrap_or_default();
	match entry.depth() {
		0 => true,
		1 => entry.file_type().is_dir() && is_year(name),
		2 => entry.file_type().is_dir() && is_month(name),
		_ => !entry.file_type().is_dir(),
	}
}

fn media_file(entry: DirEntry) -> Option<MediaFile> {
	let Some(filename) = entry.file_name().to_str() else {
		ui::debug(&format!("Skipping non UTF-8 name: {}", entry.path().display()));
		return None;
	};
	if !is_image_name(filename) {
		return None;
	}
	let filename = filename.to_string();

	match entry.metadata() {
		Ok(metadata) => Some(MediaFile::new(entry.into_path(), filename, &metadata)),
		Err(e) => {
			ui::warn(&format!("Cannot stat {}: {}", entry.path().display(), e));
			None
		}
	}
}

pub fn is_year(name: &str) -> bool {
	name.len() == 4 && name.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_month(name: &str) -> bool {
	name.len() == 2
		&& name.bytes().all(|b| b.is_ascii_digit())
		&& matches!(name.parse::<u8>(), Ok(1..=12))
}
