//! Media file detection and size formatting

use std::fs::Metadata;
use std::path::PathBuf;

use crate::config::IMAGE_EXTENSIONS;

/// One image file visited by the walker
#[derive(Debug, Clone)]
pub struct MediaFile {
	pub path: PathBuf,
	pub filename: String,
	pub size: u64,
}

impl MediaFile {
	pub fn new(path: PathBuf, filename: String, metadata: &Metadata) -> Self {
		Self {
			path,
			filename,
			size: metadata.len(),
		}
	}
}

/// True for the closed image extension set, including `.jpg.webp` style copies
pub fn is_image_name(filename: &str) -> bool {
	let lower = filename.to_ascii_lowercase();
	// Compound copies (`.png.webp`) end in `.webp` and fall out of the same check
	IMAGE_EXTENSIONS.iter().any(|ext| {
		lower.len() > ext.len() + 1
			&& lower.ends_with(ext)
			&& lower.as_bytes()[lower.len() - ext.len() - 1] == b'.'
	})
}

/// Human readable size (1024 based)
pub fn format_size(bytes: u64) -> String {
	const UNITS: &[&str] = &["KB", "MB", "GB", "TB"];

	if bytes < 1024 {
		return format!("{} B", bytes);
	}

	let mut value = bytes as f64;
	let mut unit = "B";
	for next in UNITS {
		if value < 1024.0 {
			break;
		}
		value /= 1024.0;
		unit = next;
	}
	format!("{:.2} {}", value, unit)
}
