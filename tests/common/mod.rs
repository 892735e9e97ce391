// Shared fixtures for the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// A small library with parents, live variants and orphans across two months
pub const LIBRARY: &[(&str, &str)] = &[
	("2023/12/holiday.jpg", "original holiday"),
	("2023/12/holiday-150x150.jpg", "thumb of holiday"),
	("2023/12/holiday-scaled.jpg", "scaled holiday"),
	("2023/12/gone-1024x768.jpg", "orphaned large"),
	("2023/12/gone-300x225.jpg", "orphaned medium"),
	("2024/05/logo.png", "logo original"),
	("2024/05/logo-100x100.png.webp", "webp copy of logo thumb"),
	("2024/05/banner-800x200.webp", "banner without parent"),
	("2024/05/notes.txt", "not an image"),
];

pub const ORPHANS: &[&str] = &[
	"2023/12/gone-1024x768.jpg",
	"2023/12/gone-300x225.jpg",
	"2024/05/banner-800x200.webp",
];

pub fn write_file(root: &Path, relative: &str, body: &str) {
	let path = root.join(relative);
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(path, body).unwrap();
}

pub fn build_library(root: &Path) {
	for (relative, body) in LIBRARY {
		write_file(root, relative, body);
	}
}

pub fn read(root: &Path, relative: &str) -> String {
	fs::read_to_string(root.join(relative)).unwrap()
}

/// Run stamps have millisecond resolution; keep consecutive runs apart
pub fn next_run() {
	std::thread::sleep(std::time::Duration::from_millis(5));
}
