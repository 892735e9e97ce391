//! Unified terminal output

use colored::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub struct Log;

impl Log {
	pub fn set_verbose(enabled: bool) {
		VERBOSE.store(enabled, Ordering::Relaxed);
	}

	pub fn is_verbose() -> bool {
		VERBOSE.load(Ordering::Relaxed)
	}
}

pub fn info(msg: &str) {
	println!("{} {}", "ℹ".bright_blue().bold(), msg.bright_white());
}

pub fn success(msg: &str) {
	println!("{} {}", "✓".bright_green().bold(), msg.bright_white());
}

pub fn warn(msg: &str) {
	eprintln!("{} {}", "⚠".bright_yellow().bold(), msg.bright_white());
}

pub fn error(msg: &str) {
	eprintln!("{} {}", "✗".bright_red().bold(), msg.bright_white());
}

pub fn debug(msg: &str) {
	if Log::is_verbose() {
		println!("{} {}", "⚙".bright_black().bold(), msg.dimmed());
	}
}

pub fn header(text: &str) {
	println!("\n{}", text.bright_blue().bold());
}

/// Clickable file path (OSC 8 terminal hyperlink)
pub fn path_link(path: &Path, label: &str) -> String {
	let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

	let uri = if cfg!(windows) {
		let path_str = absolute.to_string_lossy();
		let cleaned = path_str.strip_prefix(r"\\?\").unwrap_or(&path_str);
		format!("file:///{}", cleaned.replace('\\', "/"))
	} else {
		format!("file://{}", absolute.display())
	};

	format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", uri, label)
}

/// One listed orphan: relative path, dimension tag and formatted size
pub fn orphan_line(path: &Path, relative: &str, dimensions: &str, size: &str) {
	let link = path_link(path, relative);
	println!(
		"  {} {} {}",
		link.bright_white(),
		format!("[{}]", dimensions).yellow(),
		size.dimmed()
	);
}

/// Final counts of a batch (deleted/restored vs failed)
pub fn batch_summary(verb: &str, done: usize, failed: usize) {
	println!();
	if failed == 0 {
		success(&format!("{} {} files", verb, done));
	} else {
		warn(&format!("{} {} files, {} failed", verb, done, failed));
	}
}
