//! Append-only CSV audit trail, one file per run

use chrono::{Local, SecondsFormat};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::config::{LOG_EXT, LOG_PREFIX};
use crate::core::{format_size, RunStamp};
use crate::error::{Result, SweepError};
use crate::processing::OrphanRecord;

pub const HEADER: [&str; 9] = [
	"timestamp",
	"operation",
	"file_path",
	"file_size_bytes",
	"file_size_formatted",
	"dimensions",
	"base_name",
	"status",
	"error_message",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
	ScanComplete,
	OrphanFound,
	BackupCreated,
	FileDeleted,
	FileDeleteFailed,
	DeleteSummary,
	RestoreStart,
	FileRestored,
	FileRestoreFailed,
	RestoreComplete,
	BackupPreserved,
	BackupDeleted,
	BackupDeleteFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
	Success,
	Error,
	Found,
}

/// One row of the audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
	pub timestamp: String,
	pub operation: Operation,
	pub file_path: String,
	pub file_size_bytes: Option<u64>,
	pub file_size_formatted: String,
	pub dimensions: String,
	pub base_name: String,
	pub status: Status,
	pub error_message: String,
}

impl AuditEntry {
	pub fn new(operation: Operation, status: Status) -> Self {
		Self {
			timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
			operation,
			file_path: String::new(),
			file_size_bytes: None,
			file_size_formatted: String::new(),
			dimensions: String::new(),
			base_name: String::new(),
			status,
			error_message: String::new(),
		}
	}

	/// Row describing one orphan (found, deleted, restored...)
	pub fn for_orphan(operation: Operation, status: Status, record: &OrphanRecord) -> Self {
		Self::new(operation, status)
			.path(record.path.display())
			.size(record.size)
			.variant(&record.dimension_tag, &record.base_name)
	}

	pub fn path(mut self, path: impl Display) -> Self {
		self.file_path = path.to_string();
		self
	}

	pub fn size(mut self, bytes: u64) -> Self {
		self.file_size_bytes = Some(bytes);
		self.file_size_formatted = format_size(bytes);
		self
	}

	pub fn variant(mut self, dimensions: &str, base_name: &str) -> Self {
		self.dimensions = dimensions.to_string();
		self.base_name = base_name.to_string();
		self
	}

	pub fn error(mut self, message: impl Display) -> Self {
		self.error_message = message.to_string();
		self
	}
}

pub struct AuditLog {
	path: PathBuf,
	writer: csv::Writer<File>,
}

impl AuditLog {
	/// Create `<log_dir>/orphan-cleanup-<stamp>.csv` and write the header row
	pub fn create(log_dir: &Path, stamp: &RunStamp) -> Result<Self> {
		let path = log_dir.join(log_file_name(stamp));
		fs::create_dir_all(log_dir).map_err(|e| SweepError::audit(&path, e))?;

		let file = OpenOptions::new()
			.append(true)
			.create_new(true)
			.open(&path)
			.map_err(|e| SweepError::audit(&path, e))?;

		let mut writer = WriterBuilder::new()
			.quote_style(QuoteStyle::Always)
			.has_headers(false)
			.from_writer(file);
		writer.write_record(HEADER).map_err(|e| SweepError::audit(&path, e))?;
		writer.flush().map_err(|e| SweepError::audit(&path, e))?;

		Ok(Self { path, writer })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Append one row and flush it to disk
	pub fn record(&mut self, entry: AuditEntry) -> Result<()> {
		self.writer.serialize(&entry).map_err(|e| SweepError::audit(&self.path, e))?;
		self.writer.flush().map_err(|e| SweepError::audit(&self.path, e))
	}

	/// Read every row of an existing log
	pub fn read(path: &Path) -> Result<Vec<AuditEntry>> {
		let mut reader = ReaderBuilder::new()
			.has_headers(true)
			.from_path(path)
			.map_err(|e| SweepError::audit(path, e))?;
		reader
			.deserialize()
			.collect::<std::result::Result<Vec<AuditEntry>, _>>()
			.map_err(|e| SweepError::audit(path, e))
	}
}

pub fn log_file_name(stamp: &RunStamp) -> String {
	format!("{}{}.{}", LOG_PREFIX, stamp.slug(), LOG_EXT)
}

/// Audit logs in `log_dir`, newest first by the stamp in their name
pub fn list_logs(log_dir: &Path) -> Vec<(RunStamp, PathBuf)> {
	let Ok(entries) = fs::read_dir(log_dir) else {
		return Vec::new();
	};

	let mut logs: Vec<_> = entries
		.filter_map(|e| e.ok())
		.filter_map(|entry| {
			let name = entry.file_name();
			let stamp = RunStamp::from_file_name(name.to_str()?, LOG_PREFIX, LOG_EXT)?;
			Some((stamp, entry.path()))
		})
		.collect();

	logs.sort_by(|a, b| b.0.cmp(&a.0));
	logs
}
