//! Run identifiers shared by a run's audit log, staging directory and archive

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};
use std::fmt;

const SLUG_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunStamp(DateTime<Local>);

impl RunStamp {
	pub fn now() -> Self {
		Self(Local::now())
	}

	pub fn time(&self) -> DateTime<Local> {
		self.0
	}

	/// Filesystem-safe form, `YYYYMMDD-HHMMSS-mmm`
	pub fn slug(&self) -> String {
		format!("{}-{:03}", self.0.format(SLUG_FORMAT), self.0.timestamp_subsec_millis().min(999))
	}

	/// Parse a slug produced by [`RunStamp::slug`]
	pub fn parse_slug(slug: &str) -> Option<Self> {
		let (datetime, millis) = slug.rsplit_once('-')?;
		if millis.len() != 3 {
			return None;
		}
		let millis: u32 = millis.parse().ok()?;
		let naive = NaiveDateTime::parse_from_str(datetime, SLUG_FORMAT).ok()?;
		let naive = naive.with_nanosecond(millis * 1_000_000)?;
		Local.from_local_datetime(&naive).earliest().map(Self)
	}

	/// Extract the stamp from `<prefix><slug>.<ext>`
	pub fn from_file_name(name: &str, prefix: &str, ext: &str) -> Option<Self> {
		let slug = name.strip_prefix(prefix)?.strip_suffix(ext)?.strip_suffix('.')?;
		Self::parse_slug(slug)
	}
}

impl fmt::Display for RunStamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.slug())
	}
}
