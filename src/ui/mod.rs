//! # User Interface
//!
//! Colored terminal output with clickable file links.

pub mod log;

pub use log::{batch_summary, debug, error, header, info, orphan_line, path_link, success, warn, Log};
