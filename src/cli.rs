use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Config, LookupFailurePolicy};

fn styles() -> Styles {
	let fg = |c: AnsiColor| Style::new().fg_color(Some(Color::Ansi(c)));
	Styles::styled()
		.header(fg(AnsiColor::Blue).bold())
		.usage(fg(AnsiColor::Blue).bold())
		.literal(fg(AnsiColor::Blue))
		.placeholder(fg(AnsiColor::Yellow))
		.valid(fg(AnsiColor::Blue))
		.invalid(fg(AnsiColor::Red))
}

#[derive(Parser, Debug)]
#[command(
	name = "thumbsweep",
	author,
	version,
	about = "Find, back up and remove orphaned image-size variants",
	styles = styles(),
	disable_help_subcommand = true,
	after_help = format!(
		"{title}
  {bin} {preview}  {preview_args}      {preview_desc}
  {bin} {clean}    {clean_args}   {clean_desc}
  {bin} {restore}  {restore_args}                {restore_desc}
  {bin} {restore}  {restore_name_args}  {restore_name_desc}",
		title = "Examples:".bright_blue().bold(),
		bin = "thumbsweep".bright_blue(),
		preview = "preview".yellow(),
		preview_args = "--root ./uploads",
		preview_desc = "List orphans, change nothing".dimmed(),
		clean = "clean".yellow(),
		clean_args = "--root ./uploads -y",
		clean_desc = "Back up and delete orphans".dimmed(),
		restore = "restore".yellow(),
		restore_args = "",
		restore_desc = "Restore the latest backup".dimmed(),
		restore_name_args = "20240501-134510-042",
		restore_name_desc = "Restore a specific backup".dimmed(),
	),
)]
pub struct Cli {
	/// Enable verbose debug output
	#[arg(short = 'v', long = "verbose", global = true)]
	pub verbose: bool,

	/// Media library root containing YYYY/MM directories
	#[arg(short = 'r', long = "root", global = true, value_name = "DIR")]
	pub root: Option<PathBuf>,

	/// Directory for CSV audit logs (default: <root>/orphan-logs)
	#[arg(long = "log-dir", global = true, value_name = "DIR")]
	pub log_dir: Option<PathBuf>,

	/// Directory for backup archives (default: <root>/orphan-backups)
	#[arg(long = "backup-dir", global = true, value_name = "DIR")]
	pub backup_dir: Option<PathBuf>,

	/// Remove staging directories after clean, and the archive after restore
	#[arg(long = "cleanup", global = true)]
	pub cleanup: bool,

	/// What to assume when a directory cannot be listed
	#[arg(long = "on-lookup-error", global = true, value_enum, default_value = "assume-parent")]
	pub lookup_policy: LookupFailurePolicy,

	/// Check directories one at a time instead of in parallel
	#[arg(long = "sequential", global = true)]
	pub sequential: bool,

	#[command(subcommand)]
	pub command: Command,
}

impl Cli {
	pub fn config(&self) -> Config {
		Config::resolve(self.root.clone(), self.log_dir.clone(), self.backup_dir.clone())
			.with_cleanup(self.cleanup)
			.with_lookup_policy(self.lookup_policy)
			.with_parallel(!self.sequential)
	}
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Report orphaned variants without changing anything
	Preview,

	/// Back up orphaned variants into an archive, then delete them
	Clean {
		/// Do not ask for confirmation
		#[arg(short = 'y', long = "yes")]
		auto_confirm: bool,
	},

	/// Restore files from a backup archive
	Restore {
		/// Archive file name, path or run stamp (default: newest backup in the logs)
		#[arg(value_name = "ARCHIVE")]
		archive: Option<String>,
	},

	/// Show help for a subcommand
	Help {
		/// Subcommand name
		subcommand: Option<String>,
	},
}
