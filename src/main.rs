//! thumbsweep - orphaned image variant cleanup
//!
//! Scans a year/month media library for generated size variants whose
//! original is gone, backs them up into a restorable archive and removes them.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::Colorize;

use thumbsweep::cli::{Cli, Command};
use thumbsweep::commands::{self, clean::CleanOutcome};
use thumbsweep::config::Config;
use thumbsweep::error::SweepError;
use thumbsweep::ui::{self, Log};

fn main() {
	let cli = Cli::parse();
	Log::set_verbose(cli.verbose);

	if let Command::Help { subcommand } = &cli.command {
		print_help(subcommand.as_deref());
		return;
	}

	let config = cli.config();
	print_header();

	if let Err(err) = run(cli.command, &config) {
		ui::error(&format!("{:#}", err));
		if let Some(SweepError::ArchiveLocate(_)) = err.downcast_ref::<SweepError>() {
			ui::info(&format!("Backups are kept in {}", config.backup_dir.display()));
		}
		std::process::exit(1);
	}
}

fn run(command: Command, config: &Config) -> Result<()> {
	match command {
		Command::Preview => {
			commands::preview::run(config)?;
		}
		Command::Clean { auto_confirm } => {
			if let CleanOutcome::Cleaned(summary) = commands::clean::run(config, auto_confirm)? {
				if summary.deleted.failed > 0 {
					ui::warn("Some files could not be deleted, see the audit log");
				}
			}
		}
		Command::Restore { archive } => {
			commands::restore::run(config, archive.as_deref())?;
		}
		Command::Help { .. } => unreachable!("handled before config is built"),
	}
	Ok(())
}

fn print_help(subcommand: Option<&str>) {
	let mut cmd = Cli::command();
	let printed = match subcommand {
		Some(sub) => match cmd.find_subcommand_mut(sub) {
			Some(sub_cmd) => sub_cmd.print_help(),
			None => {
				eprintln!("Unknown subcommand: {}", sub);
				cmd.print_help()
			}
		},
		None => cmd.print_help(),
	};
	if let Err(e) = printed {
		eprintln!("{}", e);
	}
}

fn print_header() {
	println!();
	println!(
		"{}",
		format!("─── thumbsweep v{} ───", env!("CARGO_PKG_VERSION"))
			.bright_blue()
			.bold()
	);
}
