//! Command-line application for extracting and repacking the `translation.dat` text archive.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tt2_tools::tool;

/// Extracts and repacks the translation archive (gzip or tar.gz)
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
	/// Indicates the operation to perform
	#[command(subcommand)]
	operation: Operation,
}

/// Represents the operation to perform
#[derive(Debug, Subcommand)]
enum Operation {
	/// Extract the 'translation' text from an archive
	Extract {
		/// Specifies the archive to extract
		#[arg(default_value = "translation.dat")]
		archive: PathBuf,

		/// Specifies the text file to write
		#[arg(default_value = "translation.txt")]
		target: PathBuf,
	},

	/// Repack an edited text file into an archive
	Repack {
		/// Specifies the edited text file
		#[arg(default_value = "translation.txt")]
		source: PathBuf,

		/// Specifies the archive to write
		#[arg(default_value = "translation.dat")]
		archive: PathBuf,

		/// Specifies an original archive whose format and metadata are reused
		reference: Option<PathBuf>,
	},

	/// Inspect an archive without extracting it
	Inspect {
		/// Specifies the archive to inspect
		#[arg(default_value = "translation.dat")]
		archive: PathBuf,
	},
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt().without_time().with_target(false).init();

	let cli = Cli::parse();

	match cli.operation {
		Operation::Extract {
			archive,
			target,
		} => {
			tool::extract_text(&archive, &target).with_context(|| format!("failed to extract {}", archive.display()))?;
		}
		Operation::Repack {
			source,
			archive,
			reference,
		} => {
			tool::repack_text(&source, &archive, reference.as_deref()).with_context(|| format!("failed to repack {}", source.display()))?;
		}
		Operation::Inspect {
			archive,
		} => {
			let text = tool::inspect_text(&archive).with_context(|| format!("failed to inspect {}", archive.display()))?;
			let gzip = text.wrapper.gzip();

			println!("format: {}", text.format());
			println!("member: {}", text.wrapper.member_name().as_deref().unwrap_or("-"));
			println!("size: {} bytes", text.payload.len());
			println!("gzip mtime: {}, os: {}, level: {}", gzip.mtime, gzip.operating_system, gzip.level);

			if let Some(filename) = &gzip.filename {
				println!("gzip name: {}", String::from_utf8_lossy(filename));
			}
		}
	}

	Ok(())
}
