//! Command-line application for extracting and repacking the DDS texture of `.fnt` font containers.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tt2_tools::tool;

/// Extracts and repacks .fnt font files (gzip with an FRM/TEX header)
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
	/// Extract the DDS texture from a font, removing the FRM/TEX header
	Extract {
		/// Specifies the font to extract
		#[arg(default_value = "FontObj.fnt")]
		font: PathBuf,

		/// Specifies the texture to write, defaulting to the font path with a .dds extension
		target: Option<PathBuf>,
	},

	/// Repack an edited DDS texture into a font, restoring the FRM/TEX header
	Repack {
		/// Specifies the edited texture
		#[arg(default_value = "FontObj.dds")]
		source: PathBuf,

		/// Specifies the font to write, defaulting to the texture path with a .fnt extension
		font: Option<PathBuf>,

		/// Specifies an original font whose header is reused instead of the default
		reference: Option<PathBuf>,
	},

	/// Inspect the header and texture of a font
	Inspect {
		/// Specifies the font to inspect
		#[arg(default_value = "FontObj.fnt")]
		font: PathBuf,
	},
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt().without_time().with_target(false).init();

	let cli = Cli::parse();

	match cli.operation {
		Operation::Extract {
			font,
			target,
		} => {
			let target = target.unwrap_or_else(|| tool::texture_path(&font));

			tool::extract_font(&font, &target).with_context(|| format!("failed to extract {}", font.display()))?;
		}
		Operation::Repack {
			source,
			font,
			reference,
		} => {
			let font = font.unwrap_or_else(|| tool::font_path(&source));

			tool::repack_font(&source, &font, reference.as_deref()).with_context(|| format!("failed to repack {}", source.display()))?;
		}
		Operation::Inspect {
			font,
		} => {
			let (archive, header, info) = tool::inspect_font(&font).with_context(|| format!("failed to inspect {}", font.display()))?;

			println!("header: {} bytes, FRM {:#010x}, TEX {:#010x}", archive.header.len(), header.frm, header.tex);
			println!("texture: {} bytes, {}x{}, {} mipmaps, {}", archive.payload.len(), info.width, info.height, info.mip_maps, info.four_cc_str().as_deref().unwrap_or("uncompressed"));
		}
	}

	Ok(())
}
