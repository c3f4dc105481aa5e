use std::{io, path::PathBuf};

use thiserror::Error;

/// Represents an error raised while extracting or repacking an archive.
#[derive(Debug, Error)]
pub enum Error {
	/// Indicates that a generic I/O error occurred.
	#[error("input/output error [{0}]")]
	Io(#[from] io::Error),

	/// Indicates that an input file does not exist.
	#[error("{} not found", .0.display())]
	FileNotFound(PathBuf),

	/// Indicates that the leading bytes matched no known format.
	#[error("unknown file format (magic: {})", hex(.magic))]
	Format {
		/// The leading bytes that were read, at most two.
		magic: Vec<u8>,
	},

	/// Indicates that the tar archive holds no member with the expected name.
	#[error("'{name}' not found in archive (available: {})", .available.join(", "))]
	MissingMember {
		/// The name that was searched for.
		name: String,

		/// The names of the members that were present.
		available: Vec<String>,
	},

	/// Indicates that a font container holds no DDS texture.
	#[error("DDS marker not found")]
	MissingDdsMarker,

	/// Indicates that a font header was not in the expected FRM/TEX layout.
	#[error("invalid FRM/TEX header")]
	InvalidHeader,

	/// Indicates that a texture was too short or lacked the DDS magic.
	#[error("invalid DDS header")]
	InvalidDds,
}

fn hex(bytes: &[u8]) -> String {
	bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
