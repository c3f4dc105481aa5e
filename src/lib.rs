//! Library for unpacking and repacking the `translation.dat` text archive and the `.fnt` font containers used by Tony Tough 2.
//!
//! Both formats are gzip streams: the text archive is either a plain gzip stream or a gzip-compressed tar holding a single `translation` member,
//! and a font container is a short FRM/TEX header followed by a DDS texture, compressed as a whole.

use error::Error;
use format::Format;

/// Contains the minimal reader for DDS surface headers.
pub mod dds;

/// Contains types for errors.
pub mod error;

/// Contains the tagged variant for archive formats and the logic for sniffing them.
pub mod format;

/// Contains the FRM/TEX font header and the logic for splitting it from its texture.
pub mod header;

/// Contains types and the accompanying logic for extracting payloads from archives.
pub mod read;

/// Contains file-level operations backing the command-line tools.
pub mod tool;

/// Contains the logic for re-wrapping edited payloads into archives.
pub mod write;

/// Represents the magic bytes at the start of every gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Represents the magic bytes at the start of a DDS texture.
pub const DDS_MAGIC: [u8; 4] = [0x44, 0x44, 0x53, 0x20]; // DDS

/// Represents the name of the text member inside a tar archive, compared case-insensitively.
pub const MEMBER_NAME: &str = "translation";

/// Attempts to classify the compressed archive held in `data`.
///
/// If the data is a gzip stream, its contents are inflated to tell a compressed tar apart from a plain stream.
/// If the data does not start with the gzip magic, a `Error::Format` is returned.
pub fn detect(data: &[u8]) -> Result<Format, Error> {
	let (inflated, _) = read::inflate(data)?;

	Ok(Format::classify(&inflated))
}
