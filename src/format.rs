use std::fmt::{self, Display};

use crate::{error::Error, GZIP_MAGIC};

/// Represents the number of bytes of a tar header block.
pub const BLOCK_SIZE: usize = 512;

/// Represents the byte range of the checksum field within a tar header block.
const CHECKSUM_RANGE: std::ops::Range<usize> = 148..156;

/// Represents the format of a compressed archive.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Format {
	/// A plain gzip stream whose contents are the payload itself.
	Gzip,

	/// A gzip stream wrapping a tar archive with a named payload member.
	TarGz,
}

impl Format {
	/// Classifies already-inflated gzip contents as either a tar archive or a plain payload.
	pub fn classify(inflated: &[u8]) -> Self {
		if is_tar(inflated) {
			Self::TarGz
		} else {
			Self::Gzip
		}
	}
}

impl Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Gzip => write!(f, "gzip"),
			Self::TarGz => write!(f, "tar.gz"),
		}
	}
}

/// Checks that `data` starts with the gzip magic.
pub fn check_gzip(data: &[u8]) -> Result<(), Error> {
	match data.get(..GZIP_MAGIC.len()) {
		Some(magic) if magic == GZIP_MAGIC => Ok(()),
		_ => Err(Error::Format {
			magic: data.iter().take(GZIP_MAGIC.len()).copied().collect(),
		}),
	}
}

fn is_tar(data: &[u8]) -> bool {
	let Some(block) = data.get(..BLOCK_SIZE) else {
		return false;
	};

	let mut header = tar::Header::new_old();

	header.as_mut_bytes().copy_from_slice(block);

	if header.as_ustar().is_some() || header.as_gnu().is_some() {
		return true;
	}

	// Pre-POSIX archives carry no magic, only a checksum.

	match header.cksum() {
		Ok(stored) => stored != 0 && stored == checksum(block),
		Err(_) => false,
	}
}

fn checksum(block: &[u8]) -> u32 {
	block
		.iter()
		.enumerate()
		.map(|(i, &b)| if CHECKSUM_RANGE.contains(&i) { u32::from(b' ') } else { u32::from(b) })
		.sum()
}
