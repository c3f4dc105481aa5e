use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::{error::Error, DDS_MAGIC};

/// Represents the number of bytes of an FRM/TEX header.
pub const HEADER_SIZE: usize = 14;

/// Represents the header shipped with the game's fonts, used when no reference font is available.
pub const DEFAULT_HEADER: [u8; HEADER_SIZE] = [
	0x46, 0x52, 0x4d, 0x02, 0x00, 0x00, 0x00, // FRM
	0x54, 0x45, 0x58, 0x80, 0x00, 0x01, 0x00, // TEX
];

/// Represents the tag opening the FRM block.
const FRM_TAG: [u8; 3] = *b"FRM";

/// Represents the tag opening the TEX block.
const TEX_TAG: [u8; 3] = *b"TEX";

/// Represents the decoded fields of an FRM/TEX header.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct FontHeader {
	/// The value following the FRM tag.
	pub frm: u32,

	/// The value following the TEX tag.
	pub tex: u32,
}

impl FontHeader {
	/// Attempts to decode the fields of the header held in `bytes`.
	///
	/// Any bytes beyond the fixed header size are ignored.
	pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
		if bytes.len() < HEADER_SIZE {
			return Err(Error::InvalidHeader);
		}

		let mut cursor = Cursor::new(bytes);

		let frm = read_tagged(&mut cursor, FRM_TAG)?;
		let tex = read_tagged(&mut cursor, TEX_TAG)?;

		Ok(Self {
			frm,
			tex,
		})
	}
}

/// Splits inflated font data into the header preceding the first DDS marker and the texture from the marker onwards.
pub fn split(data: &[u8]) -> Result<(&[u8], &[u8]), Error> {
	let pos = data.windows(DDS_MAGIC.len()).position(|window| window == DDS_MAGIC).ok_or(Error::MissingDdsMarker)?;

	if pos != HEADER_SIZE {
		debug!("found {} byte header where {} were expected", pos, HEADER_SIZE);
	}

	Ok(data.split_at(pos))
}

/// Joins a header and a texture back into inflated font data.
pub fn splice(header: &[u8], texture: &[u8]) -> Vec<u8> {
	let mut data = Vec::with_capacity(header.len() + texture.len());

	data.extend_from_slice(header);
	data.extend_from_slice(texture);

	data
}

fn read_tagged<R>(inner: &mut R, tag: [u8; 3]) -> Result<u32, Error>
where
	R: Read,
{
	let mut buf = [0; 3];

	inner.read_exact(&mut buf)?;

	if buf != tag {
		return Err(Error::InvalidHeader);
	}

	Ok(inner.read_u32::<LittleEndian>()?)
}
