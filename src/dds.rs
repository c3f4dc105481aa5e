use std::io::{Cursor, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::{error::Error, DDS_MAGIC};

/// Represents the number of bytes of the magic and surface header combined.
pub const DDS_HEADER_SIZE: usize = 128;

/// Represents the offset of the FourCC code within the pixel format.
const FOURCC_OFFSET: u64 = 84;

/// Represents the surface properties of a DDS texture relevant when inspecting a font.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct DdsInfo {
	/// The height of the surface, in pixels.
	pub height: u32,

	/// The width of the surface, in pixels.
	pub width: u32,

	/// The number of mipmap levels, zero when unset.
	pub mip_maps: u32,

	/// The FourCC code of the pixel format, zeroed for uncompressed surfaces.
	pub four_cc: [u8; 4],
}

impl DdsInfo {
	/// Attempts to read the surface header at the start of `texture`.
	pub fn parse(texture: &[u8]) -> Result<Self, Error> {
		if texture.len() < DDS_HEADER_SIZE || texture[..DDS_MAGIC.len()] != DDS_MAGIC {
			return Err(Error::InvalidDds);
		}

		let mut cursor = Cursor::new(texture);

		// Skip the magic, the header size and the flags.

		cursor.seek(SeekFrom::Start(12))?;

		let height = cursor.read_u32::<LittleEndian>()?;
		let width = cursor.read_u32::<LittleEndian>()?;
		let _ = cursor.read_u32::<LittleEndian>()?; // Pitch or linear size
		let _ = cursor.read_u32::<LittleEndian>()?; // Depth
		let mip_maps = cursor.read_u32::<LittleEndian>()?;

		cursor.seek(SeekFrom::Start(FOURCC_OFFSET))?;

		let four_cc = cursor.read_u32::<LittleEndian>()?.to_le_bytes();

		Ok(Self {
			height,
			width,
			mip_maps,
			four_cc,
		})
	}

	/// Returns the FourCC code as text, or `None` for an uncompressed surface.
	pub fn four_cc_str(&self) -> Option<String> {
		match self.four_cc {
			[0, 0, 0, 0] => None,
			code => Some(code.iter().map(|&b| char::from(b)).collect()),
		}
	}
}
