use std::{
	io::{self, Read},
	ops::Range,
	path::Path,
};

use flate2::{read::MultiGzDecoder, Compression, GzBuilder, GzHeader};
use tracing::debug;

use crate::{
	error::Error,
	format::{check_gzip, Format, BLOCK_SIZE},
	header, MEMBER_NAME,
};

/// Represents the offset of the extra flags byte within a gzip header.
const XFL_OFFSET: usize = 8;

/// Represents the metadata of a gzip header, kept so a stream can be reproduced exactly.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct GzipMeta {
	/// The modification time, in seconds since the epoch, or zero when unset.
	pub mtime: u32,

	/// The original file name, if present.
	pub filename: Option<Vec<u8>>,

	/// The comment, if present.
	pub comment: Option<Vec<u8>>,

	/// The extra field, if present.
	pub extra: Option<Vec<u8>>,

	/// The operating system which produced the stream.
	pub operating_system: u8,

	/// The compression level hinted at by the extra flags.
	pub level: u32,
}

/// Represents the wrapper around a text payload.
#[derive(Debug, Clone)]
pub enum TextWrapper {
	/// A plain gzip stream.
	Gzip(GzipMeta),

	/// A gzip stream wrapping a tar archive, along with the raw blocks surrounding the payload member.
	TarGz {
		/// The metadata of the gzip stream.
		gzip: GzipMeta,

		/// The blocks preceding the member header, including any extension headers and earlier members.
		prefix: Vec<u8>,

		/// The tar header of the payload member.
		member: tar::Header,

		/// The blocks following the member data, including the end blocks and record padding.
		suffix: Vec<u8>,
	},
}

/// Represents a text archive opened for editing.
#[derive(Debug, Clone)]
pub struct TextArchive {
	/// The raw text.
	pub payload: Vec<u8>,

	/// The wrapper the text was extracted from.
	pub wrapper: TextWrapper,
}

/// Represents a font container opened for editing.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct FontArchive {
	/// The FRM/TEX header preceding the texture.
	pub header: Vec<u8>,

	/// The DDS texture, starting with the DDS magic.
	pub payload: Vec<u8>,

	/// The metadata of the gzip stream.
	pub gzip: GzipMeta,
}

impl GzipMeta {
	/// Returns the compression level to reproduce the stream with.
	pub fn compression(&self) -> Compression {
		Compression::new(self.level)
	}

	/// Returns a builder which writes a gzip header carrying this metadata.
	pub fn builder(&self) -> GzBuilder {
		let mut builder = GzBuilder::new().mtime(self.mtime).operating_system(self.operating_system);

		if let Some(filename) = &self.filename {
			builder = builder.filename(filename.as_slice());
		}

		if let Some(comment) = &self.comment {
			builder = builder.comment(comment.as_slice());
		}

		if let Some(extra) = &self.extra {
			builder = builder.extra(extra.as_slice());
		}

		builder
	}

	fn from_header(header: Option<&GzHeader>, xfl: u8) -> Self {
		let level = match xfl {
			2 => Compression::best(),
			4 => Compression::fast(),
			_ => Compression::default(),
		};

		match header {
			Some(header) => Self {
				mtime: header.mtime(),
				filename: header.filename().map(<[u8]>::to_vec),
				comment: header.comment().map(<[u8]>::to_vec),
				extra: header.extra().map(<[u8]>::to_vec),
				operating_system: header.operating_system(),
				level: level.level(),
			},
			None => Self {
				level: level.level(),
				..Self::default()
			},
		}
	}
}

impl Default for GzipMeta {
	fn default() -> Self {
		Self {
			mtime: 0,
			filename: None,
			comment: None,
			extra: None,
			operating_system: 255,
			level: Compression::best().level(),
		}
	}
}

impl TextArchive {
	/// Returns the format the text was extracted from.
	pub fn format(&self) -> Format {
		self.wrapper.format()
	}
}

impl TextWrapper {
	/// Creates the wrapper used when no original archive is available: a tar member named `translation` inside a gzip stream.
	pub fn new_tar(mtime: u64) -> Result<Self, Error> {
		let mut member = tar::Header::new_ustar();

		member.set_path(MEMBER_NAME)?;
		member.set_entry_type(tar::EntryType::Regular);
		member.set_mode(0o644);
		member.set_mtime(mtime);
		member.set_size(0);
		member.set_cksum();

		Ok(Self::TarGz {
			gzip: GzipMeta::default(),
			prefix: Vec::new(),
			member,
			suffix: vec![0; BLOCK_SIZE * 2],
		})
	}

	/// Returns the format of the wrapper.
	pub fn format(&self) -> Format {
		match self {
			Self::Gzip(_) => Format::Gzip,
			Self::TarGz {
				..
			} => Format::TarGz,
		}
	}

	/// Returns the metadata of the gzip stream.
	pub fn gzip(&self) -> &GzipMeta {
		match self {
			Self::Gzip(gzip) => gzip,
			Self::TarGz {
				gzip,
				..
			} => gzip,
		}
	}

	/// Returns the name of the payload member, if the wrapper is a tar archive.
	pub fn member_name(&self) -> Option<String> {
		match self {
			Self::Gzip(_) => None,
			Self::TarGz {
				member,
				..
			} => member.path().ok().map(|path| path.display().to_string()),
		}
	}
}

/// Attempts to inflate the gzip stream held in `data`, returning its contents and header metadata.
///
/// Concatenated gzip members are inflated as one stream, with the metadata taken from the first.
pub fn inflate(data: &[u8]) -> Result<(Vec<u8>, GzipMeta), Error> {
	check_gzip(data)?;

	let mut decoder = MultiGzDecoder::new(data);
	let mut inflated = Vec::new();

	decoder.read_to_end(&mut inflated)?;

	let meta = GzipMeta::from_header(decoder.header(), data.get(XFL_OFFSET).copied().unwrap_or(0));

	debug!("inflated {} bytes into {} bytes", data.len(), inflated.len());

	Ok((inflated, meta))
}

/// Attempts to extract the text payload from the archive held in `data`.
///
/// If the archive is a compressed tar, the first regular file named `translation` (ignoring case and any leading directories) is extracted.
/// If no such member exists, a `Error::MissingMember` is returned listing the members that were present.
pub fn read_text(data: &[u8]) -> Result<TextArchive, Error> {
	let (inflated, gzip) = inflate(data)?;

	match Format::classify(&inflated) {
		Format::Gzip => Ok(TextArchive {
			payload: inflated,
			wrapper: TextWrapper::Gzip(gzip),
		}),
		Format::TarGz => {
			let (member, payload, span) = find_member(&inflated, MEMBER_NAME)?;

			Ok(TextArchive {
				payload,
				wrapper: TextWrapper::TarGz {
					gzip,
					prefix: inflated[..span.start].to_vec(),
					member,
					suffix: inflated[span.end..].to_vec(),
				},
			})
		}
	}
}

/// Attempts to extract the header and texture from the font container held in `data`.
pub fn read_font(data: &[u8]) -> Result<FontArchive, Error> {
	let (inflated, gzip) = inflate(data)?;
	let (header, payload) = header::split(&inflated)?;

	Ok(FontArchive {
		header: header.to_vec(),
		payload: payload.to_vec(),
		gzip,
	})
}

fn find_member(tarball: &[u8], name: &str) -> Result<(tar::Header, Vec<u8>, Range<usize>), Error> {
	let mut archive = tar::Archive::new(tarball);
	let mut available = Vec::new();

	for entry in archive.entries()? {
		let mut entry = entry?;
		let path = entry.path()?.into_owned();

		debug!("found member <{}>", path.display());

		if entry.header().entry_type().is_file() && is_member(&path, name) {
			let mut payload = Vec::new();

			entry.read_to_end(&mut payload)?;

			if payload.len() as u64 != entry.size() {
				return Err(io::Error::new(io::ErrorKind::UnexpectedEof, format!("member <{}> is truncated", path.display())).into());
			}

			// The member spans its header block and its data padded to whole blocks.

			let start = entry.raw_header_position() as usize;
			let end = (entry.raw_file_position() as usize + padded(payload.len())).min(tarball.len());

			return Ok((entry.header().clone(), payload, start..end));
		}

		available.push(path.display().to_string());
	}

	Err(Error::MissingMember {
		name: name.to_string(),
		available,
	})
}

pub(crate) fn padded(len: usize) -> usize {
	len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

fn is_member(path: &Path, name: &str) -> bool {
	let full = path.to_string_lossy();
	let base = path.file_name().map(|base| base.to_string_lossy());

	full.eq_ignore_ascii_case(name) || base.is_some_and(|base| base.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use flate2::Compression;

	use crate::{error::Error, format::Format, write::deflate, DDS_MAGIC};

	use super::{inflate, is_member, read_font, read_text, GzipMeta, TextWrapper};

	const TEXT: &[u8] = b"MENU_START=Nuova partita\nMENU_LOAD=Carica\n";

	#[test]
	fn test_is_member() {
		assert!(is_member(Path::new("translation"), "translation"));
		assert!(is_member(Path::new("TRANSLATION"), "translation"));
		assert!(is_member(Path::new("data/Translation"), "translation"));
		assert!(!is_member(Path::new("translation.txt"), "translation"));
		assert!(!is_member(Path::new("translation/readme"), "translation"));
	}

	#[test]
	fn test_inflate_meta() {
		let (inflated, meta) = inflate(include_bytes!("../test/translation_gz.dat")).expect("failed to inflate");

		assert_eq!(inflated, TEXT);
		assert_eq!(meta.mtime, 1_700_000_000);
		assert_eq!(meta.filename, None);
	}

	#[test]
	fn test_inflate_unknown_magic() {
		assert!(matches!(inflate(b"FRM\x02"), Err(Error::Format { .. })));
	}

	#[test]
	fn test_read_text_gzip() {
		let archive = read_text(include_bytes!("../test/translation_gz.dat")).expect("failed to read archive");

		assert_eq!(archive.payload, TEXT);
		assert_eq!(archive.wrapper.format(), Format::Gzip);
		assert_eq!(archive.wrapper.member_name(), None);
	}

	#[test]
	fn test_read_text_tar_gz() {
		let archive = read_text(include_bytes!("../test/translation_tar.dat")).expect("failed to read archive");

		assert_eq!(archive.payload, TEXT);
		assert_eq!(archive.wrapper.format(), Format::TarGz);
		assert_eq!(archive.wrapper.member_name().as_deref(), Some("data/Translation"));
	}

	#[test]
	fn test_read_text_missing_member() {
		let err = read_text(include_bytes!("../test/no_member.dat")).expect_err("expected a missing member");

		match err {
			Error::MissingMember {
				name,
				available,
			} => {
				assert_eq!(name, "translation");
				assert_eq!(available, vec!["credits".to_string()]);
			}
			err => panic!("unexpected error: {}", err),
		}
	}

	#[test]
	fn test_read_text_truncated_member() {
		let mut member = tar::Header::new_ustar();

		member.set_path("translation").expect("failed to set path");
		member.set_size(1 << 40);
		member.set_cksum();

		let mut tarball = member.as_bytes().to_vec();

		tarball.extend_from_slice(TEXT);

		let data = deflate(&tarball, &GzipMeta::default()).expect("failed to deflate");

		assert!(matches!(read_text(&data), Err(Error::Io(_))));
	}

	#[test]
	fn test_read_font() {
		let font = read_font(include_bytes!("../test/FontObj.fnt")).expect("failed to read font");

		assert_eq!(font.header, b"FRM\x02\x00\x00\x00TEX\x80\x00\x01\x00");
		assert_eq!(font.payload[0..4], DDS_MAGIC);
		assert_eq!(font.payload.len(), 128 + 512);
		assert_eq!(font.gzip.level, Compression::best().level());
	}

	#[test]
	fn test_read_font_not_gzip() {
		assert!(matches!(read_font(b"DDS |\x00\x00\x00"), Err(Error::Format { .. })));
	}

	#[test]
	fn test_new_tar_wrapper() {
		let wrapper = TextWrapper::new_tar(1_700_000_000).expect("failed to create wrapper");

		assert_eq!(wrapper.format(), Format::TarGz);
		assert_eq!(wrapper.member_name().as_deref(), Some("translation"));
		assert_eq!(wrapper.gzip(), &GzipMeta::default());
	}
}
