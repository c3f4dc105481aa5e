use std::{
	fs,
	path::{Path, PathBuf},
	time::UNIX_EPOCH,
};

use tracing::{info, warn};

use crate::{
	dds::DdsInfo,
	error::Error,
	header::{FontHeader, DEFAULT_HEADER},
	read::{self, FontArchive, GzipMeta, TextArchive, TextWrapper},
	write, DDS_MAGIC,
};

/// Represents the extensions stripped from an edited texture when naming the repacked font.
const TEXTURE_EXTENSIONS: [&str; 3] = ["dds", "frm", "bin"];

/// Represents where the header of a repacked font came from.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum HeaderSource {
	/// The header was copied from a reference font.
	Reference,

	/// The built-in default header was used.
	Default,
}

/// Represents where the wrapper of a repacked text archive came from.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum WrapperSource {
	/// The wrapper was copied from the reference archive given explicitly.
	Reference,

	/// The wrapper was copied from the archive being overwritten.
	Existing,

	/// A new tar archive was created.
	Default,
}

/// Attempts to read the whole file at `path`, reporting a missing file as `Error::FileNotFound`.
pub fn read_input(path: &Path) -> Result<Vec<u8>, Error> {
	if !path.exists() {
		return Err(Error::FileNotFound(path.to_path_buf()));
	}

	Ok(fs::read(path)?)
}

/// Attempts to extract the text held in the archive at `archive` to the file at `target`.
pub fn extract_text(archive: &Path, target: &Path) -> Result<TextArchive, Error> {
	let data = read_input(archive)?;

	info!("Extracting from {}...", archive.display());

	let text = read::read_text(&data)?;

	if let Some(name) = text.wrapper.member_name() {
		info!("Found translation file: {}", name);
	}

	fs::write(target, &text.payload)?;

	info!("Successfully extracted {} archive to {} ({} bytes)", text.wrapper.format(), target.display(), text.payload.len());

	Ok(text)
}

/// Attempts to repack the edited text at `source` into an archive at `archive`.
///
/// The wrapper is copied from `reference` if given, otherwise from the archive being overwritten if it is readable,
/// otherwise a new tar archive is created with a member stamped with the modification time of `source`.
pub fn repack_text(source: &Path, archive: &Path, reference: Option<&Path>) -> Result<WrapperSource, Error> {
	let payload = read_input(source)?;

	info!("Repacking {} into {}...", source.display(), archive.display());

	let (wrapper, origin) = match reference {
		Some(reference) => (read::read_text(&read_input(reference)?)?.wrapper, WrapperSource::Reference),
		None => match existing_wrapper(archive) {
			Some(wrapper) => (wrapper, WrapperSource::Existing),
			None => (TextWrapper::new_tar(modified(source))?, WrapperSource::Default),
		},
	};

	if !origin.is_preserved() {
		info!("No original archive available, creating a new {} archive", wrapper.format());
	}

	let data = write::write_text(&payload, &wrapper)?;

	fs::write(archive, &data)?;

	info!("Successfully created {} archive {} ({} bytes)", wrapper.format(), archive.display(), data.len());

	Ok(origin)
}

/// Attempts to read the text archive at `archive` without extracting it.
pub fn inspect_text(archive: &Path) -> Result<TextArchive, Error> {
	read::read_text(&read_input(archive)?)
}

/// Attempts to extract the texture held in the font at `font` to the file at `target`, dropping the FRM/TEX header.
pub fn extract_font(font: &Path, target: &Path) -> Result<FontArchive, Error> {
	let data = read_input(font)?;

	info!("Extracting from {}...", font.display());

	let archive = read::read_font(&data)?;

	info!("Found FRM/TEX header ({} bytes), removing before DDS...", archive.header.len());

	fs::write(target, &archive.payload)?;

	info!("Successfully extracted to {} ({} bytes, DDS image only)", target.display(), archive.payload.len());

	Ok(archive)
}

/// Attempts to repack the edited texture at `source` into a font at `font`.
///
/// The header and gzip metadata are copied from `reference` if it is a readable font, otherwise the default header is used.
pub fn repack_font(source: &Path, font: &Path, reference: Option<&Path>) -> Result<HeaderSource, Error> {
	let payload = read_input(source)?;

	info!("Repacking {} into {}...", source.display(), font.display());

	if !payload.starts_with(&DDS_MAGIC) {
		warn!("{} does not start with the DDS marker", source.display());
	}

	let (header, gzip, origin) = match reference.map(reference_font) {
		Some(Ok(archive)) => {
			info!("Using FRM/TEX header from original file ({} bytes)", archive.header.len());

			(archive.header, archive.gzip, HeaderSource::Reference)
		}
		Some(Err(err)) => {
			warn!("Failed to read original font [{}], using default FRM/TEX header", err);

			(DEFAULT_HEADER.to_vec(), GzipMeta::default(), HeaderSource::Default)
		}
		None => {
			info!("Using default FRM/TEX header ({} bytes)", DEFAULT_HEADER.len());

			(DEFAULT_HEADER.to_vec(), GzipMeta::default(), HeaderSource::Default)
		}
	};

	let data = write::write_font(&payload, &header, &gzip)?;

	fs::write(font, &data)?;

	info!("Successfully created {} ({} bytes compressed)", font.display(), data.len());

	Ok(origin)
}

/// Attempts to read the font at `font` and decode its header and texture properties.
pub fn inspect_font(font: &Path) -> Result<(FontArchive, FontHeader, DdsInfo), Error> {
	let archive = read::read_font(&read_input(font)?)?;
	let header = FontHeader::parse(&archive.header)?;
	let info = DdsInfo::parse(&archive.payload)?;

	Ok((archive, header, info))
}

/// Returns the default texture path for the font at `font`: the same path with a `dds` extension.
pub fn texture_path(font: &Path) -> PathBuf {
	font.with_extension("dds")
}

/// Returns the default font path for the texture at `source`: the path with its texture extensions removed and a `fnt` extension.
pub fn font_path(source: &Path) -> PathBuf {
	let mut stem = source.with_extension("");

	if stem.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| TEXTURE_EXTENSIONS.contains(&ext)) {
		stem = stem.with_extension("");
	}

	let mut name = stem.into_os_string();

	name.push(".fnt");

	PathBuf::from(name)
}

fn reference_font(reference: &Path) -> Result<FontArchive, Error> {
	read::read_font(&read_input(reference)?)
}

fn existing_wrapper(archive: &Path) -> Option<TextWrapper> {
	let data = fs::read(archive).ok()?;

	match read::read_text(&data) {
		Ok(text) => {
			info!("Keeping {} format of existing {}", text.wrapper.format(), archive.display());

			Some(text.wrapper)
		}
		Err(err) => {
			warn!("Ignoring existing {} [{}]", archive.display(), err);

			None
		}
	}
}

fn modified(path: &Path) -> u64 {
	fs::metadata(path)
		.and_then(|meta| meta.modified())
		.ok()
		.and_then(|time| time.duration_since(UNIX_EPOCH).ok())
		.map_or(0, |duration| duration.as_secs())
}

impl WrapperSource {
	/// Returns if the archive format was carried over from an earlier archive.
	pub fn is_preserved(&self) -> bool {
		!matches!(self, Self::Default)
	}
}
