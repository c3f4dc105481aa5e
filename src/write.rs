use std::io::Write;

use tracing::debug;

use crate::{
	error::Error,
	format::BLOCK_SIZE,
	header,
	read::{padded, GzipMeta, TextWrapper},
};

/// Attempts to wrap the edited text in `payload` the same way as described by `wrapper`.
///
/// For a compressed tar, the blocks around the member are copied verbatim and the original member header is reused,
/// with its size and checksum rewritten only when the length of the text changed.
pub fn write_text(payload: &[u8], wrapper: &TextWrapper) -> Result<Vec<u8>, Error> {
	match wrapper {
		TextWrapper::Gzip(gzip) => deflate(payload, gzip),
		TextWrapper::TarGz {
			gzip,
			prefix,
			member,
			suffix,
		} => {
			let mut member = member.clone();
			let len = payload.len() as u64;

			if member.size().ok() != Some(len) {
				member.set_size(len);
				member.set_cksum();
			}

			let mut tarball = Vec::with_capacity(prefix.len() + BLOCK_SIZE + padded(payload.len()) + suffix.len());

			tarball.extend_from_slice(prefix);
			tarball.extend_from_slice(member.as_bytes());
			tarball.extend_from_slice(payload);
			tarball.resize(tarball.len() + padded(payload.len()) - payload.len(), 0);
			tarball.extend_from_slice(suffix);

			deflate(&tarball, gzip)
		}
	}
}

/// Attempts to prepend `header` to the edited texture in `payload` and compress the result into a font container.
pub fn write_font(payload: &[u8], header: &[u8], gzip: &GzipMeta) -> Result<Vec<u8>, Error> {
	deflate(&header::splice(header, payload), gzip)
}

/// Attempts to compress `data` into a single gzip stream carrying the metadata in `gzip`.
pub fn deflate(data: &[u8], gzip: &GzipMeta) -> Result<Vec<u8>, Error> {
	let mut encoder = gzip.builder().write(Vec::new(), gzip.compression());

	encoder.write_all(data)?;

	let deflated = encoder.finish()?;

	debug!("deflated {} bytes into {} bytes", data.len(), deflated.len());

	Ok(deflated)
}

#[cfg(test)]
mod tests {
	use flate2::Compression;

	use crate::{
		error::Error,
		format::Format,
		header::DEFAULT_HEADER,
		read::{inflate, read_font, read_text, GzipMeta, TextWrapper},
		DDS_MAGIC,
	};

	use super::{write_font, write_text};

	const TEXT: &[u8] = b"MENU_START=Nuova partita\nMENU_LOAD=Carica\n";

	fn texture() -> Vec<u8> {
		let mut texture = DDS_MAGIC.to_vec();

		texture.extend((0..640u32).map(|i| (i * 7) as u8));
		texture
	}

	#[test]
	fn test_round_trip_gzip() {
		let gzip = GzipMeta {
			mtime: 1_700_000_000,
			filename: Some(b"translation".to_vec()),
			..GzipMeta::default()
		};

		let original = write_text(TEXT, &TextWrapper::Gzip(gzip)).expect("failed to write archive");
		let archive = read_text(&original).expect("failed to read archive");

		assert_eq!(archive.payload, TEXT);
		assert_eq!(archive.wrapper.format(), Format::Gzip);
		assert_eq!(archive.wrapper.gzip().filename.as_deref(), Some(&b"translation"[..]));

		let repacked = write_text(&archive.payload, &archive.wrapper).expect("failed to repack archive");

		assert_eq!(repacked, original);
	}

	#[test]
	fn test_round_trip_tar_gz() {
		let wrapper = TextWrapper::new_tar(1_700_000_000).expect("failed to create wrapper");

		let original = write_text(TEXT, &wrapper).expect("failed to write archive");
		let archive = read_text(&original).expect("failed to read archive");

		assert_eq!(archive.payload, TEXT);
		assert_eq!(archive.wrapper.format(), Format::TarGz);
		assert_eq!(archive.wrapper.member_name().as_deref(), Some("translation"));

		let repacked = write_text(&archive.payload, &archive.wrapper).expect("failed to repack archive");

		assert_eq!(repacked, original);
	}

	#[test]
	fn test_repack_preserves_member() {
		let archive = read_text(include_bytes!("../test/translation_tar.dat")).expect("failed to read archive");
		let edited = b"MENU_START=New game\nMENU_LOAD=Load\nMENU_QUIT=Quit\n";

		let repacked = write_text(edited, &archive.wrapper).expect("failed to repack archive");
		let reread = read_text(&repacked).expect("failed to read repacked archive");

		assert_eq!(reread.payload, edited);
		assert_eq!(reread.wrapper.member_name().as_deref(), Some("data/Translation"));
		assert_eq!(reread.wrapper.gzip(), archive.wrapper.gzip());

		match (&reread.wrapper, &archive.wrapper) {
			(
				TextWrapper::TarGz {
					member: after,
					..
				},
				TextWrapper::TarGz {
					member: before,
					..
				},
			) => {
				assert_eq!(after.mtime().expect("failed to read mtime"), before.mtime().expect("failed to read mtime"));
				assert_eq!(after.size().expect("failed to read size"), edited.len() as u64);
			}
			_ => panic!("expected tar.gz wrappers"),
		}
	}

	#[test]
	fn test_repack_empty_text() {
		let wrapper = TextWrapper::new_tar(0).expect("failed to create wrapper");

		let repacked = write_text(b"", &wrapper).expect("failed to write archive");
		let archive = read_text(&repacked).expect("failed to read archive");

		assert!(archive.payload.is_empty());
		assert_eq!(archive.wrapper.format(), Format::TarGz);
	}

	#[test]
	fn test_round_trip_gzip_fixture() {
		let original = include_bytes!("../test/translation_gz.dat");
		let archive = read_text(original).expect("failed to read archive");

		let repacked = write_text(&archive.payload, &archive.wrapper).expect("failed to repack archive");

		assert_eq!(repacked, original);
	}

	#[test]
	fn test_round_trip_tar_gz_fixture() {
		let original = include_bytes!("../test/translation_tar.dat");
		let archive = read_text(original).expect("failed to read archive");

		let repacked = write_text(&archive.payload, &archive.wrapper).expect("failed to repack archive");

		assert_eq!(repacked, original);
	}

	#[test]
	fn test_round_trip_pax_fixture() {
		let original = include_bytes!("../test/translation_pax.dat");
		let archive = read_text(original).expect("failed to read archive");

		assert_eq!(archive.payload, TEXT);

		let repacked = write_text(&archive.payload, &archive.wrapper).expect("failed to repack archive");

		assert_eq!(repacked, original);
	}

	#[test]
	fn test_repack_keeps_record_padding() {
		let archive = read_text(include_bytes!("../test/translation_tar.dat")).expect("failed to read archive");
		let edited = "MENU_START=New game\n".repeat(15);

		let repacked = write_text(edited.as_bytes(), &archive.wrapper).expect("failed to repack archive");
		let (tarball, _) = inflate(&repacked).expect("failed to inflate repacked");

		assert_eq!(tarball.len(), 10240);
		assert_eq!(read_text(&repacked).expect("failed to read repacked archive").payload, edited.as_bytes());
	}

	#[test]
	fn test_round_trip_font() {
		let original = include_bytes!("../test/FontObj.fnt");
		let font = read_font(original).expect("failed to read font");

		let repacked = write_font(&font.payload, &font.header, &font.gzip).expect("failed to repack font");

		assert_eq!(repacked, original);
	}

	#[test]
	fn test_write_font_default_header() {
		let texture = texture();
		let font = write_font(&texture, &DEFAULT_HEADER, &GzipMeta::default()).expect("failed to write font");

		let (inflated, gzip) = inflate(&font).expect("failed to inflate font");

		assert_eq!(inflated[..14], DEFAULT_HEADER);
		assert_eq!(inflated[14..], texture[..]);
		assert_eq!(gzip.level, Compression::best().level());
		assert_eq!(gzip.operating_system, 255);
	}

	#[test]
	fn test_extract_repack_is_inverse() {
		let texture = texture();
		let font = write_font(&texture, &DEFAULT_HEADER, &GzipMeta::default()).expect("failed to write font");

		let extracted = read_font(&font).expect("failed to read font");

		assert_eq!(extracted.payload, texture);
		assert_eq!(extracted.header, DEFAULT_HEADER);
	}

	#[test]
	fn test_write_text_not_gzip_fails_read() {
		assert!(matches!(read_text(TEXT), Err(Error::Format { .. })));
	}
}
