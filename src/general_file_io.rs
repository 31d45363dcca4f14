// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! Path-based convenience wrappers over the in-memory codecs (ambient
//! stack, not part of the TIFF/Exif design budget). Grounded on
//! little_exif's file-level entry points (`Metadata::new_from_path`,
//! `write_to_file`) — read the whole file, run the in-memory codec, write
//! the whole file back.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::exif;
use crate::exif::ExifRecord;
use crate::jpeg::{self, Jpg};
use crate::png::{self, Png};

/// Reads a JPEG file and decodes its Exif record, per the library surface
/// in spec §6 (`decode_jpg_exif`), applied to a file path rather than an
/// already-decoded [`Jpg`].
pub fn read_jpg_file<P: AsRef<Path>>(path: P) -> Result<ExifRecord> {
    let bytes = fs::read(path).map_err(io_error)?;
    let jpg = jpeg::decode_jpg(&bytes)?;
    exif::decode_jpg_exif(&jpg)
}

/// Reads, mutates, and rewrites a JPEG file's Exif record in place.
/// No-op (but still rewrites the unchanged bytes) if the file has no
/// APP1 segment, matching [`exif::update_jpg_exif`]'s documented
/// limitation.
pub fn write_jpg_file<P: AsRef<Path>>(path: P, record: &ExifRecord) -> Result<()> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(io_error)?;
    let mut jpg = jpeg::decode_jpg(&bytes)?;
    exif::update_jpg_exif(&mut jpg, record)?;
    let encoded = jpeg::encode_jpg(&jpg)?;
    fs::write(path, encoded).map_err(io_error)
}

/// Decodes a JPEG file's full segment list, for callers that need more
/// than the Exif record (e.g. inspecting other APPn segments).
pub fn read_jpg_segments<P: AsRef<Path>>(path: P) -> Result<Jpg> {
    let bytes = fs::read(path).map_err(io_error)?;
    jpeg::decode_jpg(&bytes)
}

/// Reads a PNG file and decodes its chunk stream.
pub fn read_png_file<P: AsRef<Path>>(path: P) -> Result<Png> {
    let bytes = fs::read(path).map_err(io_error)?;
    png::decode_png(&bytes)
}

/// Encodes a chunk stream and writes it to a PNG file.
pub fn write_png_file<P: AsRef<Path>>(path: P, image: &Png) -> Result<()> {
    let encoded = png::encode_png(image)?;
    fs::write(path, encoded).map_err(io_error)
}

fn io_error(err: std::io::Error) -> crate::error::Error {
    crate::error::Error::invalid_input(format!("file I/O error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn missing_file_is_an_error() {
        let path = env::temp_dir().join("pixelmeta_does_not_exist.jpg");
        assert!(read_jpg_file(path).is_err());
    }

    #[test]
    fn png_file_round_trips() {
        let dir = env::temp_dir();
        let path = dir.join("pixelmeta_test_round_trip.png");

        let mut image = Png::default();
        image.chunks.push(crate::png::Chunk {
            chunk_type: *b"IEND",
            data: Vec::new(),
        });
        png::set_text(&mut image, "Test Key", "ABC123");

        write_png_file(&path, &image).unwrap();
        let read_back = read_png_file(&path).unwrap();
        assert_eq!(png::get_text(&read_back, "Test Key").as_deref(), Some("ABC123"));

        let _ = std::fs::remove_file(&path);
    }
}
