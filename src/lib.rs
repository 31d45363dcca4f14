// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! Round-trippable reading and writing of image container metadata:
//! JPEG segment streams, PNG chunk streams, and TIFF/Exif directory
//! trees.
//!
//! Decoding an image yields an in-memory model whose re-encoding
//! reproduces the original bytes exactly; targeted mutations (Exif tag
//! edits, PNG textual metadata) produce a file other tools accept. The
//! TIFF/Exif subsystem (see [`tiff`] and [`exif`]) is the hard part: a
//! pointer-linked directory structure with runtime endianness, twelve
//! primitive value types, inline-vs-offset value storage, and nested
//! IFDs. JPEG ([`jpeg`]) and PNG ([`png`]) are comparatively simple
//! length-prefixed segment/chunk streams.

pub mod endian;
pub mod error;
pub mod exif;
pub mod general_file_io;
pub mod jpeg;
pub mod png;
pub mod tiff;

pub use error::{Error, Result};
pub use exif::{decode_exif, decode_jpg_exif, encode_exif, update_jpg_exif, ExifRecord};
pub use general_file_io::{read_jpg_file, read_png_file, write_jpg_file, write_png_file};
pub use jpeg::{decode_jpg, encode_jpg, Jpg, Segment};
pub use png::{get_text, set_text, Chunk, Png};
pub use tiff::{decode_ifd, decode_tiff, encode_tiff, EntryValue, Ifd, IfdEntry, Tiff};
