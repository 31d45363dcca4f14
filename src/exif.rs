// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! The Exif adapter (component C): wraps/unwraps the `"Exif\0\0"` frame
//! around a TIFF structure and projects the handful of Exif sub-IFD tags
//! this crate knows about onto a friendly [`ExifRecord`]. Grounded on
//! little_exif's `metadata.rs` (`decode_metadata_general`/
//! `encode_metadata_general`), generalized from that module's full
//! tag-by-tag dispatch to the two fields spec'd here.

use log::debug;

use crate::error::{Error, Result};
use crate::jpeg::Jpg;
use crate::tiff::{decode_tiff, encode_tiff, EntryValue, Ifd, IfdEntry, Tiff, EXIF_IFD_POINTER_TAG};
use crate::endian::TypeCode;

const EXIF_FRAME_HEADER: [u8; 6] = [b'E', b'x', b'i', b'f', 0x00, 0x00];

const TAG_EXIF_VERSION: u16 = 0x9000;
const TAG_USER_COMMENT: u16 = 0x9286;

const ASCII_ENCODING_TAG: [u8; 8] = *b"ASCII\0\0\0";

/// JPEG marker byte for APP1 (`0xFFE1`), the segment that carries Exif.
const APP1_MARKER: u8 = 0xe1;

/// The subset of Exif sub-IFD fields this crate understands. Fields absent
/// on decode are `None`; fields left `None` on encode are simply omitted
/// from the written sub-IFD (spec §3 "Exif record").
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExifRecord {
    pub exif_version: Option<String>,
    pub user_comment: Option<String>,
}

impl ExifRecord {
    pub fn is_empty(&self) -> bool {
        self.exif_version.is_none() && self.user_comment.is_none()
    }
}

/// Decodes an Exif APP1 payload (`size | "Exif\0\0" | TIFF`) into an
/// [`ExifRecord`], per spec §4.C.
pub fn decode_exif(bytes: &[u8]) -> Result<ExifRecord> {
    let tiff_bytes = check_frame(bytes)?;
    let tiff = decode_tiff(tiff_bytes)?;
    Ok(project_record(&tiff))
}

/// Builds an Exif APP1 payload from an [`ExifRecord`], per spec §4.C. The
/// inner TIFF is always little-endian, matching §6's "the only choices
/// where the library fixes an answer" list.
pub fn encode_exif(record: &ExifRecord) -> Result<Vec<u8>> {
    let sub_ifd = build_sub_ifd(record)?;

    let mut tiff = Tiff::new(true);
    tiff.ifds.push(Ifd {
        entries: vec![IfdEntry::new(
            EXIF_IFD_POINTER_TAG,
            TypeCode::Uint32,
            EntryValue::SubIfd(sub_ifd),
        )],
    });

    let tiff_bytes = encode_tiff(&tiff)?;
    Ok(wrap_frame(&tiff_bytes))
}

/// Reads the Exif record out of a JPEG's first APP1 segment, or the empty
/// record if there is none (spec §4.C, property 5).
pub fn decode_jpg_exif(jpg: &Jpg) -> Result<ExifRecord> {
    match find_app1(jpg) {
        Some(segment) => decode_exif(&segment.data),
        None => {
            debug!("no APP1 segment present; returning empty Exif record");
            Ok(ExifRecord::default())
        }
    }
}

/// Replaces the first APP1 segment's payload with a freshly framed Exif
/// record. A no-op if no APP1 segment exists (spec §4.C "JPEG-level
/// mutation"; §9 "a known limitation").
pub fn update_jpg_exif(jpg: &mut Jpg, record: &ExifRecord) -> Result<()> {
    let Some(segment) = find_app1_mut(jpg) else {
        debug!("update_jpg_exif: no APP1 segment present, no-op");
        return Ok(());
    };

    // `encode_exif` already emits `size | "Exif\0\0" | TIFF`, and `size` is
    // the JPEG segment's own length field (spec §4.C: the two coincide) —
    // no separate length prefix is added here.
    segment.data = encode_exif(record)?;

    Ok(())
}

fn find_app1(jpg: &Jpg) -> Option<&crate::jpeg::Segment> {
    jpg.segments.iter().find(|s| s.marker == APP1_MARKER)
}

fn find_app1_mut(jpg: &mut Jpg) -> Option<&mut crate::jpeg::Segment> {
    jpg.segments.iter_mut().find(|s| s.marker == APP1_MARKER)
}

/// Validates the `size | "Exif\0\0" | TIFF` frame (spec §4.C "Frame") and
/// returns the TIFF tail. `size` is a 2-byte big-endian field preceding the
/// 6-byte header, so the header itself is checked at offset 2.
fn check_frame(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < 8 {
        return Err(Error::malformed(bytes, 0, "truncated Exif frame"));
    }
    if bytes[2..8] != EXIF_FRAME_HEADER {
        return Err(Error::malformed(bytes, 2, "bad Exif frame header"));
    }
    Ok(&bytes[8..])
}

fn wrap_frame(tiff_bytes: &[u8]) -> Vec<u8> {
    let size = (tiff_bytes.len() + EXIF_FRAME_HEADER.len() + 2) as u16;
    let mut out = Vec::with_capacity(2 + EXIF_FRAME_HEADER.len() + tiff_bytes.len());
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(&EXIF_FRAME_HEADER);
    out.extend_from_slice(tiff_bytes);
    out
}

/// Walks IFD0's `0x8769` entry (if present and well-formed) and projects
/// its known tags, per spec §4.C steps 2-5.
fn project_record(tiff: &Tiff) -> ExifRecord {
    let mut record = ExifRecord::default();

    let Some(ifd0) = tiff.ifds.first() else {
        return record;
    };

    let sub_ifd = match ifd0.get(EXIF_IFD_POINTER_TAG) {
        Some(entry) => match &entry.value {
            EntryValue::SubIfd(sub) => sub,
            _ => {
                debug!("0x8769 present but not resolved to a sub-IFD; ignoring");
                return record;
            }
        },
        None => return record,
    };

    for entry in &sub_ifd.entries {
        match (entry.tag, &entry.value) {
            (TAG_EXIF_VERSION, EntryValue::Undefined(bytes)) if bytes.len() == 4 => {
                record.exif_version = Some(String::from_utf8_lossy(bytes).into_owned());
            }
            (TAG_USER_COMMENT, EntryValue::Undefined(bytes)) if bytes.len() >= 8 => {
                record.user_comment = Some(String::from_utf8_lossy(&bytes[8..]).into_owned());
            }
            (tag, _) => {
                debug!("ignoring unrecognized or malformed Exif sub-IFD tag {tag:#06x}");
            }
        }
    }

    record
}

/// Builds the Exif sub-IFD for the present fields of `record`, per spec
/// §4.C "Encode".
fn build_sub_ifd(record: &ExifRecord) -> Result<Ifd> {
    let mut entries = Vec::new();

    if let Some(version) = &record.exif_version {
        let bytes = version.as_bytes();
        if bytes.len() != 4 {
            return Err(Error::invalid_input(format!(
                "ExifVersion must encode to exactly 4 bytes, got {}",
                bytes.len()
            )));
        }
        entries.push(IfdEntry::new(
            TAG_EXIF_VERSION,
            TypeCode::Undefined8,
            EntryValue::Undefined(bytes.to_vec()),
        ));
    }

    if let Some(comment) = &record.user_comment {
        let mut bytes = Vec::with_capacity(8 + comment.len());
        bytes.extend_from_slice(&ASCII_ENCODING_TAG);
        bytes.extend_from_slice(comment.as_bytes());
        entries.push(IfdEntry::new(
            TAG_USER_COMMENT,
            TypeCode::Undefined8,
            EntryValue::Undefined(bytes),
        ));
    }

    Ok(Ifd { entries })
}
