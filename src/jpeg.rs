// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! The JPEG segment codec (component D): a thin, marker-framed segment
//! model the Exif adapter treats as a collaborator. Grounded on
//! `other_examples/8141f410_TechnikTobi-little_exif__src-jpg.rs.rs`'s
//! `generic_read_metadata`/`skip_ecs`/`encode_metadata_jpg`, generalized
//! from that module's Exif-specific segment surgery to a full,
//! general-purpose decode/encode of the entire segment list (spec §4.D).

use crate::error::{Error, Result};

const MARKER_PREFIX: u8 = 0xff;

const SOI: u8 = 0xd8;
const EOI: u8 = 0xd9;
const SOS: u8 = 0xda;
const RST_FIRST: u8 = 0xd0;
const RST_LAST: u8 = 0xd7;
const DRI: u8 = 0xdd;

/// One JPEG marker segment. `marker` is the second byte of the `0xFF`
/// marker pair. `data` holds the segment's payload as it appears on the
/// wire: for length-prefixed segments that includes the two big-endian
/// length bytes themselves (spec §3 "JPEG segment").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub marker: u8,
    pub data: Vec<u8>,
}

/// A decoded JPEG byte stream: an ordered list of segments, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Jpg {
    pub segments: Vec<Segment>,
}

/// Decodes a complete JPEG byte stream into its segment list, per spec
/// §4.D / §6 "JPEG framing".
pub fn decode_jpg(bytes: &[u8]) -> Result<Jpg> {
    let mut segments = Vec::new();
    let mut cursor = 0usize;

    while cursor < bytes.len() {
        if bytes[cursor] != MARKER_PREFIX {
            return Err(Error::malformed(bytes, cursor, "expected marker prefix 0xff"));
        }

        let marker = *bytes
            .get(cursor + 1)
            .ok_or_else(|| Error::malformed(bytes, cursor, "truncated marker"))?;
        cursor += 2;

        if marker == SOI || marker == EOI || (RST_FIRST..=RST_LAST).contains(&marker) {
            segments.push(Segment { marker, data: Vec::new() });
            continue;
        }

        if marker == DRI {
            let data = bytes
                .get(cursor..cursor + 4)
                .ok_or_else(|| Error::malformed(bytes, cursor, "truncated DRI segment"))?
                .to_vec();
            cursor += 4;
            segments.push(Segment { marker, data });
            continue;
        }

        if marker == SOS {
            let length = read_u16_be(bytes, cursor)? as usize;
            let sos_header_end = cursor + length;
            if sos_header_end > bytes.len() {
                return Err(Error::malformed(bytes, cursor, "truncated SOS header"));
            }

            let ecs_end = skip_ecs(bytes, sos_header_end)?;
            let data = bytes[cursor..ecs_end].to_vec();
            cursor = ecs_end;
            segments.push(Segment { marker, data });
            continue;
        }

        // Generic length-prefixed segment: APPn, COM, SOFn, DHT, DQT, etc.
        let length = read_u16_be(bytes, cursor)? as usize;
        let end = cursor + length;
        let data = bytes
            .get(cursor..end)
            .ok_or_else(|| Error::malformed(bytes, cursor, "truncated segment payload"))?
            .to_vec();
        cursor = end;
        segments.push(Segment { marker, data });
    }

    Ok(Jpg { segments })
}

/// Re-encodes a segment list into a JPEG byte stream.
pub fn encode_jpg(jpg: &Jpg) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for segment in &jpg.segments {
        out.push(MARKER_PREFIX);
        out.push(segment.marker);
        out.extend_from_slice(&segment.data);
    }
    Ok(out)
}

fn read_u16_be(bytes: &[u8], offset: usize) -> Result<u16> {
    let pair: [u8; 2] = bytes
        .get(offset..offset + 2)
        .ok_or_else(|| Error::malformed(bytes, offset, "truncated length field"))?
        .try_into()
        .expect("slice length checked above");
    Ok(u16::from_be_bytes(pair))
}

/// Scans forward from the end of the SOS header over entropy-coded data,
/// stopping at the first non-stuffed marker: a `0xFF` byte followed by
/// anything other than `0x00` (a stuffing byte) or an RSTn marker (which
/// is itself part of the entropy-coded stream), per spec §4.D "SOS
/// handling" / §6.
fn skip_ecs(bytes: &[u8], start: usize) -> Result<usize> {
    let mut i = start;
    while i < bytes.len() {
        if bytes[i] == MARKER_PREFIX {
            match bytes.get(i + 1) {
                Some(0x00) => {
                    i += 2;
                    continue;
                }
                Some(&next) if (RST_FIRST..=RST_LAST).contains(&next) => {
                    i += 2;
                    continue;
                }
                Some(_) => return Ok(i),
                None => return Ok(i),
            }
        }
        i += 1;
    }
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_jpg() -> Vec<u8> {
        let mut bytes = vec![0xff, SOI];
        // APP0 (JFIF), length 16 (includes the 2 length bytes).
        bytes.extend_from_slice(&[0xff, 0xe0, 0x00, 0x10]);
        bytes.extend_from_slice(b"JFIF\0");
        bytes.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);
        // SOS with a 2-byte header (length field only) and a few bytes of
        // entropy-coded data containing a stuffed 0xff 0x00 and an RST1.
        bytes.extend_from_slice(&[0xff, SOS, 0x00, 0x02]);
        bytes.extend_from_slice(&[0x11, 0x22, 0xff, 0x00, 0x33, 0xff, RST_FIRST + 1, 0x44]);
        bytes.extend_from_slice(&[0xff, EOI]);
        bytes
    }

    #[test]
    fn round_trips_minimal_jpg() {
        let bytes = minimal_jpg();
        let jpg = decode_jpg(&bytes).unwrap();
        let re_encoded = encode_jpg(&jpg).unwrap();
        assert_eq!(re_encoded, bytes);
    }

    #[test]
    fn sos_absorbs_stuffed_bytes_and_rst_markers() {
        let bytes = minimal_jpg();
        let jpg = decode_jpg(&bytes).unwrap();
        let sos = jpg.segments.iter().find(|s| s.marker == SOS).unwrap();
        // header (2 bytes) + 8 bytes of entropy-coded data, stopping
        // right before the EOI marker.
        assert_eq!(sos.data.len(), 10);
    }

    #[test]
    fn marker_only_segments_have_empty_data() {
        let bytes = minimal_jpg();
        let jpg = decode_jpg(&bytes).unwrap();
        assert_eq!(jpg.segments.first().unwrap().data, Vec::<u8>::new());
        assert_eq!(jpg.segments.last().unwrap().data, Vec::<u8>::new());
    }

    #[test]
    fn truncated_marker_is_malformed() {
        let bytes = vec![0xffu8];
        assert!(decode_jpg(&bytes).is_err());
    }
}
