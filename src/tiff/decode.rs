// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! TIFF decode: header, IFD walker, sub-IFD follower. Grounded on
//! `ImageFileDirectory::decode_ifd` from little_exif's `src/ifd/mod.rs` —
//! the cursor-relative-to-origin walk and the inline-vs-offset branch are
//! the same shape, generalized from the teacher's giant `ExifTag` enum to
//! this crate's typed `EntryValue`.

use crate::endian::{self, Endian, TypeCode};
use crate::error::{Error, Result};

use super::{EntryValue, Ifd, IfdEntry, Tiff, EXIF_IFD_POINTER_TAG};

const ENTRY_LENGTH: usize = 12;

/// Decodes a complete TIFF structure. `bytes` must start at the TIFF
/// byte-order mark (spec §4.B.1-3).
pub fn decode_tiff(bytes: &[u8]) -> Result<Tiff> {
    if bytes.len() < 8 {
        return Err(Error::malformed(bytes, 0, "truncated TIFF header"));
    }

    let endian = match &bytes[0..4] {
        [0x49, 0x49, 0x2a, 0x00] => Endian::Little,
        [0x4d, 0x4d, 0x00, 0x2a] => Endian::Big,
        _ => return Err(Error::malformed(bytes, 0, "bad byte order")),
    };

    let mut ifds = Vec::new();
    let mut next_offset = Some(endian::read_u32(bytes, 4, endian)? as usize);

    while let Some(offset) = next_offset {
        let (ifd, next) = decode_ifd_at(bytes, offset, endian)?;
        ifds.push(ifd);
        next_offset = next;
    }

    Ok(Tiff {
        little_endian: endian == Endian::Little,
        ifds,
    })
}

/// Decodes a single IFD at an absolute offset from the TIFF origin,
/// without following the `next IFD` link. This is the entry point spec
/// §6 calls `decode_ifd(bytes, offset, little_endian)`, used directly by
/// the Exif adapter to decode a sub-IFD.
pub fn decode_ifd(bytes: &[u8], offset: usize, little_endian: bool) -> Result<Ifd> {
    let endian = if little_endian { Endian::Little } else { Endian::Big };
    Ok(decode_ifd_at(bytes, offset, endian)?.0)
}

fn decode_ifd_at(bytes: &[u8], offset: usize, endian: Endian) -> Result<(Ifd, Option<usize>)> {
    let entry_count = endian::read_u16(bytes, offset, endian)? as usize;

    let mut entries = Vec::with_capacity(entry_count);
    let mut cursor = offset + 2;

    for _ in 0..entry_count {
        let entry = decode_entry(bytes, cursor, endian)?;
        entries.push(entry);
        cursor += ENTRY_LENGTH;
    }

    let next_offset = endian::read_u32(bytes, cursor, endian)?;
    let next = if next_offset == 0 { None } else { Some(next_offset as usize) };

    Ok((Ifd { entries }, next))
}

fn decode_entry(bytes: &[u8], entry_offset: usize, endian: Endian) -> Result<IfdEntry> {
    let tag = endian::read_u16(bytes, entry_offset, endian)?;
    let raw_type = endian::read_u16(bytes, entry_offset + 2, endian)?;
    let count = endian::read_u32(bytes, entry_offset + 4, endian)?;
    let value_field_offset = entry_offset + 8;

    let type_code = TypeCode::from_u16(raw_type)
        .ok_or_else(|| Error::malformed(bytes, entry_offset + 2, format!("unknown TIFF type code {raw_type}")))?;

    // Sub-IFD pointer: a single UINT32 offset resolved recursively, per
    // spec §4.B.5. Only 0x8769 (Exif) is wired, matching §9's "Sub-IFD
    // tags beyond Exif" scope note.
    if tag == EXIF_IFD_POINTER_TAG && type_code == TypeCode::Uint32 && count == 1 {
        let sub_offset = endian::read_u32(bytes, value_field_offset, endian)? as usize;
        let (sub_ifd, _) = decode_ifd_at(bytes, sub_offset, endian)?;
        return Ok(IfdEntry::new(tag, type_code, EntryValue::SubIfd(sub_ifd)));
    }

    let byte_length = type_code.element_width() as u64 * count as u64;

    let payload_offset = if byte_length > 4 {
        endian::read_u32(bytes, value_field_offset, endian)? as usize
    } else {
        value_field_offset
    };

    let value = decode_value(bytes, payload_offset, type_code, count, endian)?;

    Ok(IfdEntry::new(tag, type_code, value))
}

fn decode_value(
    bytes: &[u8],
    offset: usize,
    type_code: TypeCode,
    count: u32,
    endian: Endian,
) -> Result<EntryValue> {
    let n = count as usize;
    let width = type_code.element_width() as usize;

    macro_rules! collect {
        ($read:path) => {{
            let mut values = Vec::with_capacity(n);
            for i in 0..n {
                values.push($read(bytes, offset + i * width, endian)?);
            }
            values
        }};
    }

    Ok(match type_code {
        TypeCode::Uint8 => EntryValue::U8(collect!(endian::read_u8)),
        TypeCode::Int8 => EntryValue::I8(collect!(endian::read_i8)),
        TypeCode::Undefined8 => EntryValue::Undefined(collect!(endian::read_u8)),
        TypeCode::Uint16 => EntryValue::U16(collect!(endian::read_u16)),
        TypeCode::Int16 => EntryValue::I16(collect!(endian::read_i16)),
        TypeCode::Uint32 => EntryValue::U32(collect!(endian::read_u32)),
        TypeCode::Int32 => EntryValue::I32(collect!(endian::read_i32)),
        TypeCode::Single => EntryValue::F32(collect!(endian::read_f32)),
        // §9 "DOUBLE decode bug": the source reads DOUBLE with the 32-bit
        // accessor by mistake. This is the corrected 64-bit read.
        TypeCode::Double => EntryValue::F64(collect!(endian::read_f64)),
        TypeCode::Urational => {
            let mut values = Vec::with_capacity(n);
            for i in 0..n {
                let base = offset + i * width;
                let num = endian::read_u32(bytes, base, endian)?;
                let den = endian::read_u32(bytes, base + 4, endian)?;
                values.push((num, den));
            }
            EntryValue::Urational(values)
        }
        // §9 "Signed rationals bug": the source reads SRATIONAL with the
        // unsigned accessor. This reads both halves as i32.
        TypeCode::Srational => {
            let mut values = Vec::with_capacity(n);
            for i in 0..n {
                let base = offset + i * width;
                let num = endian::read_i32(bytes, base, endian)?;
                let den = endian::read_i32(bytes, base + 4, endian)?;
                values.push((num, den));
            }
            EntryValue::Srational(values)
        }
        TypeCode::Ascii => {
            let raw = bytes
                .get(offset..offset + n)
                .ok_or_else(|| Error::malformed(bytes, offset, "truncated ASCII value"))?;
            // Invariant 2: strip the on-wire trailing null (and anything
            // after it, in case of a malformed over-long count).
            let text_len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            let text = String::from_utf8_lossy(&raw[..text_len]).into_owned();
            EntryValue::Ascii(text)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::encode_tiff;

    fn tiff_with_one_entry(endian_little: bool, value: EntryValue, type_code: TypeCode) -> Tiff {
        Tiff {
            little_endian: endian_little,
            ifds: vec![Ifd {
                entries: vec![IfdEntry::new(0x0100, type_code, value)],
            }],
        }
    }

    #[test]
    fn rejects_bad_byte_order() {
        let bytes = [0u8; 8];
        assert!(decode_tiff(&bytes).is_err());
    }

    #[test]
    fn decodes_inline_short_value() {
        let t = tiff_with_one_entry(true, EntryValue::U16(vec![7, 9]), TypeCode::Uint16);
        let bytes = encode_tiff(&t).unwrap();
        let decoded = decode_tiff(&bytes).unwrap();
        assert_eq!(decoded, t);
    }

    #[test]
    fn decodes_spilled_ascii_value() {
        let t = tiff_with_one_entry(true, EntryValue::Ascii("hello world".into()), TypeCode::Ascii);
        let bytes = encode_tiff(&t).unwrap();
        let decoded = decode_tiff(&bytes).unwrap();
        assert_eq!(decoded, t);
    }

    #[test]
    fn decodes_signed_rational_as_signed() {
        let t = tiff_with_one_entry(
            true,
            EntryValue::Srational(vec![(-3, 7)]),
            TypeCode::Srational,
        );
        let bytes = encode_tiff(&t).unwrap();
        let decoded = decode_tiff(&bytes).unwrap();
        assert_eq!(decoded, t);
    }

    #[test]
    fn decodes_double_with_64_bit_accessor() {
        let t = tiff_with_one_entry(true, EntryValue::F64(vec![1.5, -2.25]), TypeCode::Double);
        let bytes = encode_tiff(&t).unwrap();
        let decoded = decode_tiff(&bytes).unwrap();
        assert_eq!(decoded, t);
    }

    #[test]
    fn duplicate_tags_are_both_kept() {
        let t = Tiff {
            little_endian: true,
            ifds: vec![Ifd {
                entries: vec![
                    IfdEntry::new(0x0100, TypeCode::Uint16, EntryValue::U16(vec![1])),
                    IfdEntry::new(0x0100, TypeCode::Uint16, EntryValue::U16(vec![2])),
                ],
            }],
        };
        let bytes = encode_tiff(&t).unwrap();
        let decoded = decode_tiff(&bytes).unwrap();
        assert_eq!(decoded.ifds[0].entries.len(), 2);
        assert_eq!(decoded, t);
    }
}
