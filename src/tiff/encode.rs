// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! TIFF encode: two-pass size planning followed by a single write pass.
//! Grounded on `encode_ifd`/`encode_metadata_general` from the stable fork
//! at `other_examples/c2ac01f6_revoltchat-little_exif__src-metadata.rs.rs`
//! — same front-region/back-region split and `next_offset` bookkeeping,
//! generalized from that fork's fixed IFD0->ExifIFD->InteropIFD chain to
//! an arbitrary `Vec<Ifd>` top-level chain with recursive sub-IFD nesting.

use crate::endian::{self, Endian, TypeCode};
use crate::error::Result;

use super::{EntryValue, Ifd, IfdEntry, Tiff};

/// Header is the byte-order mark plus the IFD0 offset; IFD0 always lands
/// right after it, at absolute offset 8 (spec §6).
const TIFF_HEADER_LEN: usize = 8;

/// Encodes a complete TIFF structure. Layout is `[header][front IFD0][front
/// IFD1]...[back region]`, per spec §4.B.2: every top-level IFD's fixed-size
/// front is written contiguously before any variable-size back payload, so
/// a top-level IFD's `next IFD offset` is simply the start of the next
/// front.
pub fn encode_tiff(tiff: &Tiff) -> Result<Vec<u8>> {
    let endian = tiff.endian();

    let sizes: Vec<(usize, usize)> = tiff.ifds.iter().map(sizes_of).collect();
    let total_front: usize = sizes.iter().map(|(f, _)| f).sum();
    let total_back: usize = sizes.iter().map(|(_, b)| b).sum();

    let mut out = vec![0u8; TIFF_HEADER_LEN + total_front + total_back];
    out[0..4].copy_from_slice(&endian.header());
    endian::write_u32(&mut out, 4, endian, TIFF_HEADER_LEN as u32);

    let mut front_ptr = TIFF_HEADER_LEN;
    let mut back_ptr = TIFF_HEADER_LEN + total_front;

    for (i, ifd) in tiff.ifds.iter().enumerate() {
        let is_last = i + 1 == tiff.ifds.len();
        let (front_len, _) = sizes[i];
        write_ifd(&mut out, ifd, front_ptr, front_len, &mut back_ptr, is_last, endian);
        front_ptr += front_len;
    }

    Ok(out)
}

/// `(front, back)` byte sizes for one IFD, per spec §4.B.1: `front = 6 +
/// 12N`; `back` sums each entry's spilled payload length, with nested IFDs
/// contributing their own full `front + back` (the child is stored
/// entirely within the parent's back region).
fn sizes_of(ifd: &Ifd) -> (usize, usize) {
    let front = 6 + 12 * ifd.entries.len();
    let back = ifd.entries.iter().map(back_payload_len).sum();
    (front, back)
}

/// Byte length of an entry's value when it must be written out-of-line —
/// the quantity that decides inline-vs-spilled per invariant 3.
fn back_payload_len(entry: &IfdEntry) -> usize {
    match &entry.value {
        EntryValue::SubIfd(child) => {
            let (cf, cb) = sizes_of(child);
            cf + cb
        }
        _ => {
            let len = (entry.type_code.element_width() * entry.count()) as usize;
            if len > 4 {
                len
            } else {
                0
            }
        }
    }
}

/// Writes one IFD's front region starting at `front_start` (already sized
/// to `front_len` bytes in `out`), spilling oversized or nested values into
/// the shared `back_ptr` cursor. `is_last` controls whether the trailing
/// `next IFD offset` field points at the next contiguous front (`false`)
/// or is `0` (`true`) — used both for top-level chaining and, always
/// `true`, for nested sub-IFDs.
fn write_ifd(
    out: &mut [u8],
    ifd: &Ifd,
    front_start: usize,
    front_len: usize,
    back_ptr: &mut usize,
    is_last: bool,
    endian: Endian,
) {
    endian::write_u16(out, front_start, endian, ifd.entries.len() as u16);

    for (i, entry) in ifd.entries.iter().enumerate() {
        let entry_offset = front_start + 2 + 12 * i;

        endian::write_u16(out, entry_offset, endian, entry.tag);
        endian::write_u16(out, entry_offset + 2, endian, entry.type_code.as_u16());
        endian::write_u32(out, entry_offset + 4, endian, entry.count());

        match &entry.value {
            EntryValue::SubIfd(child) => {
                let (child_front, child_back) = sizes_of(child);
                let child_start = *back_ptr;
                endian::write_u32(out, entry_offset + 8, endian, child_start as u32);

                let mut child_back_ptr = child_start + child_front;
                write_ifd(out, child, child_start, child_front, &mut child_back_ptr, true, endian);

                *back_ptr = child_start + child_front + child_back;
            }
            _ => {
                let byte_len = (entry.type_code.element_width() * entry.count()) as usize;
                if byte_len > 4 {
                    endian::write_u32(out, entry_offset + 8, endian, *back_ptr as u32);
                    write_value_payload(out, *back_ptr, entry, endian);
                    *back_ptr += byte_len;
                } else {
                    write_inline_payload(out, entry_offset + 8, entry, endian);
                }
            }
        }
    }

    let next_field = front_start + 2 + 12 * ifd.entries.len();
    let next_value = if is_last { 0 } else { (front_start + front_len) as u32 };
    endian::write_u32(out, next_field, endian, next_value);
}

fn write_inline_payload(out: &mut [u8], offset: usize, entry: &IfdEntry, endian: Endian) {
    // Inline values are always <= 4 bytes; write them left-justified into
    // the 4-byte value field. The remainder is already zeroed by the
    // caller's initial `vec![0; ...]` allocation.
    match &entry.value {
        EntryValue::U8(v) | EntryValue::Undefined(v) => {
            out[offset..offset + v.len()].copy_from_slice(v);
        }
        EntryValue::I8(v) => {
            for (i, b) in v.iter().enumerate() {
                out[offset + i] = *b as u8;
            }
        }
        EntryValue::U16(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_u16(out, offset + i * 2, endian, *x);
            }
        }
        EntryValue::I16(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_i16(out, offset + i * 2, endian, *x);
            }
        }
        EntryValue::U32(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_u32(out, offset + i * 4, endian, *x);
            }
        }
        EntryValue::I32(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_i32(out, offset + i * 4, endian, *x);
            }
        }
        EntryValue::F32(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_f32(out, offset + i * 4, endian, *x);
            }
        }
        EntryValue::Ascii(s) => {
            let bytes = s.as_bytes();
            out[offset..offset + bytes.len()].copy_from_slice(bytes);
            // null terminator already present via zero-fill.
        }
        EntryValue::Urational(_) | EntryValue::Srational(_) | EntryValue::F64(_) => {
            unreachable!("rational and double values always spill: 8 bytes > 4")
        }
        EntryValue::SubIfd(_) => unreachable!("sub-IFD pointer is handled by write_ifd directly"),
    }
}

fn write_value_payload(out: &mut [u8], offset: usize, entry: &IfdEntry, endian: Endian) {
    match &entry.value {
        EntryValue::U8(v) | EntryValue::Undefined(v) => {
            out[offset..offset + v.len()].copy_from_slice(v);
        }
        EntryValue::I8(v) => {
            for (i, b) in v.iter().enumerate() {
                out[offset + i] = *b as u8;
            }
        }
        EntryValue::U16(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_u16(out, offset + i * 2, endian, *x);
            }
        }
        EntryValue::I16(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_i16(out, offset + i * 2, endian, *x);
            }
        }
        EntryValue::U32(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_u32(out, offset + i * 4, endian, *x);
            }
        }
        EntryValue::I32(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_i32(out, offset + i * 4, endian, *x);
            }
        }
        EntryValue::F32(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_f32(out, offset + i * 4, endian, *x);
            }
        }
        EntryValue::F64(v) => {
            for (i, x) in v.iter().enumerate() {
                endian::write_f64(out, offset + i * 8, endian, *x);
            }
        }
        EntryValue::Urational(v) => {
            for (i, (num, den)) in v.iter().enumerate() {
                let base = offset + i * 8;
                endian::write_u32(out, base, endian, *num);
                endian::write_u32(out, base + 4, endian, *den);
            }
        }
        EntryValue::Srational(v) => {
            for (i, (num, den)) in v.iter().enumerate() {
                let base = offset + i * 8;
                endian::write_i32(out, base, endian, *num);
                endian::write_i32(out, base + 4, endian, *den);
            }
        }
        EntryValue::Ascii(s) => {
            let bytes = s.as_bytes();
            out[offset..offset + bytes.len()].copy_from_slice(bytes);
            out[offset + bytes.len()] = 0;
        }
        EntryValue::SubIfd(_) => unreachable!("sub-IFD pointer is handled by write_ifd directly"),
    }
}
