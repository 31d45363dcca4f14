// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! The TIFF data model and codec (component B of the design) — the hard
//! part of this crate. A `Tiff` is a runtime-endian, pointer-linked tree of
//! `Ifd`s; decoding walks that tree, encoding plans a front/back layout
//! before writing a single byte. See `decode` and `encode` for the two
//! halves of the codec.

mod decode;
mod encode;

pub use decode::{decode_ifd, decode_tiff};
pub use encode::encode_tiff;

use crate::endian::TypeCode;

/// Tag of the Exif sub-IFD pointer (the only IFD-pointer tag this crate
/// wires up, per spec §4.B.5 / §9 "Sub-IFD tags beyond Exif").
pub const EXIF_IFD_POINTER_TAG: u16 = 0x8769;

/// A complete TIFF structure: an endianness and the top-level chain of
/// IFDs (conventionally IFD0 and, for images with a thumbnail, IFD1).
#[derive(Clone, Debug, PartialEq)]
pub struct Tiff {
    pub little_endian: bool,
    pub ifds: Vec<Ifd>,
}

impl Tiff {
    pub fn new(little_endian: bool) -> Tiff {
        Tiff {
            little_endian,
            ifds: Vec::new(),
        }
    }

    pub(crate) fn endian(&self) -> crate::endian::Endian {
        if self.little_endian {
            crate::endian::Endian::Little
        } else {
            crate::endian::Endian::Big
        }
    }
}

/// A single Image File Directory: an ordered sequence of entries. Order is
/// on-wire order and is preserved verbatim by both decode and encode —
/// ascending-tag order is a TIFF convention this library does not enforce.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ifd {
    pub entries: Vec<IfdEntry>,
}

impl Ifd {
    pub fn new() -> Ifd {
        Ifd::default()
    }

    pub fn get(&self, tag: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }
}

/// One 12-byte TIFF directory entry, resolved in memory: `(tag, type)`
/// identifies how `value` is interpreted.
#[derive(Clone, Debug, PartialEq)]
pub struct IfdEntry {
    pub tag: u16,
    pub type_code: TypeCode,
    pub value: EntryValue,
}

impl IfdEntry {
    pub fn new(tag: u16, type_code: TypeCode, value: EntryValue) -> IfdEntry {
        IfdEntry { tag, type_code, value }
    }

    /// On-wire component count, per spec invariant 1 (non-ASCII, non-IFD)
    /// and invariant 4 (nested IFD has on-wire count 1).
    pub fn count(&self) -> u32 {
        match &self.value {
            EntryValue::U8(v) | EntryValue::Undefined(v) => v.len() as u32,
            EntryValue::I8(v) => v.len() as u32,
            EntryValue::U16(v) => v.len() as u32,
            EntryValue::I16(v) => v.len() as u32,
            EntryValue::U32(v) => v.len() as u32,
            EntryValue::I32(v) => v.len() as u32,
            EntryValue::F32(v) => v.len() as u32,
            EntryValue::F64(v) => v.len() as u32,
            EntryValue::Urational(v) => v.len() as u32,
            EntryValue::Srational(v) => v.len() as u32,
            // Invariant 2: the in-memory string carries no trailing null;
            // the wire form always adds one, counted here.
            EntryValue::Ascii(s) => s.len() as u32 + 1,
            // Invariant 4: a nested IFD's on-wire count is always 1 (it is
            // a single UINT32 offset).
            EntryValue::SubIfd(_) => 1,
        }
    }
}

/// The decoded payload of an `IfdEntry`. Variants mirror the primitive
/// families of `TypeCode`, plus a `SubIfd` arm for the handful of tags
/// (just `0x8769` Exif, in this implementation) whose on-wire UINT32
/// offset is resolved into a nested directory rather than kept as a raw
/// number — see spec §9 "Nested IFD value variant".
#[derive(Clone, Debug, PartialEq)]
pub enum EntryValue {
    U8(Vec<u8>),
    I8(Vec<i8>),
    Ascii(String),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    Urational(Vec<(u32, u32)>),
    Srational(Vec<(i32, i32)>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Undefined(Vec<u8>),
    /// A sub-IFD referenced by an IFD-pointer tag, resolved at decode time
    /// and owned exclusively by this entry.
    SubIfd(Ifd),
}
