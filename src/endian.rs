// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! Endian-aware reads and writes at an absolute offset into a byte buffer,
//! plus the TIFF type-code → element-width table (component A of the
//! design).

use crate::error::{Error, Result};

/// TIFF byte order. The TIFF byte-order mark selects this once per file;
/// every multi-byte field in the TIFF region (but *not* the surrounding
/// Exif/JPEG framing, which is always big-endian) is read and written
/// according to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// The 4-byte TIFF byte-order mark, including the magic number `42`.
    pub fn header(self) -> [u8; 4] {
        match self {
            Endian::Little => [0x49, 0x49, 0x2a, 0x00],
            Endian::Big => [0x4d, 0x4d, 0x00, 0x2a],
        }
    }
}

macro_rules! read_fn {
    ($name:ident, $ty:ty, $width:expr) => {
        pub fn $name(buf: &[u8], offset: usize, endian: Endian) -> Result<$ty> {
            let bytes: [u8; $width] = buf
                .get(offset..offset + $width)
                .ok_or_else(|| {
                    Error::malformed(buf, offset, format!("truncated buffer reading {}", stringify!($ty)))
                })?
                .try_into()
                .expect("slice length checked above");
            Ok(match endian {
                Endian::Little => <$ty>::from_le_bytes(bytes),
                Endian::Big => <$ty>::from_be_bytes(bytes),
            })
        }
    };
}

macro_rules! write_fn {
    ($name:ident, $ty:ty, $width:expr) => {
        pub fn $name(buf: &mut [u8], offset: usize, endian: Endian, value: $ty) {
            let bytes = match endian {
                Endian::Little => value.to_le_bytes(),
                Endian::Big => value.to_be_bytes(),
            };
            buf[offset..offset + $width].copy_from_slice(&bytes);
        }
    };
}

read_fn!(read_u8, u8, 1);
read_fn!(read_i8, i8, 1);
read_fn!(read_u16, u16, 2);
read_fn!(read_i16, i16, 2);
read_fn!(read_u32, u32, 4);
read_fn!(read_i32, i32, 4);
read_fn!(read_f32, f32, 4);
read_fn!(read_f64, f64, 8);

write_fn!(write_u8, u8, 1);
write_fn!(write_i8, i8, 1);
write_fn!(write_u16, u16, 2);
write_fn!(write_i16, i16, 2);
write_fn!(write_u32, u32, 4);
write_fn!(write_i32, i32, 4);
write_fn!(write_f32, f32, 4);
write_fn!(write_f64, f64, 8);

/// The twelve TIFF primitive type codes, per spec §3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u16)]
pub enum TypeCode {
    Uint8 = 1,
    Ascii = 2,
    Uint16 = 3,
    Uint32 = 4,
    Urational = 5,
    Int8 = 6,
    Undefined8 = 7,
    Int16 = 8,
    Int32 = 9,
    Srational = 10,
    Single = 11,
    Double = 12,
}

impl TypeCode {
    pub fn from_u16(code: u16) -> Option<TypeCode> {
        Some(match code {
            1 => TypeCode::Uint8,
            2 => TypeCode::Ascii,
            3 => TypeCode::Uint16,
            4 => TypeCode::Uint32,
            5 => TypeCode::Urational,
            6 => TypeCode::Int8,
            7 => TypeCode::Undefined8,
            8 => TypeCode::Int16,
            9 => TypeCode::Int32,
            10 => TypeCode::Srational,
            11 => TypeCode::Single,
            12 => TypeCode::Double,
            _ => return None,
        })
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Width in bytes of a single element of this type. Rational types
    /// count both the numerator and denominator (8 bytes total).
    pub fn element_width(self) -> u32 {
        match self {
            TypeCode::Uint8 | TypeCode::Ascii | TypeCode::Int8 | TypeCode::Undefined8 => 1,
            TypeCode::Uint16 | TypeCode::Int16 => 2,
            TypeCode::Uint32 | TypeCode::Int32 | TypeCode::Single => 4,
            TypeCode::Urational | TypeCode::Srational | TypeCode::Double => 8,
        }
    }
}
