// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

use pixelmeta::endian::TypeCode;
use pixelmeta::{decode_ifd, decode_tiff, encode_tiff, EntryValue, Ifd, IfdEntry, Tiff};

/// Property 3 (spec §8): for any `Tiff` produced by `decode_tiff`,
/// `decode_tiff(encode_tiff(T))` equals `T` as a data structure.
#[test]
fn structural_equivalence_across_many_entry_types() {
    let tiff = Tiff {
        little_endian: true,
        ifds: vec![
            Ifd {
                entries: vec![
                    IfdEntry::new(0x0100, TypeCode::Uint32, EntryValue::U32(vec![1920])),
                    IfdEntry::new(0x0101, TypeCode::Uint32, EntryValue::U32(vec![1080])),
                    IfdEntry::new(0x010f, TypeCode::Ascii, EntryValue::Ascii("Acme Camera Co.".into())),
                    IfdEntry::new(
                        0x829a,
                        TypeCode::Urational,
                        EntryValue::Urational(vec![(1, 250)]),
                    ),
                    IfdEntry::new(
                        0x9201,
                        TypeCode::Srational,
                        EntryValue::Srational(vec![(-2, 1)]),
                    ),
                    IfdEntry::new(0x8769, TypeCode::Uint32, EntryValue::SubIfd(Ifd {
                        entries: vec![IfdEntry::new(
                            0x9000,
                            TypeCode::Undefined8,
                            EntryValue::Undefined(b"0231".to_vec()),
                        )],
                    })),
                ],
            },
            // A thumbnail IFD1.
            Ifd {
                entries: vec![IfdEntry::new(
                    0x0201,
                    TypeCode::Uint32,
                    EntryValue::U32(vec![1234]),
                )],
            },
        ],
    };

    let bytes = encode_tiff(&tiff).unwrap();
    let decoded = decode_tiff(&bytes).unwrap();
    assert_eq!(decoded, tiff);
}

#[test]
fn decode_ifd_entry_point_matches_full_decode() {
    let tiff = Tiff {
        little_endian: true,
        ifds: vec![Ifd {
            entries: vec![IfdEntry::new(0x0100, TypeCode::Uint16, EntryValue::U16(vec![7]))],
        }],
    };
    let bytes = encode_tiff(&tiff).unwrap();

    let via_decode_tiff = decode_tiff(&bytes).unwrap().ifds.into_iter().next().unwrap();
    let via_decode_ifd = decode_ifd(&bytes, 8, true).unwrap();
    assert_eq!(via_decode_tiff, via_decode_ifd);
}

#[test]
fn big_endian_tiff_with_doubles_and_duplicates() {
    let tiff = Tiff {
        little_endian: false,
        ifds: vec![Ifd {
            entries: vec![
                IfdEntry::new(0x0100, TypeCode::Double, EntryValue::F64(vec![1.5, -2.25, 3.0])),
                IfdEntry::new(0x0100, TypeCode::Double, EntryValue::F64(vec![9.0])),
            ],
        }],
    };

    let bytes = encode_tiff(&tiff).unwrap();
    assert_eq!(&bytes[0..4], &[0x4d, 0x4d, 0x00, 0x2a]);

    let decoded = decode_tiff(&bytes).unwrap();
    assert_eq!(decoded, tiff);
    assert_eq!(decoded.ifds[0].entries.len(), 2);
}

#[test]
fn malformed_byte_order_reports_offset() {
    let bytes = [0xffu8; 16];
    let err = decode_tiff(&bytes).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("bad byte order"));
    assert!(message.contains("at 0"));
}
