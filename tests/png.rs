// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

use pixelmeta::{decode_png, encode_png, get_text, set_text, Chunk, Png};

/// A minimal but structurally valid PNG chunk stream, standing in for
/// `dangocat.png` since no binary fixture is checked into this crate.
fn synthetic_png() -> Png {
    Png {
        chunks: vec![
            Chunk { chunk_type: *b"IHDR", data: vec![0u8; 13] },
            Chunk { chunk_type: *b"IDAT", data: vec![0x78, 0x9c, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01] },
            Chunk { chunk_type: *b"IEND", data: Vec::new() },
        ],
    }
}

/// Property 2 (spec §8) — `encode_png(decode_png(bytes)) == bytes`.
#[test]
fn png_round_trips_byte_for_byte() {
    let png = synthetic_png();
    let bytes = encode_png(&png).unwrap();
    let decoded = decode_png(&bytes).unwrap();
    let re_encoded = encode_png(&decoded).unwrap();
    assert_eq!(re_encoded, bytes);
}

/// S5 — tEXt manipulation: absent, then set, then replaced, then a second
/// key, with the edits surviving a full byte round-trip.
#[test]
fn text_chunk_insert_replace_and_second_key() {
    let mut png = synthetic_png();

    assert_eq!(get_text(&png, "Test Key"), None);

    set_text(&mut png, "Test Key", "ABC123");
    assert_eq!(get_text(&png, "Test Key").as_deref(), Some("ABC123"));

    set_text(&mut png, "Test Key", "123 ABC");
    assert_eq!(get_text(&png, "Test Key").as_deref(), Some("123 ABC"));

    set_text(&mut png, "Test Key 2", "?");
    assert_eq!(get_text(&png, "Test Key").as_deref(), Some("123 ABC"));
    assert_eq!(get_text(&png, "Test Key 2").as_deref(), Some("?"));

    let text_chunk_count = png.chunks.iter().filter(|c| c.chunk_type == *b"tEXt").count();
    assert_eq!(text_chunk_count, 2);

    let bytes = encode_png(&png).unwrap();
    let round_tripped = decode_png(&bytes).unwrap();
    assert_eq!(get_text(&round_tripped, "Test Key").as_deref(), Some("123 ABC"));
    assert_eq!(get_text(&round_tripped, "Test Key 2").as_deref(), Some("?"));
}

/// Property 6 (spec §8) — setting the same key twice leaves exactly one
/// `tEXt` chunk for it, and chunks with other keys are unaffected.
#[test]
fn other_keys_are_unaffected_by_set_text() {
    let mut png = synthetic_png();
    set_text(&mut png, "Comment", "unrelated");
    set_text(&mut png, "Test Key", "v1");
    set_text(&mut png, "Test Key", "v2");

    assert_eq!(get_text(&png, "Comment").as_deref(), Some("unrelated"));
    assert_eq!(get_text(&png, "Test Key").as_deref(), Some("v2"));
}

/// S6 — real-world-shaped tEXt chunks, keyed by standard PNG keywords.
#[test]
fn reads_standard_text_keywords() {
    let mut png = synthetic_png();
    set_text(&mut png, "Author", "Project Nayuki");
    set_text(&mut png, "Software", "Hex editor");

    assert_eq!(get_text(&png, "Author").as_deref(), Some("Project Nayuki"));
    assert_eq!(get_text(&png, "Software").as_deref(), Some("Hex editor"));
}

#[test]
fn rejects_truncated_chunk() {
    let mut bytes = encode_png(&synthetic_png()).unwrap();
    bytes.truncate(bytes.len() - 10);
    assert!(decode_png(&bytes).is_err());
}
