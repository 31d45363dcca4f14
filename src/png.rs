// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! The PNG chunk codec (component E, ambient): a general chunk-stream
//! decode/encode plus plain-text `tEXt` accessors. Grounded on
//! little_exif's `png.rs` — `check_signature`/`get_next_chunk_descriptor`/
//! `parse_png` supply the chunk-walking shape and the `crc` crate CRC-32
//! usage, generalized from that module's Exif-in-zTXt-with-zlib carrier
//! (out of scope here — spec §1) down to a plain, uncompressed `tEXt`
//! carrier (spec §6 "PNG framing").

use crc::{Crc, CRC_32_ISO_HDLC};
use log::debug;

use crate::error::{Error, Result};

/// CRC-32/ISO-HDLC, precomputed once at first use (spec §5 / §9 "CRC-32
/// table"); the `crc` crate's table is built lazily behind a `const fn`
/// so there is no explicit lazy-init branch to write here.
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

const CHUNK_TEXT: [u8; 4] = *b"tEXt";
const CHUNK_IEND: [u8; 4] = *b"IEND";

/// One PNG chunk, resolved in memory. The 8-byte length/type header and
/// trailing CRC-32 are wire-only framing, recomputed on encode; they are
/// not stored here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_type: [u8; 4],
    pub data: Vec<u8>,
}

/// A decoded PNG byte stream: the ordered chunk sequence following the
/// 8-byte signature.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Png {
    pub chunks: Vec<Chunk>,
}

/// Decodes a complete PNG byte stream, per spec §6 "PNG framing".
pub fn decode_png(bytes: &[u8]) -> Result<Png> {
    check_signature(bytes)?;

    let mut chunks = Vec::new();
    let mut cursor = PNG_SIGNATURE.len();

    while cursor < bytes.len() {
        let (chunk, next) = decode_chunk(bytes, cursor)?;
        chunks.push(chunk);
        cursor = next;
    }

    Ok(Png { chunks })
}

/// Re-encodes a chunk stream into a PNG byte stream, recomputing each
/// chunk's length prefix and CRC-32 trailer.
pub fn encode_png(png: &Png) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(PNG_SIGNATURE.len());
    out.extend_from_slice(&PNG_SIGNATURE);

    for chunk in &png.chunks {
        out.extend_from_slice(&(chunk.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&chunk.chunk_type);
        out.extend_from_slice(&chunk.data);
        out.extend_from_slice(&crc_of(&chunk.chunk_type, &chunk.data).to_be_bytes());
    }

    Ok(out)
}

/// Returns the value of the `tEXt` chunk keyed `key`, if one exists.
/// `None` if absent (spec §8 property 6 / scenario S5).
pub fn get_text(png: &Png, key: &str) -> Option<String> {
    png.chunks.iter().find_map(|chunk| {
        if chunk.chunk_type != CHUNK_TEXT {
            return None;
        }
        let (chunk_key, value) = split_text_chunk(&chunk.data)?;
        if chunk_key == key {
            Some(value)
        } else {
            None
        }
    })
}

/// Inserts or replaces the `tEXt` chunk keyed `key` with `value`. An
/// existing chunk with that key is replaced in place; a new chunk is
/// inserted immediately before `IEND` (spec §8 property 6).
pub fn set_text(png: &mut Png, key: &str, value: &str) {
    let mut data = Vec::with_capacity(key.len() + 1 + value.len());
    data.extend_from_slice(key.as_bytes());
    data.push(0);
    data.extend_from_slice(value.as_bytes());

    let existing = png.chunks.iter_mut().find(|chunk| {
        chunk.chunk_type == CHUNK_TEXT
            && split_text_chunk(&chunk.data).is_some_and(|(k, _)| k == key)
    });

    match existing {
        Some(chunk) => chunk.data = data,
        None => {
            let insert_at = png
                .chunks
                .iter()
                .position(|c| c.chunk_type == CHUNK_IEND)
                .unwrap_or(png.chunks.len());
            png.chunks.insert(
                insert_at,
                Chunk { chunk_type: CHUNK_TEXT, data },
            );
        }
    }
}

fn split_text_chunk(data: &[u8]) -> Option<(&str, String)> {
    let null_pos = data.iter().position(|&b| b == 0)?;
    let key = std::str::from_utf8(&data[..null_pos]).ok()?;
    let value = String::from_utf8_lossy(&data[null_pos + 1..]).into_owned();
    Some((key, value))
}

fn check_signature(bytes: &[u8]) -> Result<()> {
    if bytes.get(0..PNG_SIGNATURE.len()) != Some(&PNG_SIGNATURE[..]) {
        return Err(Error::malformed(bytes, 0, "bad PNG signature"));
    }
    Ok(())
}

fn decode_chunk(bytes: &[u8], offset: usize) -> Result<(Chunk, usize)> {
    let header = bytes
        .get(offset..offset + 8)
        .ok_or_else(|| Error::malformed(bytes, offset, "truncated chunk header"))?;

    let length = u32::from_be_bytes(header[0..4].try_into().expect("checked above")) as usize;
    let mut chunk_type = [0u8; 4];
    chunk_type.copy_from_slice(&header[4..8]);

    let data_start = offset + 8;
    let data_end = data_start + length;
    let data = bytes
        .get(data_start..data_end)
        .ok_or_else(|| Error::malformed(bytes, data_start, "truncated chunk data"))?
        .to_vec();

    let crc_end = data_end + 4;
    let stored_crc = u32::from_be_bytes(
        bytes
            .get(data_end..crc_end)
            .ok_or_else(|| Error::malformed(bytes, data_end, "truncated chunk CRC"))?
            .try_into()
            .expect("checked above"),
    );

    let computed_crc = crc_of(&chunk_type, &data);
    if stored_crc != computed_crc {
        return Err(Error::malformed(
            bytes,
            data_end,
            format!("chunk CRC mismatch: stored {stored_crc:#010x}, computed {computed_crc:#010x}"),
        ));
    }

    if chunk_type == CHUNK_TEXT && split_text_chunk(&data).is_none() {
        debug!("tEXt chunk has no null separator; get_text will never match it");
    }

    Ok((Chunk { chunk_type, data }, crc_end))
}

fn crc_of(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut digest = CRC32.digest();
    digest.update(chunk_type);
    digest.update(data);
    digest.finalize()
}
