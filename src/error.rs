// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! Error type shared by the TIFF, Exif, JPEG and PNG layers.
//!
//! Decoders never return a partial result: any structural violation fails
//! the whole call with [`Error::MalformedData`], annotated with a small
//! byte-position trace to help track down where in the buffer things went
//! wrong. Encoders that are handed a record they cannot serialize fail with
//! [`Error::InvalidInput`].

/// How many bytes of context to show on either side of the offending offset.
const TRACE_WINDOW: usize = 5;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input violates a structural invariant of the format being
    /// decoded: bad magic, unknown type code, truncated buffer, a size
    /// field that disagrees with reality, invalid Exif framing, and so on.
    #[error("malformed data: {message}{trace}", trace = format_trace(*offset, window))]
    MalformedData {
        offset: usize,
        message: String,
        /// Captured at the point the error was raised so `Display` can
        /// render the `prev:`/`next:` byte windows without borrowing the
        /// original buffer.
        window: TraceWindow,
    },

    /// A caller-supplied record can't be serialized as-is, e.g. an
    /// `ExifVersion` whose encoded form isn't exactly 4 bytes long.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// A snapshot of the bytes immediately surrounding a decode failure.
#[derive(Debug, Clone, Default)]
pub struct TraceWindow {
    pub prev: Vec<u8>,
    pub next: Vec<u8>,
}

fn format_trace(offset: usize, window: &TraceWindow) -> String {
    format!(
        " at {offset} (0x{offset:x}), prev: {prev}, next: {next}",
        prev = hex_bytes(&window.prev),
        next = hex_bytes(&window.next),
    )
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Error {
    /// Builds a [`Error::MalformedData`], capturing up to [`TRACE_WINDOW`]
    /// bytes before and after `offset` in `buf` for the diagnostic trace.
    pub fn malformed(buf: &[u8], offset: usize, message: impl Into<String>) -> Error {
        let prev_start = offset.saturating_sub(TRACE_WINDOW);
        let prev = buf.get(prev_start..offset).unwrap_or(&[]).to_vec();

        let next_end = (offset + TRACE_WINDOW).min(buf.len());
        let next = buf.get(offset..next_end).unwrap_or(&[]).to_vec();

        Error::MalformedData {
            offset,
            message: message.into(),
            window: TraceWindow { prev, next },
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Error {
        Error::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
