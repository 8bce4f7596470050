//! Frame iteration over byte streams.
//!
//! Layout on the wire, repeated until end-of-stream:
//! [ len: u32 LE ][ payload: len bytes ]
//!
//! A stream that ends exactly on a frame boundary is a clean end. Ending inside
//! a header or payload is `CodecError::Truncated`.

use std::io::{self, ErrorKind, Read, Write};

use framejoin_core::config::DEFAULT_MAX_FRAME_BYTES;
use framejoin_core::types::Scalar;

use crate::error::{CodecError, Result};
use crate::row::encode_row_into;

pub const FRAME_HEADER_LEN: usize = 4;

/// Pulls one frame payload at a time from a reader, reusing its buffer.
pub struct FrameReader<R: Read> {
    inner: R,
    max_frame_bytes: usize,
    buf: Vec<u8>,
    frames_read: u64,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_max_frame_bytes(inner, DEFAULT_MAX_FRAME_BYTES)
    }

    pub fn with_max_frame_bytes(inner: R, max_frame_bytes: usize) -> Self {
        Self {
            inner,
            max_frame_bytes,
            buf: Vec::new(),
            frames_read: 0,
        }
    }

    /// Number of complete frames returned so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Next payload, or `None` at a clean end-of-stream.
    pub fn next_frame(&mut self) -> Result<Option<&[u8]>> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        match read_full(&mut self.inner, &mut header)? {
            0 => return Ok(None),
            n if n < FRAME_HEADER_LEN => {
                return Err(CodecError::Truncated {
                    context: "frame header",
                    needed: FRAME_HEADER_LEN,
                    available: n,
                })
            }
            _ => {}
        }

        let len = u32::from_le_bytes(header) as usize;
        if len > self.max_frame_bytes {
            return Err(CodecError::FrameTooLarge {
                len,
                max: self.max_frame_bytes,
            });
        }

        self.buf.resize(len, 0);
        let got = read_full(&mut self.inner, &mut self.buf)?;
        if got < len {
            return Err(CodecError::Truncated {
                context: "frame payload",
                needed: len,
                available: got,
            });
        }

        self.frames_read += 1;
        Ok(Some(self.buf.as_slice()))
    }
}

/// Like `read_exact`, but reports how many bytes arrived before EOF instead of
/// failing, so callers can tell a clean end from a torn frame.
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Feed every frame payload of `reader` to `handler` until end-of-stream.
///
/// Stops at the first error, whether it comes from the stream itself or from
/// the handler, and returns it. Frames after the failing one are never read.
/// On success returns the number of frames handled.
pub fn for_each_frame<R, E, F>(
    reader: R,
    max_frame_bytes: usize,
    mut handler: F,
) -> std::result::Result<u64, E>
where
    R: Read,
    E: From<CodecError>,
    F: FnMut(&[u8]) -> std::result::Result<(), E>,
{
    let mut frames = FrameReader::with_max_frame_bytes(reader, max_frame_bytes);
    while let Some(payload) = frames.next_frame()? {
        handler(payload)?;
    }
    Ok(frames.frames_read())
}

/// Writes rows as frames.
pub struct FrameWriter<W: Write> {
    inner: W,
    scratch: Vec<u8>,
    frames_written: u64,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            scratch: Vec::new(),
            frames_written: 0,
        }
    }

    /// Encode the concatenation of `parts` as a single row and write it as one
    /// frame.
    ///
    /// Nothing reaches the writer if encoding fails. If the writer itself fails
    /// part way through, the bytes it already accepted stay on the stream as a
    /// torn frame; the frame is not counted and the stream should be treated as
    /// ending at the last counted frame.
    pub fn write_row_parts(&mut self, parts: &[&[Scalar]]) -> Result<()> {
        let fields: usize = parts.iter().map(|p| p.len()).sum();
        let count = u16::try_from(fields).map_err(|_| CodecError::TooManyFields(fields))?;

        self.scratch.clear();
        self.scratch.extend_from_slice(&[0u8; FRAME_HEADER_LEN]);
        self.scratch.extend_from_slice(&count.to_le_bytes());
        let mut field_buf = Vec::new();
        for part in parts {
            // Re-use the row encoder for field bodies, dropping its count prefix.
            field_buf.clear();
            encode_row_into(part, &mut field_buf)?;
            self.scratch.extend_from_slice(&field_buf[2..]);
        }

        let payload_len = self.scratch.len() - FRAME_HEADER_LEN;
        let len = u32::try_from(payload_len).map_err(|_| CodecError::FieldTooLarge(payload_len))?;
        self.scratch[..FRAME_HEADER_LEN].copy_from_slice(&len.to_le_bytes());

        self.inner.write_all(&self.scratch)?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn write_row(&mut self, row: &[Scalar]) -> Result<()> {
        self.write_row_parts(&[row])
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
