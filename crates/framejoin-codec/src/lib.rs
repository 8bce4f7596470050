#![forbid(unsafe_code)]
//! framejoin-codec: the row wire format.
//!
//! Two layers:
//! - `row`: deterministic encoding of an ordered list of scalars into a payload.
//!   Equal rows always encode to identical bytes, which is what lets the join
//!   use encoded keys directly as hash table keys.
//! - `frame`: one `[len: u32 LE][payload]` frame per row on a byte stream, plus
//!   a stop-on-error iteration helper.
//!
//! `jsonl` is a text view of rows for tooling and fixtures.

pub mod buf;
pub mod error;
pub mod frame;
pub mod jsonl;
pub mod row;

pub use error::{CodecError, Result};
pub use frame::{for_each_frame, FrameReader, FrameWriter, FRAME_HEADER_LEN};
pub use row::{decode_row, encode_frame, encode_row, encode_row_into};
