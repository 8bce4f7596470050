//! NDJSON view of rows, for turning frame files into text and back.
//!
//! Each line is a JSON array, one element per field. Strings, booleans, null,
//! integers (I64) and non-integral numbers (F64) map directly; the other types
//! use a single-key object: `{"I32": 1}`, `{"F32": 1.5}`, `{"Bin": [0, 255]}`.
//! Non-finite floats have no JSON form and come out as `null`.

use std::io::{BufRead, Write};

use framejoin_core::types::{Row, Scalar};
use serde_json::{json, Value};

use crate::error::{CodecError, Result};
use crate::frame::{FrameReader, FrameWriter};
use crate::row::decode_row;

pub fn scalar_to_json(v: &Scalar) -> Value {
    match v {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::I32(i) => json!({ "I32": i }),
        Scalar::I64(i) => Value::from(*i),
        Scalar::F32(f) => json!({ "F32": f }),
        Scalar::F64(f) => Value::from(*f),
        Scalar::Str(s) => Value::String(s.clone()),
        Scalar::Bin(b) => json!({ "Bin": b }),
    }
}

pub fn scalar_from_json(v: Value) -> Result<Scalar> {
    match v {
        Value::Null => Ok(Scalar::Null),
        Value::Bool(b) => Ok(Scalar::Bool(b)),
        Value::String(s) => Ok(Scalar::Str(s)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Scalar::I64(i)),
            (None, Some(f)) => Ok(Scalar::F64(f)),
            (None, None) => Err(CodecError::JsonShape("number out of range")),
        },
        Value::Object(_) => Ok(serde_json::from_value(v)?),
        Value::Array(_) => Err(CodecError::JsonShape("nested array as field value")),
    }
}

pub fn row_to_json(row: &[Scalar]) -> Value {
    Value::Array(row.iter().map(scalar_to_json).collect())
}

pub fn row_from_json(line: &str) -> Result<Row> {
    match serde_json::from_str::<Value>(line)? {
        Value::Array(fields) => fields.into_iter().map(scalar_from_json).collect(),
        _ => Err(CodecError::JsonShape("row is not a json array")),
    }
}

/// Encode every non-blank NDJSON line of `input` as a frame on `output`.
/// Returns the number of rows written. Per-line failures come back as
/// `CodecError::InvalidRow` carrying the 1-based line number.
pub fn encode_lines<R: BufRead, W: Write>(input: R, output: W) -> Result<u64> {
    let mut out = FrameWriter::new(output);
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        row_from_json(&line)
            .and_then(|row| out.write_row(&row))
            .map_err(|e| CodecError::InvalidRow {
                line: idx + 1,
                source: Box::new(e),
            })?;
    }
    out.flush()?;
    Ok(out.frames_written())
}

/// Write every frame of `input` as an NDJSON line. Stops at the first
/// malformed frame.
pub fn dump_frames<R: std::io::Read, W: Write>(
    input: R,
    max_frame_bytes: usize,
    mut output: W,
) -> Result<u64> {
    let mut frames = FrameReader::with_max_frame_bytes(input, max_frame_bytes);
    while let Some(payload) = frames.next_frame()? {
        let row = decode_row(payload)?;
        writeln!(output, "{}", row_to_json(&row))?;
    }
    output.flush()?;
    Ok(frames.frames_read())
}
