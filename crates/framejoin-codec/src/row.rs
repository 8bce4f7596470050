//! Row payload encoding.
//!
//! Layout:
//! [ field_count: u16 LE ]
//! then per field: [ tag: u8 ][ body ]
//!
//! Bodies: Null (none), Bool (1 byte, 0/1), I32/F32 (4 bytes LE),
//! I64/F64 (8 bytes LE), Str/Bin ([ len: u32 LE ][ bytes ]).
//!
//! Floats are written as raw bits, so `0.0` and `-0.0` encode differently and
//! NaN only equals the identical NaN bit pattern.

use framejoin_core::types::{Row, Scalar};

use crate::error::{CodecError, Result};
use crate::frame::FRAME_HEADER_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Null = 0,
    Bool = 1,
    I32 = 2,
    I64 = 3,
    F32 = 4,
    F64 = 5,
    Str = 6,
    Bin = 7,
}

impl Tag {
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(Tag::Null),
            1 => Ok(Tag::Bool),
            2 => Ok(Tag::I32),
            3 => Ok(Tag::I64),
            4 => Ok(Tag::F32),
            5 => Ok(Tag::F64),
            6 => Ok(Tag::Str),
            7 => Ok(Tag::Bin),
            other => Err(CodecError::UnknownTag(other)),
        }
    }

    pub fn of(s: &Scalar) -> Self {
        match s {
            Scalar::Null => Tag::Null,
            Scalar::Bool(_) => Tag::Bool,
            Scalar::I32(_) => Tag::I32,
            Scalar::I64(_) => Tag::I64,
            Scalar::F32(_) => Tag::F32,
            Scalar::F64(_) => Tag::F64,
            Scalar::Str(_) => Tag::Str,
            Scalar::Bin(_) => Tag::Bin,
        }
    }
}

/// Encode `fields` as a payload appended to `out`.
///
/// Generic over the slice so key and value halves can be encoded without
/// first being collected into one `Row`.
pub fn encode_row_into(fields: &[Scalar], out: &mut Vec<u8>) -> Result<()> {
    let count = u16::try_from(fields.len()).map_err(|_| CodecError::TooManyFields(fields.len()))?;
    out.extend_from_slice(&count.to_le_bytes());
    for field in fields {
        encode_scalar(field, out)?;
    }
    Ok(())
}

/// Encode a row payload (no frame header).
pub fn encode_row(fields: &[Scalar]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(2 + fields.len() * 9);
    encode_row_into(fields, &mut out)?;
    Ok(out)
}

/// Encode a complete frame: length prefix followed by the row payload.
pub fn encode_frame(fields: &[Scalar]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; FRAME_HEADER_LEN];
    encode_row_into(fields, &mut out)?;
    let payload_len = out.len() - FRAME_HEADER_LEN;
    let len = u32::try_from(payload_len).map_err(|_| CodecError::FieldTooLarge(payload_len))?;
    out[..FRAME_HEADER_LEN].copy_from_slice(&len.to_le_bytes());
    Ok(out)
}

fn encode_scalar(s: &Scalar, out: &mut Vec<u8>) -> Result<()> {
    out.push(Tag::of(s) as u8);
    match s {
        Scalar::Null => {}
        Scalar::Bool(b) => out.push(*b as u8),
        Scalar::I32(i) => out.extend_from_slice(&i.to_le_bytes()),
        Scalar::I64(i) => out.extend_from_slice(&i.to_le_bytes()),
        Scalar::F32(f) => out.extend_from_slice(&f.to_bits().to_le_bytes()),
        Scalar::F64(f) => out.extend_from_slice(&f.to_bits().to_le_bytes()),
        Scalar::Str(s) => encode_bytes(s.as_bytes(), out)?,
        Scalar::Bin(b) => encode_bytes(b, out)?,
    }
    Ok(())
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) -> Result<()> {
    let len = u32::try_from(bytes.len()).map_err(|_| CodecError::FieldTooLarge(bytes.len()))?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

/// Decode a row payload. The whole slice must be consumed.
pub fn decode_row(payload: &[u8]) -> Result<Row> {
    let mut d = Decoder { bytes: payload, pos: 0 };
    let count = u16::from_le_bytes(d.array::<2>("field count")?) as usize;
    let mut row = Vec::with_capacity(count);
    for _ in 0..count {
        row.push(d.scalar()?);
    }
    let rest = payload.len() - d.pos;
    if rest != 0 {
        return Err(CodecError::TrailingBytes(rest));
    }
    Ok(row)
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8]> {
        let available = self.bytes.len() - self.pos;
        if n > available {
            return Err(CodecError::Truncated {
                context,
                needed: n,
                available,
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    fn len_prefixed(&mut self, context: &'static str) -> Result<&'a [u8]> {
        let len = u32::from_le_bytes(self.array::<4>(context)?) as usize;
        self.take(len, context)
    }

    fn scalar(&mut self) -> Result<Scalar> {
        let [tag] = self.array::<1>("field tag")?;
        Ok(match Tag::from_u8(tag)? {
            Tag::Null => Scalar::Null,
            Tag::Bool => {
                let [b] = self.array::<1>("bool")?;
                Scalar::Bool(b != 0)
            }
            Tag::I32 => Scalar::I32(i32::from_le_bytes(self.array("i32")?)),
            Tag::I64 => Scalar::I64(i64::from_le_bytes(self.array("i64")?)),
            Tag::F32 => Scalar::F32(f32::from_bits(u32::from_le_bytes(self.array("f32")?))),
            Tag::F64 => Scalar::F64(f64::from_bits(u64::from_le_bytes(self.array("f64")?))),
            Tag::Str => {
                let raw = self.len_prefixed("str")?;
                let s = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
                Scalar::Str(s.to_string())
            }
            Tag::Bin => Scalar::Bin(self.len_prefixed("bin")?.to_vec()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framejoin_core::row;

    #[test]
    fn decode_restores_every_scalar_kind() {
        let r = vec![
            Scalar::Null,
            Scalar::Bool(true),
            Scalar::I32(-7),
            Scalar::I64(1 << 40),
            Scalar::F32(1.5),
            Scalar::F64(-2.25),
            Scalar::Str("héllo".into()),
            Scalar::Bin(vec![0, 255, 3]),
        ];
        assert_eq!(decode_row(&encode_row(&r).unwrap()).unwrap(), r);
    }

    #[test]
    fn equal_rows_encode_identically() {
        let a = encode_row(&row!["k", 1i64]).unwrap();
        let b = encode_row(&row!["k", 1i64]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn type_is_part_of_the_encoding() {
        // Same numeric value, different types: must not collide as keys.
        let a = encode_row(&[Scalar::I32(1)]).unwrap();
        let b = encode_row(&[Scalar::I64(1)]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn string_boundaries_are_unambiguous() {
        let a = encode_row(&row!["ab", "c"]).unwrap();
        let b = encode_row(&row!["a", "bc"]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn signed_zero_keys_differ() {
        let a = encode_row(&[Scalar::F64(0.0)]).unwrap();
        let b = encode_row(&[Scalar::F64(-0.0)]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn frame_header_holds_payload_length() {
        let frame = encode_frame(&row!["a"]).unwrap();
        let len = u32::from_le_bytes(frame[..4].try_into().unwrap()) as usize;
        assert_eq!(len, frame.len() - FRAME_HEADER_LEN);
        assert_eq!(&frame[FRAME_HEADER_LEN..], encode_row(&row!["a"]).unwrap().as_slice());
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let payload = [1u8, 0, 0xff];
        assert!(matches!(decode_row(&payload), Err(CodecError::UnknownTag(0xff))));
    }

    #[test]
    fn short_payload_is_truncated() {
        // Declares one i64 field but carries only 3 bytes of it.
        let payload = [1u8, 0, Tag::I64 as u8, 1, 2, 3];
        assert!(matches!(
            decode_row(&payload),
            Err(CodecError::Truncated { context: "i64", needed: 8, available: 3 })
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut payload = encode_row(&row![1i64]).unwrap();
        payload.push(0);
        assert!(matches!(decode_row(&payload), Err(CodecError::TrailingBytes(1))));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let payload = [1u8, 0, Tag::Str as u8, 2, 0, 0, 0, 0xc3, 0x28];
        assert!(matches!(decode_row(&payload), Err(CodecError::InvalidUtf8)));
    }
}
