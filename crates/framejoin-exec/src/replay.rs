//! Deterministic replay & provenance helpers.
//!
//! A run is identified by the hash of its descriptor; its result by the digest
//! of its output bytes. Identical descriptors over identical input streams must
//! yield identical output digests.

use std::io::{self, Write};

use framejoin_core::hash::{hash_serde, Hash256, StreamDigest};
use framejoin_operators::InstructionDescriptor;

use crate::ExecError;

pub fn hash_descriptor(desc: &InstructionDescriptor) -> Result<Hash256, ExecError> {
    Ok(hash_serde(desc)?)
}

/// Pass-through writer that digests every byte it forwards.
pub struct DigestWriter<'d, W: Write> {
    inner: W,
    digest: &'d mut StreamDigest,
}

impl<'d, W: Write> DigestWriter<'d, W> {
    pub fn new(inner: W, digest: &'d mut StreamDigest) -> Self {
        Self { inner, digest }
    }
}

impl<W: Write> Write for DigestWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.digest.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
