//! Stable hashing helpers for descriptors, manifests, and output streams.

use std::fmt;
use std::str::FromStr;

use blake3::Hasher;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A blake3 digest. Serializes as 64 lowercase hex characters so reports and
/// manifests stay readable and comparable with `b3sum` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash256(pub [u8; 32]);

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(blake3::Hash::from(self.0).to_hex().as_str())
    }
}

impl FromStr for Hash256 {
    type Err = blake3::HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        blake3::Hash::from_hex(s).map(|h| Hash256(*h.as_bytes()))
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

pub fn hash_bytes(bytes: &[u8]) -> Hash256 {
    let mut h = Hasher::new();
    h.update(bytes);
    Hash256(h.finalize().into())
}

/// Hash any serde-serializable value deterministically (via JSON).
pub fn hash_serde<T: Serialize>(v: &T) -> Result<Hash256, crate::error::Error> {
    let bytes = serde_json::to_vec(v)?;
    Ok(hash_bytes(&bytes))
}

/// Incremental digest for data that arrives in pieces (e.g. an output stream).
#[derive(Default)]
pub struct StreamDigest {
    hasher: Hasher,
    bytes: u64,
}

impl StreamDigest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.bytes += chunk.len() as u64;
    }

    /// Total bytes fed so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn finish(&self) -> Hash256 {
        Hash256(self.hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_digest_matches_one_shot() {
        let mut d = StreamDigest::new();
        d.update(b"hello ");
        d.update(b"world");
        assert_eq!(d.finish(), hash_bytes(b"hello world"));
        assert_eq!(d.bytes(), 11);
    }

    #[test]
    fn serializes_as_hex_string() {
        let h = hash_bytes(b"");
        let json = serde_json::to_value(h).unwrap();
        let text = json.as_str().unwrap();
        assert_eq!(text.len(), 64);
        // blake3 of the empty input.
        assert!(text.starts_with("af1349b9"));
        assert_eq!(serde_json::from_value::<Hash256>(json.clone()).unwrap(), h);
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!("zz".parse::<Hash256>().is_err());
        assert!(serde_json::from_str::<Hash256>("\"abc\"").is_err());
    }
}
