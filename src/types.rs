//! Core index types: the block size and the strong digest.

use crate::error::IndexError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Size in bytes of the fixed content blocks files are split into.
pub const BLOCK_SIZE: usize = 8192;

/// Width in bytes of a strong digest.
pub const DIGEST_LEN: usize = 20;

/// A 160-bit strong digest of some content.
///
/// Two digests are equal iff their raw bytes are equal. The textual form is
/// always exactly `2 * DIGEST_LEN` lowercase hex characters, two per byte
/// with leading zeros preserved.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub fn from_bytes(raw: [u8; DIGEST_LEN]) -> Self {
        Digest(raw)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Canonical textual form: 40 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s).map_err(|_| IndexError::MalformedDigest(s.to_string()))?;
        let raw: [u8; DIGEST_LEN] = raw
            .try_into()
            .map_err(|_| IndexError::MalformedDigest(s.to_string()))?;
        Ok(Digest(raw))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_form_is_fixed_width() {
        // Leading zeros in any byte must be preserved, not just the first.
        let mut raw = [0u8; DIGEST_LEN];
        raw[0] = 0x00;
        raw[1] = 0x0a;
        raw[2] = 0xff;
        let digest = Digest::from_bytes(raw);

        let hex = digest.to_hex();
        assert_eq!(hex.len(), 2 * DIGEST_LEN);
        assert!(hex.starts_with("000aff"));
        assert_eq!(hex, format!("{digest}"));
    }

    #[test]
    fn hex_round_trip() {
        let raw: [u8; DIGEST_LEN] = core::array::from_fn(|i| (i * 13) as u8);
        let digest = Digest::from_bytes(raw);
        let parsed: Digest = digest.to_hex().parse().unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn rejects_malformed_text() {
        assert!("".parse::<Digest>().is_err());
        assert!("abc".parse::<Digest>().is_err());
        // right length, bad characters
        assert!("zz39a3ee5e6b4b0d3255bfef95601890afd80709"
            .parse::<Digest>()
            .is_err());
        // too long
        assert!("da39a3ee5e6b4b0d3255bfef95601890afd8070900"
            .parse::<Digest>()
            .is_err());
    }

    #[test]
    fn serializes_as_hex_string() {
        let raw: [u8; DIGEST_LEN] = core::array::from_fn(|i| i as u8);
        let digest = Digest::from_bytes(raw);

        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));

        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
