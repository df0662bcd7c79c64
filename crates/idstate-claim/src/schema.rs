//! Claim schema hashes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use idstate_core::bytes::decode_hex_array;
use idstate_core::HexError;

/// The 16-byte hash identifying a claim's schema.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SchemaHash(pub [u8; 16]);

impl SchemaHash {
    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 32 hex chars.
    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        decode_hex_array::<16>(s).map(Self)
    }
}

impl fmt::Display for SchemaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for SchemaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaHash({})", self.to_hex())
    }
}

impl Serialize for SchemaHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SchemaHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let s = SchemaHash::from_hex("ca938857241db9451ea329256b9c06e5").unwrap();
        assert_eq!(s.as_bytes()[0], 0xca);
        assert_eq!(s.as_bytes()[15], 0xe5);
        assert_eq!(s.to_string(), "ca938857241db9451ea329256b9c06e5");
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(SchemaHash::from_hex("ca93").is_err());
    }
}
