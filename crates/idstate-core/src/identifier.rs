//! # Identity Identifiers
//!
//! An identifier is 31 bytes laid out as
//! `type (2) ‖ genesis (27) ‖ checksum (2)`. The genesis part is cut from
//! the genesis state hash; the checksum is the big-endian `u16` sum of the
//! preceding 29 bytes.
//!
//! Identifiers enter circuits as the little-endian integer of their 31
//! bytes, which is always below the field modulus.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bytes::decode_hex_array;
use crate::error::{DecodingError, HexError};
use crate::field::FieldElement;

/// Byte width of an identifier.
pub const IDENTIFIER_LEN: usize = 31;

/// Byte width of the genesis segment.
pub const GENESIS_LEN: usize = 27;

/// A 31-byte identity identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; IDENTIFIER_LEN]);

impl Identifier {
    /// Wrap raw bytes without validating the checksum.
    pub fn from_bytes(bytes: [u8; IDENTIFIER_LEN]) -> Self {
        Self(bytes)
    }

    /// Assemble `type ‖ genesis ‖ checksum`, computing the checksum.
    pub fn from_parts(id_type: [u8; 2], genesis: &[u8; GENESIS_LEN]) -> Self {
        let mut bytes = [0u8; IDENTIFIER_LEN];
        bytes[..2].copy_from_slice(&id_type);
        bytes[2..29].copy_from_slice(genesis);
        let checksum = checksum(&bytes[..29]);
        bytes[29..].copy_from_slice(&checksum.to_be_bytes());
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        &self.0
    }

    /// The two type bytes.
    pub fn id_type(&self) -> [u8; 2] {
        [self.0[0], self.0[1]]
    }

    /// The 27 genesis bytes.
    pub fn genesis(&self) -> [u8; GENESIS_LEN] {
        let mut out = [0u8; GENESIS_LEN];
        out.copy_from_slice(&self.0[2..29]);
        out
    }

    /// The stored checksum.
    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes([self.0[29], self.0[30]])
    }

    /// True when the stored checksum matches the type and genesis bytes.
    pub fn has_valid_checksum(&self) -> bool {
        checksum(&self.0[..29]) == self.checksum()
    }

    /// Little-endian integer form used as a circuit input.
    pub fn to_field(&self) -> FieldElement {
        let mut buf = [0u8; 32];
        buf[..IDENTIFIER_LEN].copy_from_slice(&self.0);
        // 31 bytes are below 2^248 < p.
        FieldElement::from_le_bytes(&buf).unwrap_or_default()
    }

    /// Inverse of [`Identifier::to_field`]; the top byte must be zero.
    pub fn from_field(fe: &FieldElement) -> Result<Self, DecodingError> {
        let le = fe.to_le_bytes();
        if le[IDENTIFIER_LEN] != 0 {
            return Err(DecodingError::MalformedHeader(
                "identifier slot uses more than 31 bytes".into(),
            ));
        }
        let mut bytes = [0u8; IDENTIFIER_LEN];
        bytes.copy_from_slice(&le[..IDENTIFIER_LEN]);
        Ok(Self(bytes))
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 62-char hex string.
    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        decode_hex_array::<IDENTIFIER_LEN>(s).map(Self)
    }
}

fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.to_hex())
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
