//! # BN254 Scalar Field Elements
//!
//! Every claim slot, tree key, tree value and state hash is an element of
//! the BN254 scalar field with modulus
//! `p = 21888242871839275222246405745257275088548364400416034343698204186575808495617`.
//!
//! ## Security Invariant
//!
//! Conversions from integers, bytes and decimal text reject values `>= p`
//! with [`FieldError::OutOfRange`]. Nothing is silently reduced modulo `p`;
//! a reduced value would commit to a different claim than the one supplied.
//!
//! ## Serde
//!
//! Field elements serialize as decimal strings, the format circuit inputs
//! use.

use std::fmt;
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInt, BigInteger, PrimeField, Zero};
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FieldError;

static MODULUS: Lazy<BigUint> = Lazy::new(|| BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le()));

/// An element of the BN254 scalar field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FieldElement(Fr);

impl FieldElement {
    /// The additive identity.
    pub fn zero() -> Self {
        Self(Fr::zero())
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Self(Fr::from(1u64))
    }

    /// Lift a `u64`; always in range.
    pub fn from_u64(v: u64) -> Self {
        Self(Fr::from(v))
    }

    /// The field modulus as an arbitrary-precision integer.
    pub fn modulus() -> &'static BigUint {
        &MODULUS
    }

    /// Interpret 32 little-endian bytes as an integer `< p`.
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Result<Self, FieldError> {
        let mut limbs = [0u64; 4];
        for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *limb = u64::from_le_bytes(word);
        }
        Fr::from_bigint(BigInt::new(limbs))
            .map(Self)
            .ok_or_else(|| FieldError::OutOfRange(format!("0x{}", hex::encode(reversed(bytes)))))
    }

    /// Interpret up to 32 little-endian bytes, zero-extending the high end.
    pub fn from_le_slice(bytes: &[u8]) -> Result<Self, FieldError> {
        if bytes.len() > 32 {
            return Err(FieldError::TooLong(bytes.len()));
        }
        let mut buf = [0u8; 32];
        buf[..bytes.len()].copy_from_slice(bytes);
        Self::from_le_bytes(&buf)
    }

    /// Interpret 32 big-endian bytes as an integer `< p`.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Result<Self, FieldError> {
        Self::from_le_bytes(&reversed(bytes))
    }

    /// Canonical 32-byte little-endian encoding.
    pub fn to_le_bytes(&self) -> [u8; 32] {
        let v = self.0.into_bigint().to_bytes_le();
        let mut out = [0u8; 32];
        out[..v.len()].copy_from_slice(&v);
        out
    }

    /// Canonical 32-byte big-endian encoding.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        reversed(&self.to_le_bytes())
    }

    /// Convert from an arbitrary-precision integer, rejecting values `>= p`.
    pub fn from_biguint(v: &BigUint) -> Result<Self, FieldError> {
        if v >= &*MODULUS {
            return Err(FieldError::OutOfRange(v.to_string()));
        }
        let bytes = v.to_bytes_le();
        Self::from_le_slice(&bytes)
    }

    /// The element as an arbitrary-precision integer in `[0, p)`.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.to_le_bytes())
    }

    /// Parse a decimal string.
    pub fn from_decimal(s: &str) -> Result<Self, FieldError> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FieldError::Parse(s.to_string()));
        }
        let v = BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| FieldError::Parse(s.into()))?;
        Self::from_biguint(&v)
    }

    /// Decimal string form.
    pub fn to_decimal(&self) -> String {
        self.to_biguint().to_string()
    }

    /// Bit `i` of the canonical integer, least significant first.
    pub fn bit(&self, i: usize) -> bool {
        i < 256 && self.0.into_bigint().get_bit(i)
    }

    /// True for the additive identity.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The underlying arkworks element.
    pub fn as_fr(&self) -> Fr {
        self.0
    }
}

fn reversed(bytes: &[u8; 32]) -> [u8; 32] {
    let mut out = *bytes;
    out.reverse();
    out
}

impl From<Fr> for FieldElement {
    fn from(fr: Fr) -> Self {
        Self(fr)
    }
}

impl From<FieldElement> for Fr {
    fn from(fe: FieldElement) -> Self {
        fe.0
    }
}

impl From<u64> for FieldElement {
    fn from(v: u64) -> Self {
        Self::from_u64(v)
    }
}

impl FromStr for FieldElement {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_decimal())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_decimal(&s).map_err(serde::de::Error::custom)
    }
}
