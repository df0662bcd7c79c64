//! # EdDSA-Poseidon over Baby Jubjub
//!
//! Key derivation, signing and verification compatible with the circom
//! `EdDSAPoseidonVerifier` template.
//!
//! ## Algorithm
//!
//! - `h = Blake512(sk)`; the low 32 bytes are pruned
//!   (`h[0] &= 0xF8`, `h[31] &= 0x7F`, `h[31] |= 0x40`) and read
//!   little-endian; the signing scalar is that integer shifted right by 3.
//! - Public key: `A = B8 · s`.
//! - Sign `m`: `r = LE(Blake512(h[32..64] ‖ LE32(m))) mod l`, `R8 = B8 · r`,
//!   `hm = Poseidon(R8.x, R8.y, A.x, A.y, m)`, `S = (r + hm · 8s) mod l`.
//! - Verify: `S < l` and `B8 · S == R8 + A · (8 · hm)`.
//!
//! ## Security Invariant
//!
//! - Private keys are never serialized or logged. [`PrivateKey`] does not
//!   implement `Serialize` and its `Debug` prints a placeholder.
//! - Key bytes are zeroized when the key is dropped.
//! - Signing is deterministic: equal keys and messages give equal
//!   signatures.

use std::fmt;

use blake_hash::Digest;
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use idstate_core::bytes::{decode_hex_array, hex_prefix};
use idstate_core::{CryptoError, FieldElement};

use crate::babyjubjub::{sub_order, Point};
use crate::poseidon::poseidon_hash;

/// A 32-byte Baby Jubjub EdDSA private key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

/// A Baby Jubjub public key point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(Point);

/// An EdDSA-Poseidon signature `(R8, S)`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Commitment point `R8`.
    pub r8: Point,
    /// Response scalar `S < l`.
    pub s: FieldElement,
}

fn blake512(chunks: &[&[u8]]) -> [u8; 64] {
    let mut hasher = blake_hash::Blake512::new();
    for chunk in chunks {
        hasher.update(*chunk);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    out
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

impl PrivateKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        decode_hex_array::<32>(hex)
            .map(Self)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
    }

    /// Generate a key from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The signing scalar `s`.
    pub fn scalar(&self) -> BigUint {
        let h = blake512(&[self.0.as_slice()]);
        let mut pruned = [0u8; 32];
        pruned.copy_from_slice(&h[..32]);
        pruned[0] &= 0xF8;
        pruned[31] &= 0x7F;
        pruned[31] |= 0x40;
        let s = BigUint::from_bytes_le(&pruned) >> 3u32;
        pruned.zeroize();
        s
    }

    /// Derive the public key `B8 · s`.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(Point::base8().mul_scalar(&self.scalar()))
    }

    /// Sign a field element message with EdDSA-Poseidon.
    pub fn sign(&self, message: &FieldElement) -> Result<Signature, CryptoError> {
        let h = blake512(&[self.0.as_slice()]);
        let msg_le = message.to_le_bytes();
        let r_digest = blake512(&[&h[32..], msg_le.as_slice()]);
        let r = BigUint::from_bytes_le(&r_digest) % sub_order();
        let r8 = Point::base8().mul_scalar(&r);

        let a = self.public_key();
        let hm = poseidon_hash(&[r8.x(), r8.y(), a.x(), a.y(), *message])?;

        let s = self.scalar() << 3u32;
        let big_s = (r + hm.to_biguint() * s) % sub_order();
        let s = FieldElement::from_biguint(&big_s)
            .map_err(|e| CryptoError::Hash(e.to_string()))?;
        Ok(Signature { r8, s })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

impl PublicKey {
    /// Build from affine coordinates, rejecting points off the curve or
    /// outside the prime-order subgroup.
    pub fn from_coordinates(x: FieldElement, y: FieldElement) -> Result<Self, CryptoError> {
        let point = Point::new(x, y)
            .map_err(|_| CryptoError::InvalidPublicKey("point is not on the curve".into()))?;
        Self::from_point(point)
    }

    fn from_point(point: Point) -> Result<Self, CryptoError> {
        if !point.in_sub_group() {
            return Err(CryptoError::InvalidPublicKey(
                "point is not in the prime-order subgroup".into(),
            ));
        }
        Ok(Self(point))
    }

    /// The underlying curve point.
    pub fn point(&self) -> &Point {
        &self.0
    }

    /// The `x` coordinate.
    pub fn x(&self) -> FieldElement {
        self.0.x()
    }

    /// The `y` coordinate.
    pub fn y(&self) -> FieldElement {
        self.0.y()
    }

    /// 32-byte compressed form.
    pub fn compress(&self) -> [u8; 32] {
        self.0.compress()
    }

    /// Recover from the 32-byte compressed form.
    pub fn decompress(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        Self::from_point(Point::decompress(bytes)?)
    }

    /// Hex of the compressed form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.compress())
    }

    /// Parse the hex of the compressed form.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = decode_hex_array::<32>(hex)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Self::decompress(&bytes)
    }

    /// Verify an EdDSA-Poseidon signature over `message`.
    pub fn verify(&self, message: &FieldElement, sig: &Signature) -> bool {
        verify(self, message, sig).is_ok()
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}...)", hex_prefix(&self.compress()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

impl Signature {
    /// 64-byte compressed form: `compress(R8) ‖ LE32(S)`.
    pub fn compress(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r8.compress());
        out[32..].copy_from_slice(&self.s.to_le_bytes());
        out
    }

    /// Recover a signature from its compressed form.
    pub fn decompress(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 64 {
            return Err(CryptoError::InvalidSignatureLength(bytes.len()));
        }
        let mut r8_bytes = [0u8; 32];
        r8_bytes.copy_from_slice(&bytes[..32]);
        let r8 = Point::decompress(&r8_bytes)
            .map_err(|e| CryptoError::SignatureDecompressionFailed(e.to_string()))?;
        let mut s_bytes = [0u8; 32];
        s_bytes.copy_from_slice(&bytes[32..]);
        let s = FieldElement::from_le_bytes(&s_bytes)
            .map_err(|e| CryptoError::SignatureDecompressionFailed(e.to_string()))?;
        if s.to_biguint() >= *sub_order() {
            return Err(CryptoError::SignatureDecompressionFailed(
                "S is not below the subgroup order".into(),
            ));
        }
        Ok(Self { r8, s })
    }

    /// Hex of the compressed form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.compress())
    }

    /// Parse the hex of the compressed form.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex.trim())
            .map_err(|e| CryptoError::SignatureDecompressionFailed(e.to_string()))?;
        Self::decompress(&bytes)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", hex_prefix(&self.compress()))
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an EdDSA-Poseidon signature.
///
/// Returns `Ok(())` if valid, `Err(CryptoError::InvalidSignature)` otherwise.
pub fn verify(
    public_key: &PublicKey,
    message: &FieldElement,
    sig: &Signature,
) -> Result<(), CryptoError> {
    if !public_key.0.is_on_curve() {
        return Err(CryptoError::InvalidPublicKey("point is not on the curve".into()));
    }
    if !sig.r8.is_on_curve() || sig.s.to_biguint() >= *sub_order() {
        return Err(CryptoError::InvalidSignature);
    }
    let hm = poseidon_hash(&[
        sig.r8.x(),
        sig.r8.y(),
        public_key.x(),
        public_key.y(),
        *message,
    ])?;
    let left = Point::base8().mul_scalar(&sig.s.to_biguint());
    let right = sig
        .r8
        .add(&public_key.0.mul_scalar(&(hm.to_biguint() << 3u32)));
    if left == right {
        Ok(())
    } else {
        Err(CryptoError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "0001020304050607080900010203040506070809000102030405060708090001";
    const GENESIS_KEY_HEX: &str =
        "28156abe7fe2fd433dc9df969286b96666489bac508612d0e16593e944c4f69f";

    fn fe(s: &str) -> FieldElement {
        FieldElement::from_decimal(s).unwrap()
    }

    #[test]
    fn test_public_key_known_vector() {
        let sk = PrivateKey::from_hex(KEY_HEX).unwrap();
        let pk = sk.public_key();
        assert_eq!(
            pk.x(),
            fe("13277427435165878497778222415993513565335242147425444199013288855685581939618")
        );
        assert_eq!(
            pk.y(),
            fe("13622229784656158136036771217484571176836296686641868549125388198837476602820")
        );
    }

    #[test]
    fn test_public_key_in_subgroup() {
        let sk = PrivateKey::from_hex(GENESIS_KEY_HEX).unwrap();
        assert!(sk.public_key().point().in_sub_group());
    }

    #[test]
    fn test_genesis_key_public_coordinates() {
        let pk = PrivateKey::from_hex(GENESIS_KEY_HEX).unwrap().public_key();
        assert_eq!(
            pk.x(),
            fe("17640206035128972995519606214765283372613874593503528180869261482403155458945")
        );
        assert_eq!(
            pk.y(),
            fe("20634138280259599560273310290025659992320584624461316485434108770067472477956")
        );
        assert_eq!(
            pk.to_hex(),
            "046f8ce2096fb5df44495bcd39a463db0a5a0a816cd595ee43a3943b26829ead"
        );
        assert_eq!(pk.compress()[31] & 0x80, 0x80);
    }

    #[test]
    fn test_low_order_point_rejected() {
        // (0, -1) is on the curve with order 2.
        let minus_one = fe(
            "21888242871839275222246405745257275088548364400416034343698204186575808495616",
        );
        assert!(Point::new(FieldElement::zero(), minus_one).is_ok());
        assert!(matches!(
            PublicKey::from_coordinates(FieldElement::zero(), minus_one),
            Err(CryptoError::InvalidPublicKey(_))
        ));

        let mut compressed = minus_one.to_le_bytes();
        compressed[31] &= 0x7f;
        assert!(matches!(
            PublicKey::decompress(&compressed),
            Err(CryptoError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_public_key_compression_round_trip() {
        let pk = PrivateKey::from_hex(GENESIS_KEY_HEX).unwrap().public_key();
        let compressed = pk.compress();
        let back = PublicKey::decompress(&compressed).unwrap();
        assert_eq!(back, pk);
        assert_eq!(back.x(), pk.x());
        assert_eq!(PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
    }

    #[test]
    fn test_sign_and_verify() {
        let sk = PrivateKey::from_hex(GENESIS_KEY_HEX).unwrap();
        let msg = FieldElement::from_u64(123_456_789);
        let sig = sk.sign(&msg).unwrap();
        verify(&sk.public_key(), &msg, &sig).expect("valid signature should verify");
        assert!(sk.public_key().verify(&msg, &sig));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let sk = PrivateKey::from_hex(GENESIS_KEY_HEX).unwrap();
        let msg = FieldElement::from_u64(42);
        assert_eq!(sk.sign(&msg).unwrap(), sk.sign(&msg).unwrap());
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let sk = PrivateKey::from_hex(GENESIS_KEY_HEX).unwrap();
        let sig = sk.sign(&FieldElement::from_u64(1)).unwrap();
        assert_eq!(
            verify(&sk.public_key(), &FieldElement::from_u64(2), &sig),
            Err(CryptoError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let sk1 = PrivateKey::from_hex(GENESIS_KEY_HEX).unwrap();
        let sk2 = PrivateKey::from_hex(KEY_HEX).unwrap();
        let msg = FieldElement::from_u64(7);
        let sig = sk1.sign(&msg).unwrap();
        assert!(!sk2.public_key().verify(&msg, &sig));
    }

    #[test]
    fn test_tampered_s_fails() {
        let sk = PrivateKey::from_hex(GENESIS_KEY_HEX).unwrap();
        let msg = FieldElement::from_u64(9);
        let mut sig = sk.sign(&msg).unwrap();
        sig.s = FieldElement::from_biguint(&((sig.s.to_biguint() + 1u32) % sub_order())).unwrap();
        assert!(!sk.public_key().verify(&msg, &sig));
    }

    #[test]
    fn test_signature_compression_round_trip() {
        let sk = PrivateKey::generate();
        let msg = FieldElement::from_u64(1000);
        let sig = sk.sign(&msg).unwrap();
        let bytes = sig.compress();
        let back = Signature::decompress(&bytes).unwrap();
        assert_eq!(back, sig);
        assert!(sk.public_key().verify(&msg, &back));
    }

    #[test]
    fn test_signature_wrong_length() {
        assert_eq!(
            Signature::decompress(&[0u8; 63]),
            Err(CryptoError::InvalidSignatureLength(63))
        );
    }

    #[test]
    fn test_signature_bad_s_rejected() {
        let sk = PrivateKey::from_hex(GENESIS_KEY_HEX).unwrap();
        let mut bytes = sk.sign(&FieldElement::one()).unwrap().compress();
        // S = l is outside the subgroup range.
        bytes[32..].copy_from_slice(&FieldElement::from_biguint(sub_order()).unwrap().to_le_bytes());
        assert!(matches!(
            Signature::decompress(&bytes),
            Err(CryptoError::SignatureDecompressionFailed(_))
        ));
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let sk = PrivateKey::from_hex(GENESIS_KEY_HEX).unwrap();
        assert_eq!(format!("{sk:?}"), "PrivateKey(<redacted>)");
    }

    #[test]
    fn test_private_key_bad_hex() {
        assert!(matches!(
            PrivateKey::from_hex("abcd"),
            Err(CryptoError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_public_key_serde_hex() {
        let pk = PrivateKey::from_hex(KEY_HEX).unwrap().public_key();
        let json = serde_json::to_string(&pk).unwrap();
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(8))]

            #[test]
            fn sign_verify_any_key(key in any::<[u8; 32]>(), msg in any::<u64>()) {
                let sk = PrivateKey::from_bytes(key);
                let m = FieldElement::from_u64(msg);
                let sig = sk.sign(&m).unwrap();
                prop_assert!(sk.public_key().verify(&m, &sig));
            }
        }
    }
}
