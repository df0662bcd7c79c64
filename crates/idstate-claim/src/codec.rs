//! # Claim Codec
//!
//! Encodes a [`Claim`] into eight field elements and decodes them back.
//!
//! ## Header (slot 0)
//!
//! - bytes 0..16: schema hash
//! - byte 16: flags
//!   - bits 0–2 subject position: `000` self, `010` index, `011` value
//!   - bit 3 expirable
//!   - bit 4 updatable
//!   - bits 5–7 merklized root position: `000` none, `001` index, `010` value
//! - bytes 20..24: version, little-endian `u32`
//! - bytes 17..20 and 24..32: reserved, zero
//!
//! ## Security Invariant
//!
//! `decode(encode(c)) == c` for every claim `encode` accepts, and `decode`
//! rejects any slot vector `encode` could not have produced. Without the
//! second half, two distinct slot vectors could decode to the same claim
//! while hashing to different tree keys.

use serde::{Deserialize, Serialize};

use idstate_core::{
    CryptoError, DecodingError, EncodingError, FieldElement, IdStateError, Identifier,
};
use idstate_crypto::FieldHasher;

use crate::claim::{Claim, MerklizedRoot, SubjectPosition};
use crate::schema::SchemaHash;

const SUBJECT_SELF: u8 = 0b000;
const SUBJECT_INDEX: u8 = 0b010;
const SUBJECT_VALUE: u8 = 0b011;
const SUBJECT_MASK: u8 = 0b111;

const FLAG_EXPIRABLE: u8 = 1 << 3;
const FLAG_UPDATABLE: u8 = 1 << 4;

const MERKLIZE_SHIFT: u8 = 5;
const MERKLIZE_NONE: u8 = 0b000;
const MERKLIZE_INDEX: u8 = 0b001;
const MERKLIZE_VALUE: u8 = 0b010;

const FLAGS_BYTE: usize = 16;
const VERSION_OFFSET: usize = 20;

/// The eight field elements of an encoded claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSlots(pub [FieldElement; 8]);

impl ClaimSlots {
    /// All eight slots.
    pub fn slots(&self) -> &[FieldElement; 8] {
        &self.0
    }

    /// Index section, slots 0..4.
    pub fn index(&self) -> &[FieldElement] {
        &self.0[..4]
    }

    /// Value section, slots 4..8.
    pub fn value(&self) -> &[FieldElement] {
        &self.0[4..]
    }

    /// `(hIndex, hValue)` under `hasher`.
    pub fn hi_hv<H: FieldHasher + ?Sized>(
        &self,
        hasher: &H,
    ) -> Result<(FieldElement, FieldElement), CryptoError> {
        Ok((hasher.hash(self.index())?, hasher.hash(self.value())?))
    }
}

/// Reject claims where a merklized root and a data value share a slot.
pub(crate) fn check_positions(claim: &Claim) -> Result<(), EncodingError> {
    match claim.merklized {
        MerklizedRoot::Index(_) if !claim.index_data[0].is_zero() => {
            Err(EncodingError::ConflictingPosition {
                slot: 2,
                first: "index data",
                second: "merklized root",
            })
        }
        MerklizedRoot::Value(_) if !claim.value_data[0].is_zero() => {
            Err(EncodingError::ConflictingPosition {
                slot: 6,
                first: "value data",
                second: "merklized root",
            })
        }
        _ => Ok(()),
    }
}

impl Claim {
    /// Encode into eight slots.
    pub fn encode(&self) -> Result<ClaimSlots, EncodingError> {
        check_positions(self)?;

        let mut header = [0u8; 32];
        header[..16].copy_from_slice(self.schema.as_bytes());
        let mut flags = match self.subject {
            SubjectPosition::None => SUBJECT_SELF,
            SubjectPosition::Index(_) => SUBJECT_INDEX,
            SubjectPosition::Value(_) => SUBJECT_VALUE,
        };
        if self.expiration.is_some() {
            flags |= FLAG_EXPIRABLE;
        }
        if self.updatable {
            flags |= FLAG_UPDATABLE;
        }
        let merklize = match self.merklized {
            MerklizedRoot::None => MERKLIZE_NONE,
            MerklizedRoot::Index(_) => MERKLIZE_INDEX,
            MerklizedRoot::Value(_) => MERKLIZE_VALUE,
        };
        flags |= merklize << MERKLIZE_SHIFT;
        header[FLAGS_BYTE] = flags;
        header[VERSION_OFFSET..VERSION_OFFSET + 4].copy_from_slice(&self.version.to_le_bytes());

        let mut nonce_exp = [0u8; 32];
        nonce_exp[..8].copy_from_slice(&self.revocation_nonce.to_le_bytes());
        if let Some(exp) = self.expiration {
            nonce_exp[8..16].copy_from_slice(&exp.to_le_bytes());
        }

        let mut slots = [FieldElement::zero(); 8];
        slots[0] = slot_from_bytes(0, &header)?;
        slots[2] = self.index_data[0];
        slots[3] = self.index_data[1];
        slots[4] = slot_from_bytes(4, &nonce_exp)?;
        slots[6] = self.value_data[0];
        slots[7] = self.value_data[1];

        match self.subject {
            SubjectPosition::None => {}
            SubjectPosition::Index(id) => slots[1] = id.to_field(),
            SubjectPosition::Value(id) => slots[5] = id.to_field(),
        }
        match self.merklized {
            MerklizedRoot::None => {}
            MerklizedRoot::Index(root) => slots[2] = root,
            MerklizedRoot::Value(root) => slots[6] = root,
        }

        Ok(ClaimSlots(slots))
    }

    /// Decode eight slots.
    pub fn decode(slots: &ClaimSlots) -> Result<Claim, DecodingError> {
        let s = slots.0;
        let header = s[0].to_le_bytes();
        if header[17..VERSION_OFFSET].iter().any(|b| *b != 0)
            || header[VERSION_OFFSET + 4..].iter().any(|b| *b != 0)
        {
            return Err(DecodingError::MalformedHeader(
                "reserved header bytes are non-zero".into(),
            ));
        }

        let mut schema = [0u8; 16];
        schema.copy_from_slice(&header[..16]);
        let flags = header[FLAGS_BYTE];
        let mut version = [0u8; 4];
        version.copy_from_slice(&header[VERSION_OFFSET..VERSION_OFFSET + 4]);

        let subject = match flags & SUBJECT_MASK {
            SUBJECT_SELF => {
                reject_nonzero(&s, 1)?;
                reject_nonzero(&s, 5)?;
                SubjectPosition::None
            }
            SUBJECT_INDEX => {
                reject_nonzero(&s, 5)?;
                SubjectPosition::Index(subject_id(&s[1], "index")?)
            }
            SUBJECT_VALUE => {
                reject_nonzero(&s, 1)?;
                SubjectPosition::Value(subject_id(&s[5], "value")?)
            }
            other => return Err(DecodingError::InvalidSubjectFlag(other)),
        };

        let mut index_data = [s[2], s[3]];
        let mut value_data = [s[6], s[7]];
        let merklized = match flags >> MERKLIZE_SHIFT {
            MERKLIZE_NONE => MerklizedRoot::None,
            MERKLIZE_INDEX => {
                index_data[0] = FieldElement::zero();
                MerklizedRoot::Index(s[2])
            }
            MERKLIZE_VALUE => {
                value_data[0] = FieldElement::zero();
                MerklizedRoot::Value(s[6])
            }
            other => return Err(DecodingError::InvalidMerklizeFlag(other)),
        };

        let nonce_exp = s[4].to_le_bytes();
        if nonce_exp[16..].iter().any(|b| *b != 0) {
            return Err(DecodingError::MalformedHeader(
                "reserved revocation slot bytes are non-zero".into(),
            ));
        }
        let mut nonce = [0u8; 8];
        nonce.copy_from_slice(&nonce_exp[..8]);
        let mut exp = [0u8; 8];
        exp.copy_from_slice(&nonce_exp[8..16]);
        let exp = u64::from_le_bytes(exp);
        let expiration = if flags & FLAG_EXPIRABLE != 0 {
            Some(exp)
        } else if exp != 0 {
            return Err(DecodingError::ExpirationWithoutFlag);
        } else {
            None
        };

        Ok(Claim {
            schema: SchemaHash::from_bytes(schema),
            subject,
            merklized,
            updatable: flags & FLAG_UPDATABLE != 0,
            version: u32::from_le_bytes(version),
            index_data,
            value_data,
            revocation_nonce: u64::from_le_bytes(nonce),
            expiration,
        })
    }

    /// `(hIndex, hValue)`: the claims-tree key and value of this claim.
    pub fn hi_hv<H: FieldHasher + ?Sized>(
        &self,
        hasher: &H,
    ) -> Result<(FieldElement, FieldElement), IdStateError> {
        Ok(self.encode()?.hi_hv(hasher)?)
    }
}

fn slot_from_bytes(slot: usize, bytes: &[u8; 32]) -> Result<FieldElement, EncodingError> {
    FieldElement::from_le_bytes(bytes).map_err(|source| EncodingError::SlotOverflow { slot, source })
}

fn reject_nonzero(slots: &[FieldElement; 8], idx: usize) -> Result<(), DecodingError> {
    if slots[idx].is_zero() {
        Ok(())
    } else {
        Err(DecodingError::UnexpectedSlotData(idx))
    }
}

fn subject_id(slot: &FieldElement, position: &'static str) -> Result<Identifier, DecodingError> {
    if slot.is_zero() {
        return Err(DecodingError::MissingSubject(position));
    }
    Identifier::from_field(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idstate_crypto::Poseidon;

    fn schema() -> SchemaHash {
        SchemaHash::from_hex("0102030405060708090a0b0c0d0e0f10").unwrap()
    }

    fn id() -> Identifier {
        Identifier::from_parts([0, 0], &[0x42; 27])
    }

    #[test]
    fn test_self_claim_layout() {
        let claim = Claim::builder(schema())
            .with_index_data(FieldElement::from_u64(10), FieldElement::from_u64(20))
            .with_value_data(FieldElement::from_u64(30), FieldElement::from_u64(40))
            .with_revocation_nonce(0x0102)
            .with_version(7)
            .build()
            .unwrap();
        let slots = claim.encode().unwrap();
        let header = slots.0[0].to_le_bytes();
        assert_eq!(&header[..16], schema().as_bytes());
        assert_eq!(header[16], 0);
        assert_eq!(&header[20..24], &7u32.to_le_bytes());
        assert!(slots.0[1].is_zero());
        assert_eq!(slots.0[2], FieldElement::from_u64(10));
        assert_eq!(slots.0[3], FieldElement::from_u64(20));
        assert_eq!(slots.0[4], FieldElement::from_u64(0x0102));
        assert!(slots.0[5].is_zero());
        assert_eq!(slots.0[6], FieldElement::from_u64(30));
        assert_eq!(slots.0[7], FieldElement::from_u64(40));
        assert_eq!(Claim::decode(&slots).unwrap(), claim);
    }

    #[test]
    fn test_flags_byte() {
        let claim = Claim::builder(schema())
            .with_value_id(id())
            .with_expiration(1_000)
            .with_updatable(true)
            .with_merklized_root(MerklizedRoot::Value(FieldElement::from_u64(99)))
            .build()
            .unwrap();
        let slots = claim.encode().unwrap();
        let flags = slots.0[0].to_le_bytes()[16];
        assert_eq!(flags, 0b010_1_1_011);
        assert_eq!(slots.0[5], id().to_field());
        assert_eq!(slots.0[6], FieldElement::from_u64(99));
        let nonce_exp = slots.0[4].to_le_bytes();
        assert_eq!(&nonce_exp[8..16], &1_000u64.to_le_bytes());
        assert_eq!(Claim::decode(&slots).unwrap(), claim);
    }

    #[test]
    fn test_index_subject_and_index_root() {
        let claim = Claim::builder(schema())
            .with_index_id(id())
            .with_merklized_root(MerklizedRoot::Index(FieldElement::from_u64(5)))
            .with_index_data(FieldElement::zero(), FieldElement::from_u64(6))
            .build()
            .unwrap();
        let slots = claim.encode().unwrap();
        assert_eq!(slots.0[0].to_le_bytes()[16], 0b001_0_0_010);
        assert_eq!(slots.0[1], id().to_field());
        assert_eq!(slots.0[2], FieldElement::from_u64(5));
        assert_eq!(Claim::decode(&slots).unwrap(), claim);
    }

    #[test]
    fn test_encode_rejects_direct_conflict() {
        let mut claim = Claim::builder(schema()).build().unwrap();
        claim.value_data[0] = FieldElement::one();
        claim.merklized = MerklizedRoot::Value(FieldElement::one());
        assert!(matches!(
            claim.encode(),
            Err(EncodingError::ConflictingPosition { slot: 6, .. })
        ));
    }

    fn header_with_flags(flags: u8) -> FieldElement {
        let mut header = [0u8; 32];
        header[16] = flags;
        FieldElement::from_le_bytes(&header).unwrap()
    }

    #[test]
    fn test_decode_unknown_subject_code() {
        let mut slots = [FieldElement::zero(); 8];
        slots[0] = header_with_flags(0b001);
        assert_eq!(
            Claim::decode(&ClaimSlots(slots)),
            Err(DecodingError::InvalidSubjectFlag(0b001))
        );
    }

    #[test]
    fn test_decode_unknown_merklize_code() {
        let mut slots = [FieldElement::zero(); 8];
        slots[0] = header_with_flags(0b011 << 5);
        assert_eq!(
            Claim::decode(&ClaimSlots(slots)),
            Err(DecodingError::InvalidMerklizeFlag(0b011))
        );
    }

    #[test]
    fn test_decode_missing_subject() {
        let mut slots = [FieldElement::zero(); 8];
        slots[0] = header_with_flags(SUBJECT_VALUE);
        assert_eq!(
            Claim::decode(&ClaimSlots(slots)),
            Err(DecodingError::MissingSubject("value"))
        );
    }

    #[test]
    fn test_decode_stray_subject_slot() {
        let mut slots = [FieldElement::zero(); 8];
        slots[1] = FieldElement::one();
        assert_eq!(
            Claim::decode(&ClaimSlots(slots)),
            Err(DecodingError::UnexpectedSlotData(1))
        );
    }

    #[test]
    fn test_decode_reserved_header_bytes() {
        let mut header = [0u8; 32];
        header[18] = 1;
        let mut slots = [FieldElement::zero(); 8];
        slots[0] = FieldElement::from_le_bytes(&header).unwrap();
        assert!(matches!(
            Claim::decode(&ClaimSlots(slots)),
            Err(DecodingError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_decode_expiration_without_flag() {
        let mut nonce_exp = [0u8; 32];
        nonce_exp[8] = 1;
        let mut slots = [FieldElement::zero(); 8];
        slots[4] = FieldElement::from_le_bytes(&nonce_exp).unwrap();
        assert_eq!(
            Claim::decode(&ClaimSlots(slots)),
            Err(DecodingError::ExpirationWithoutFlag)
        );
    }

    #[test]
    fn test_hi_hv_hashes_sections() {
        let claim = Claim::builder(schema())
            .with_index_data(FieldElement::from_u64(1), FieldElement::from_u64(2))
            .build()
            .unwrap();
        let slots = claim.encode().unwrap();
        let (hi, hv) = claim.hi_hv(&Poseidon).unwrap();
        assert_eq!(hi, Poseidon.hash(slots.index()).unwrap());
        assert_eq!(hv, Poseidon.hash(slots.value()).unwrap());
    }

    #[test]
    fn test_hi_depends_only_on_index_section() {
        let a = Claim::builder(schema())
            .with_revocation_nonce(1)
            .build()
            .unwrap();
        let b = Claim::builder(schema())
            .with_revocation_nonce(2)
            .build()
            .unwrap();
        let (hi_a, hv_a) = a.hi_hv(&Poseidon).unwrap();
        let (hi_b, hv_b) = b.hi_hv(&Poseidon).unwrap();
        assert_eq!(hi_a, hi_b);
        assert_ne!(hv_a, hv_b);
    }

    #[test]
    fn test_slots_serialize_as_decimal_strings() {
        let claim = Claim::builder(schema())
            .with_revocation_nonce(5)
            .build()
            .unwrap();
        let json = serde_json::to_value(claim.encode().unwrap()).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 8);
        assert_eq!(arr[4], serde_json::json!("5"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_identifier() -> impl Strategy<Value = Identifier> {
            any::<[u8; 27]>().prop_map(|g| Identifier::from_parts([0, 1], &g))
        }

        fn arb_fe() -> impl Strategy<Value = FieldElement> {
            any::<u64>().prop_map(FieldElement::from_u64)
        }

        fn arb_subject() -> impl Strategy<Value = SubjectPosition> {
            prop_oneof![
                Just(SubjectPosition::None),
                arb_identifier().prop_map(SubjectPosition::Index),
                arb_identifier().prop_map(SubjectPosition::Value),
            ]
        }

        fn arb_claim() -> impl Strategy<Value = Claim> {
            (
                any::<[u8; 16]>(),
                arb_subject(),
                0u8..3,
                arb_fe(),
                any::<bool>(),
                any::<u32>(),
                [arb_fe(), arb_fe(), arb_fe(), arb_fe()],
                any::<u64>(),
                proptest::option::of(any::<u64>()),
            )
                .prop_map(
                    |(schema, subject, root_pos, root, updatable, version, data, nonce, exp)| {
                        let mut claim = Claim {
                            schema: SchemaHash::from_bytes(schema),
                            subject,
                            merklized: MerklizedRoot::None,
                            updatable,
                            version,
                            index_data: [data[0], data[1]],
                            value_data: [data[2], data[3]],
                            revocation_nonce: nonce,
                            expiration: exp,
                        };
                        match root_pos {
                            1 => {
                                claim.index_data[0] = FieldElement::zero();
                                claim.merklized = MerklizedRoot::Index(root);
                            }
                            2 => {
                                claim.value_data[0] = FieldElement::zero();
                                claim.merklized = MerklizedRoot::Value(root);
                            }
                            _ => {}
                        }
                        claim
                    },
                )
        }

        proptest! {
            #[test]
            fn decode_inverts_encode(claim in arb_claim()) {
                let slots = claim.encode().unwrap();
                prop_assert_eq!(Claim::decode(&slots).unwrap(), claim);
            }

            #[test]
            fn encode_inverts_decode(claim in arb_claim()) {
                let slots = claim.encode().unwrap();
                let again = Claim::decode(&slots).unwrap().encode().unwrap();
                prop_assert_eq!(again, slots);
            }
        }
    }
}
