//! # Claim Model
//!
//! The structured form of a claim. Subject and merklized-root placement
//! are tagged unions, so a claim cannot name a subject in both sections
//! or a merklized root in both sections.
//!
//! Data values are [`FieldElement`]s and therefore already below the field
//! modulus. [`ClaimBuilder`] additionally accepts raw byte payloads and
//! performs the range check when the claim is built.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use idstate_core::{EncodingError, FieldElement, Identifier};

use crate::schema::SchemaHash;

/// Where the claim's subject identifier lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "position", content = "id", rename_all = "lowercase")]
pub enum SubjectPosition {
    /// Self-claim: no subject slot is used.
    #[default]
    None,
    /// Subject identifier in slot 1.
    Index(Identifier),
    /// Subject identifier in slot 5.
    Value(Identifier),
}

/// Where the claim's merklized root lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "position", content = "root", rename_all = "lowercase")]
pub enum MerklizedRoot {
    /// No merklized root.
    #[default]
    None,
    /// Root in slot 2.
    Index(FieldElement),
    /// Root in slot 6.
    Value(FieldElement),
}

/// A claim in structured form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// Schema identifying the claim type.
    pub schema: SchemaHash,
    /// Subject placement.
    pub subject: SubjectPosition,
    /// Merklized root placement.
    pub merklized: MerklizedRoot,
    /// Whether the claim may be superseded by a newer version.
    pub updatable: bool,
    /// Claim version.
    pub version: u32,
    /// Index data slots 2 and 3.
    pub index_data: [FieldElement; 2],
    /// Value data slots 6 and 7.
    pub value_data: [FieldElement; 2],
    /// Nonce inserted into the revocation tree to revoke this claim.
    pub revocation_nonce: u64,
    /// Expiration as unix seconds; `Some` sets the expirable flag.
    pub expiration: Option<u64>,
}

impl Claim {
    /// Start building a claim for `schema`.
    pub fn builder(schema: SchemaHash) -> ClaimBuilder {
        ClaimBuilder::new(schema)
    }

    /// The subject identifier, wherever it is placed.
    pub fn subject_id(&self) -> Option<Identifier> {
        match self.subject {
            SubjectPosition::None => None,
            SubjectPosition::Index(id) | SubjectPosition::Value(id) => Some(id),
        }
    }

    /// Expiration as a UTC instant.
    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expiration?).ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }

    /// True when the claim carries an expiration at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiration_date() {
            Some(exp) => exp <= now,
            None => false,
        }
    }
}

/// A data value not yet range-checked.
#[derive(Debug, Clone)]
enum DataInput {
    Field(FieldElement),
    Bytes(Vec<u8>),
}

impl DataInput {
    fn resolve(&self, slot: usize) -> Result<FieldElement, EncodingError> {
        match self {
            DataInput::Field(fe) => Ok(*fe),
            DataInput::Bytes(bytes) => {
                if bytes.len() > 32 {
                    return Err(EncodingError::DataTooLong(bytes.len()));
                }
                FieldElement::from_le_slice(bytes)
                    .map_err(|source| EncodingError::SlotOverflow { slot, source })
            }
        }
    }
}

impl Default for DataInput {
    fn default() -> Self {
        DataInput::Field(FieldElement::zero())
    }
}

/// Builder for [`Claim`].
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    schema: SchemaHash,
    subject: SubjectPosition,
    merklized: MerklizedRoot,
    updatable: bool,
    version: u32,
    index_data: [DataInput; 2],
    value_data: [DataInput; 2],
    revocation_nonce: u64,
    expiration: Option<u64>,
    pre_epoch_expiration: Option<i64>,
}

impl ClaimBuilder {
    /// A self-claim with zeroed data.
    pub fn new(schema: SchemaHash) -> Self {
        Self {
            schema,
            subject: SubjectPosition::None,
            merklized: MerklizedRoot::None,
            updatable: false,
            version: 0,
            index_data: Default::default(),
            value_data: Default::default(),
            revocation_nonce: 0,
            expiration: None,
            pre_epoch_expiration: None,
        }
    }

    /// Place the subject identifier in the index section.
    pub fn with_index_id(mut self, id: Identifier) -> Self {
        self.subject = SubjectPosition::Index(id);
        self
    }

    /// Place the subject identifier in the value section.
    pub fn with_value_id(mut self, id: Identifier) -> Self {
        self.subject = SubjectPosition::Value(id);
        self
    }

    /// Set the merklized root placement.
    pub fn with_merklized_root(mut self, root: MerklizedRoot) -> Self {
        self.merklized = root;
        self
    }

    /// Index data slots 2 and 3 as field elements.
    pub fn with_index_data(mut self, a: FieldElement, b: FieldElement) -> Self {
        self.index_data = [DataInput::Field(a), DataInput::Field(b)];
        self
    }

    /// Index data slots 2 and 3 as little-endian byte payloads.
    pub fn with_index_data_bytes(mut self, a: &[u8], b: &[u8]) -> Self {
        self.index_data = [DataInput::Bytes(a.to_vec()), DataInput::Bytes(b.to_vec())];
        self
    }

    /// Value data slots 6 and 7 as field elements.
    pub fn with_value_data(mut self, a: FieldElement, b: FieldElement) -> Self {
        self.value_data = [DataInput::Field(a), DataInput::Field(b)];
        self
    }

    /// Value data slots 6 and 7 as little-endian byte payloads.
    pub fn with_value_data_bytes(mut self, a: &[u8], b: &[u8]) -> Self {
        self.value_data = [DataInput::Bytes(a.to_vec()), DataInput::Bytes(b.to_vec())];
        self
    }

    /// Revocation nonce.
    pub fn with_revocation_nonce(mut self, nonce: u64) -> Self {
        self.revocation_nonce = nonce;
        self
    }

    /// Expiration as unix seconds.
    pub fn with_expiration(mut self, unix_seconds: u64) -> Self {
        self.expiration = Some(unix_seconds);
        self.pre_epoch_expiration = None;
        self
    }

    /// Expiration as a UTC instant. Instants before the epoch fail at
    /// [`build`](Self::build).
    pub fn with_expiration_date(mut self, at: DateTime<Utc>) -> Self {
        let ts = at.timestamp();
        match u64::try_from(ts) {
            Ok(secs) => {
                self.expiration = Some(secs);
                self.pre_epoch_expiration = None;
            }
            Err(_) => {
                self.expiration = None;
                self.pre_epoch_expiration = Some(ts);
            }
        }
        self
    }

    /// Updatable flag.
    pub fn with_updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    /// Claim version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Range-check the data and assemble the claim.
    pub fn build(self) -> Result<Claim, EncodingError> {
        let index_data = [self.index_data[0].resolve(2)?, self.index_data[1].resolve(3)?];
        let value_data = [self.value_data[0].resolve(6)?, self.value_data[1].resolve(7)?];
        if let Some(ts) = self.pre_epoch_expiration {
            return Err(EncodingError::InvalidExpiration(ts));
        }
        let claim = Claim {
            schema: self.schema,
            subject: self.subject,
            merklized: self.merklized,
            updatable: self.updatable,
            version: self.version,
            index_data,
            value_data,
            revocation_nonce: self.revocation_nonce,
            expiration: self.expiration,
        };
        crate::codec::check_positions(&claim)?;
        Ok(claim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaHash {
        SchemaHash::from_bytes([0x11; 16])
    }

    #[test]
    fn test_builder_defaults_to_self_claim() {
        let claim = Claim::builder(schema()).build().unwrap();
        assert_eq!(claim.subject, SubjectPosition::None);
        assert_eq!(claim.merklized, MerklizedRoot::None);
        assert_eq!(claim.expiration, None);
        assert!(claim.subject_id().is_none());
    }

    #[test]
    fn test_builder_bytes_payload_too_long() {
        let err = Claim::builder(schema())
            .with_index_data_bytes(&[1u8; 33], &[])
            .build()
            .unwrap_err();
        assert_eq!(err, EncodingError::DataTooLong(33));
    }

    #[test]
    fn test_builder_bytes_payload_overflows_field() {
        let err = Claim::builder(schema())
            .with_value_data_bytes(&[], &[0xff; 32])
            .build()
            .unwrap_err();
        assert!(matches!(err, EncodingError::SlotOverflow { slot: 7, .. }));
    }

    #[test]
    fn test_builder_merklized_conflict() {
        let err = Claim::builder(schema())
            .with_index_data(FieldElement::from_u64(5), FieldElement::zero())
            .with_merklized_root(MerklizedRoot::Index(FieldElement::from_u64(9)))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            EncodingError::ConflictingPosition { slot: 2, .. }
        ));
    }

    #[test]
    fn test_builder_negative_expiration_rejected() {
        let before_epoch = Utc.timestamp_opt(-10, 0).single().unwrap();
        let err = Claim::builder(schema())
            .with_expiration_date(before_epoch)
            .build()
            .unwrap_err();
        assert_eq!(err, EncodingError::InvalidExpiration(-10));
    }

    #[test]
    fn test_expiration_keeps_full_u64_range() {
        let claim = Claim::builder(schema())
            .with_expiration(u64::MAX)
            .build()
            .unwrap();
        assert_eq!(claim.expiration, Some(u64::MAX));
        let decoded = Claim::decode(&claim.encode().unwrap()).unwrap();
        assert_eq!(decoded.expiration, Some(u64::MAX));
        assert!(!claim.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_later_expiration_replaces_rejected_date() {
        let before_epoch = Utc.timestamp_opt(-10, 0).single().unwrap();
        let claim = Claim::builder(schema())
            .with_expiration_date(before_epoch)
            .with_expiration(5)
            .build()
            .unwrap();
        assert_eq!(claim.expiration, Some(5));
    }

    #[test]
    fn test_expiration_date_helpers() {
        let at = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        let claim = Claim::builder(schema())
            .with_expiration_date(at)
            .build()
            .unwrap();
        assert_eq!(claim.expiration, Some(1_700_000_000));
        assert_eq!(claim.expiration_date(), Some(at));
        assert!(claim.is_expired_at(at));
        assert!(!claim.is_expired_at(Utc.timestamp_opt(1_600_000_000, 0).single().unwrap()));
    }

    #[test]
    fn test_subject_id_either_section() {
        let id = Identifier::from_parts([0, 0], &[3u8; 27]);
        let a = Claim::builder(schema()).with_index_id(id).build().unwrap();
        let b = Claim::builder(schema()).with_value_id(id).build().unwrap();
        assert_eq!(a.subject_id(), Some(id));
        assert_eq!(b.subject_id(), Some(id));
    }
}
