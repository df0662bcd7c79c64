//! # Field Hash Abstraction
//!
//! Trees, claim hashing and state derivation only need "a function from a
//! short sequence of field elements to one field element". The
//! [`FieldHasher`] trait names that seam; [`crate::Poseidon`] is the
//! production implementation.
//!
//! ## Security Invariant
//!
//! Implementations must be deterministic and must treat inputs of
//! different lengths as different messages.

use idstate_core::{CryptoError, FieldElement};

/// Hash a fixed-arity sequence of field elements to a field element.
pub trait FieldHasher: Send + Sync {
    /// Human-readable identifier of the hash function.
    fn name(&self) -> &'static str;

    /// Hash `inputs`. Arity limits are implementation-defined.
    fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, CryptoError>;

    /// Hash exactly two elements.
    fn hash2(&self, left: &FieldElement, right: &FieldElement) -> Result<FieldElement, CryptoError> {
        self.hash(&[*left, *right])
    }
}

impl<H: FieldHasher + ?Sized> FieldHasher for &H {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
        (**self).hash(inputs)
    }
}

impl<H: FieldHasher + ?Sized> FieldHasher for std::sync::Arc<H> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
        (**self).hash(inputs)
    }
}
