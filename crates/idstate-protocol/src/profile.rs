//! # Protocol Profile
//!
//! Tree depths, bit order and identifier type shared by every identity
//! built under one deployment. Profiles deserialize from YAML or JSON;
//! absent fields take the defaults below.
//!
//! | Field | Default |
//! |-------|---------|
//! | `claimsDepth` | 32 |
//! | `revocationDepth` | 64 |
//! | `rootsDepth` | 40 |
//! | `bitOrder` | `lsb-first` |
//! | `idType` | `0` |

use serde::{Deserialize, Serialize};

use idstate_core::TreeError;
use idstate_smt::{BitOrder, TreeConfig};

/// Deployment-wide identity parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProtocolProfile {
    /// Depth of the claims tree.
    pub claims_depth: usize,
    /// Depth of the revocation tree.
    pub revocation_depth: usize,
    /// Depth of the roots tree.
    pub roots_depth: usize,
    /// Key bit order for all three trees.
    pub bit_order: BitOrder,
    /// Identifier type, written big-endian into the first two id bytes.
    pub id_type: u16,
}

impl Default for ProtocolProfile {
    fn default() -> Self {
        Self {
            claims_depth: 32,
            revocation_depth: 64,
            roots_depth: 40,
            bit_order: BitOrder::LsbFirst,
            id_type: 0,
        }
    }
}

impl ProtocolProfile {
    /// Small trees for tests and fixture generation: every depth is 4.
    pub fn testing() -> Self {
        Self {
            claims_depth: 4,
            revocation_depth: 4,
            roots_depth: 4,
            ..Self::default()
        }
    }

    /// Check every depth.
    pub fn validate(&self) -> Result<(), TreeError> {
        self.claims_config()?;
        self.revocation_config()?;
        self.roots_config()?;
        Ok(())
    }

    /// Claims tree shape.
    pub fn claims_config(&self) -> Result<TreeConfig, TreeError> {
        self.config(self.claims_depth)
    }

    /// Revocation tree shape.
    pub fn revocation_config(&self) -> Result<TreeConfig, TreeError> {
        self.config(self.revocation_depth)
    }

    /// Roots tree shape.
    pub fn roots_config(&self) -> Result<TreeConfig, TreeError> {
        self.config(self.roots_depth)
    }

    /// Identifier type bytes.
    pub fn id_type_bytes(&self) -> [u8; 2] {
        self.id_type.to_be_bytes()
    }

    fn config(&self, depth: usize) -> Result<TreeConfig, TreeError> {
        Ok(TreeConfig::new(depth)?.with_bit_order(self.bit_order))
    }
}
