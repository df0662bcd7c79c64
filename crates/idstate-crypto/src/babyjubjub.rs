//! # Baby Jubjub
//!
//! The twisted Edwards curve `a·x² + y² = 1 + d·x²·y²` over the BN254
//! scalar field with `a = 168700` and `d = 168696`. Points are kept in
//! affine coordinates; `d` is a non-square, so the addition law is
//! complete for points on the curve.
//!
//! ## Compression
//!
//! A point compresses to 32 bytes: `y` little-endian, with the top bit of
//! the last byte set when `x > (p - 1) / 2`.

use std::fmt;

use ark_bn254::Fr;
use ark_ff::{Field, One, Zero};
use num_bigint::BigUint;
use once_cell::sync::Lazy;

use idstate_core::{CryptoError, FieldElement};

/// Curve coefficient `a`.
pub const A: u64 = 168700;
/// Curve coefficient `d`.
pub const D: u64 = 168696;

const B8_X: &str = "5299619240641551281634865583518297030282874472190772894086521144482721001553";
const B8_Y: &str = "16950150798460657717958625567821834550301663161624707787222815936182638968203";
const SUBORDER: &str =
    "2736030358979909402780800718157159386076813972158567259200215660948447373041";

static B8: Lazy<Point> = Lazy::new(|| Point {
    x: parse_constant(B8_X),
    y: parse_constant(B8_Y),
});

static SUB_ORDER: Lazy<BigUint> = Lazy::new(|| parse_biguint(SUBORDER));

static HALF_MODULUS: Lazy<BigUint> = Lazy::new(|| FieldElement::modulus().clone() >> 1u32);

fn parse_biguint(s: &str) -> BigUint {
    // Constant tables are fixed at compile time; a parse failure is a build defect.
    BigUint::parse_bytes(s.as_bytes(), 10).unwrap_or_default()
}

fn parse_constant(s: &str) -> Fr {
    FieldElement::from_decimal(s)
        .map(|fe| fe.as_fr())
        .unwrap_or_else(|_| Fr::zero())
}

/// Prime order `l` of the subgroup generated by [`Point::base8`].
pub fn sub_order() -> &'static BigUint {
    &SUB_ORDER
}

/// An affine Baby Jubjub point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    x: Fr,
    y: Fr,
}

impl Point {
    /// The neutral element `(0, 1)`.
    pub fn identity() -> Self {
        Self {
            x: Fr::zero(),
            y: Fr::one(),
        }
    }

    /// The base point `B8` of the prime-order subgroup.
    pub fn base8() -> Self {
        *B8
    }

    /// Build a point, rejecting coordinates off the curve.
    pub fn new(x: FieldElement, y: FieldElement) -> Result<Self, CryptoError> {
        let p = Self {
            x: x.as_fr(),
            y: y.as_fr(),
        };
        if !p.is_on_curve() {
            return Err(CryptoError::NotOnCurve);
        }
        Ok(p)
    }

    /// The `x` coordinate.
    pub fn x(&self) -> FieldElement {
        FieldElement::from(self.x)
    }

    /// The `y` coordinate.
    pub fn y(&self) -> FieldElement {
        FieldElement::from(self.y)
    }

    /// Check `a·x² + y² == 1 + d·x²·y²`.
    pub fn is_on_curve(&self) -> bool {
        let x2 = self.x.square();
        let y2 = self.y.square();
        Fr::from(A) * x2 + y2 == Fr::one() + Fr::from(D) * x2 * y2
    }

    /// Twisted Edwards point addition.
    pub fn add(&self, other: &Point) -> Point {
        let x1y2 = self.x * other.y;
        let y1x2 = self.y * other.x;
        let dxy = Fr::from(D) * self.x * other.x * self.y * other.y;
        // Denominators are non-zero for curve points because d is a non-square.
        let x_den = (Fr::one() + dxy).inverse().unwrap_or_else(Fr::zero);
        let y_den = (Fr::one() - dxy).inverse().unwrap_or_else(Fr::zero);
        Point {
            x: (x1y2 + y1x2) * x_den,
            y: (self.y * other.y - Fr::from(A) * self.x * other.x) * y_den,
        }
    }

    /// Multiply by a non-negative integer scalar (double-and-add).
    pub fn mul_scalar(&self, n: &BigUint) -> Point {
        let mut acc = Point::identity();
        for i in (0..n.bits()).rev() {
            acc = acc.add(&acc);
            if n.bit(i) {
                acc = acc.add(self);
            }
        }
        acc
    }

    /// True when `l · P` is the identity.
    pub fn in_sub_group(&self) -> bool {
        self.is_on_curve() && self.mul_scalar(&SUB_ORDER) == Point::identity()
    }

    /// 32-byte compressed form.
    pub fn compress(&self) -> [u8; 32] {
        let mut out = self.y().to_le_bytes();
        if coordinate_sign(&self.x()) {
            out[31] |= 0x80;
        }
        out
    }

    /// Recover a point from its compressed form.
    pub fn decompress(bytes: &[u8; 32]) -> Result<Point, CryptoError> {
        let mut buf = *bytes;
        let sign = buf[31] & 0x80 != 0;
        buf[31] &= 0x7f;
        let y = FieldElement::from_le_bytes(&buf)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?
            .as_fr();

        let y2 = y.square();
        let num = Fr::one() - y2;
        let den = Fr::from(A) - Fr::from(D) * y2;
        let den_inv = den
            .inverse()
            .ok_or_else(|| CryptoError::InvalidPublicKey("division by zero".into()))?;
        let mut x = (num * den_inv)
            .sqrt()
            .ok_or_else(|| CryptoError::InvalidPublicKey("x is not a square".into()))?;
        if coordinate_sign(&FieldElement::from(x)) != sign {
            x = -x;
        }
        let point = Point { x, y };
        if !point.is_on_curve() {
            return Err(CryptoError::NotOnCurve);
        }
        Ok(point)
    }
}

/// Sign convention for compression: `true` when `c > (p - 1) / 2`.
fn coordinate_sign(c: &FieldElement) -> bool {
    c.to_biguint() > *HALF_MODULUS
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("x", &self.x())
            .field("y", &self.y())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_point_on_curve_and_in_subgroup() {
        let b8 = Point::base8();
        assert!(b8.is_on_curve());
        assert!(b8.in_sub_group());
    }

    #[test]
    fn test_identity_is_neutral() {
        let b8 = Point::base8();
        assert_eq!(b8.add(&Point::identity()), b8);
        assert_eq!(Point::identity().add(&b8), b8);
    }

    #[test]
    fn test_scalar_mul_matches_repeated_addition() {
        let b8 = Point::base8();
        let three = b8.add(&b8).add(&b8);
        assert_eq!(b8.mul_scalar(&BigUint::from(3u32)), three);
        assert_eq!(b8.mul_scalar(&BigUint::from(0u32)), Point::identity());
    }

    #[test]
    fn test_scalar_mul_distributes() {
        let b8 = Point::base8();
        let a = BigUint::from(123_456u32);
        let b = BigUint::from(654_321u32);
        let lhs = b8.mul_scalar(&(&a + &b));
        let rhs = b8.mul_scalar(&a).add(&b8.mul_scalar(&b));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_compress_round_trip() {
        for k in [1u32, 2, 3, 1000, 99_999] {
            let p = Point::base8().mul_scalar(&BigUint::from(k));
            let c = p.compress();
            assert_eq!(Point::decompress(&c).unwrap(), p);
        }
    }

    #[test]
    fn test_negated_point_flips_sign_bit() {
        let p = Point::base8().mul_scalar(&BigUint::from(7u32));
        let neg = Point { x: -p.x, y: p.y };
        assert!(neg.is_on_curve());
        assert_ne!(p.compress()[31] & 0x80, neg.compress()[31] & 0x80);
        assert_eq!(Point::decompress(&neg.compress()).unwrap(), neg);
    }

    #[test]
    fn test_off_curve_rejected() {
        assert_eq!(
            Point::new(FieldElement::one(), FieldElement::one()),
            Err(CryptoError::NotOnCurve)
        );
    }

    #[test]
    fn test_decompress_rejects_y_out_of_range() {
        let mut bytes = [0xffu8; 32];
        bytes[31] = 0x7f;
        assert!(Point::decompress(&bytes).is_err());
    }
}
