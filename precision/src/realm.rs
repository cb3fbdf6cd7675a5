use dashu_base::Abs;
use dashu_float::FBig;

use crate::double_double::DoubleDouble;

/// A complex number whose real and imaginary parts live in a particular
/// [`PrecisionRealm`]'s scalar type.
#[derive(Debug, Clone)]
pub struct Complex<S> {
    pub re: S,
    pub im: S,
}

impl<S: Clone> Complex<S> {
    pub const fn new(re: S, im: S) -> Self {
        Self { re, im }
    }
}

/// The numeric capability set described in spec §4.1: complex add and
/// multiply, squared magnitude, construction from an `f64` literal, and
/// comparison of a scalar to an `f64` threshold. Implemented once per
/// precision tier; no other component is generic over anything but this
/// trait.
pub trait PrecisionRealm: Clone {
    type Scalar: Clone;

    /// Lifts an `f64` literal into this realm's scalar type.
    fn literal(&self, value: f64) -> Self::Scalar;

    fn add(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    fn mul(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    /// `true` if `value > threshold`.
    fn exceeds(&self, value: &Self::Scalar, threshold: f64) -> bool;

    /// Lossy conversion back to `f64`, used only for colour mapping and
    /// diagnostics, never on the hot iteration path.
    fn to_f64(&self, value: &Self::Scalar) -> f64;

    fn complex_literal(&self, re: f64, im: f64) -> Complex<Self::Scalar> {
        Complex::new(self.literal(re), self.literal(im))
    }

    fn complex_add(
        &self,
        a: &Complex<Self::Scalar>,
        b: &Complex<Self::Scalar>,
    ) -> Complex<Self::Scalar> {
        Complex::new(self.add(&a.re, &b.re), self.add(&a.im, &b.im))
    }

    /// `a * a` — the only multiplication the iteration kernel needs.
    fn complex_sqr(&self, a: &Complex<Self::Scalar>) -> Complex<Self::Scalar> {
        let re_sqr = self.mul(&a.re, &a.re);
        let im_sqr = self.mul(&a.im, &a.im);
        let re = self.sub(&re_sqr, &im_sqr);
        let cross = self.mul(&a.re, &a.im);
        let im = self.add(&cross, &cross);
        Complex::new(re, im)
    }

    fn complex_magnitude_sqr(&self, a: &Complex<Self::Scalar>) -> Self::Scalar {
        self.add(&self.mul(&a.re, &a.re), &self.mul(&a.im, &a.im))
    }

    /// Default subtraction, expressed via `add` and negation through `-1`.
    fn sub(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar {
        let neg_one = self.literal(-1.0);
        self.add(a, &self.mul(b, &neg_one))
    }
}

/// Hardware double precision. The default and fastest realm.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRealm;

impl PrecisionRealm for StandardRealm {
    type Scalar = f64;

    fn literal(&self, value: f64) -> f64 {
        value
    }

    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn mul(&self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    fn sub(&self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    fn exceeds(&self, value: &f64, threshold: f64) -> bool {
        *value > threshold
    }

    fn to_f64(&self, value: &f64) -> f64 {
        *value
    }
}

/// Compensated double-double arithmetic (~106 bits of mantissa).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedRealm;

impl PrecisionRealm for ExtendedRealm {
    type Scalar = DoubleDouble;

    fn literal(&self, value: f64) -> DoubleDouble {
        DoubleDouble::from_f64(value)
    }

    fn add(&self, a: &DoubleDouble, b: &DoubleDouble) -> DoubleDouble {
        (*a).add(*b)
    }

    fn mul(&self, a: &DoubleDouble, b: &DoubleDouble) -> DoubleDouble {
        (*a).mul(*b)
    }

    fn sub(&self, a: &DoubleDouble, b: &DoubleDouble) -> DoubleDouble {
        (*a).sub(*b)
    }

    fn exceeds(&self, value: &DoubleDouble, threshold: f64) -> bool {
        value.to_f64() > threshold
    }

    fn to_f64(&self, value: &DoubleDouble) -> f64 {
        value.to_f64()
    }
}

/// Software arbitrary-precision arithmetic over a configurable significand
/// bit width (§3: `1..=16384`, default 128).
#[derive(Debug, Clone, Copy)]
pub struct ArbitraryRealm {
    pub significand_bits: usize,
}

impl ArbitraryRealm {
    #[must_use]
    pub const fn new(significand_bits: u32) -> Self {
        Self {
            significand_bits: significand_bits as usize,
        }
    }
}

type MpFloat = FBig;

impl PrecisionRealm for ArbitraryRealm {
    type Scalar = MpFloat;

    fn literal(&self, value: f64) -> MpFloat {
        if value == 0.0 {
            FBig::ZERO
                .with_precision(self.significand_bits)
                .expect("zero always rounds exactly")
        } else {
            FBig::try_from(value)
                .expect("finite f64 literal")
                .with_precision(self.significand_bits)
                .expect("valid rounding mode")
        }
    }

    fn add(&self, a: &MpFloat, b: &MpFloat) -> MpFloat {
        (a + b)
            .with_precision(self.significand_bits)
            .expect("valid rounding mode")
    }

    fn mul(&self, a: &MpFloat, b: &MpFloat) -> MpFloat {
        (a * b)
            .with_precision(self.significand_bits)
            .expect("valid rounding mode")
    }

    fn sub(&self, a: &MpFloat, b: &MpFloat) -> MpFloat {
        (a - b)
            .with_precision(self.significand_bits)
            .expect("valid rounding mode")
    }

    fn exceeds(&self, value: &MpFloat, threshold: f64) -> bool {
        // Compare at full configured precision rather than round-tripping
        // through f64, which would lose the excursion at deep zoom levels.
        value.clone().abs() > self.literal(threshold)
    }

    fn to_f64(&self, value: &MpFloat) -> f64 {
        value.to_f64().value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_realm_iterates_like_plain_f64() {
        let realm = StandardRealm;
        let c = realm.complex_literal(-1.0, 0.0);
        let z = realm.complex_sqr(&c);
        assert_eq!(z.re, 1.0);
        assert_eq!(z.im, -0.0);
    }

    #[test]
    fn extended_realm_matches_standard_for_simple_values() {
        let realm = ExtendedRealm;
        let c = realm.complex_literal(0.5, 0.5);
        let mag = realm.complex_magnitude_sqr(&c);
        assert!((mag.to_f64() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn arbitrary_realm_respects_configured_precision() {
        let realm = ArbitraryRealm::new(128);
        let c = realm.complex_literal(2.0, 0.0);
        let mag = realm.complex_magnitude_sqr(&c);
        assert!((realm.to_f64(&mag) - 4.0).abs() < 1e-9);
    }
}
