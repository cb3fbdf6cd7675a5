//! The escape-time iteration kernel (§4.2), generic over a
//! [`PrecisionRealm`] so the same algorithm runs at hardware, extended or
//! arbitrary precision without duplication.

use fractalcast_precision::PrecisionRealm;

use crate::plot_context::{Fractal, ESCAPE_RADIUS_SQUARED};

/// Whether a point's orbit left the escape radius before the iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStatus {
    Escaped,
    Unescaped,
}

/// The raw result of iterating a single point (§4.2).
#[derive(Debug, Clone, Copy)]
pub struct IterationResult {
    pub iterations: u32,
    pub status: EscapeStatus,
    /// `|z|^2` at the final iteration, in `f64`. `NaN` when the cardioid or
    /// bulb short-circuit fired, since no orbit was actually computed.
    pub magnitude_sqr: f64,
}

/// Iterates the fractal function at one complex point until it escapes the
/// radius `R` (§4.2: [`ESCAPE_RADIUS_SQUARED`]) or the iteration cap is hit.
///
/// `point` is always the pixel's complex coordinate; which role it plays —
/// `z_0` or `c` — depends on `fractal`.
#[must_use]
pub fn iterate<R: PrecisionRealm>(
    realm: &R,
    fractal: Fractal,
    point: (f64, f64),
    max_iterations: u32,
    skip_bulb_check: bool,
) -> IterationResult {
    let (z0_re, z0_im, c_re, c_im) = match fractal {
        Fractal::Mandelbrot => (0.0, 0.0, point.0, point.1),
        Fractal::Julia { c_re, c_im } => (point.0, point.1, c_re, c_im),
    };

    if matches!(fractal, Fractal::Mandelbrot) && skip_bulb_check && in_cardioid_or_bulb(c_re, c_im)
    {
        return IterationResult {
            iterations: max_iterations,
            status: EscapeStatus::Unescaped,
            magnitude_sqr: f64::NAN,
        };
    }

    let c = realm.complex_literal(c_re, c_im);
    let mut z = realm.complex_literal(z0_re, z0_im);
    let mut mag_sqr = realm.complex_magnitude_sqr(&z);

    let mut iterations = 0;
    while iterations < max_iterations && !realm.exceeds(&mag_sqr, ESCAPE_RADIUS_SQUARED) {
        z = realm.complex_add(&realm.complex_sqr(&z), &c);
        mag_sqr = realm.complex_magnitude_sqr(&z);
        iterations += 1;
    }

    let status = if iterations == max_iterations {
        EscapeStatus::Unescaped
    } else {
        EscapeStatus::Escaped
    };

    IterationResult {
        iterations,
        status,
        magnitude_sqr: realm.to_f64(&mag_sqr),
    }
}

/// True if `c` is provably inside the main cardioid or the period-2 bulb,
/// in which case iteration would run to `max_iterations` without escaping
/// and can be skipped entirely. Evaluated at `f64` precision regardless of
/// the active realm — at the magnifications where this check matters the
/// two regions are large enough that hardware precision is always
/// sufficient to classify a point correctly.
fn in_cardioid_or_bulb(c_re: f64, c_im: f64) -> bool {
    let c_im_sqr = c_im * c_im;
    let q = (c_re - 0.25).powi(2) + c_im_sqr;
    let in_cardioid = q * (q + (c_re - 0.25)) <= 0.25 * c_im_sqr;
    let in_bulb = (c_re + 1.0) * (c_re + 1.0) + c_im_sqr <= 0.0625;
    in_cardioid || in_bulb
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractalcast_precision::StandardRealm;

    #[test]
    fn origin_never_escapes() {
        let realm = StandardRealm;
        let result = iterate(&realm, Fractal::Mandelbrot, (0.0, 0.0), 1000, false);
        assert_eq!(result.status, EscapeStatus::Unescaped);
        assert_eq!(result.iterations, 1000);
    }

    #[test]
    fn far_point_escapes_almost_immediately() {
        let realm = StandardRealm;
        let result = iterate(&realm, Fractal::Mandelbrot, (5.0, 5.0), 1000, false);
        assert_eq!(result.status, EscapeStatus::Escaped);
        assert!(result.iterations < 5);
    }

    #[test]
    fn cardioid_short_circuit_agrees_with_direct_iteration() {
        let realm = StandardRealm;
        let with_check = iterate(&realm, Fractal::Mandelbrot, (0.0, 0.0), 5000, true);
        let without_check = iterate(&realm, Fractal::Mandelbrot, (0.0, 0.0), 5000, false);
        assert_eq!(with_check.status, without_check.status);
        assert_eq!(with_check.iterations, without_check.iterations);
    }

    #[test]
    fn julia_set_iterates_from_the_pixel_as_z0() {
        let realm = StandardRealm;
        let fractal = Fractal::Julia {
            c_re: -0.4,
            c_im: 0.6,
        };
        let result = iterate(&realm, fractal, (0.0, 0.0), 200, false);
        // Just exercising the z0 = point, c = constant wiring; this point's
        // fate is not the thing under test.
        assert!(result.iterations <= 200);
    }

    #[test]
    fn single_pixel_origin_scenario_is_unescaped() {
        // Regression for the 1x1 degenerate-viewport scenario: a lone
        // origin pixel must never escape within any reasonable cap.
        let realm = StandardRealm;
        let result = iterate(&realm, Fractal::Mandelbrot, (0.0, 0.0), 1, false);
        assert_eq!(result.status, EscapeStatus::Unescaped);
    }
}
