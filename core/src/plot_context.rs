use crate::colour::ColourScheme;
use crate::error::{RenderError, RenderResult};
use fractalcast_precision::PrecisionMode;

/// Permitted range for every viewport corner component (§3).
pub const VIEWPORT_COMPONENT_MIN: f64 = -10.0;
pub const VIEWPORT_COMPONENT_MAX: f64 = 10.0;

/// Permitted range for the Julia constant's real and imaginary parts (§3).
pub const JULIA_C_MIN: f64 = -2.0;
pub const JULIA_C_MAX: f64 = 2.0;

/// The escape radius `R` (§4.2). Deliberately larger than the mathematical
/// 2 so the smoothing function in §4.3 produces visually continuous bands.
pub const ESCAPE_RADIUS: f64 = 256.0;
pub const ESCAPE_RADIUS_SQUARED: f64 = ESCAPE_RADIUS * ESCAPE_RADIUS;

/// Which fractal family to iterate (§4.2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fractal {
    /// `z_0 = 0`, `c` = the pixel's complex coordinate.
    Mandelbrot,
    /// `z_0` = the pixel's complex coordinate, `c` = a fixed constant.
    Julia { c_re: f64, c_im: f64 },
}

/// Where rendered bands are written (§3, §6).
#[derive(Debug, Clone)]
pub enum Destination {
    File(std::path::PathBuf),
    Terminal,
}

/// A rectangle in the complex plane (§3: "complex-plane viewport").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub min_re: f64,
    pub min_im: f64,
    pub max_re: f64,
    pub max_im: f64,
}

impl Frame {
    #[must_use]
    pub const fn new(min_re: f64, min_im: f64, max_re: f64, max_im: f64) -> Self {
        Self {
            min_re,
            min_im,
            max_re,
            max_im,
        }
    }

    fn validate(&self) -> RenderResult<()> {
        for (name, value) in [
            ("min_re", self.min_re),
            ("min_im", self.min_im),
            ("max_re", self.max_re),
            ("max_im", self.max_im),
        ] {
            if !(VIEWPORT_COMPONENT_MIN..=VIEWPORT_COMPONENT_MAX).contains(&value) {
                return Err(RenderError::ConfigOutOfRange(format!(
                    "viewport {name} = {value} is outside [{VIEWPORT_COMPONENT_MIN}, {VIEWPORT_COMPONENT_MAX}]"
                )));
            }
        }
        if self.max_re <= self.min_re || self.max_im <= self.min_im {
            return Err(RenderError::ConfigOutOfRange(
                "viewport maximum corner must be strictly greater than the minimum corner".into(),
            ));
        }
        Ok(())
    }
}

/// The immutable-during-render description of what is to be drawn (§3).
#[derive(Debug, Clone)]
pub struct PlotContext {
    pub fractal: Fractal,
    pub frame: Frame,
    pub max_iterations: u32,
    pub width: usize,
    pub height: usize,
    pub scheme: ColourScheme,
    pub precision: PrecisionMode,
    /// Computed once per render from [`ESCAPE_RADIUS`] (§4.3, §9).
    pub smoothing_constant: f64,
    /// Skip iterating points provably inside the main cardioid or period-2
    /// bulb (an optimisation carried over from the original implementation;
    /// see SPEC_FULL.md).
    pub skip_bulb_check: bool,
}

impl PlotContext {
    /// # Errors
    /// Returns [`RenderError::ConfigOutOfRange`] if any field violates the
    /// §3 bounds.
    pub fn new(
        fractal: Fractal,
        frame: Frame,
        max_iterations: u32,
        width: usize,
        height: usize,
        scheme: ColourScheme,
        precision: PrecisionMode,
        skip_bulb_check: bool,
    ) -> RenderResult<Self> {
        frame.validate()?;

        if width == 0 || height == 0 {
            return Err(RenderError::ConfigOutOfRange(
                "width and height must each be at least 1".into(),
            ));
        }

        if let Fractal::Julia { c_re, c_im } = fractal {
            for (name, value) in [("c_re", c_re), ("c_im", c_im)] {
                if !(JULIA_C_MIN..=JULIA_C_MAX).contains(&value) {
                    return Err(RenderError::ConfigOutOfRange(format!(
                        "julia {name} = {value} is outside [{JULIA_C_MIN}, {JULIA_C_MAX}]"
                    )));
                }
            }
        }

        let smoothing_constant = (ESCAPE_RADIUS.ln().ln()) / ESCAPE_RADIUS.ln();

        Ok(Self {
            fractal,
            frame,
            max_iterations,
            width,
            height,
            scheme,
            precision,
            smoothing_constant,
            skip_bulb_check,
        })
    }
}

/// The affine pixel-to-complex-plane mapping described in spec §4.4: the
/// viewport's minimum corner sits at pixel `(0, height - 1)`, the maximum
/// at `(width - 1, 0)`. Precomputes the per-axis step so that rendering a
/// row only needs one multiply-add per pixel.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMap {
    min_re: f64,
    max_im: f64,
    real_step: f64,
    imag_step: f64,
}

impl CoordinateMap {
    #[must_use]
    pub fn new(frame: &Frame, width: usize, height: usize) -> Self {
        let real_step = if width > 1 {
            (frame.max_re - frame.min_re) / (width - 1) as f64
        } else {
            0.0
        };
        let imag_step = if height > 1 {
            (frame.max_im - frame.min_im) / (height - 1) as f64
        } else {
            0.0
        };
        Self {
            min_re: frame.min_re,
            max_im: frame.max_im,
            real_step,
            imag_step,
        }
    }

    /// The real part of the complex coordinate at column `x`.
    #[must_use]
    #[inline]
    pub fn pixel_real(&self, x: usize) -> f64 {
        self.min_re + x as f64 * self.real_step
    }

    /// The imaginary part of the complex coordinate at row `y` (`y = 0` is
    /// the top row, at the viewport's maximum imaginary part).
    #[must_use]
    #[inline]
    pub fn row_imag(&self, y: usize) -> f64 {
        self.max_im - y as f64 * self.imag_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme() -> ColourScheme {
        ColourScheme::All
    }

    #[test]
    fn rejects_viewport_outside_bounds() {
        let frame = Frame::new(-20.0, -1.0, 1.0, 1.0);
        let err = PlotContext::new(
            Fractal::Mandelbrot,
            frame,
            100,
            10,
            10,
            scheme(),
            PrecisionMode::Standard,
            true,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_julia_constant_outside_bounds() {
        let frame = Frame::new(-1.0, -1.0, 1.0, 1.0);
        let err = PlotContext::new(
            Fractal::Julia { c_re: 5.0, c_im: 0.0 },
            frame,
            100,
            10,
            10,
            scheme(),
            PrecisionMode::Standard,
            true,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_zero_dimensions() {
        let frame = Frame::new(-1.0, -1.0, 1.0, 1.0);
        let err = PlotContext::new(
            Fractal::Mandelbrot,
            frame,
            100,
            0,
            10,
            scheme(),
            PrecisionMode::Standard,
            true,
        );
        assert!(err.is_err());
    }

    #[test]
    fn coordinate_map_places_corners_correctly() {
        let frame = Frame::new(-2.0, -1.0, 1.0, 1.0);
        let map = CoordinateMap::new(&frame, 4, 3);
        // (0, height - 1) is the minimum corner.
        assert!((map.pixel_real(0) - frame.min_re).abs() < 1e-12);
        assert!((map.row_imag(2) - frame.min_im).abs() < 1e-12);
        // (width - 1, 0) is the maximum corner.
        assert!((map.pixel_real(3) - frame.max_re).abs() < 1e-12);
        assert!((map.row_imag(0) - frame.max_im).abs() < 1e-12);
    }

    #[test]
    fn coordinate_map_handles_single_pixel_axis() {
        let frame = Frame::new(-1.0, -1.0, 1.0, 1.0);
        let map = CoordinateMap::new(&frame, 1, 1);
        assert_eq!(map.pixel_real(0), frame.min_re);
        assert_eq!(map.row_imag(0), frame.max_im);
    }
}
