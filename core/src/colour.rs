//! Maps a (smoothed iteration count, escape status) pair to a pixel value
//! (§4.3). Ten named schemes are supported, each fixed to one of four bit
//! depths; the depth determines how [`crate::sink::ImageSink`] frames the
//! pixel into a row.

use crate::kernel::EscapeStatus;
use fractalcast_palette::{hsv_to_rgb, Rgb8};

/// The output bit depth a colour scheme is rendered at (spec §4.3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// One bit per pixel, packed eight-to-a-byte (PBM).
    One,
    /// One byte per pixel (PGM).
    Eight,
    /// Three bytes per pixel (PPM).
    TwentyFour,
    /// One printable character per pixel, newline-terminated rows.
    Ascii,
}

/// The value produced for a single pixel. The bit depth named by the
/// [`ColourScheme`] that produced it determines which variant appears.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelValue {
    /// `true` means "set" (black in BLACK_WHITE, white in WHITE_BLACK).
    Mono(bool),
    Gray(u8),
    Rgb(Rgb8),
    Ascii(u8),
}

const ASCII_CHARSET: &[u8] = b" .:-=+*#%@";
const COLOUR_SCALE_MULTIPLIER: f64 = 20.0;
const CHAR_SCALE_MULTIPLIER: f64 = 0.3;

/// One of the ten named colour schemes (spec §4.3). Each fixes a
/// [`BitDepth`] and a mapping from smoothed iteration count to pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColourScheme {
    #[default]
    All,
    BlackWhite,
    WhiteBlack,
    Greyscale,
    RedWhite,
    Fire,
    AllVibrant,
    RedHot,
    Matrix,
    Ascii,
}

impl ColourScheme {
    #[must_use]
    pub const fn bit_depth(self) -> BitDepth {
        match self {
            Self::All
            | Self::RedWhite
            | Self::Fire
            | Self::AllVibrant
            | Self::RedHot
            | Self::Matrix => BitDepth::TwentyFour,
            Self::BlackWhite | Self::WhiteBlack => BitDepth::One,
            Self::Greyscale => BitDepth::Eight,
            Self::Ascii => BitDepth::Ascii,
        }
    }

    /// Maps a smoothed iteration count and escape status to a pixel value.
    /// `n` is only meaningful when `status` is [`EscapeStatus::Escaped`];
    /// every scheme below treats the unescaped case as its "inside the
    /// set" colour regardless of `n`.
    #[must_use]
    pub fn map(self, n: f64, status: EscapeStatus) -> PixelValue {
        match self {
            Self::All => PixelValue::Rgb(map_all(n, status, 0.8)),
            Self::AllVibrant => PixelValue::Rgb(map_all(n, status, 1.0)),
            Self::BlackWhite => PixelValue::Mono(status == EscapeStatus::Unescaped),
            Self::WhiteBlack => PixelValue::Mono(status == EscapeStatus::Escaped),
            Self::Greyscale => PixelValue::Gray(map_greyscale(n, status)),
            Self::RedWhite => PixelValue::Rgb(map_red_white(n, status)),
            Self::Fire => PixelValue::Rgb(map_fire(n, status)),
            Self::RedHot => PixelValue::Rgb(map_red_hot(n, status)),
            Self::Matrix => PixelValue::Rgb(map_matrix(n, status)),
            Self::Ascii => PixelValue::Ascii(map_ascii(n, status)),
        }
    }
}

fn map_all(n: f64, status: EscapeStatus, vibrancy: f64) -> Rgb8 {
    if status == EscapeStatus::Unescaped {
        return Rgb8::black();
    }
    let h = (COLOUR_SCALE_MULTIPLIER * n).rem_euclid(360.0);
    hsv_to_rgb(h, 0.6, vibrancy)
}

fn map_greyscale(n: f64, status: EscapeStatus) -> u8 {
    if status == EscapeStatus::Escaped {
        return 0;
    }
    let shade = 255.0 - (n * 8.5).rem_euclid(510.0).sub_abs(255.0);
    (shade as u8).max(30)
}

/// `|x|` via the same `fabs(fmod(..) - k)` idiom the original uses
/// repeatedly; kept as a small helper to avoid repeating `.abs()` chains.
trait SubAbs {
    fn sub_abs(self, rhs: f64) -> f64;
}

impl SubAbs for f64 {
    fn sub_abs(self, rhs: f64) -> f64 {
        (self - rhs).abs()
    }
}

fn map_red_white(n: f64, status: EscapeStatus) -> Rgb8 {
    let mut s = 1.0;
    if status == EscapeStatus::Escaped {
        s = 0.7 - (n / 20.0).rem_euclid(1.4).sub_abs(0.7);
        s = s.min(0.7);
    }
    hsv_to_rgb(0.0, s, 1.0)
}

fn map_fire(n: f64, status: EscapeStatus) -> Rgb8 {
    if status == EscapeStatus::Unescaped {
        return hsv_to_rgb(0.0, 0.85, 0.0);
    }
    let h = 50.0 - (n * 2.0).rem_euclid(100.0).sub_abs(50.0);
    hsv_to_rgb(h, 0.85, 0.85)
}

fn map_red_hot(n: f64, status: EscapeStatus) -> Rgb8 {
    if status == EscapeStatus::Unescaped {
        return hsv_to_rgb(0.0, 1.0, 0.0);
    }
    let scaled = 90.0 - (n * 2.0).rem_euclid(180.0).sub_abs(90.0);
    if scaled <= 30.0 {
        hsv_to_rgb(0.0, 1.0, scaled / 30.0)
    } else {
        hsv_to_rgb(scaled - 30.0, 1.0, 1.0)
    }
}

fn map_matrix(n: f64, status: EscapeStatus) -> Rgb8 {
    if status == EscapeStatus::Unescaped {
        return hsv_to_rgb(120.0, 1.0, 0.0);
    }
    let v = (90.0 - (n * 2.0).rem_euclid(180.0).sub_abs(90.0)) / 90.0;
    hsv_to_rgb(120.0, 1.0, v)
}

fn map_ascii(n: f64, status: EscapeStatus) -> u8 {
    let last = ASCII_CHARSET.len() - 1;
    let index = if status == EscapeStatus::Escaped {
        // Mod the full 10-glyph charset length (spec §4.3: "index
        // floor(0.3*n mod L), L=10"), not L-1 — the source's own colour.c
        // mods by LEN-1, which never produces the densest glyph for an
        // escaped pixel; the spec explicitly overrides that with L=10.
        ((CHAR_SCALE_MULTIPLIER * n).rem_euclid(ASCII_CHARSET.len() as f64)) as usize
    } else {
        last
    };
    ASCII_CHARSET[index]
}

/// Writes one pixel's value into its place in a row buffer. `row` must be
/// exactly [`crate::block::row_bytes`] long for `depth` and the row's
/// pixel width; `x` is the column index.
///
/// # Panics
/// Panics if `x` is out of range for `row`'s length at the given depth, or
/// if `value`'s variant does not match `depth`.
pub fn write_pixel(row: &mut [u8], x: usize, depth: BitDepth, value: PixelValue) {
    match (depth, value) {
        (BitDepth::TwentyFour, PixelValue::Rgb(rgb)) => {
            let offset = x * 3;
            row[offset..offset + 3].copy_from_slice(&rgb.as_bytes());
        }
        (BitDepth::Eight, PixelValue::Gray(shade)) => row[x] = shade,
        (BitDepth::Ascii, PixelValue::Ascii(byte)) => row[x] = byte,
        (BitDepth::One, PixelValue::Mono(set)) => {
            let byte = x / 8;
            let bit = 7 - (x % 8);
            if set {
                row[byte] |= 1 << bit;
            } else {
                row[byte] &= !(1 << bit);
            }
        }
        _ => panic!("pixel value variant does not match colour scheme's bit depth"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_depths_match_scheme_catalogue() {
        assert_eq!(ColourScheme::All.bit_depth(), BitDepth::TwentyFour);
        assert_eq!(ColourScheme::BlackWhite.bit_depth(), BitDepth::One);
        assert_eq!(ColourScheme::WhiteBlack.bit_depth(), BitDepth::One);
        assert_eq!(ColourScheme::Greyscale.bit_depth(), BitDepth::Eight);
        assert_eq!(ColourScheme::Ascii.bit_depth(), BitDepth::Ascii);
    }

    #[test]
    fn black_white_is_black_inside_the_set() {
        let px = ColourScheme::BlackWhite.map(0.0, EscapeStatus::Unescaped);
        assert_eq!(px, PixelValue::Mono(true));
        let px = ColourScheme::BlackWhite.map(0.0, EscapeStatus::Escaped);
        assert_eq!(px, PixelValue::Mono(false));
    }

    #[test]
    fn white_black_is_the_inverse_of_black_white() {
        assert_eq!(
            ColourScheme::WhiteBlack.map(3.0, EscapeStatus::Unescaped),
            PixelValue::Mono(false)
        );
        assert_eq!(
            ColourScheme::WhiteBlack.map(3.0, EscapeStatus::Escaped),
            PixelValue::Mono(true)
        );
    }

    #[test]
    fn greyscale_interior_is_black() {
        let PixelValue::Gray(shade) = ColourScheme::Greyscale.map(0.0, EscapeStatus::Unescaped)
        else {
            panic!("expected Gray pixel");
        };
        assert_eq!(shade, 0);
    }

    #[test]
    fn greyscale_exterior_never_goes_fully_dark() {
        for i in 0..200 {
            let PixelValue::Gray(shade) =
                ColourScheme::Greyscale.map(f64::from(i), EscapeStatus::Escaped)
            else {
                panic!("expected Gray pixel");
            };
            assert!(shade >= 30);
        }
    }

    #[test]
    fn ascii_interior_uses_the_densest_glyph() {
        let px = ColourScheme::Ascii.map(0.0, EscapeStatus::Unescaped);
        assert_eq!(px, PixelValue::Ascii(*ASCII_CHARSET.last().unwrap()));
    }

    #[test]
    fn ascii_glyph_always_within_charset() {
        for i in 0..500 {
            let PixelValue::Ascii(byte) = ColourScheme::Ascii.map(f64::from(i), EscapeStatus::Escaped)
            else {
                panic!("expected Ascii pixel");
            };
            assert!(ASCII_CHARSET.contains(&byte));
        }
    }

    #[test]
    fn write_pixel_packs_eight_mono_pixels_per_byte() {
        let mut row = [0u8; 2];
        write_pixel(&mut row, 0, BitDepth::One, PixelValue::Mono(true));
        write_pixel(&mut row, 7, BitDepth::One, PixelValue::Mono(true));
        write_pixel(&mut row, 8, BitDepth::One, PixelValue::Mono(true));
        assert_eq!(row, [0b1000_0001, 0b1000_0000]);
    }

    #[test]
    fn all_scheme_is_black_inside_and_coloured_outside() {
        assert_eq!(
            ColourScheme::All.map(0.0, EscapeStatus::Unescaped),
            PixelValue::Rgb(Rgb8::black())
        );
        let PixelValue::Rgb(rgb) = ColourScheme::All.map(5.0, EscapeStatus::Escaped) else {
            panic!("expected Rgb pixel");
        };
        assert!(rgb.r > 0 || rgb.g > 0 || rgb.b > 0);
    }
}
