//! Argument parsing for the root binary (§1/§6: argument parsing is named
//! as an external collaborator, not specified by spec.md). Styled after
//! the teacher's `mandelbrot::command_line_interface`: one `#[arg(...)]`
//! per field, `allow_hyphen_values` on every signed numeric flag, a
//! `value_parser`/`ValueEnum` for the one non-trivial parse (the colour
//! scheme name), and a `Cli::command().debug_assert()` smoke test.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use fractalcast_core::ColourScheme;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Renders an escape-time fractal image, locally or across a LAN of worker
/// hosts, to a PNM/PBM/PGM file, an ASCII art file, or the terminal.
pub struct Cli {
    /// Which side of the master/worker protocol this invocation plays.
    /// `standalone` renders entirely on this host.
    #[arg(long, value_enum, default_value_t = Role::Standalone)]
    pub role: Role,

    /// Fractal family to render.
    #[arg(long, value_enum, default_value_t = FractalArg::Mandelbrot)]
    pub fractal: FractalArg,

    /// Real part of the Julia constant `c` (ignored for Mandelbrot).
    #[arg(long, value_name = "RE(C)", default_value_t = -0.8, allow_hyphen_values = true)]
    pub julia_re: f64,

    /// Imaginary part of the Julia constant `c` (ignored for Mandelbrot).
    #[arg(long, value_name = "IM(C)", default_value_t = 0.156, allow_hyphen_values = true)]
    pub julia_im: f64,

    /// Real part of the viewport's minimum corner.
    #[arg(long, value_name = "RE", default_value_t = -2.0, allow_hyphen_values = true)]
    pub min_re: f64,

    /// Imaginary part of the viewport's minimum corner.
    #[arg(long, value_name = "IM", default_value_t = -1.2, allow_hyphen_values = true)]
    pub min_im: f64,

    /// Real part of the viewport's maximum corner.
    #[arg(long, value_name = "RE", default_value_t = 1.0, allow_hyphen_values = true)]
    pub max_re: f64,

    /// Imaginary part of the viewport's maximum corner.
    #[arg(long, value_name = "IM", default_value_t = 1.2, allow_hyphen_values = true)]
    pub max_im: f64,

    /// Iteration cap per pixel.
    #[arg(short = 'n', long, default_value_t = 256)]
    pub max_iterations: u32,

    /// Output image width in pixels.
    #[arg(short = 'W', long, default_value_t = 640)]
    pub width: usize,

    /// Output image height in pixels.
    #[arg(short = 'H', long, default_value_t = 480)]
    pub height: usize,

    /// Colour scheme / bit-depth pairing (§4.3).
    #[arg(long, value_enum, default_value_t = SchemeArg::All)]
    pub scheme: SchemeArg,

    /// Numeric precision tier (§4.1).
    #[arg(long, value_enum, default_value_t = PrecisionArg::Standard)]
    pub precision: PrecisionArg,

    /// Arbitrary-precision significand width, in bits (only used when
    /// `--precision arbitrary`).
    #[arg(long, default_value_t = fractalcast_precision::MP_BITS_DEFAULT)]
    pub mp_bits: u32,

    /// Skip iterating points provably inside the main cardioid or the
    /// period-2 bulb.
    #[arg(long, default_value_t = true)]
    pub skip_bulb_check: bool,

    /// Output file path. Omit to write to the terminal.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Memory budget for one resident row-band, in bytes (§3, §4.5).
    #[arg(long, default_value_t = 8 << 20)]
    pub memory_budget: usize,

    /// Number of OS threads per band (standalone/worker role; §3, §4.6).
    #[arg(short, long, default_value_t = 4)]
    pub threads: usize,

    /// Address this host listens on, master role only (e.g. `0.0.0.0:5000`).
    #[arg(long)]
    pub bind: Option<String>,

    /// Number of worker connections the master waits for before starting
    /// the render, master role only.
    #[arg(long, default_value_t = 1)]
    pub worker_count: usize,

    /// Log verbosity (`error`, `warn`, `info`, `debug`, `trace`).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Standalone,
    Master,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FractalArg {
    Mandelbrot,
    Julia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PrecisionArg {
    Standard,
    Extended,
    Arbitrary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemeArg {
    All,
    AllVibrant,
    BlackWhite,
    WhiteBlack,
    Greyscale,
    RedWhite,
    Fire,
    RedHot,
    Matrix,
    Ascii,
}

impl From<SchemeArg> for ColourScheme {
    fn from(value: SchemeArg) -> Self {
        match value {
            SchemeArg::All => Self::All,
            SchemeArg::AllVibrant => Self::AllVibrant,
            SchemeArg::BlackWhite => Self::BlackWhite,
            SchemeArg::WhiteBlack => Self::WhiteBlack,
            SchemeArg::Greyscale => Self::Greyscale,
            SchemeArg::RedWhite => Self::RedWhite,
            SchemeArg::Fire => Self::Fire,
            SchemeArg::RedHot => Self::RedHot,
            SchemeArg::Matrix => Self::Matrix,
            SchemeArg::Ascii => Self::Ascii,
        }
    }
}

#[cfg(test)]
mod test_cli {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
