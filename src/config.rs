//! Turns parsed CLI flags into a validated [`PlotContext`] and
//! [`Destination`] — the "configuration inputs" collaborator named in
//! spec.md §6, consumed here rather than from a config file (file-based
//! configuration loading is explicitly out of scope per spec.md §1).

use fractalcast_core::{Destination, Fractal, Frame, PlotContext, RenderResult};
use fractalcast_precision::PrecisionMode;

use crate::command_line_interface::{Cli, FractalArg, PrecisionArg};

/// Builds the [`PlotContext`] spec.md §3 describes from parsed CLI flags,
/// running the same §3 bounds validation [`PlotContext::new`] always does.
///
/// # Errors
/// Returns [`fractalcast_core::RenderError::ConfigOutOfRange`] or
/// [`fractalcast_core::RenderError::PrecisionUnsupported`] if any flag
/// violates its permitted range.
pub fn plot_context_from_cli(cli: &Cli) -> RenderResult<PlotContext> {
    let fractal = match cli.fractal {
        FractalArg::Mandelbrot => Fractal::Mandelbrot,
        FractalArg::Julia => Fractal::Julia {
            c_re: cli.julia_re,
            c_im: cli.julia_im,
        },
    };

    let frame = Frame::new(cli.min_re, cli.min_im, cli.max_re, cli.max_im);

    let precision = match cli.precision {
        PrecisionArg::Standard => PrecisionMode::Standard,
        PrecisionArg::Extended => PrecisionMode::Extended,
        PrecisionArg::Arbitrary => PrecisionMode::arbitrary(cli.mp_bits)
            .map_err(|e| fractalcast_core::RenderError::PrecisionUnsupported(e.to_string()))?,
    };

    PlotContext::new(
        fractal,
        frame,
        cli.max_iterations,
        cli.width,
        cli.height,
        cli.scheme.into(),
        precision,
        cli.skip_bulb_check,
    )
}

/// Where the render's bytes go: a file if `--output` was given, the
/// terminal otherwise.
#[must_use]
pub fn destination_from_cli(cli: &Cli) -> Destination {
    match &cli.output {
        Some(path) => Destination::File(path.clone()),
        None => Destination::Terminal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn default_flags_produce_a_valid_standalone_context() {
        let cli = Cli::parse_from(["fractalcast"]);
        let ctx = plot_context_from_cli(&cli).unwrap();
        assert_eq!(ctx.width, 640);
        assert_eq!(ctx.height, 480);
        assert!(matches!(ctx.fractal, Fractal::Mandelbrot));
    }

    #[test]
    fn julia_flags_carry_the_constant_through() {
        let cli = Cli::parse_from([
            "fractalcast",
            "--fractal",
            "julia",
            "--julia-re",
            "-0.4",
            "--julia-im",
            "0.6",
        ]);
        let ctx = plot_context_from_cli(&cli).unwrap();
        assert!(matches!(
            ctx.fractal,
            Fractal::Julia { c_re, c_im } if c_re == -0.4 && c_im == 0.6
        ));
    }

    #[test]
    fn out_of_range_viewport_is_rejected() {
        let cli = Cli::parse_from(["fractalcast", "--min-re", "-50.0"]);
        assert!(plot_context_from_cli(&cli).is_err());
    }
}
