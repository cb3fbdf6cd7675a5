#![forbid(unsafe_code)]

//! The rendering engine (§4-§6): iteration kernel, colour mapper, plot
//! context, tiled-block memory manager, OS-thread render pool and
//! streaming image sink. Every piece here is generic over
//! [`fractalcast_precision::PrecisionRealm`] so the same code path serves
//! hardware, extended and arbitrary precision renders.

pub mod block;
pub mod colour;
pub mod error;
pub mod kernel;
pub mod plot_context;
pub mod pool;
pub mod sink;

pub use block::{ArrayContext, BlockPlan};
pub use colour::{BitDepth, ColourScheme, PixelValue};
pub use error::{RenderError, RenderResult};
pub use kernel::{iterate, EscapeStatus, IterationResult};
pub use plot_context::{CoordinateMap, Destination, Fractal, Frame, PlotContext};
pub use pool::{render_block, render_single_row};
pub use sink::ImageSink;

use fractalcast_precision::{ArbitraryRealm, ExtendedRealm, PrecisionMode, StandardRealm};

/// Renders an entire image to `destination`, dividing the work into
/// memory-budgeted blocks and, within each block, across `thread_count` OS
/// threads (§5, §6). This is the single-host render path; the distributed
/// master/worker path in `fractalcast-net` drives [`render_single_row`]
/// directly instead.
///
/// # Errors
/// Propagates any [`RenderError`] raised while validating the block plan,
/// rendering a block, or writing to the sink.
pub fn render_to_sink(ctx: &PlotContext, budget_bytes: usize, thread_count: usize) -> RenderResult<()> {
    let destination = Destination::Terminal;
    render_to_sink_at(ctx, &destination, budget_bytes, thread_count)
}

/// As [`render_to_sink`], but with an explicit destination rather than
/// always writing to the terminal. Split out so callers (and tests) can
/// target a file without constructing a whole [`PlotContext`] twice.
///
/// # Errors
/// See [`render_to_sink`].
pub fn render_to_sink_at(
    ctx: &PlotContext,
    destination: &Destination,
    budget_bytes: usize,
    thread_count: usize,
) -> RenderResult<()> {
    let depth = ctx.scheme.bit_depth();
    let plan = BlockPlan::new(ctx.width, ctx.height, depth, budget_bytes)?;
    let coord = CoordinateMap::new(&ctx.frame, ctx.width, ctx.height);
    let mut sink = ImageSink::create(destination, ctx.width, ctx.height, depth)?;
    log::debug!(
        "render plan: {} block(s) of up to {} rows, {} bytes/row",
        plan.total_blocks(),
        plan.rows_per_block,
        plan.row_bytes
    );

    for block_id in 0..plan.total_blocks() {
        let rows = plan.rows_in_block(block_id);
        let first_row = plan.first_row_of_block(block_id);
        log::debug!("rendering block {block_id} ({rows} row(s) starting at {first_row})");
        let mut array = ArrayContext::new(plan.row_bytes, rows);

        match ctx.precision {
            PrecisionMode::Standard => {
                render_block(&StandardRealm, ctx, &coord, first_row, rows, thread_count, &mut array)?;
            }
            PrecisionMode::Extended => {
                render_block(&ExtendedRealm, ctx, &coord, first_row, rows, thread_count, &mut array)?;
            }
            PrecisionMode::Arbitrary { significand_bits } => {
                let realm = ArbitraryRealm::new(significand_bits);
                render_block(&realm, ctx, &coord, first_row, rows, thread_count, &mut array)?;
            }
        }

        sink.write_block(&array, rows)?;
    }

    sink.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ctx(scheme: ColourScheme, width: usize, height: usize) -> PlotContext {
        PlotContext::new(
            Fractal::Mandelbrot,
            Frame::new(-2.0, -1.2, 1.0, 1.2),
            50,
            width,
            height,
            scheme,
            PrecisionMode::Standard,
            true,
        )
        .unwrap()
    }

    #[test]
    fn renders_a_small_ppm_end_to_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.ppm");
        let plot = ctx(ColourScheme::All, 16, 12);

        render_to_sink_at(&plot, &Destination::File(path.clone()), 1 << 20, 4).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6 16 12 255 "));
        let header_len = b"P6 16 12 255 ".len();
        assert_eq!(bytes.len(), header_len + 16 * 12 * 3);
    }

    #[test]
    fn renders_a_small_pbm_with_a_memory_budget_of_exactly_one_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.pbm");
        let plot = ctx(ColourScheme::BlackWhite, 17, 9);
        let row_bytes = block::row_bytes(17, BitDepth::One);

        render_to_sink_at(&plot, &Destination::File(path.clone()), row_bytes, 2).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P4 17 9 "));
        let header_len = b"P4 17 9 ".len();
        assert_eq!(bytes.len(), header_len + row_bytes * 9);
    }

    #[test]
    fn renders_ascii_output_with_one_line_per_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let plot = ctx(ColourScheme::Ascii, 20, 5);

        render_to_sink_at(&plot, &Destination::File(path.clone()), 1 << 16, 3).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 5);
        for line in contents.lines() {
            assert_eq!(line.len(), 20);
        }
    }

    #[test]
    fn single_pixel_image_at_the_origin_is_unescaped_and_black() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.ppm");
        // A 1x1 viewport collapsed onto the origin: the only rendered
        // pixel sits at the minimum corner, which here is the origin
        // itself, always inside the set.
        let plot = PlotContext::new(
            Fractal::Mandelbrot,
            Frame::new(-0.0001, -0.0001, 0.0001, 0.0001),
            50,
            1,
            1,
            ColourScheme::All,
            PrecisionMode::Standard,
            true,
        )
        .unwrap();

        render_to_sink_at(&plot, &Destination::File(path.clone()), 1 << 10, 1).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, b"P6 1 1 255 \x00\x00\x00");
    }
}
