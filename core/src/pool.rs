//! OS-thread render pool (§6). Deliberately built on `std::thread::scope`
//! rather than a work-stealing pool: the partitioning rule — row (or
//! column) index modulo thread count — must be stable and reproducible so
//! that distributed rendering (§8) produces byte-identical output no
//! matter how many workers are involved.

use std::thread;

use fractalcast_precision::PrecisionRealm;

use crate::block::ArrayContext;
use crate::colour::write_pixel;
use crate::error::{RenderError, RenderResult};
use crate::kernel::iterate;
use crate::plot_context::{CoordinateMap, PlotContext};

/// Smallest and largest accepted worker-thread counts for local rendering
/// (§3).
pub const THREAD_COUNT_MIN: usize = 1;
pub const THREAD_COUNT_MAX: usize = 512;

/// Renders `rows` consecutive image rows, starting at `first_row`, into
/// `array`, splitting the work across `thread_count` OS threads.
///
/// Rows are assigned to threads by `local_row % thread_count`, so thread
/// `t` always owns the same rows regardless of how long any other thread's
/// rows take — matching the column-stripe assignment used by
/// [`render_single_row`] for the single-row distributed case.
///
/// # Errors
/// Returns [`RenderError::ThreadSpawn`] if the underlying OS refuses to
/// spawn a thread. Per-row panics inside a thread are not caught; the spec
/// treats that as an unrecoverable state matching the C implementation's
/// behaviour on errors within a worker thread.
pub fn render_block<R>(
    realm: &R,
    ctx: &PlotContext,
    coord: &CoordinateMap,
    first_row: usize,
    rows: usize,
    thread_count: usize,
    array: &mut ArrayContext,
) -> RenderResult<()>
where
    R: PrecisionRealm + Sync,
{
    let row_bytes = array.row_bytes();
    let thread_count = thread_count.max(1).min(rows.max(1));

    let mut buckets: Vec<Vec<(usize, &mut [u8])>> = (0..thread_count).map(|_| Vec::new()).collect();
    for (local_row, row_slice) in array
        .as_bytes_mut()
        .chunks_exact_mut(row_bytes)
        .enumerate()
    {
        buckets[local_row % thread_count].push((local_row, row_slice));
    }

    thread::scope(|scope| -> RenderResult<()> {
        let handles: Vec<_> = buckets
            .into_iter()
            .map(|bucket| {
                scope.spawn(move || {
                    for (local_row, row) in bucket {
                        render_row(realm, ctx, coord, first_row + local_row, row);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle
                .join()
                .map_err(|_| RenderError::ThreadJoin("render thread panicked".into()))?;
        }
        Ok(())
    })
}

/// Renders the pixels of image row `image_row` into `row`, a buffer
/// exactly [`crate::block::row_bytes`] long.
fn render_row<R>(
    realm: &R,
    ctx: &PlotContext,
    coord: &CoordinateMap,
    image_row: usize,
    row: &mut [u8],
) where
    R: PrecisionRealm,
{
    let depth = ctx.scheme.bit_depth();
    let imag = coord.row_imag(image_row);

    for x in 0..ctx.width {
        let real = coord.pixel_real(x);
        let result = iterate(
            realm,
            ctx.fractal,
            (real, imag),
            ctx.max_iterations,
            ctx.skip_bulb_check,
        );
        let n = smoothed_iteration_count(&result, ctx.smoothing_constant);
        let value = ctx.scheme.map(n, result.status);
        write_pixel(row, x, depth, value);
    }
}

/// Renders a single image row split into column stripes across
/// `thread_count` threads (§8.3: the distributed worker's per-row unit of
/// work). Each thread computes its columns' pixel values independently;
/// they are packed into the output row sequentially afterwards so that
/// 1-bit colour schemes, whose bytes are shared by up to eight columns,
/// never see concurrent writes to the same byte.
///
/// # Errors
/// Returns [`RenderError::ThreadJoin`] if a render thread panics.
pub fn render_single_row<R>(
    realm: &R,
    ctx: &PlotContext,
    coord: &CoordinateMap,
    image_row: usize,
    thread_count: usize,
) -> RenderResult<Vec<u8>>
where
    R: PrecisionRealm + Sync,
{
    let depth = ctx.scheme.bit_depth();
    let row_bytes = crate::block::row_bytes(ctx.width, depth);
    let thread_count = thread_count.max(1).min(ctx.width.max(1));
    let imag = coord.row_imag(image_row);

    let columns: Vec<usize> = (0..ctx.width).collect();
    let mut buckets: Vec<Vec<usize>> = (0..thread_count).map(|_| Vec::new()).collect();
    for &x in &columns {
        buckets[x % thread_count].push(x);
    }

    let computed: Vec<Vec<(usize, crate::colour::PixelValue)>> = thread::scope(|scope| {
        let handles: Vec<_> = buckets
            .into_iter()
            .map(|bucket| {
                scope.spawn(move || {
                    bucket
                        .into_iter()
                        .map(|x| {
                            let real = coord.pixel_real(x);
                            let result = iterate(
                                realm,
                                ctx.fractal,
                                (real, imag),
                                ctx.max_iterations,
                                ctx.skip_bulb_check,
                            );
                            let n = smoothed_iteration_count(&result, ctx.smoothing_constant);
                            (x, ctx.scheme.map(n, result.status))
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            out.push(
                handle
                    .join()
                    .map_err(|_| RenderError::ThreadJoin("render thread panicked".into()))?,
            );
        }
        Ok::<_, RenderError>(out)
    })?;

    let mut row = vec![0u8; row_bytes];
    for bucket in computed {
        for (x, value) in bucket {
            write_pixel(&mut row, x, depth, value);
        }
    }
    Ok(row)
}

/// The iteration count fed to the colour mapper (§4.3): smoothing
/// (`iterations + 1 - smoothing_constant`) applies only to escaped points.
/// GREYSCALE is the one scheme that also reads `n` for unescaped points
/// (its interior shade), so those get the raw iteration count rather than
/// the escaped-only smoothed value.
fn smoothed_iteration_count(result: &crate::kernel::IterationResult, smoothing_constant: f64) -> f64 {
    match result.status {
        crate::kernel::EscapeStatus::Escaped => f64::from(result.iterations) + 1.0 - smoothing_constant,
        crate::kernel::EscapeStatus::Unescaped => f64::from(result.iterations),
    }
}
