//! Wire framing for the master/worker protocol (§8). A raw TCP exchange,
//! deliberately without an async runtime: one thread per worker
//! connection on the master side, a single blocking loop on the worker
//! side, matching the teacher's own preference for OS threads over a
//! reactor and the original implementation's synchronous socket loop.

use std::io::{Read, Write};

use fractalcast_core::{ColourScheme, Fractal, Frame, PlotContext, RenderError, RenderResult};
use fractalcast_precision::PrecisionMode;

/// Smallest and largest accepted TCP port numbers (§3).
pub const PORT_MIN: u16 = 1024;
pub const PORT_MAX: u16 = 65534;

/// Smallest and largest accepted worker counts for the master to dial out
/// to, or accept connections from (§3).
pub const WORKER_COUNT_MIN: u32 = 1;
pub const WORKER_COUNT_MAX: u32 = 32;

/// A single byte the worker sends to request its next row assignment.
const PING: u8 = 0x01;

/// Width, in bytes, of the ASCII-decimal row number the master assigns.
const ROW_REQUEST_LEN: usize = 10;

/// Width, in bytes, of the ASCII-decimal row number prefixed to a
/// worker's row-data reply.
const ROW_PREFIX_LEN: usize = 6;

/// Length of the binary-packed [`PlotContext`] handshake (§8: sent once,
/// master to worker, immediately after the TCP connection is accepted).
pub const HANDSHAKE_LEN: usize = 1 + 16 + 32 + 4 + 16 + 1 + 1 + 4 + 1;

/// Reads exactly `buf.len()` bytes, unless the very first read returns
/// zero bytes — that is treated as a clean end-of-work signal rather than
/// an error, per §8's "empty read ends the row-dispatch loop" contract.
///
/// Returns `Ok(true)` if `buf` was filled, `Ok(false)` on a clean
/// zero-byte start-of-frame EOF, and [`RenderError::ShortIo`] if the peer
/// closed mid-frame.
fn read_frame<R: Read>(stream: &mut R, buf: &mut [u8]) -> RenderResult<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream
            .read(&mut buf[filled..])
            .map_err(RenderError::SocketRead)?;
        if n == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(RenderError::ShortIo {
                expected: buf.len(),
                actual: filled,
            });
        }
        filled += n;
    }
    Ok(true)
}

fn write_frame<W: Write>(stream: &mut W, buf: &[u8]) -> RenderResult<()> {
    stream.write_all(buf).map_err(RenderError::SocketWrite)
}

fn encode_row_number(row: u64, width: usize) -> Vec<u8> {
    format!("{row:>width$}").into_bytes()
}

fn decode_row_number(buf: &[u8]) -> RenderResult<u64> {
    let text = std::str::from_utf8(buf).map_err(|_| RenderError::ShortIo {
        expected: buf.len(),
        actual: 0,
    })?;
    text.trim()
        .parse()
        .map_err(|_| RenderError::ShortIo {
            expected: buf.len(),
            actual: 0,
        })
}

/// Worker side of one row-dispatch cycle: sends the ready-ping, then
/// blocks for the master's next row assignment. `Ok(None)` means the
/// master has no more work and the worker should close the connection.
///
/// # Errors
/// Propagates [`RenderError::SocketRead`]/[`RenderError::SocketWrite`] on
/// I/O failure, or [`RenderError::ShortIo`] on a malformed frame.
pub fn request_row<S: Read + Write>(stream: &mut S) -> RenderResult<Option<u64>> {
    write_frame(stream, &[PING])?;

    let mut buf = [0u8; ROW_REQUEST_LEN];
    if !read_frame(stream, &mut buf)? {
        return Ok(None);
    }
    decode_row_number(&buf).map(Some)
}

/// Master side: waits for a worker's ready-ping. `Ok(false)` means the
/// worker closed the connection instead of pinging.
///
/// # Errors
/// See [`request_row`].
pub fn await_ping<S: Read>(stream: &mut S) -> RenderResult<bool> {
    let mut buf = [0u8; 1];
    read_frame(stream, &mut buf)
}

/// Master side: assigns `row` to a worker that just pinged.
///
/// # Errors
/// See [`request_row`].
pub fn assign_row<S: Write>(stream: &mut S, row: u64) -> RenderResult<()> {
    write_frame(stream, &encode_row_number(row, ROW_REQUEST_LEN))
}

/// Worker side: sends a completed row's pixel bytes, prefixed with its
/// row number.
///
/// # Errors
/// See [`request_row`].
pub fn send_row_result<S: Write>(stream: &mut S, row: u64, pixels: &[u8]) -> RenderResult<()> {
    let mut frame = encode_row_number(row, ROW_PREFIX_LEN);
    frame.extend_from_slice(pixels);
    write_frame(stream, &frame)
}

/// Master side: reads one worker's row result. `row_bytes` must match the
/// render's configured row length. `Ok(None)` means the worker closed the
/// connection before sending a result.
///
/// # Errors
/// See [`request_row`].
pub fn receive_row_result<S: Read>(stream: &mut S, row_bytes: usize) -> RenderResult<Option<(u64, Vec<u8>)>> {
    let mut buf = vec![0u8; ROW_PREFIX_LEN + row_bytes];
    if !read_frame(stream, &mut buf)? {
        return Ok(None);
    }
    let row = decode_row_number(&buf[..ROW_PREFIX_LEN])?;
    Ok(Some((row, buf[ROW_PREFIX_LEN..].to_vec())))
}

fn fractal_tag(fractal: Fractal) -> u8 {
    match fractal {
        Fractal::Mandelbrot => 0,
        Fractal::Julia { .. } => 1,
    }
}

fn scheme_tag(scheme: ColourScheme) -> u8 {
    match scheme {
        ColourScheme::All => 0,
        ColourScheme::BlackWhite => 1,
        ColourScheme::WhiteBlack => 2,
        ColourScheme::Greyscale => 3,
        ColourScheme::RedWhite => 4,
        ColourScheme::Fire => 5,
        ColourScheme::AllVibrant => 6,
        ColourScheme::RedHot => 7,
        ColourScheme::Matrix => 8,
        ColourScheme::Ascii => 9,
    }
}

fn scheme_from_tag(tag: u8) -> RenderResult<ColourScheme> {
    Ok(match tag {
        0 => ColourScheme::All,
        1 => ColourScheme::BlackWhite,
        2 => ColourScheme::WhiteBlack,
        3 => ColourScheme::Greyscale,
        4 => ColourScheme::RedWhite,
        5 => ColourScheme::Fire,
        6 => ColourScheme::AllVibrant,
        7 => ColourScheme::RedHot,
        8 => ColourScheme::Matrix,
        9 => ColourScheme::Ascii,
        other => return Err(RenderError::ConfigOutOfRange(format!("unknown colour scheme tag {other}"))),
    })
}

/// Serialises the handshake the master sends a worker immediately after
/// accepting its connection: everything the worker needs to render rows
/// on its own (§8). The destination and memory budget are never sent —
/// those are master-only concerns.
#[must_use]
pub fn encode_handshake(ctx: &PlotContext) -> [u8; HANDSHAKE_LEN] {
    let mut buf = [0u8; HANDSHAKE_LEN];
    let mut offset = 0;

    macro_rules! put {
        ($bytes:expr) => {{
            let bytes = $bytes;
            buf[offset..offset + bytes.len()].copy_from_slice(&bytes);
            offset += bytes.len();
        }};
    }

    put!([fractal_tag(ctx.fractal)]);
    let (c_re, c_im) = match ctx.fractal {
        Fractal::Mandelbrot => (0.0, 0.0),
        Fractal::Julia { c_re, c_im } => (c_re, c_im),
    };
    put!(c_re.to_le_bytes());
    put!(c_im.to_le_bytes());
    put!(ctx.frame.min_re.to_le_bytes());
    put!(ctx.frame.min_im.to_le_bytes());
    put!(ctx.frame.max_re.to_le_bytes());
    put!(ctx.frame.max_im.to_le_bytes());
    put!(ctx.max_iterations.to_le_bytes());
    put!((ctx.width as u64).to_le_bytes());
    put!((ctx.height as u64).to_le_bytes());
    put!([scheme_tag(ctx.scheme)]);

    match ctx.precision {
        PrecisionMode::Standard => {
            put!([0u8]);
            put!(0u32.to_le_bytes());
        }
        PrecisionMode::Extended => {
            put!([1u8]);
            put!(0u32.to_le_bytes());
        }
        PrecisionMode::Arbitrary { significand_bits } => {
            put!([2u8]);
            put!(significand_bits.to_le_bytes());
        }
    }

    put!([u8::from(ctx.skip_bulb_check)]);

    debug_assert_eq!(offset, HANDSHAKE_LEN);
    buf
}

/// Inverse of [`encode_handshake`].
///
/// # Errors
/// Returns [`RenderError::ConfigOutOfRange`] if the buffer encodes an
/// unrecognised fractal, scheme or precision tag, or fails the usual
/// [`PlotContext::new`] bounds validation.
pub fn decode_handshake(buf: &[u8; HANDSHAKE_LEN]) -> RenderResult<PlotContext> {
    let mut offset = 0;

    macro_rules! take {
        ($n:expr) => {{
            let slice = &buf[offset..offset + $n];
            offset += $n;
            slice
        }};
    }

    let fractal_tag = take!(1)[0];
    let c_re = f64::from_le_bytes(take!(8).try_into().unwrap());
    let c_im = f64::from_le_bytes(take!(8).try_into().unwrap());
    let min_re = f64::from_le_bytes(take!(8).try_into().unwrap());
    let min_im = f64::from_le_bytes(take!(8).try_into().unwrap());
    let max_re = f64::from_le_bytes(take!(8).try_into().unwrap());
    let max_im = f64::from_le_bytes(take!(8).try_into().unwrap());
    let max_iterations = u32::from_le_bytes(take!(4).try_into().unwrap());
    let width = u64::from_le_bytes(take!(8).try_into().unwrap()) as usize;
    let height = u64::from_le_bytes(take!(8).try_into().unwrap()) as usize;
    let scheme = scheme_from_tag(take!(1)[0])?;
    let precision_tag = take!(1)[0];
    let significand_bits = u32::from_le_bytes(take!(4).try_into().unwrap());
    let skip_bulb_check = take!(1)[0] != 0;

    let fractal = match fractal_tag {
        0 => Fractal::Mandelbrot,
        1 => Fractal::Julia { c_re, c_im },
        other => {
            return Err(RenderError::ConfigOutOfRange(format!(
                "unknown fractal tag {other}"
            )))
        }
    };

    let precision = match precision_tag {
        0 => PrecisionMode::Standard,
        1 => PrecisionMode::Extended,
        2 => PrecisionMode::arbitrary(significand_bits)
            .map_err(|e| RenderError::PrecisionUnsupported(e.to_string()))?,
        other => {
            return Err(RenderError::ConfigOutOfRange(format!(
                "unknown precision tag {other}"
            )))
        }
    };

    PlotContext::new(
        fractal,
        Frame::new(min_re, min_im, max_re, max_im),
        max_iterations,
        width,
        height,
        scheme,
        precision,
        skip_bulb_check,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_ctx() -> PlotContext {
        PlotContext::new(
            Fractal::Julia {
                c_re: -0.4,
                c_im: 0.6,
            },
            Frame::new(-1.5, -1.5, 1.5, 1.5),
            500,
            800,
            600,
            ColourScheme::Fire,
            PrecisionMode::Arbitrary { significand_bits: 256 },
            false,
        )
        .unwrap()
    }

    #[test]
    fn handshake_round_trips() {
        let ctx = sample_ctx();
        let encoded = encode_handshake(&ctx);
        let decoded = decode_handshake(&encoded).unwrap();

        assert_eq!(decoded.fractal, ctx.fractal);
        assert_eq!(decoded.frame, ctx.frame);
        assert_eq!(decoded.max_iterations, ctx.max_iterations);
        assert_eq!(decoded.width, ctx.width);
        assert_eq!(decoded.height, ctx.height);
        assert_eq!(decoded.scheme, ctx.scheme);
        assert_eq!(decoded.precision, ctx.precision);
        assert_eq!(decoded.skip_bulb_check, ctx.skip_bulb_check);
    }

    #[test]
    fn row_request_cycle_round_trips_over_an_in_memory_stream() {
        let mut stream = Cursor::new(Vec::new());
        assign_row(&mut stream, 42).unwrap();
        stream.set_position(0);

        let mut buf = [0u8; ROW_REQUEST_LEN];
        assert!(read_frame(&mut stream, &mut buf).unwrap());
        assert_eq!(decode_row_number(&buf).unwrap(), 42);
    }

    #[test]
    fn row_result_round_trips() {
        let mut stream = Cursor::new(Vec::new());
        send_row_result(&mut stream, 7, &[1, 2, 3, 4]).unwrap();
        stream.set_position(0);

        let (row, pixels) = receive_row_result(&mut stream, 4).unwrap().unwrap();
        assert_eq!(row, 7);
        assert_eq!(pixels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_read_signals_end_of_work() {
        let mut stream = Cursor::new(Vec::new());
        assert!(!await_ping(&mut stream).unwrap());
        assert_eq!(receive_row_result(&mut stream, 10).unwrap(), None);
    }

    #[test]
    fn mid_frame_close_is_a_short_io_error() {
        let mut stream = Cursor::new(vec![1, 2, 3]);
        let mut buf = [0u8; ROW_REQUEST_LEN];
        let err = read_frame(&mut stream, &mut buf).unwrap_err();
        assert!(matches!(err, RenderError::ShortIo { expected: 10, actual: 3 }));
    }
}
