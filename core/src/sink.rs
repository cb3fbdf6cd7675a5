//! Streaming image output (§6). Replaces the teacher's `image` crate: that
//! crate wants the whole pixel buffer up front and owns its own container
//! formats, while this format needs an exact byte-level PNM/PBM/PGM header
//! followed by however many row-bands happen to fit the memory budget,
//! written incrementally as each one finishes rendering.

use std::fs::File;
use std::io::{BufWriter, Stdout, Write};

use crate::block::ArrayContext;
use crate::colour::BitDepth;
use crate::error::{RenderError, RenderResult};
use crate::plot_context::Destination;

enum Writer {
    File(BufWriter<File>),
    Stdout(BufWriter<Stdout>),
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::File(w) => w.write(buf),
            Self::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::File(w) => w.flush(),
            Self::Stdout(w) => w.flush(),
        }
    }
}

/// An open image output stream: header already written, ready to accept
/// row-bands in top-to-bottom order.
pub struct ImageSink {
    writer: Writer,
    depth: BitDepth,
    width: usize,
}

impl ImageSink {
    /// Opens `destination`, writing the PNM/PBM/PGM header immediately
    /// (ASCII output has no header).
    ///
    /// # Errors
    /// Returns [`RenderError::FileOpen`] if a file destination cannot be
    /// created, or [`RenderError::FileWrite`] if the header cannot be
    /// written.
    pub fn create(destination: &Destination, width: usize, height: usize, depth: BitDepth) -> RenderResult<Self> {
        let mut writer = match destination {
            Destination::File(path) => {
                let file = File::create(path).map_err(|source| RenderError::FileOpen {
                    path: path.display().to_string(),
                    source,
                })?;
                Writer::File(BufWriter::new(file))
            }
            Destination::Terminal => Writer::Stdout(BufWriter::new(std::io::stdout())),
        };

        if let Some(header) = pnm_header(width, height, depth) {
            writer
                .write_all(header.as_bytes())
                .map_err(RenderError::FileWrite)?;
        }

        Ok(Self {
            writer,
            depth,
            width,
        })
    }

    /// Appends `rows` rows worth of pixel data from `array` to the stream.
    ///
    /// # Errors
    /// Returns [`RenderError::FileWrite`] if the underlying write fails.
    pub fn write_block(&mut self, array: &ArrayContext, rows: usize) -> RenderResult<()> {
        if self.depth == BitDepth::Ascii {
            let row_bytes = array.row_bytes();
            for row in array.as_bytes()[..row_bytes * rows].chunks_exact(row_bytes) {
                self.writer.write_all(row).map_err(RenderError::FileWrite)?;
                self.writer.write_all(b"\n").map_err(RenderError::FileWrite)?;
            }
        } else {
            let row_bytes = array.row_bytes();
            self.writer
                .write_all(&array.as_bytes()[..row_bytes * rows])
                .map_err(RenderError::FileWrite)?;
        }
        Ok(())
    }

    /// Flushes and releases the underlying stream.
    ///
    /// # Errors
    /// Returns [`RenderError::FileClose`] if the final flush fails.
    pub fn close(mut self) -> RenderResult<()> {
        self.writer.flush().map_err(RenderError::FileClose)
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }
}

/// The exact PNM header string for a given bit depth, or `None` for ASCII
/// output, which has no header at all (§6).
fn pnm_header(width: usize, height: usize, depth: BitDepth) -> Option<String> {
    match depth {
        BitDepth::One => Some(format!("P4 {width} {height} ")),
        BitDepth::Eight => Some(format!("P5 {width} {height} 255 ")),
        BitDepth::TwentyFour => Some(format!("P6 {width} {height} 255 ")),
        BitDepth::Ascii => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pbm_header_matches_exact_byte_contract() {
        assert_eq!(pnm_header(640, 480, BitDepth::One).unwrap(), "P4 640 480 ");
    }

    #[test]
    fn pgm_header_matches_exact_byte_contract() {
        assert_eq!(
            pnm_header(640, 480, BitDepth::Eight).unwrap(),
            "P5 640 480 255 "
        );
    }

    #[test]
    fn ppm_header_matches_exact_byte_contract() {
        assert_eq!(
            pnm_header(640, 480, BitDepth::TwentyFour).unwrap(),
            "P6 640 480 255 "
        );
    }

    #[test]
    fn ascii_has_no_header() {
        assert!(pnm_header(80, 24, BitDepth::Ascii).is_none());
    }

    #[test]
    fn writes_ascii_rows_with_newline_terminators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut sink = ImageSink::create(
            &Destination::File(path.clone()),
            3,
            2,
            BitDepth::Ascii,
        )
        .unwrap();

        let mut array = ArrayContext::new(3, 2);
        array.row_mut(0).copy_from_slice(b"abc");
        array.row_mut(1).copy_from_slice(b"def");
        sink.write_block(&array, 2).unwrap();
        sink.close().unwrap();

        let contents = std::fs::read(path).unwrap();
        assert_eq!(contents, b"abc\ndef\n");
    }

    #[test]
    fn writes_ppm_bytes_with_exact_header_and_no_row_separators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ppm");
        let mut sink = ImageSink::create(
            &Destination::File(path.clone()),
            2,
            1,
            BitDepth::TwentyFour,
        )
        .unwrap();

        let mut array = ArrayContext::new(6, 1);
        array
            .row_mut(0)
            .copy_from_slice(&[255, 0, 0, 0, 255, 0]);
        sink.write_block(&array, 1).unwrap();
        sink.close().unwrap();

        let contents = std::fs::read(path).unwrap();
        assert_eq!(contents, b"P6 2 1 255 \xff\x00\x00\x00\xff\x00");
    }
}
