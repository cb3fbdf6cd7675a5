//! Tiled-block memory management (§5). An image can have more rows than
//! fit in the configured memory budget at once, so rendering proceeds in
//! row-bands ("blocks"): a block is rendered entirely in memory, then
//! handed to [`crate::sink::ImageSink`] and discarded before the next one
//! is allocated.

use crate::colour::BitDepth;
use crate::error::{RenderError, RenderResult};

/// Smallest and largest accepted memory budgets, in bytes (§3).
pub const MEMORY_MIN: usize = 1_000;
pub const MEMORY_MAX: usize = usize::MAX;

/// Bytes needed to hold one row of `width` pixels at the given bit depth.
#[must_use]
pub fn row_bytes(width: usize, depth: BitDepth) -> usize {
    match depth {
        BitDepth::One => width.div_ceil(8),
        BitDepth::Eight | BitDepth::Ascii => width,
        BitDepth::TwentyFour => width * 3,
    }
}

/// Describes how an image's rows are divided into blocks that each fit
/// within a memory budget (§5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    pub row_bytes: usize,
    pub rows_per_block: usize,
    pub full_block_count: usize,
    pub remainder_rows: usize,
}

impl BlockPlan {
    /// # Errors
    /// Returns [`RenderError::OutOfBudget`] if `budget_bytes` cannot hold
    /// even a single row.
    pub fn new(
        width: usize,
        height: usize,
        depth: BitDepth,
        budget_bytes: usize,
    ) -> RenderResult<Self> {
        let row_bytes = row_bytes(width, depth);

        if row_bytes > budget_bytes {
            return Err(RenderError::OutOfBudget {
                budget: budget_bytes,
                row_bytes,
            });
        }

        let rows_per_block = (budget_bytes / row_bytes).max(1).min(height);
        let full_block_count = height / rows_per_block;
        let remainder_rows = height % rows_per_block;

        Ok(Self {
            row_bytes,
            rows_per_block,
            full_block_count,
            remainder_rows,
        })
    }

    /// Total number of blocks this plan will produce, including a final
    /// short block for the remainder rows if there are any.
    #[must_use]
    pub const fn total_blocks(&self) -> usize {
        self.full_block_count + if self.remainder_rows > 0 { 1 } else { 0 }
    }

    /// How many rows belong to `block_id` (0-indexed); the last block may
    /// be shorter than the rest.
    #[must_use]
    pub const fn rows_in_block(&self, block_id: usize) -> usize {
        if block_id < self.full_block_count {
            self.rows_per_block
        } else {
            self.remainder_rows
        }
    }

    /// The image row number (0-indexed from the top) that local row 0 of
    /// `block_id` corresponds to.
    #[must_use]
    pub const fn first_row_of_block(&self, block_id: usize) -> usize {
        block_id * self.rows_per_block
    }
}

/// An in-memory buffer for one block's worth of rows, each `row_bytes`
/// long. Allocated fresh per block and dropped once written to the sink.
#[derive(Debug)]
pub struct ArrayContext {
    row_bytes: usize,
    data: Vec<u8>,
}

impl ArrayContext {
    #[must_use]
    pub fn new(row_bytes: usize, rows: usize) -> Self {
        Self {
            row_bytes,
            data: vec![0u8; row_bytes * rows],
        }
    }

    /// The mutable byte slice backing local row `row` within this block.
    ///
    /// # Panics
    /// Panics if `row` is out of range for the block this context was
    /// allocated for.
    #[must_use]
    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        let start = row * self.row_bytes;
        &mut self.data[start..start + self.row_bytes]
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[must_use]
    pub const fn row_bytes(&self) -> usize {
        self.row_bytes
    }
}
