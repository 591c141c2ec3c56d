//! Encode side of the pipeline: parse the text grid, pick a predictor and
//! delta mode per row, pack residuals into 8-row blocks, and emit the
//! container.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::format::{self, Header, BLOCK_ROWS};
use crate::grid::Grid;
use crate::lzma;
use crate::predict::{select_predictor, Predictor};
use crate::residual::{choose_mode, first_row_residuals, DeltaMode};

/// Encode a text grid read from `input` into a BPR5 container on `output`.
pub fn encode<R: BufRead, W: Write>(input: R, output: W) -> Result<()> {
    let grid = Grid::parse(input)?;
    encode_grid(&grid, output)
}

/// Encode an already-parsed grid.
pub fn encode_grid<W: Write>(grid: &Grid, mut output: W) -> Result<()> {
    let row_lengths: Vec<usize> = grid.rows.iter().map(Vec::len).collect();

    let Some(seed) = grid.seed() else {
        // no samples anywhere: the container is just magic + row lengths
        let header = Header {
            row_lengths,
            seed: 0,
            predictors: Vec::new(),
            modes: Vec::new(),
        };
        header.write_to(&mut output)?;
        output.flush()?;
        return Ok(());
    };

    let (predictors, modes, blocks) = plan(grid)?;

    let header = Header {
        row_lengths,
        seed,
        predictors,
        modes,
    };
    header.write_to(&mut output)?;

    for block in &blocks {
        format::write_varint(&mut output, block.len() as u64)?;
        output.write_all(block)?;
    }
    output.flush()?;
    Ok(())
}

/// One pass over the rows: per-row predictor and mode selection, residual
/// generation, and block compression. Only the compressed blocks and one
/// in-flight residual buffer are held alongside the grid.
fn plan(grid: &Grid) -> Result<(Vec<Predictor>, Vec<DeltaMode>, Vec<Vec<u8>>)> {
    let rows = grid.rows.len();
    let mut predictors = Vec::with_capacity(rows);
    let mut modes = Vec::with_capacity(rows);
    let mut blocks = Vec::with_capacity(rows.div_ceil(BLOCK_ROWS));
    let mut raw = Vec::new();
    let mut prev: Option<&[i32]> = None;

    for (i, row) in grid.rows.iter().enumerate() {
        let predictor = select_predictor(row, prev);
        let (mode, residuals) = match prev {
            // row 0 follows the fixed seed/difference rule; its mode byte
            // is written as 0 and ignored by the decoder
            None => (DeltaMode::First, first_row_residuals(row)),
            Some(prev) => choose_mode(row, prev, predictor),
        };

        predictors.push(predictor);
        modes.push(mode);
        for &d in &residuals {
            format::write_varint(&mut raw, format::zigzag_encode(d) as u64)?;
        }

        if (i + 1) % BLOCK_ROWS == 0 {
            blocks.push(lzma::compress_block(&raw)?);
            raw.clear();
        }
        prev = Some(row);
    }
    if rows % BLOCK_ROWS != 0 {
        blocks.push(lzma::compress_block(&raw)?);
    }

    Ok((predictors, modes, blocks))
}
