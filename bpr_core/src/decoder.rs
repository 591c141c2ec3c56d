//! Decode side of the pipeline: read the container header, decompress the
//! blocks in order, replay each row's reconstruction rule, and write the
//! normalized text grid.

use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::format::{self, Header, BLOCK_ROWS};
use crate::grid::Grid;
use crate::lzma;
use crate::predict::{predict_at, Predictor};
use crate::residual::DeltaMode;

/// Decode a BPR5 container read from `input` into its text grid on
/// `output`.
pub fn decode<R: Read, W: Write>(mut input: R, mut output: W) -> Result<()> {
    let header = Header::read_from(&mut input)?;
    let rows = decode_rows(&header, &mut input)?;
    let grid = Grid { rows };
    grid.write(&mut output)?;
    output.flush()?;
    Ok(())
}

fn decode_rows<R: Read>(header: &Header, input: &mut R) -> Result<Vec<Vec<i32>>> {
    let row_count = header.row_lengths.len();
    let mut rows: Vec<Vec<i32>> = Vec::new();

    if header.total_samples() == 0 {
        rows.resize(row_count, Vec::new());
        return Ok(rows);
    }

    for b in 0..header.block_count() {
        let raw = read_block(input, b)?;
        let mut stream: &[u8] = &raw;

        let lo = b * BLOCK_ROWS;
        let hi = (lo + BLOCK_ROWS).min(row_count);
        for i in lo..hi {
            let prev = rows.last().map(Vec::as_slice);
            let row = decode_row(
                i,
                header.row_lengths[i],
                header.predictors[i],
                header.modes[i],
                header.seed,
                prev,
                &mut stream,
            )?;
            rows.push(row);
        }

        if !stream.is_empty() {
            return Err(Error::Residual(format!(
                "block {b} left {} unconsumed bytes",
                stream.len()
            )));
        }
    }

    Ok(rows)
}

/// Read one length-prefixed LZMA block and decompress it.
fn read_block<R: Read>(input: &mut R, b: usize) -> Result<Vec<u8>> {
    let clen = format::read_varint(input).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            Error::Malformed(format!("truncated container: length of block {b} missing"))
        }
        io::ErrorKind::InvalidData => {
            Error::Malformed(format!("bad varint for length of block {b}"))
        }
        _ => Error::Io(e),
    })?;
    let clen = usize::try_from(clen)
        .map_err(|_| Error::Malformed(format!("block {b} length exceeds address space")))?;

    let mut compressed = vec![0u8; clen];
    input.read_exact(&mut compressed).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::Malformed(format!("block {b} length exceeds remaining input"))
        } else {
            Error::Io(e)
        }
    })?;

    lzma::decompress_block(&compressed)
}

/// Reconstruct one row from the residual stream.
///
/// Row 0 ignores its mode byte: seed, a first difference at column 1,
/// second differences beyond. Every later row starts with the predictor
/// at column 0 (A = 0, C = 0, B = prev[0]-or-0) and then follows its
/// recorded mode. Arithmetic wraps, matching the encoder exactly.
fn decode_row(
    i: usize,
    len: usize,
    predictor: Predictor,
    mode: DeltaMode,
    seed: i32,
    prev: Option<&[i32]>,
    stream: &mut &[u8],
) -> Result<Vec<i32>> {
    let mut rec = Vec::with_capacity(len);
    if len == 0 {
        return Ok(rec);
    }

    if i == 0 {
        rec.push(seed);
        if len >= 2 {
            let d = next_residual(stream)?;
            rec.push(rec[0].wrapping_add(d));
        }
        for j in 2..len {
            let d = next_residual(stream)?;
            rec.push(extrapolate(&rec, j).wrapping_add(d));
        }
        return Ok(rec);
    }

    let d = next_residual(stream)?;
    rec.push(predict_at(predictor, &rec, prev, 0).wrapping_add(d));

    match mode {
        DeltaMode::First => {
            for j in 1..len {
                let d = next_residual(stream)?;
                rec.push(predict_at(predictor, &rec, prev, j).wrapping_add(d));
            }
        }
        DeltaMode::Second => {
            if len >= 2 {
                let d = next_residual(stream)?;
                rec.push(rec[0].wrapping_add(d));
            }
            for j in 2..len {
                let d = next_residual(stream)?;
                rec.push(extrapolate(&rec, j).wrapping_add(d));
            }
        }
    }
    Ok(rec)
}

/// Linear extrapolation 2·rec[j−1] − rec[j−2], the base the second-order
/// residual was formed against.
#[inline]
fn extrapolate(rec: &[i32], j: usize) -> i32 {
    rec[j - 1].wrapping_mul(2).wrapping_sub(rec[j - 2])
}

fn next_residual(stream: &mut &[u8]) -> Result<i32> {
    let z = format::read_varint(stream).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            Error::Residual("block ended before all row residuals were read".into())
        }
        _ => Error::Residual(e.to_string()),
    })?;
    let z =
        u32::try_from(z).map_err(|_| Error::Residual(format!("residual {z} exceeds 32 bits")))?;
    Ok(format::zigzag_decode(z))
}
