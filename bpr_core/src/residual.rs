//! Residual generation for both delta modes, and per-row mode selection.
//!
//! All residual arithmetic is two's-complement wrapping, mirrored exactly
//! by the decoder's reconstruction, so encode/decode are inverses over
//! the whole i32 domain rather than only the expected height range.

use crate::error::{Error, Result};
use crate::predict::{predict_at, Predictor};

/// How a row's residuals are formed after column 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeltaMode {
    /// Predictor residual at every column.
    First = 0,
    /// Row-internal differencing: first difference at column 1, second
    /// differences from column 2 on. Column 0 still uses the predictor.
    Second = 1,
}

impl DeltaMode {
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0 => Ok(DeltaMode::First),
            1 => Ok(DeltaMode::Second),
            other => Err(Error::UnknownMode(other)),
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Residuals for the first row of a grid.
///
/// The sample at column 0 travels in the header as the seed; column 1 is
/// a first difference and later columns are second differences. The
/// decoder applies this fixed rule to row 0 regardless of its mode byte.
pub fn first_row_residuals(row: &[i32]) -> Vec<i32> {
    let mut res = Vec::with_capacity(row.len().saturating_sub(1));
    if row.len() >= 2 {
        res.push(row[1].wrapping_sub(row[0]));
    }
    for j in 2..row.len() {
        res.push(second_diff(row, j));
    }
    res
}

/// Residuals for a non-initial row under the given predictor and mode.
///
/// Column 0 always takes the predictor with `A = 0, C = 0,
/// B = prev[0]`-or-0; the mode governs the rest of the row.
pub fn row_residuals(row: &[i32], prev: &[i32], predictor: Predictor, mode: DeltaMode) -> Vec<i32> {
    let mut res = Vec::with_capacity(row.len());
    if row.is_empty() {
        return res;
    }
    res.push(row[0].wrapping_sub(predict_at(predictor, row, Some(prev), 0)));
    match mode {
        DeltaMode::First => {
            for j in 1..row.len() {
                let pred = predict_at(predictor, row, Some(prev), j);
                res.push(row[j].wrapping_sub(pred));
            }
        }
        DeltaMode::Second => {
            if row.len() >= 2 {
                res.push(row[1].wrapping_sub(row[0]));
            }
            for j in 2..row.len() {
                res.push(second_diff(row, j));
            }
        }
    }
    res
}

/// Generate residuals for a non-initial row under both modes and keep the
/// one with the smaller L1 sum, first-order winning ties.
pub fn choose_mode(row: &[i32], prev: &[i32], predictor: Predictor) -> (DeltaMode, Vec<i32>) {
    let first = row_residuals(row, prev, predictor, DeltaMode::First);
    let second = row_residuals(row, prev, predictor, DeltaMode::Second);
    if l1(&second) < l1(&first) {
        (DeltaMode::Second, second)
    } else {
        (DeltaMode::First, first)
    }
}

#[inline]
fn second_diff(row: &[i32], j: usize) -> i32 {
    row[j]
        .wrapping_sub(row[j - 1].wrapping_mul(2))
        .wrapping_add(row[j - 2])
}

fn l1(residuals: &[i32]) -> u64 {
    residuals
        .iter()
        .map(|d| d.unsigned_abs() as u64)
        .fold(0u64, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_row_of_an_arithmetic_progression() {
        // 10 11 12 13 14: one first difference, then flat second differences
        assert_eq!(first_row_residuals(&[10, 11, 12, 13, 14]), [1, 0, 0, 0]);
        assert_eq!(first_row_residuals(&[42]), []);
        assert_eq!(first_row_residuals(&[]), []);
    }

    #[test]
    fn identical_rows_are_zero_under_up_mode_zero() {
        let prev = [5, 6, 7];
        let res = row_residuals(&[5, 6, 7], &prev, Predictor::Up, DeltaMode::First);
        assert_eq!(res, [0, 0, 0]);
    }

    #[test]
    fn chosen_mode_never_loses() {
        let prev = [100, 100, 100, 100, 100];
        let row = [100, 102, 104, 106, 108];
        for p in Predictor::ALL {
            let (_, kept) = choose_mode(&row, &prev, p);
            let first = row_residuals(&row, &prev, p, DeltaMode::First);
            let second = row_residuals(&row, &prev, p, DeltaMode::Second);
            assert!(l1(&kept) <= l1(&first));
            assert!(l1(&kept) <= l1(&second));
        }
    }

    #[test]
    fn tie_prefers_first_order() {
        // one-sample rows: both modes produce the identical single residual
        let (mode, _) = choose_mode(&[9], &[4], Predictor::Left);
        assert_eq!(mode, DeltaMode::First);
    }

    #[test]
    fn ragged_previous_row_defaults_to_zero() {
        // prev is shorter than row; columns beyond it predict from 0
        let prev = [4, 5];
        let res = row_residuals(&[6, 7, 8, 9], &prev, Predictor::Up, DeltaMode::First);
        assert_eq!(res, [6 - 4, 7 - 5, 8, 9]);
    }
}
