use std::io::{BufRead, Write};

use crate::error::{Error, Result};

/// A parsed text grid: rows of 32-bit signed height samples.
///
/// Rows may differ in length and may be empty; both survive a round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    pub rows: Vec<Vec<i32>>,
}

impl Grid {
    /// Parse a whitespace-separated decimal grid, one row per line.
    ///
    /// Any run of whitespace separates samples; an empty line is an empty
    /// row. Integers may carry a leading sign.
    pub fn parse<R: BufRead>(input: R) -> Result<Self> {
        let mut rows = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            let mut row = Vec::new();
            for token in line.split_whitespace() {
                let sample: i32 = token.parse().map_err(|_| Error::Parse {
                    line: idx + 1,
                    msg: format!("{token:?} is not a decimal integer"),
                })?;
                row.push(sample);
            }
            rows.push(row);
        }
        Ok(Grid { rows })
    }

    /// Write the normalized text form: samples joined by single spaces,
    /// each row terminated by `\n`.
    pub fn write<W: Write>(&self, mut out: W) -> Result<()> {
        for row in &self.rows {
            let mut first = true;
            for sample in row {
                if first {
                    first = false;
                } else {
                    out.write_all(b" ")?;
                }
                write!(out, "{sample}")?;
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// First sample of the first non-empty row; `None` when the grid has
    /// no samples at all.
    pub fn seed(&self) -> Option<i32> {
        self.rows.iter().find_map(|row| row.first().copied())
    }

    pub fn total_samples(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Grid {
        Grid::parse(text.as_bytes()).unwrap()
    }

    #[test]
    fn parses_signed_and_ragged_rows() {
        let grid = parse("1 2 3\n-4 +5\n\n6\n");
        assert_eq!(grid.rows, vec![vec![1, 2, 3], vec![-4, 5], vec![], vec![6]]);
        assert_eq!(grid.seed(), Some(1));
        assert_eq!(grid.total_samples(), 6);
    }

    #[test]
    fn runs_of_whitespace_separate_samples() {
        let grid = parse("1\t 2   3\n");
        assert_eq!(grid.rows, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn write_normalizes_to_single_spaces_and_newlines() {
        let grid = parse("1\t2\n\n3\n");
        let mut out = Vec::new();
        grid.write(&mut out).unwrap();
        assert_eq!(out, b"1 2\n\n3\n");
    }

    #[test]
    fn bad_token_names_its_line() {
        let err = Grid::parse("1 2\n3 x4\n".as_bytes()).unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other}"),
        }
    }

    #[test]
    fn empty_input_is_an_empty_grid() {
        let grid = parse("");
        assert!(grid.rows.is_empty());
        assert_eq!(grid.seed(), None);
    }
}
