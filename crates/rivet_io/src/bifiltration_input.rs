//! Bifiltration input (spec.md §6): the external boundary-data shape the
//! engine consumes. Building a bifiltration from a point cloud or a
//! Vietoris-Rips complex is explicitly out of scope (spec.md §1) — this
//! module only parses the already-sparse column data.
//!
//! Grounded on `spicy_parser::netlist_types`'s plain-struct external model
//! (no `serde`, hand-rolled line parsing) and on
//! `examples/original_source/interface/input_manager.cpp` for the field
//! shape: grade vectors, then one column block per homological dimension.

use num_bigint::BigInt;
use num_rational::BigRational;

use rivet_core::firep::Firep;
use rivet_core::matrix::{Bigrade, BigradedColumn, BigradedMatrix, SparseColumn};

use crate::error::IoError;

/// One column of a boundary matrix as given by the external bifiltration
/// format: a bigrade (indices into the grade vectors), the column's
/// original position, and the sparse set of row indices it has a 1 in.
#[derive(Debug, Clone)]
pub struct RawColumn {
    pub bigrade: (usize, usize),
    pub dim_index: usize,
    pub rows: Vec<usize>,
}

/// The full external bifiltration: exact-rational grade vectors plus the
/// two boundary matrices' raw columns (spec.md §6's `hom_dim`,
/// `hom_dim + 1` pair).
#[derive(Debug, Clone)]
pub struct BifiltrationInput {
    pub x_grades: Vec<BigRational>,
    pub y_grades: Vec<BigRational>,
    pub low_rows: usize,
    pub low_columns: Vec<RawColumn>,
    pub high_rows: usize,
    pub high_columns: Vec<RawColumn>,
}

fn check_monotone(grades: &[BigRational], axis: &'static str) -> Result<(), IoError> {
    for (i, w) in grades.windows(2).enumerate() {
        if w[0] >= w[1] {
            return Err(IoError::NonMonotoneGrades { axis, line: i + 1 });
        }
    }
    Ok(())
}

fn parse_rational(s: &str, line: usize) -> Result<BigRational, IoError> {
    match s.split_once('/') {
        Some((num, den)) => {
            let n: BigInt = num.parse().map_err(|_| IoError::Malformed {
                line,
                detail: format!("bad rational numerator {num:?}"),
            })?;
            let d: BigInt = den.parse().map_err(|_| IoError::Malformed {
                line,
                detail: format!("bad rational denominator {den:?}"),
            })?;
            Ok(BigRational::new(n, d))
        }
        None => {
            let n: BigInt = s.parse().map_err(|_| IoError::Malformed {
                line,
                detail: format!("bad integer grade {s:?}"),
            })?;
            Ok(BigRational::from_integer(n))
        }
    }
}

impl BifiltrationInput {
    /// Converts the parsed grade vectors and raw columns into a
    /// `rivet_core::Firep` at the given homological dimension. The row
    /// index spaces are taken as given by the caller's `low_rows`/
    /// `high_rows` (low's rows are `(d-1)`-generators; high's rows are
    /// `d`-generators, i.e. the same index space as low's columns).
    pub fn into_firep(&self, hom_dim: usize) -> Firep {
        let nx = self.x_grades.len();
        let ny = self.y_grades.len();
        let low = build_matrix(self.low_rows, &self.low_columns);
        let high = build_matrix(self.high_rows, &self.high_columns);
        Firep::new(hom_dim, nx, ny, low, high)
    }

    /// Parses the textual bifiltration format: a line `nx ny`, then `nx`
    /// x-grade lines, then `ny` y-grade lines, then two column blocks (low,
    /// high) each starting with a `rows cols` line followed by one line per
    /// column: `x y dim_index r0 r1 ...`.
    pub fn parse(text: &str) -> Result<Self, IoError> {
        let mut lines = text.lines().enumerate();
        let dims_line = next_nonblank(&mut lines)?;
        let mut dims = dims_line.1.split_whitespace();
        let nx: usize = parse_usize(dims.next(), dims_line.0)?;
        let ny: usize = parse_usize(dims.next(), dims_line.0)?;

        let mut x_grades = Vec::with_capacity(nx);
        for _ in 0..nx {
            let (ln, text) = next_nonblank(&mut lines)?;
            x_grades.push(parse_rational(text.trim(), ln)?);
        }
        let mut y_grades = Vec::with_capacity(ny);
        for _ in 0..ny {
            let (ln, text) = next_nonblank(&mut lines)?;
            y_grades.push(parse_rational(text.trim(), ln)?);
        }
        check_monotone(&x_grades, "x")?;
        check_monotone(&y_grades, "y")?;

        let (low_rows, low_columns) = parse_block(&mut lines)?;
        let (high_rows, high_columns) = parse_block(&mut lines)?;

        Ok(Self {
            x_grades,
            y_grades,
            low_rows,
            low_columns,
            high_rows,
            high_columns,
        })
    }
}

fn build_matrix(nrows: usize, raw: &[RawColumn]) -> BigradedMatrix {
    let columns = raw
        .iter()
        .map(|c| BigradedColumn {
            data: SparseColumn::from_rows(c.rows.clone()),
            dim_index: c.dim_index,
            bigrade: Bigrade::new(c.bigrade.0, c.bigrade.1),
        })
        .collect();
    BigradedMatrix::new(nrows, columns)
}

fn next_nonblank<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> Result<(usize, &'a str), IoError> {
    for (i, l) in lines.by_ref() {
        let trimmed = l.trim();
        if !trimmed.is_empty() {
            return Ok((i + 1, trimmed));
        }
    }
    Err(IoError::Malformed {
        line: 0,
        detail: "unexpected end of input".to_string(),
    })
}

fn parse_usize(tok: Option<&str>, line: usize) -> Result<usize, IoError> {
    tok.and_then(|t| t.parse().ok()).ok_or_else(|| IoError::Malformed {
        line,
        detail: "expected an integer".to_string(),
    })
}

fn parse_block<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> Result<(usize, Vec<RawColumn>), IoError> {
    let (ln, header) = next_nonblank(lines)?;
    let mut tok = header.split_whitespace();
    let nrows = parse_usize(tok.next(), ln)?;
    let ncols = parse_usize(tok.next(), ln)?;

    let mut columns = Vec::with_capacity(ncols);
    for _ in 0..ncols {
        let (ln, text) = next_nonblank(lines)?;
        let mut tok = text.split_whitespace();
        let x = parse_usize(tok.next(), ln)?;
        let y = parse_usize(tok.next(), ln)?;
        let dim_index = parse_usize(tok.next(), ln)?;
        let rows: Vec<usize> = tok
            .map(|t| t.parse::<usize>())
            .collect::<Result<_, _>>()
            .map_err(|_| IoError::Malformed {
                line: ln,
                detail: "bad row index".to_string(),
            })?;
        columns.push(RawColumn {
            bigrade: (x, y),
            dim_index,
            rows,
        });
    }
    Ok((nrows, columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_edge_triangle_bifiltration() {
        let text = "2 2\n0\n1\n0\n1\n1 1\n1 1 0\n1 1\n1 1 0 0\n";
        let bifilt = BifiltrationInput::parse(text).unwrap();
        assert_eq!(bifilt.x_grades.len(), 2);
        assert_eq!(bifilt.low_columns.len(), 1);
        assert_eq!(bifilt.high_columns.len(), 1);
        assert_eq!(bifilt.high_columns[0].rows, vec![0]);
    }

    #[test]
    fn rejects_non_monotone_grades() {
        let text = "2 1\n1\n0\n0\n0 0\n0 1\n0 0 0\n";
        let err = BifiltrationInput::parse(text).unwrap_err();
        assert!(matches!(err, IoError::NonMonotoneGrades { axis: "x", .. }));
    }
}
