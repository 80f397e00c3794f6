#![forbid(unsafe_code)]

use fmm_matrix::{MatrixError, SquareMatrix};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellPair {
    pub reference: f64,
    pub candidate: f64,
}

impl CellPair {
    #[must_use]
    pub fn abs_diff(self) -> f64 {
        (self.reference - self.candidate).abs()
    }
}

/// Aggregate and element-wise divergence between two outputs of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivergenceReport {
    pub n: usize,
    pub max_abs_diff: f64,
    pub sum_abs_diff: f64,
    /// First row-major cell holding the maximum; `None` when nothing differs.
    pub worst_cell: Option<(usize, usize)>,
    #[serde(skip)]
    pub cells: Vec<CellPair>,
}

impl DivergenceReport {
    #[must_use]
    pub fn cell(&self, i: usize, j: usize) -> Option<CellPair> {
        if i >= self.n || j >= self.n {
            return None;
        }
        self.cells.get(i * self.n + j).copied()
    }

    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.max_abs_diff == 0.0
    }
}

/// Visits every cell row-major and accumulates `|ref - candidate|`.
///
/// There is no early exit: the sum always covers all `N*N` cells. A NaN
/// difference pins the maximum to NaN for the rest of the scan.
pub fn compare(
    reference: &SquareMatrix,
    candidate: &SquareMatrix,
) -> Result<DivergenceReport, MatrixError> {
    let n = reference.dim();
    if candidate.dim() != n {
        return Err(MatrixError::LengthMismatch {
            n,
            len: candidate.len(),
        });
    }

    let mut max_abs_diff = 0.0f64;
    let mut sum_abs_diff = 0.0f64;
    let mut worst_idx: Option<usize> = None;
    let mut cells = Vec::with_capacity(reference.len());

    for (idx, (&r, &c)) in reference
        .values()
        .iter()
        .zip(candidate.values())
        .enumerate()
    {
        let pair = CellPair {
            reference: r,
            candidate: c,
        };
        let d = pair.abs_diff();
        sum_abs_diff += d;
        if d.is_nan() {
            if !max_abs_diff.is_nan() {
                max_abs_diff = f64::NAN;
                worst_idx = Some(idx);
            }
        } else if d > max_abs_diff {
            max_abs_diff = d;
            worst_idx = Some(idx);
        }
        cells.push(pair);
    }

    Ok(DivergenceReport {
        n,
        max_abs_diff,
        sum_abs_diff,
        worst_cell: worst_idx.map(|idx| (idx / n, idx % n)),
        cells,
    })
}
