#![forbid(unsafe_code)]

use std::fmt;

use fmm_matrix::{MatrixError, SquareMatrix};

pub mod candidates;

pub use candidates::{BROKEN_A, BROKEN_B, BROKEN_C, CANDIDATES};

pub const KERNEL_REASON_CODES: [&str; 2] = ["kernel_dimension_mismatch", "kernel_matrix_invalid"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    DimensionMismatch { expected: usize, actual: usize },
    Matrix(MatrixError),
}

impl KernelError {
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "kernel_dimension_mismatch",
            Self::Matrix(_) => "kernel_matrix_invalid",
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "operand dimension {actual} does not match N={expected}")
            }
            Self::Matrix(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for KernelError {}

impl From<MatrixError> for KernelError {
    fn from(err: MatrixError) -> Self {
        Self::Matrix(err)
    }
}

/// The multiply capability: reads row-major `a` and `b`, writes into `c`.
///
/// Callers guarantee all three slices hold `n * n` cells and that `c` is
/// zero-filled on entry. Implementations may leave cells untouched.
pub type MatmulFn = fn(a: &[f64], b: &[f64], c: &mut [f64], n: usize);

/// A named multiply implementation injected into a differential run.
#[derive(Debug, Clone, Copy)]
pub struct CandidateKernel {
    pub label: &'static str,
    pub multiply: MatmulFn,
}

impl CandidateKernel {
    #[must_use]
    pub const fn new(label: &'static str, multiply: MatmulFn) -> Self {
        Self { label, multiply }
    }

    /// Runs the kernel after checking every operand has the output's dimension.
    ///
    /// The output is handed over as-is; whatever the kernel writes (or skips)
    /// is what the caller reads back.
    pub fn run(
        &self,
        a: &SquareMatrix,
        b: &SquareMatrix,
        c: &mut SquareMatrix,
    ) -> Result<(), KernelError> {
        let n = c.dim();
        for operand in [a, b] {
            if operand.dim() != n {
                return Err(KernelError::DimensionMismatch {
                    expected: n,
                    actual: operand.dim(),
                });
            }
        }
        (self.multiply)(a.values(), b.values(), c.values_mut(), n);
        Ok(())
    }
}

/// Ground-truth kernel exposed through the same capability as the candidates.
pub const REFERENCE: CandidateKernel = CandidateKernel::new("reference", reference_matmul);

/// `C[i][j] = sum_k A[i][k] * B[k][j]`, accumulated in `f64` in ascending `k`.
pub fn reference_matmul(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    for i in 0..n {
        let a_row = &a[i * n..(i + 1) * n];
        for j in 0..n {
            let mut sum = 0.0f64;
            for (k, &a_ik) in a_row.iter().enumerate() {
                sum += a_ik * b[k * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}

/// Reference product of two equally sized matrices into a fresh buffer.
pub fn multiply(a: &SquareMatrix, b: &SquareMatrix) -> Result<SquareMatrix, KernelError> {
    let mut c = SquareMatrix::zeroed(a.dim())?;
    REFERENCE.run(a, b, &mut c)?;
    Ok(c)
}
