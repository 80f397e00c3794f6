#![forbid(unsafe_code)]

pub const MATRIX_REASON_CODES: [&str; 4] = [
    "matrix_zero_dimension",
    "matrix_size_overflow",
    "matrix_allocation_failed",
    "matrix_length_mismatch",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    ZeroDimension,
    SizeOverflow { n: usize },
    AllocationFailed { n: usize, elements: usize },
    LengthMismatch { n: usize, len: usize },
}

impl MatrixError {
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::ZeroDimension => "matrix_zero_dimension",
            Self::SizeOverflow { .. } => "matrix_size_overflow",
            Self::AllocationFailed { .. } => "matrix_allocation_failed",
            Self::LengthMismatch { .. } => "matrix_length_mismatch",
        }
    }
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "matrix dimension must be > 0"),
            Self::SizeOverflow { n } => write!(f, "element count overflow for N={n}"),
            Self::AllocationFailed { n, elements } => {
                write!(f, "Allocation failed (N={n}, {elements} elements)")
            }
            Self::LengthMismatch { n, len } => {
                write!(f, "buffer of length {len} is not N*N for N={n}")
            }
        }
    }
}

impl std::error::Error for MatrixError {}

/// Number of cells in an `n x n` matrix, rejecting `n == 0` and overflow.
pub fn element_count(n: usize) -> Result<usize, MatrixError> {
    if n == 0 {
        return Err(MatrixError::ZeroDimension);
    }
    n.checked_mul(n).ok_or(MatrixError::SizeOverflow { n })
}

/// Dense, square, row-major matrix of `f64`.
///
/// Every constructor yields a fully initialized buffer of exactly `n * n`
/// cells. Kernels that skip a cell leave the zero written at allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SquareMatrix {
    /// Allocates a zero-filled matrix, surfacing allocation failure as an error.
    pub fn zeroed(n: usize) -> Result<Self, MatrixError> {
        let elements = element_count(n)?;
        let mut values = Vec::new();
        values
            .try_reserve_exact(elements)
            .map_err(|_| MatrixError::AllocationFailed { n, elements })?;
        values.resize(elements, 0.0);
        Ok(Self { n, values })
    }

    pub fn from_values(n: usize, values: Vec<f64>) -> Result<Self, MatrixError> {
        let elements = element_count(n)?;
        if values.len() != elements {
            return Err(MatrixError::LengthMismatch {
                n,
                len: values.len(),
            });
        }
        Ok(Self { n, values })
    }

    /// Builds a matrix by evaluating `f(i, j)` in row-major order.
    pub fn from_fn<F>(n: usize, mut f: F) -> Result<Self, MatrixError>
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut out = Self::zeroed(n)?;
        for i in 0..n {
            for j in 0..n {
                out.values[i * n + j] = f(i, j);
            }
        }
        Ok(out)
    }

    pub fn identity(n: usize) -> Result<Self, MatrixError> {
        Self::from_fn(n, |i, j| if i == j { 1.0 } else { 0.0 })
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.n || j >= self.n {
            return None;
        }
        self.values.get(i * self.n + j).copied()
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) -> bool {
        if i >= self.n || j >= self.n {
            return false;
        }
        self.values[i * self.n + j] = value;
        true
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Row `i` as a slice, or `None` past the last row.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.n {
            return None;
        }
        let start = i * self.n;
        Some(&self.values[start..start + self.n])
    }

    #[must_use]
    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Little-endian bytes of every cell, row-major. Stable across platforms.
    #[must_use]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.values.len() * 8);
        for value in &self.values {
            out.extend_from_slice(&value.to_bits().to_le_bytes());
        }
        out
    }

    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::{MATRIX_REASON_CODES, MatrixError, SquareMatrix, element_count};
    use proptest::prelude::*;

    #[test]
    fn reason_codes_cover_every_variant() {
        let errors = [
            MatrixError::ZeroDimension,
            MatrixError::SizeOverflow { n: 3 },
            MatrixError::AllocationFailed { n: 3, elements: 9 },
            MatrixError::LengthMismatch { n: 3, len: 8 },
        ];
        let codes: Vec<&str> = errors.iter().map(MatrixError::reason_code).collect();
        assert_eq!(codes, MATRIX_REASON_CODES.to_vec());
    }

    #[test]
    fn element_count_rejects_zero_and_overflow() {
        assert_eq!(element_count(0), Err(MatrixError::ZeroDimension));
        assert_eq!(element_count(4), Ok(16));
        let err = element_count(usize::MAX).expect_err("overflow");
        assert!(matches!(err, MatrixError::SizeOverflow { .. }));
    }

    #[test]
    fn zeroed_matrix_is_fully_initialized() {
        let m = SquareMatrix::zeroed(5).expect("alloc");
        assert_eq!(m.dim(), 5);
        assert_eq!(m.len(), 25);
        assert!(m.is_all_zero());
    }

    #[test]
    fn oversized_allocation_is_an_error_not_an_abort() {
        // 2^31 squared cells of f64 cannot be reserved on any real machine.
        let err = SquareMatrix::zeroed(1 << 31).expect_err("allocation must fail");
        assert!(matches!(
            err,
            MatrixError::AllocationFailed { .. } | MatrixError::SizeOverflow { .. }
        ));
    }

    #[test]
    fn from_values_checks_length() {
        let err = SquareMatrix::from_values(2, vec![1.0, 2.0, 3.0]).expect_err("len 3");
        assert_eq!(err, MatrixError::LengthMismatch { n: 2, len: 3 });
        let m = SquareMatrix::from_values(2, vec![1.0, 2.0, 3.0, 4.0]).expect("len 4");
        assert_eq!(m.get(1, 0), Some(3.0));
        assert_eq!(m.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(m.row(2), None);
    }

    #[test]
    fn identity_has_unit_diagonal() {
        let m = SquareMatrix::identity(3).expect("identity");
        assert_eq!(m.values(), &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn set_and_get_respect_bounds() {
        let mut m = SquareMatrix::zeroed(2).expect("alloc");
        assert!(m.set(0, 1, 7.5));
        assert!(!m.set(2, 0, 1.0));
        assert_eq!(m.get(0, 1), Some(7.5));
        assert_eq!(m.get(0, 2), None);
    }

    #[test]
    fn le_bytes_encode_bit_patterns() {
        let m = SquareMatrix::from_values(1, vec![1.0]).expect("1x1");
        assert_eq!(m.to_le_bytes(), 1.0f64.to_bits().to_le_bytes().to_vec());
    }

    proptest! {
        #[test]
        fn from_fn_is_row_major(n in 1usize..12) {
            let m = SquareMatrix::from_fn(n, |i, j| (i * n + j) as f64).expect("alloc");
            for (idx, value) in m.values().iter().enumerate() {
                prop_assert_eq!(*value, idx as f64);
            }
        }
    }
}
