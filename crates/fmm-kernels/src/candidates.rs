#![forbid(unsafe_code)]

//! Deliberately flawed kernels used to exercise the harness.
//!
//! Each one runs to completion without panicking and produces plausible
//! looking output, which is exactly what makes them worth detecting.

use crate::CandidateKernel;

/// Accumulates every dot product but never stores it.
pub const BROKEN_A: CandidateKernel = CandidateKernel::new("broken_A", missing_write_matmul);

/// Reads the left operand transposed (`A[k][i]` instead of `A[i][k]`).
pub const BROKEN_B: CandidateKernel = CandidateKernel::new("broken_B", swapped_index_matmul);

/// Narrows operands and the running sum to `f32`.
pub const BROKEN_C: CandidateKernel = CandidateKernel::new("broken_C", f32_accumulate_matmul);

pub const CANDIDATES: [CandidateKernel; 3] = [BROKEN_A, BROKEN_B, BROKEN_C];

pub fn missing_write_matmul(a: &[f64], b: &[f64], _c: &mut [f64], n: usize) {
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0;
            for k in 0..n {
                sum += a[i * n + k] * b[k * n + j];
            }
            std::hint::black_box(sum);
        }
    }
}

pub fn swapped_index_matmul(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0;
            for k in 0..n {
                sum += a[k * n + i] * b[k * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
pub fn f32_accumulate_matmul(a: &[f64], b: &[f64], c: &mut [f64], n: usize) {
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0f32;
            for k in 0..n {
                sum += a[i * n + k] as f32 * b[k * n + j] as f32;
            }
            c[i * n + j] = f64::from(sum);
        }
    }
}
