#![forbid(unsafe_code)]

//! Runs every kernel over every scenario and a fixed set of dimensions.
//!
//! The reference must match itself everywhere; each candidate must be
//! caught by at least one run.

use crate::{HarnessConfig, HarnessError, RunRequest, run_and_record};
use fmm_kernels::CandidateKernel;
use fmm_scenario::Scenario;
use fmm_verdict::Tolerance;
use serde::Serialize;

pub const SWEEP_DIMENSIONS: [usize; 4] = [1, 3, 6, 16];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelSweepSummary {
    pub kernel: String,
    pub runs: usize,
    pub mismatches: usize,
    /// `scenario@N` for every mismatching run, in sweep order.
    pub detected_in: Vec<String>,
    pub max_abs_diff_seen: f64,
}

impl KernelSweepSummary {
    fn new(kernel: &str) -> Self {
        Self {
            kernel: kernel.to_string(),
            runs: 0,
            mismatches: 0,
            detected_in: Vec::new(),
            max_abs_diff_seen: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub tolerance: f64,
    pub kernels: Vec<KernelSweepSummary>,
    pub failures: Vec<String>,
}

impl SweepReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

fn sweep_kernel(
    config: &HarnessConfig,
    kernel: &CandidateKernel,
    dims: &[usize],
    tolerance: Tolerance,
) -> Result<KernelSweepSummary, HarnessError> {
    let mut summary = KernelSweepSummary::new(kernel.label);
    for &n in dims {
        for scenario in Scenario::ALL {
            let request = RunRequest::new(n, scenario, tolerance)?;
            let outcome = run_and_record(config, &request, kernel)?;
            summary.runs += 1;

            let max = outcome.divergence.max_abs_diff;
            if max.is_nan() || max > summary.max_abs_diff_seen {
                summary.max_abs_diff_seen = max;
            }
            if !outcome.verdict.is_match() {
                summary.mismatches += 1;
                summary.detected_in.push(format!("{scenario}@{n}"));
            }
        }
    }
    Ok(summary)
}

pub fn run_kernel_sweep(
    config: &HarnessConfig,
    reference: &CandidateKernel,
    candidates: &[CandidateKernel],
    dims: &[usize],
    tolerance: Tolerance,
) -> Result<SweepReport, HarnessError> {
    let mut kernels = Vec::with_capacity(candidates.len() + 1);
    let mut failures = Vec::new();

    let reference_summary = sweep_kernel(config, reference, dims, tolerance)?;
    for run in &reference_summary.detected_in {
        failures.push(format!("{}: reference mismatched at {run}", reference.label));
    }
    kernels.push(reference_summary);

    for candidate in candidates {
        let summary = sweep_kernel(config, candidate, dims, tolerance)?;
        if summary.mismatches == 0 {
            failures.push(format!("{}: candidate never detected", candidate.label));
        }
        kernels.push(summary);
    }

    Ok(SweepReport {
        tolerance: tolerance.value(),
        kernels,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::{SWEEP_DIMENSIONS, run_kernel_sweep};
    use crate::HarnessConfig;
    use fmm_kernels::{BROKEN_A, BROKEN_C, CANDIDATES, REFERENCE};
    use fmm_verdict::Tolerance;

    #[test]
    fn default_sweep_detects_every_candidate() {
        let report = run_kernel_sweep(
            &HarnessConfig::default(),
            &REFERENCE,
            &CANDIDATES,
            &SWEEP_DIMENSIONS,
            Tolerance::default(),
        )
        .expect("sweep");
        assert!(report.all_passed(), "{:?}", report.failures);
        assert_eq!(report.kernels.len(), 4);
        for summary in &report.kernels {
            assert_eq!(summary.runs, 16);
        }
        assert_eq!(report.kernels[0].mismatches, 0);
        assert_eq!(report.kernels[0].max_abs_diff_seen, 0.0);
    }

    #[test]
    fn f32_kernel_escapes_small_integer_sweep() {
        // Integer-valued scenarios at N=1 are exact even in f32; only
        // random carries fractions.
        let report = run_kernel_sweep(
            &HarnessConfig::default(),
            &REFERENCE,
            &[BROKEN_C],
            &[1],
            Tolerance::default(),
        )
        .expect("sweep");
        let summary = &report.kernels[1];
        assert!(summary.detected_in.iter().all(|run| run == "random@1"));
    }

    #[test]
    fn unwritten_output_is_caught_everywhere_with_nonzero_reference() {
        let report = run_kernel_sweep(
            &HarnessConfig::default(),
            &REFERENCE,
            &[BROKEN_A],
            &[3],
            Tolerance::default(),
        )
        .expect("sweep");
        let summary = &report.kernels[1];
        assert_eq!(summary.runs, 4);
        assert_eq!(summary.mismatches, 4);
        assert_eq!(
            summary.detected_in,
            vec!["increment@3", "identity@3", "random@3", "pattern@3"]
        );
    }

    #[test]
    fn huge_tolerance_hides_every_candidate() {
        let report = run_kernel_sweep(
            &HarnessConfig::default(),
            &REFERENCE,
            &CANDIDATES,
            &[3],
            Tolerance::new(1e300).expect("tol"),
        )
        .expect("sweep");
        assert!(!report.all_passed());
        assert_eq!(report.failures.len(), 3);
        assert!(report.failures.iter().all(|f| f.ends_with("candidate never detected")));
    }
}
