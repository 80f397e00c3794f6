#![forbid(unsafe_code)]

use crate::divergence::DivergenceReport;
use crate::printf::{format_exp, format_general_width};
use crate::{HarnessError, RunOutcome};
use fmm_verdict::{Tolerance, Verdict, VerdictLedger, decide_and_record, decide_verdict};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Last row index printed in full before the sample is cut short.
pub const SAMPLE_LAST_FULL_ROW: usize = 5;
/// The sample is only cut short for matrices wider than this.
pub const SAMPLE_TRUNCATE_ABOVE_N: usize = 6;

pub const RUN_REPORT_SCHEMA_VERSION: u8 = 1;

/// Classifies a divergence against the tolerance.
#[must_use]
pub fn report(divergence: &DivergenceReport, tolerance: Tolerance) -> Verdict {
    decide_verdict(divergence.max_abs_diff, tolerance)
}

/// `report`, also recording the decision in `ledger`.
pub fn report_into(
    ledger: &mut VerdictLedger,
    divergence: &DivergenceReport,
    tolerance: Tolerance,
    note: impl Into<String>,
) -> Verdict {
    decide_and_record(ledger, divergence.max_abs_diff, tolerance, note)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleEntry {
    pub i: usize,
    pub j: usize,
    pub reference: f64,
    pub candidate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticSample {
    pub entries: Vec<SampleEntry>,
    pub truncated: bool,
}

/// Row-major sample of `(reference, candidate)` pairs.
///
/// Rows are emitted whole; after row `SAMPLE_LAST_FULL_ROW` the sample
/// stops when `N > SAMPLE_TRUNCATE_ABOVE_N`. The verdict never looks at it.
#[must_use]
pub fn diagnostic_sample(divergence: &DivergenceReport) -> DiagnosticSample {
    let n = divergence.n;
    let mut entries = Vec::new();
    let mut truncated = false;
    for i in 0..n {
        for j in 0..n {
            if let Some(cell) = divergence.cell(i, j) {
                entries.push(SampleEntry {
                    i,
                    j,
                    reference: cell.reference,
                    candidate: cell.candidate,
                });
            }
        }
        if i >= SAMPLE_LAST_FULL_ROW && n > SAMPLE_TRUNCATE_ABOVE_N {
            truncated = true;
            break;
        }
    }
    DiagnosticSample { entries, truncated }
}

/// Everything printed or persisted about one finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub schema_version: u8,
    pub kernel: String,
    pub n: usize,
    pub scenario: String,
    pub tolerance: f64,
    pub max_abs_diff: f64,
    pub sum_abs_diff: f64,
    pub worst_cell: Option<(usize, usize)>,
    pub verdict: Verdict,
    pub reason_code: String,
    pub sample: DiagnosticSample,
}

impl RunReport {
    #[must_use]
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        Self {
            schema_version: RUN_REPORT_SCHEMA_VERSION,
            kernel: outcome.kernel.to_string(),
            n: outcome.request.n,
            scenario: outcome.request.scenario.as_str().to_string(),
            tolerance: outcome.request.tolerance.value(),
            max_abs_diff: outcome.divergence.max_abs_diff,
            sum_abs_diff: outcome.divergence.sum_abs_diff,
            worst_cell: outcome.divergence.worst_cell,
            verdict: outcome.verdict,
            reason_code: outcome.verdict.reason_code().to_string(),
            sample: diagnostic_sample(&outcome.divergence),
        }
    }

    /// Standard output of a run: header, aggregates, sample table, and the
    /// closing line when the outputs agree.
    #[must_use]
    pub fn render_stdout(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Matrix multiply test (impl: {}, N={}, scenario={})",
            self.kernel, self.n, self.scenario
        );
        let _ = writeln!(out, "Max abs difference: {}", format_exp(self.max_abs_diff, 6));
        let _ = writeln!(out, "Sum abs difference: {}", format_exp(self.sum_abs_diff, 6));
        let _ = writeln!(out);
        let _ = writeln!(out, "Sample entries (i,j): ref | candidate");
        for entry in &self.sample.entries {
            let _ = writeln!(
                out,
                "({:2},{:2}): {} | {}",
                entry.i,
                entry.j,
                format_general_width(entry.reference, 12, 6),
                format_general_width(entry.candidate, 12, 6)
            );
        }
        if self.sample.truncated {
            let _ = writeln!(out, "... (truncated)");
        }
        if self.verdict.is_match() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "No significant difference detected (within tolerance {}).",
                format_exp(self.tolerance, 6)
            );
        }
        out
    }

    /// Standard error diagnostic, present only for a mismatch.
    #[must_use]
    pub fn render_stderr(&self) -> Option<String> {
        match self.verdict {
            Verdict::Match => None,
            Verdict::Mismatch => Some(format!(
                "\nDETECTED: numerical mismatch (max diff {} > tol {})\n",
                format_exp(self.max_abs_diff, 6),
                format_exp(self.tolerance, 6)
            )),
        }
    }
}

pub fn write_run_report(path: &Path, report: &RunReport) -> Result<(), HarnessError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|err| HarnessError::Io(format!("failed creating {}: {err}", parent.display())))?;
    }
    let raw = serde_json::to_string_pretty(report)
        .map_err(|err| HarnessError::Io(format!("failed serializing run report: {err}")))?;
    fs::write(path, raw)
        .map_err(|err| HarnessError::Io(format!("failed writing {}: {err}", path.display())))
}
