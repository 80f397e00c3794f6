#![forbid(unsafe_code)]

pub mod cli;
pub mod divergence;
pub mod printf;
pub mod report;
pub mod run_log;
pub mod sweep;

use crate::divergence::{DivergenceReport, compare};
use crate::run_log::{RunLogRecord, append_run_log, digest_matrices};
use fmm_kernels::{CandidateKernel, KernelError, REFERENCE};
use fmm_matrix::{MatrixError, SquareMatrix};
use fmm_scenario::{Scenario, ScenarioError};
use fmm_verdict::{Tolerance, Verdict, VerdictLedger};
use std::path::PathBuf;
use std::time::Instant;

pub const DEFAULT_N: usize = 6;
pub const DEFAULT_SCENARIO: Scenario = Scenario::Increment;

pub const RUN_LOG_PATH_ENV: &str = "FMM_RUN_LOG_PATH";
pub const REPORT_PATH_ENV: &str = "FMM_REPORT_PATH";

pub const HARNESS_REASON_CODES: [&str; 4] = [
    "harness_invalid_argument",
    "harness_unknown_scenario",
    "harness_allocation_failed",
    "harness_io_failed",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    InvalidArgument(String),
    UnknownScenario(String),
    Allocation(MatrixError),
    Io(String),
}

impl HarnessError {
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "harness_invalid_argument",
            Self::UnknownScenario(_) => "harness_unknown_scenario",
            Self::Allocation(_) => "harness_allocation_failed",
            Self::Io(_) => "harness_io_failed",
        }
    }

    /// Every setup error ends the process with status 1.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "{msg}"),
            Self::UnknownScenario(name) => write!(f, "Unknown scenario '{name}'"),
            Self::Allocation(err) => write!(f, "{err}"),
            Self::Io(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for HarnessError {}

impl From<MatrixError> for HarnessError {
    fn from(err: MatrixError) -> Self {
        match err {
            MatrixError::ZeroDimension => {
                Self::InvalidArgument("matrix dimension must be positive".to_string())
            }
            other => Self::Allocation(other),
        }
    }
}

impl From<ScenarioError> for HarnessError {
    fn from(err: ScenarioError) -> Self {
        match err {
            ScenarioError::Unknown(name) => Self::UnknownScenario(name),
            ScenarioError::Matrix(inner) => inner.into(),
        }
    }
}

impl From<KernelError> for HarnessError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::Matrix(inner) => inner.into(),
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}

/// Ambient settings that do not come from the positional command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    pub run_log_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

impl HarnessConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            run_log_path: non_empty_env_path(RUN_LOG_PATH_ENV),
            report_path: non_empty_env_path(REPORT_PATH_ENV),
        }
    }

    #[must_use]
    pub fn with_run_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.run_log_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }
}

fn non_empty_env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Everything that determines one run besides the kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunRequest {
    pub n: usize,
    pub scenario: Scenario,
    pub tolerance: Tolerance,
}

impl RunRequest {
    pub fn new(n: usize, scenario: Scenario, tolerance: Tolerance) -> Result<Self, HarnessError> {
        if n == 0 {
            return Err(HarnessError::InvalidArgument(
                "matrix dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            n,
            scenario,
            tolerance,
        })
    }
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            n: DEFAULT_N,
            scenario: DEFAULT_SCENARIO,
            tolerance: Tolerance::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub kernel: &'static str,
    pub request: RunRequest,
    pub divergence: DivergenceReport,
    pub verdict: Verdict,
    pub ledger: VerdictLedger,
    pub input_digest: String,
    pub reference_digest: String,
    pub candidate_digest: String,
    pub duration_ms: u64,
}

/// One differential run: generate, multiply twice, compare, classify.
///
/// All four buffers are allocated zero-filled before any of them is
/// written, so an allocation failure aborts before computation starts.
/// The buffers are dropped when this returns; only the divergence report
/// and digests survive.
pub fn run_differential(
    request: &RunRequest,
    candidate: &CandidateKernel,
) -> Result<RunOutcome, HarnessError> {
    let start = Instant::now();
    let n = request.n;

    let mut a = SquareMatrix::zeroed(n)?;
    let mut b = SquareMatrix::zeroed(n)?;
    let mut c_test = SquareMatrix::zeroed(n)?;
    let mut c_ref = SquareMatrix::zeroed(n)?;

    request.scenario.fill(&mut a, &mut b)?;

    candidate.run(&a, &b, &mut c_test)?;
    REFERENCE.run(&a, &b, &mut c_ref)?;

    let divergence = compare(&c_ref, &c_test)?;

    let mut ledger = VerdictLedger::new();
    let note = format!(
        "{}/{}/n={}",
        candidate.label,
        request.scenario.as_str(),
        request.n
    );
    let verdict = report::report_into(&mut ledger, &divergence, request.tolerance, note);

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    Ok(RunOutcome {
        kernel: candidate.label,
        request: *request,
        input_digest: digest_matrices(&[&a, &b]),
        reference_digest: digest_matrices(&[&c_ref]),
        candidate_digest: digest_matrices(&[&c_test]),
        divergence,
        verdict,
        ledger,
        duration_ms,
    })
}

/// Persists the configured side artifacts (JSONL run log, JSON report) of a finished run.
pub fn persist_outcome(config: &HarnessConfig, outcome: &RunOutcome) -> Result<(), HarnessError> {
    if let Some(path) = &config.run_log_path {
        append_run_log(path, &RunLogRecord::from_outcome(outcome))?;
    }
    if let Some(path) = &config.report_path {
        report::write_run_report(path, &report::RunReport::from_outcome(outcome))?;
    }
    Ok(())
}

/// `run_differential` followed by `persist_outcome`.
pub fn run_and_record(
    config: &HarnessConfig,
    request: &RunRequest,
    candidate: &CandidateKernel,
) -> Result<RunOutcome, HarnessError> {
    let outcome = run_differential(request, candidate)?;
    persist_outcome(config, &outcome)?;
    Ok(outcome)
}
