#![forbid(unsafe_code)]

use crate::{HarnessError, RunOutcome};
use fmm_matrix::SquareMatrix;
use fmm_verdict::{VERDICT_REASON_CODES, Verdict};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// One JSONL line per completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunLogRecord {
    pub ts_unix_ms: u128,
    pub kernel: String,
    pub n: usize,
    pub scenario: String,
    pub seed: u32,
    pub tolerance: f64,
    pub input_digest: String,
    pub reference_digest: String,
    pub candidate_digest: String,
    pub max_abs_diff: f64,
    pub sum_abs_diff: f64,
    pub verdict: Verdict,
    pub reason_code: String,
    pub duration_ms: u64,
}

impl RunLogRecord {
    #[must_use]
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let ts_unix_ms = outcome.ledger.last().map_or_else(now_unix_ms, |event| event.ts_millis);
        Self {
            ts_unix_ms,
            kernel: outcome.kernel.to_string(),
            n: outcome.request.n,
            scenario: outcome.request.scenario.as_str().to_string(),
            seed: outcome.request.scenario.seed(),
            tolerance: outcome.request.tolerance.value(),
            input_digest: outcome.input_digest.clone(),
            reference_digest: outcome.reference_digest.clone(),
            candidate_digest: outcome.candidate_digest.clone(),
            max_abs_diff: outcome.divergence.max_abs_diff,
            sum_abs_diff: outcome.divergence.sum_abs_diff,
            verdict: outcome.verdict,
            reason_code: outcome.verdict.reason_code().to_string(),
            duration_ms: outcome.duration_ms,
        }
    }

    /// True when the record carries enough to replay and audit the run.
    #[must_use]
    pub fn is_replay_complete(&self) -> bool {
        if self.kernel.trim().is_empty()
            || self.scenario.trim().is_empty()
            || self.n == 0
            || !is_sha256_hex(&self.input_digest)
            || !is_sha256_hex(&self.reference_digest)
            || !is_sha256_hex(&self.candidate_digest)
        {
            return false;
        }
        VERDICT_REASON_CODES
            .iter()
            .any(|code| *code == self.reason_code)
    }
}

fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn is_sha256_hex(raw: &str) -> bool {
    raw.len() == 64 && raw.bytes().all(|b| b.is_ascii_hexdigit())
}

fn hex(digest: &[u8]) -> String {
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex(&Sha256::digest(bytes))
}

/// SHA-256 over the little-endian bit patterns of each matrix in turn.
#[must_use]
pub fn digest_matrices(matrices: &[&SquareMatrix]) -> String {
    let mut hasher = Sha256::new();
    for matrix in matrices {
        hasher.update(matrix.to_le_bytes());
    }
    hex(&hasher.finalize())
}

pub fn append_run_log(path: &Path, record: &RunLogRecord) -> Result<(), HarnessError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|err| HarnessError::Io(format!("failed creating {}: {err}", parent.display())))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| HarnessError::Io(format!("failed opening {}: {err}", path.display())))?;
    let line = serde_json::to_string(record)
        .map_err(|err| HarnessError::Io(format!("failed serializing run log record: {err}")))?;
    let mut payload = line.into_bytes();
    payload.push(b'\n');
    file.write_all(&payload).map_err(|err| {
        HarnessError::Io(format!("failed appending run log {}: {err}", path.display()))
    })
}
