#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_TOLERANCE: f64 = 1e-12;

pub const VERDICT_REASON_CODES: [&str; 2] = ["verdict_match", "verdict_mismatch"];

pub const TOLERANCE_REASON_CODES: [&str; 3] = [
    "tolerance_negative",
    "tolerance_not_a_number",
    "tolerance_malformed",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ToleranceError {
    Negative(f64),
    NotANumber,
    Malformed(String),
}

impl ToleranceError {
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Negative(_) => "tolerance_negative",
            Self::NotANumber => "tolerance_not_a_number",
            Self::Malformed(_) => "tolerance_malformed",
        }
    }
}

impl std::fmt::Display for ToleranceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negative(value) => write!(f, "tolerance {value} must be >= 0"),
            Self::NotANumber => write!(f, "tolerance must not be NaN"),
            Self::Malformed(raw) => write!(f, "tolerance '{raw}' is not a number"),
        }
    }
}

impl std::error::Error for ToleranceError {}

/// Non-negative threshold on the element-wise absolute difference.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tolerance(f64);

impl Tolerance {
    pub fn new(value: f64) -> Result<Self, ToleranceError> {
        if value.is_nan() {
            return Err(ToleranceError::NotANumber);
        }
        if value < 0.0 {
            return Err(ToleranceError::Negative(value));
        }
        Ok(Self(value))
    }

    pub fn parse(raw: &str) -> Result<Self, ToleranceError> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| ToleranceError::Malformed(raw.to_string()))?;
        Self::new(value)
    }

    /// Lenient form used at the command line: anything unusable becomes the default.
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    Mismatch,
}

impl Verdict {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Mismatch => "mismatch",
        }
    }

    #[must_use]
    pub const fn reason_code(self) -> &'static str {
        match self {
            Self::Match => "verdict_match",
            Self::Mismatch => "verdict_mismatch",
        }
    }

    /// Process exit status for a completed run.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Match => 0,
            Self::Mismatch => 2,
        }
    }

    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Match)
    }
}

/// The single pass/fail gate of a run.
///
/// A difference exactly equal to the tolerance is a match. A NaN maximum
/// never compares `<=` anything and is therefore a mismatch.
#[must_use]
pub fn decide_verdict(max_abs_diff: f64, tolerance: Tolerance) -> Verdict {
    if max_abs_diff <= tolerance.value() {
        Verdict::Match
    } else {
        Verdict::Mismatch
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictEvent {
    pub ts_millis: u128,
    pub max_abs_diff: f64,
    pub tolerance: Tolerance,
    pub verdict: Verdict,
    pub note: String,
}

#[derive(Debug, Default, Clone)]
pub struct VerdictLedger {
    events: Vec<VerdictEvent>,
}

impl VerdictLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: VerdictEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[VerdictEvent] {
        &self.events
    }

    #[must_use]
    pub fn last(&self) -> Option<&VerdictEvent> {
        self.events.last()
    }

    #[must_use]
    pub fn mismatch_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| event.verdict == Verdict::Mismatch)
            .count()
    }
}

pub fn decide_and_record(
    ledger: &mut VerdictLedger,
    max_abs_diff: f64,
    tolerance: Tolerance,
    note: impl Into<String>,
) -> Verdict {
    let verdict = decide_verdict(max_abs_diff, tolerance);
    let ts_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    ledger.record(VerdictEvent {
        ts_millis,
        max_abs_diff,
        tolerance,
        verdict,
        note: note.into(),
    });
    verdict
}
