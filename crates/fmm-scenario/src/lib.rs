#![forbid(unsafe_code)]

use fmm_matrix::{MatrixError, SquareMatrix};

pub const LCG_MULTIPLIER: u32 = 1_103_515_245;
pub const LCG_INCREMENT: u32 = 12_345;
pub const RANDOM_SCENARIO_SEED: u32 = 123_456_789;

pub const SCENARIO_REASON_CODES: [&str; 2] = ["scenario_unknown_name", "scenario_matrix_invalid"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    Unknown(String),
    Matrix(MatrixError),
}

impl ScenarioError {
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::Unknown(_) => "scenario_unknown_name",
            Self::Matrix(_) => "scenario_matrix_invalid",
        }
    }
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "Unknown scenario '{name}'"),
            Self::Matrix(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ScenarioError {}

impl From<MatrixError> for ScenarioError {
    fn from(err: MatrixError) -> Self {
        Self::Matrix(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    Increment,
    Identity,
    Random,
    Pattern,
}

impl Scenario {
    pub const ALL: [Self; 4] = [Self::Increment, Self::Identity, Self::Random, Self::Pattern];

    pub fn from_name(name: &str) -> Result<Self, ScenarioError> {
        match name {
            "increment" => Ok(Self::Increment),
            "identity" => Ok(Self::Identity),
            "random" => Ok(Self::Random),
            "pattern" => Ok(Self::Pattern),
            other => Err(ScenarioError::Unknown(other.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::Identity => "identity",
            Self::Random => "random",
            Self::Pattern => "pattern",
        }
    }

    /// Seed of the generator stream behind this scenario; zero when none is used.
    #[must_use]
    pub const fn seed(self) -> u32 {
        match self {
            Self::Random => RANDOM_SCENARIO_SEED,
            Self::Increment | Self::Identity | Self::Pattern => 0,
        }
    }

    /// Overwrites every cell of `a` and `b`. Both must share one dimension.
    pub fn fill(self, a: &mut SquareMatrix, b: &mut SquareMatrix) -> Result<(), ScenarioError> {
        let n = a.dim();
        if b.dim() != n {
            return Err(ScenarioError::Matrix(MatrixError::LengthMismatch { n, len: b.len() }));
        }

        match self {
            Self::Increment => fill_increment(a, b, n),
            Self::Identity => fill_identity(a, b, n),
            Self::Random => fill_random(a, b, n),
            Self::Pattern => fill_pattern(a, b, n),
        }
        Ok(())
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// 32-bit linear congruential stream with wrapping arithmetic.
///
/// The arithmetic is bit-exact on every platform: `state = state * 1103515245
/// + 12345 (mod 2^32)`, and each draw keeps bits 16..31 of the new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg32 {
    state: u32,
}

impl Lcg32 {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    #[must_use]
    pub const fn state(self) -> u32 {
        self.state
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// `((state >> 16) mod modulus - offset) / divisor` on the advanced state.
    pub fn next_scaled(&mut self, modulus: i32, offset: i32, divisor: f64) -> f64 {
        let high = (self.next_u32() >> 16) as i32;
        f64::from(high % modulus - offset) / divisor
    }
}

fn fill_increment(a: &mut SquareMatrix, b: &mut SquareMatrix, n: usize) {
    let (a_vals, b_vals) = (a.values_mut(), b.values_mut());
    for i in 0..n {
        for j in 0..n {
            let idx = i * n + j;
            a_vals[idx] = (idx + 1) as f64;
            b_vals[idx] = ((i + j) % 7) as f64 - 3.0;
        }
    }
}

fn fill_identity(a: &mut SquareMatrix, b: &mut SquareMatrix, n: usize) {
    let (a_vals, b_vals) = (a.values_mut(), b.values_mut());
    for i in 0..n {
        for j in 0..n {
            let value = if i == j { 1.0 } else { 0.0 };
            a_vals[i * n + j] = value;
            b_vals[i * n + j] = value;
        }
    }
}

fn fill_random(a: &mut SquareMatrix, b: &mut SquareMatrix, n: usize) {
    let mut rng = Lcg32::new(RANDOM_SCENARIO_SEED);
    let (a_vals, b_vals) = (a.values_mut(), b.values_mut());
    // One draw for A then one for B per cell; the interleaving is part of the stream contract.
    for idx in 0..n * n {
        a_vals[idx] = rng.next_scaled(97, 48, 3.0);
        b_vals[idx] = rng.next_scaled(61, 30, 4.0);
    }
}

fn fill_pattern(a: &mut SquareMatrix, b: &mut SquareMatrix, n: usize) {
    let (a_vals, b_vals) = (a.values_mut(), b.values_mut());
    for i in 0..n {
        for j in 0..n {
            a_vals[i * n + j] = (i + 1) as f64;
            b_vals[i * n + j] = (j + 2) as f64;
        }
    }
}

/// Freshly allocated, fully populated input pair for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioInputs {
    pub scenario: Scenario,
    pub a: SquareMatrix,
    pub b: SquareMatrix,
}

/// Resolves `name` and builds its `(A, B)` pair for dimension `n`.
///
/// `n` is expected to have been validated by the caller; a zero `n` still
/// surfaces as a matrix error rather than a panic.
pub fn generate(name: &str, n: usize) -> Result<ScenarioInputs, ScenarioError> {
    let scenario = Scenario::from_name(name)?;
    generate_scenario(scenario, n)
}

pub fn generate_scenario(scenario: Scenario, n: usize) -> Result<ScenarioInputs, ScenarioError> {
    let mut a = SquareMatrix::zeroed(n)?;
    let mut b = SquareMatrix::zeroed(n)?;
    scenario.fill(&mut a, &mut b)?;
    Ok(ScenarioInputs { scenario, a, b })
}
