#![forbid(unsafe_code)]

//! Positional command line shared by every `matmul_diff_*` binary.
//!
//! ```text
//! <program> [N] [scenario] [tolerance]
//! ```
//!
//! Exit status: 0 match, 2 mismatch, 1 setup error.

use crate::report::RunReport;
use crate::{DEFAULT_N, HarnessConfig, HarnessError, RunRequest, persist_outcome, run_differential};
use fmm_kernels::CandidateKernel;
use fmm_scenario::Scenario;
use fmm_verdict::{Tolerance, Verdict};
use std::io::Write;

pub const MAX_POSITIONAL_ARGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CliCommand {
    Run(RunRequest),
    Help,
}

#[must_use]
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [N] [scenario] [tolerance]\n  \
         N: matrix dimension (default 6)\n  \
         scenario: increment | identity | random | pattern (default increment)\n  \
         tolerance: max-diff tolerance (default 1e-12)\n"
    )
}

pub fn parse_dimension(raw: &str) -> Result<usize, HarnessError> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        HarnessError::InvalidArgument(format!("invalid matrix dimension '{raw}'"))
    })?;
    if value <= 0 {
        return Err(HarnessError::InvalidArgument(format!(
            "matrix dimension must be positive, got {value}"
        )));
    }
    usize::try_from(value)
        .map_err(|_| HarnessError::InvalidArgument(format!("matrix dimension {value} is too large")))
}

/// Parses the arguments that follow the program name.
pub fn parse_args(args: &[String]) -> Result<CliCommand, HarnessError> {
    if matches!(args.first().map(String::as_str), Some("-h" | "--help")) {
        return Ok(CliCommand::Help);
    }
    if args.len() > MAX_POSITIONAL_ARGS {
        return Err(HarnessError::InvalidArgument(format!(
            "expected at most {MAX_POSITIONAL_ARGS} arguments, got {}",
            args.len()
        )));
    }

    let n = match args.first() {
        Some(raw) => parse_dimension(raw)?,
        None => DEFAULT_N,
    };
    let scenario = match args.get(1) {
        Some(raw) => Scenario::from_name(raw)?,
        None => crate::DEFAULT_SCENARIO,
    };
    let tolerance = args
        .get(2)
        .map_or_else(Tolerance::default, |raw| Tolerance::parse_or_default(raw));

    Ok(CliCommand::Run(RunRequest::new(n, scenario, tolerance)?))
}

fn io_error(stream: &str, err: &std::io::Error) -> HarnessError {
    HarnessError::Io(format!("failed writing {stream}: {err}"))
}

fn execute_run<O: Write, E: Write>(
    request: &RunRequest,
    candidate: &CandidateKernel,
    config: &HarnessConfig,
    out: &mut O,
    err: &mut E,
) -> Result<Verdict, HarnessError> {
    let outcome = run_differential(request, candidate)?;
    let report = RunReport::from_outcome(&outcome);

    out.write_all(report.render_stdout().as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| io_error("stdout", &e))?;
    if let Some(diagnostic) = report.render_stderr() {
        err.write_all(diagnostic.as_bytes())
            .map_err(|e| io_error("stderr", &e))?;
    }

    persist_outcome(config, &outcome)?;
    Ok(outcome.verdict)
}

/// Runs one differential test for `candidate` and returns the exit status.
pub fn execute<O: Write, E: Write>(
    program: &str,
    args: &[String],
    candidate: &CandidateKernel,
    config: &HarnessConfig,
    out: &mut O,
    err: &mut E,
) -> i32 {
    let result = parse_args(args).and_then(|command| match command {
        CliCommand::Help => out
            .write_all(usage(program).as_bytes())
            .map(|()| None)
            .map_err(|e| io_error("stdout", &e)),
        CliCommand::Run(request) => {
            execute_run(&request, candidate, config, out, err).map(Some)
        }
    });

    match result {
        Ok(Some(verdict)) => verdict.exit_code(),
        Ok(None) => 0,
        Err(error) => {
            let _ = writeln!(err, "{error}");
            if matches!(error, HarnessError::InvalidArgument(_)) {
                let _ = err.write_all(usage(program).as_bytes());
            }
            error.exit_code()
        }
    }
}

/// Entry point for a binary linked against exactly one candidate kernel.
pub fn run_main(candidate: &CandidateKernel) -> i32 {
    let mut argv = std::env::args();
    let program = argv.next().unwrap_or_else(|| "matmul_diff".to_string());
    let args: Vec<String> = argv.collect();
    let config = HarnessConfig::from_env();

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    execute(
        &program,
        &args,
        candidate,
        &config,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}

#[cfg(test)]
mod tests {
    use super::{CliCommand, parse_args, parse_dimension, usage};
    use crate::HarnessError;
    use fmm_scenario::Scenario;
    use fmm_verdict::{DEFAULT_TOLERANCE, Tolerance};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    fn request(raw: &[&str]) -> crate::RunRequest {
        match parse_args(&args(raw)).expect("valid args") {
            CliCommand::Run(request) => request,
            CliCommand::Help => panic!("unexpected help for {raw:?}"),
        }
    }

    #[test]
    fn no_arguments_yield_defaults() {
        let req = request(&[]);
        assert_eq!(req.n, 6);
        assert_eq!(req.scenario, Scenario::Increment);
        assert_eq!(req.tolerance.value(), DEFAULT_TOLERANCE);
    }

    #[test]
    fn all_three_positionals_are_honoured() {
        let req = request(&["9", "random", "1e-6"]);
        assert_eq!(req.n, 9);
        assert_eq!(req.scenario, Scenario::Random);
        assert_eq!(req.tolerance, Tolerance::new(1e-6).expect("tol"));
    }

    #[test]
    fn bad_tolerance_silently_becomes_default() {
        assert_eq!(request(&["3", "pattern", "-1"]).tolerance.value(), DEFAULT_TOLERANCE);
        assert_eq!(request(&["3", "pattern", "loose"]).tolerance.value(), DEFAULT_TOLERANCE);
        assert_eq!(request(&["3", "pattern", "0"]).tolerance.value(), 0.0);
    }

    #[test]
    fn non_positive_or_malformed_dimension_is_rejected() {
        for raw in ["0", "-4", "six", ""] {
            let err = parse_args(&args(&[raw])).expect_err("invalid N");
            assert!(matches!(err, HarnessError::InvalidArgument(_)), "{raw}: {err:?}");
        }
        assert_eq!(parse_dimension(" 12 "), Ok(12));
    }

    #[test]
    fn unknown_scenario_is_its_own_error() {
        let err = parse_args(&args(&["4", "spiral"])).expect_err("unknown");
        assert_eq!(err, HarnessError::UnknownScenario("spiral".to_string()));
    }

    #[test]
    fn too_many_arguments_is_a_usage_error() {
        let err = parse_args(&args(&["4", "identity", "1e-9", "extra"])).expect_err("argc");
        assert!(matches!(err, HarnessError::InvalidArgument(_)));
    }

    #[test]
    fn help_flag_short_circuits() {
        assert_eq!(parse_args(&args(&["--help"])), Ok(CliCommand::Help));
        assert_eq!(parse_args(&args(&["-h", "x", "y", "z"])), Ok(CliCommand::Help));
    }

    #[test]
    fn usage_lists_every_scenario() {
        let text = usage("matmul_diff_a");
        assert!(text.starts_with("Usage: matmul_diff_a [N] [scenario] [tolerance]\n"));
        for scenario in Scenario::ALL {
            assert!(text.contains(scenario.as_str()));
        }
    }
}
