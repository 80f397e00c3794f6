#![forbid(unsafe_code)]

use fmm_harness::HarnessConfig;
use fmm_harness::sweep::{SWEEP_DIMENSIONS, SweepReport, run_kernel_sweep};
use fmm_kernels::{CANDIDATES, REFERENCE};
use fmm_verdict::Tolerance;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize)]
struct GateSummary {
    status: &'static str,
    run_log: String,
    dimensions: Vec<usize>,
    report: SweepReport,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("run_kernel_sweep failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut log_path: Option<PathBuf> = None;
    let mut tolerance = Tolerance::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--log-path" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--log-path requires a value".to_string())?;
                log_path = Some(PathBuf::from(value));
            }
            "--tolerance" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--tolerance requires a value".to_string())?;
                tolerance = Tolerance::parse(&value).map_err(|err| err.to_string())?;
            }
            "--help" | "-h" => {
                println!(
                    "Usage: cargo run -p fmm-harness --bin run_kernel_sweep -- [--log-path <path>] [--tolerance <tol>]"
                );
                return Ok(());
            }
            unknown => return Err(format!("unknown argument: {unknown}")),
        }
    }

    let ts_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis());
    let log_path = log_path.unwrap_or_else(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../artifacts/logs")
            .join(format!("kernel_sweep_{ts_millis}.jsonl"))
    });

    let cfg = HarnessConfig::default().with_run_log_path(log_path.clone());
    let report = run_kernel_sweep(&cfg, &REFERENCE, &CANDIDATES, &SWEEP_DIMENSIONS, tolerance)
        .map_err(|err| format!("{} ({err})", err.reason_code()))?;

    let status = if report.all_passed() { "pass" } else { "fail" };
    let summary = GateSummary {
        status,
        run_log: log_path.display().to_string(),
        dimensions: SWEEP_DIMENSIONS.to_vec(),
        report,
    };

    let summary_json = serde_json::to_string_pretty(&summary)
        .map_err(|err| format!("failed serializing summary: {err}"))?;
    println!("{summary_json}");

    if status == "fail" {
        std::process::exit(2);
    }
    Ok(())
}
