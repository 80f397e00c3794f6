use fmm_harness::{RunRequest, run_differential};
use fmm_kernels::{BROKEN_A, BROKEN_B, BROKEN_C, CANDIDATES, REFERENCE, multiply};
use fmm_matrix::SquareMatrix;
use fmm_scenario::{Scenario, generate_scenario};
use fmm_verdict::{Tolerance, Verdict};

fn request(n: usize, scenario: Scenario) -> RunRequest {
    RunRequest::new(n, scenario, Tolerance::default()).expect("valid request")
}

#[test]
fn pattern_reference_corner_is_row_times_column_sum() {
    let inputs = generate_scenario(Scenario::Pattern, 3).expect("inputs");
    let c = multiply(&inputs.a, &inputs.b).expect("multiply");
    // A[0,k] = 1 and B[k,0] = 2 for every k.
    assert_eq!(c.get(0, 0), Some(6.0));
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(c.get(i, j), Some(3.0 * (i + 1) as f64 * (j + 2) as f64));
        }
    }

    let outcome = run_differential(&request(3, Scenario::Pattern), &REFERENCE).expect("run");
    assert_eq!(outcome.verdict, Verdict::Match);
    let corner = outcome.divergence.cell(0, 0).expect("corner");
    assert_eq!(corner.reference, 6.0);
}

#[test]
fn identity_exposes_unwritten_output() {
    let inputs = generate_scenario(Scenario::Identity, 4).expect("inputs");
    let c = multiply(&inputs.a, &inputs.b).expect("multiply");
    assert_eq!(c, SquareMatrix::identity(4).expect("identity"));

    let outcome = run_differential(&request(4, Scenario::Identity), &BROKEN_A).expect("run");
    assert_eq!(outcome.verdict, Verdict::Mismatch);
    assert_eq!(outcome.divergence.max_abs_diff, 1.0);
    assert_eq!(outcome.divergence.sum_abs_diff, 4.0);
    assert_eq!(outcome.verdict.exit_code(), 2);
}

#[test]
fn f32_accumulation_passes_small_integers_and_fails_random() {
    let exact = run_differential(&request(5, Scenario::Increment), &BROKEN_C).expect("increment");
    assert_eq!(exact.verdict, Verdict::Match);
    assert_eq!(exact.divergence.max_abs_diff, 0.0);

    let lossy = run_differential(&request(16, Scenario::Random), &BROKEN_C).expect("random");
    assert_eq!(lossy.verdict, Verdict::Mismatch);
    assert!(lossy.divergence.max_abs_diff > 0.0);
    assert!(lossy.divergence.max_abs_diff < 1e-2);
}

#[test]
fn loose_tolerance_turns_f32_error_into_a_match() {
    let strict = run_differential(&request(16, Scenario::Random), &BROKEN_C).expect("strict");
    let loose_tol = Tolerance::new(strict.divergence.max_abs_diff).expect("tol");
    let loose = run_differential(
        &RunRequest::new(16, Scenario::Random, loose_tol).expect("req"),
        &BROKEN_C,
    )
    .expect("loose");
    assert_eq!(loose.verdict, Verdict::Match);
    assert_eq!(loose.divergence, strict.divergence);
}

#[test]
fn single_cell_matrices_work_for_every_scenario() {
    for scenario in Scenario::ALL {
        let outcome = run_differential(&request(1, scenario), &REFERENCE).expect("run");
        assert_eq!(outcome.verdict, Verdict::Match, "{scenario}");
        assert_eq!(outcome.divergence.cells.len(), 1);

        // A transposed read of a 1x1 matrix is the same read.
        let swapped = run_differential(&request(1, scenario), &BROKEN_B).expect("run");
        assert_eq!(swapped.verdict, Verdict::Match, "{scenario}");
    }
}

#[test]
fn every_candidate_is_caught_by_some_scenario_at_n6() {
    for candidate in CANDIDATES {
        let caught = Scenario::ALL.iter().any(|&scenario| {
            run_differential(&request(6, scenario), &candidate)
                .map(|outcome| outcome.verdict == Verdict::Mismatch)
                .unwrap_or(false)
        });
        assert!(caught, "{} escaped every scenario", candidate.label);
    }
}

#[test]
fn random_inputs_are_reproducible_across_runs() {
    let first = run_differential(&request(12, Scenario::Random), &REFERENCE).expect("first");
    let second = run_differential(&request(12, Scenario::Random), &REFERENCE).expect("second");
    assert_eq!(first.input_digest, second.input_digest);
    assert_eq!(first.reference_digest, second.reference_digest);

    let other = run_differential(&request(12, Scenario::Increment), &REFERENCE).expect("other");
    assert_ne!(first.input_digest, other.input_digest);
}
