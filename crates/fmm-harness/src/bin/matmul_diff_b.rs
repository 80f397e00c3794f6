#![forbid(unsafe_code)]

fn main() {
    std::process::exit(fmm_harness::cli::run_main(&fmm_kernels::BROKEN_B));
}
