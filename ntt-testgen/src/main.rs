//! NTT Test-Vector Generator
//!
//! Produces the parameter dump, input/output vectors and lane twiddle tables a
//! P-lane NTT implementation is verified with, and checks the implementation's
//! result files against the reference outputs.
//!
//! ## Steps
//!
//! - `--params` - derive parameters and write `PARAM.txt`
//! - `--ntt-gen` - `NTT_DIN.txt`, `NTT_DOUT.txt`, `W.txt`, `WINV.txt`
//! - `--intt-gen` - `INTT_DIN.txt`, `INTT_DOUT.txt`, `W.txt`, `WINV.txt`
//! - `--ntt-test` - compare `NTT_DOUT.txt` with `NTT_RES.txt`
//! - `--intt-test` - compare `INTT_DOUT.txt` with `INTT_RES.txt`
//!
//! Steps combine and run in the order listed. A failed comparison is logged
//! and the remaining steps still run; the exit code reports it.
//!
//! ## Usage
//!
//! ```bash
//! # 1024-point transform, 16-bit modulus, 8 lanes
//! ntt-testgen --ntt-gen -n 1024 -k 16 -p 8
//!
//! # Built-in 32-bit preset, reproducible data
//! ntt-testgen --ntt-gen --intt-gen --predefined --seed 1
//!
//! # Wide modulus: give up on the root scan after 100000 candidates
//! ntt-testgen --params -n 1024 -k 64 --max-root-candidates 100000
//!
//! # After the hardware run has written NTT_RES.txt / INTT_RES.txt
//! RUST_LOG=debug ntt-testgen --ntt-test --intt-test
//! ```

mod config;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use ntt::params::{derive, NttParameters};
use ntt::transform::bit_reverse_permute;
use ntt::twiddle::TwiddleTables;
use ntt::vectors::{self, VectorError};
use rand_chacha::ChaCha20Rng;
use tracing::{error, info, warn};

use crate::config::{Cli, GeneratorConfig};

type BoxError = Box<dyn std::error::Error>;

// ============================================================================
// Parameters
// ============================================================================

fn load_parameters(
    config: &GeneratorConfig,
    rng: &mut ChaCha20Rng,
) -> Result<NttParameters, BoxError> {
    if config.predefined {
        let params = NttParameters::predefined(config.lanes)?;
        if params.n != config.n || params.bit_length != config.bit_length {
            warn!(
                "Preset overrides N={} K={} with N={} K={}",
                config.n, config.bit_length, params.n, params.bit_length
            );
        }
        return Ok(params);
    }

    info!(
        "Searching parameters for N={} K={} P={}...",
        config.n, config.bit_length, config.lanes
    );
    let mut oracle = config.oracle(rng);
    Ok(derive(
        config.n,
        config.bit_length,
        config.lanes,
        &mut oracle,
        &config.limits(),
    )?)
}

fn log_parameters(params: &NttParameters) {
    info!("-----------------------");
    info!("N      : {}", params.n);
    info!("K      : {}", params.bit_length);
    info!("P      : {}", params.lanes);
    info!("q      : {}", params.q);
    info!("psi    : {}", params.psi);
    info!("psi_inv: {}", params.psi_inv);
    info!("w      : {}", params.w);
    info!("w_inv  : {}", params.w_inv);
    info!("n_inv  : {}", params.n_inv);
    info!("log(R) : {}", params.log_r());
    info!("-----------------------");
}

fn write_parameters(out_dir: &Path, params: &NttParameters, json: bool) -> Result<(), BoxError> {
    let file = BufWriter::new(File::create(out_dir.join(vectors::PARAM_FILE))?);
    vectors::write_parameter_dump(file, params)?;

    if json {
        let file = BufWriter::new(File::create(out_dir.join("PARAM.json"))?);
        serde_json::to_writer_pretty(file, params)?;
    }
    Ok(())
}

// ============================================================================
// Vector Generation
// ============================================================================

fn write_twiddles(out_dir: &Path, params: &NttParameters) -> Result<(), BoxError> {
    let tables = TwiddleTables::from_parameters(params)?;
    vectors::write_hex_file(out_dir.join(vectors::TWIDDLE_FILE), &tables.forward)?;
    vectors::write_hex_file(out_dir.join(vectors::TWIDDLE_INV_FILE), &tables.inverse)?;
    info!("Twiddle tables: {} entries per file", tables.len());
    Ok(())
}

/// Random input, forward transform output in bit-reversed order.
fn generate_ntt_data(
    out_dir: &Path,
    params: &NttParameters,
    rng: &mut ChaCha20Rng,
) -> Result<(), BoxError> {
    let engine = params.engine();
    let input = vectors::random_sequence(params.n, &params.q, rng);
    let output = engine.forward(&input)?;

    // Reference self check: undo the transform and compare
    let recovered = bit_reverse_permute(&engine.inverse(&bit_reverse_permute(&output)?)?)?;
    if recovered != input {
        error!("NTT/INTT round trip does not reproduce the input; check the parameters");
    }

    vectors::write_hex_file(out_dir.join(vectors::NTT_INPUT_FILE), &input)?;
    vectors::write_hex_file(out_dir.join(vectors::NTT_OUTPUT_FILE), &output)?;
    write_twiddles(out_dir, params)
}

/// Random input, inverse transform output in bit-reversed order.
fn generate_intt_data(
    out_dir: &Path,
    params: &NttParameters,
    rng: &mut ChaCha20Rng,
) -> Result<(), BoxError> {
    let input = vectors::random_sequence(params.n, &params.q, rng);
    let output = params.engine().inverse(&input)?;

    vectors::write_hex_file(out_dir.join(vectors::INTT_INPUT_FILE), &input)?;
    vectors::write_hex_file(out_dir.join(vectors::INTT_OUTPUT_FILE), &output)?;
    write_twiddles(out_dir, params)
}

// ============================================================================
// Result Checks
// ============================================================================

/// Compare expected against actual; logs the outcome and returns whether it passed.
fn check_results(label: &str, out_dir: &Path, expected: &str, actual: &str) -> bool {
    match vectors::compare_vector_files(out_dir.join(expected), out_dir.join(actual)) {
        Ok(()) => {
            info!("{} Test: PASSED", label);
            true
        }
        Err(VectorError::LengthMismatch { expected, actual }) => {
            error!(
                "Length mismatch in {} results: expected {} values, got {}",
                label, expected, actual
            );
            false
        }
        Err(VectorError::ValueMismatch {
            position,
            expected,
            actual,
        }) => {
            error!("Mismatch in {} results at position {}", label, position);
            error!("Expected: {}, Got: {}", expected, actual);
            false
        }
        Err(e) => {
            error!("{} Test: cannot read result files: {}", label, e);
            false
        }
    }
}

// ============================================================================
// Main
// ============================================================================

/// Run the requested steps in order. Returns whether every requested check passed.
fn run(cli: &Cli) -> Result<bool, BoxError> {
    let config = &cli.config;
    let out_dir = config.out_dir.as_path();
    std::fs::create_dir_all(out_dir)?;
    let mut rng = config.rng();

    if cli.needs_parameters() {
        let params = load_parameters(config, &mut rng)?;
        log_parameters(&params);
        write_parameters(out_dir, &params, config.json)?;
        if cli.params {
            info!("Parameters generated successfully");
        }

        if cli.ntt_gen {
            generate_ntt_data(out_dir, &params, &mut rng)?;
            info!("NTT data generated successfully");
        }
        if cli.intt_gen {
            generate_intt_data(out_dir, &params, &mut rng)?;
            info!("INTT data generated successfully");
        }
    }

    let mut passed = true;
    if cli.ntt_test {
        passed &= check_results(
            "NTT",
            out_dir,
            vectors::NTT_OUTPUT_FILE,
            vectors::NTT_RESULT_FILE,
        );
    }
    if cli.intt_test {
        passed &= check_results(
            "INTT",
            out_dir,
            vectors::INTT_OUTPUT_FILE,
            vectors::INTT_RESULT_FILE,
        );
    }
    Ok(passed)
}

fn main() -> Result<ExitCode, BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if !cli.has_work() {
        warn!("Nothing to do: pass --params, --ntt-gen, --intt-gen, --ntt-test or --intt-test");
        return Ok(ExitCode::SUCCESS);
    }

    Ok(if run(&cli)? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
