//! Test-vector files exchanged with the hardware flow.
//!
//! Every file is plain text with one lowercase hexadecimal value per line and
//! no `0x` prefix. The parameter dump lists `N, K, P, q, psi, psi_inv, w,
//! w_inv, (n_inv·R) mod q, R` in that order, each left-justified in a
//! 20-character field.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use num_bigint::BigUint;
use rand::Rng;

use crate::params::NttParameters;

pub const PARAM_FILE: &str = "PARAM.txt";
pub const NTT_INPUT_FILE: &str = "NTT_DIN.txt";
pub const NTT_OUTPUT_FILE: &str = "NTT_DOUT.txt";
pub const NTT_RESULT_FILE: &str = "NTT_RES.txt";
pub const INTT_INPUT_FILE: &str = "INTT_DIN.txt";
pub const INTT_OUTPUT_FILE: &str = "INTT_DOUT.txt";
pub const INTT_RESULT_FILE: &str = "INTT_RES.txt";
pub const TWIDDLE_FILE: &str = "W.txt";
pub const TWIDDLE_INV_FILE: &str = "WINV.txt";

/// Width of one field in the parameter dump.
pub const PARAM_FIELD_WIDTH: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("mismatch at position {position}: expected {expected}, got {actual}")]
    ValueMismatch {
        /// 1-based line number
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("line {line}: {content:?} is not a hexadecimal value")]
    Parse { line: usize, content: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Lowercase hex without prefix.
pub fn to_hex(value: &BigUint) -> String {
    format!("{:x}", value)
}

/// Parse one hex value; surrounding whitespace is ignored.
pub fn parse_hex(text: &str) -> Option<BigUint> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    BigUint::parse_bytes(text.as_bytes(), 16)
}

pub fn write_hex_lines<W: Write>(mut writer: W, values: &[BigUint]) -> std::io::Result<()> {
    for value in values {
        writeln!(writer, "{:x}", value)?;
    }
    writer.flush()
}

/// Read one value per line, skipping blank lines.
pub fn read_hex_lines<R: BufRead>(reader: R) -> Result<Vec<BigUint>, VectorError> {
    let mut values = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value = parse_hex(&line).ok_or_else(|| VectorError::Parse {
            line: index + 1,
            content: line.clone(),
        })?;
        values.push(value);
    }
    Ok(values)
}

pub fn write_hex_file(path: impl AsRef<Path>, values: &[BigUint]) -> std::io::Result<()> {
    write_hex_lines(BufWriter::new(File::create(path)?), values)
}

pub fn read_hex_file(path: impl AsRef<Path>) -> Result<Vec<BigUint>, VectorError> {
    read_hex_lines(BufReader::new(File::open(path)?))
}

/// Write the ten-line parameter dump.
pub fn write_parameter_dump<W: Write>(
    mut writer: W,
    params: &NttParameters,
) -> std::io::Result<()> {
    let fields = [
        BigUint::from(params.n),
        BigUint::from(params.bit_length),
        BigUint::from(params.lanes),
        params.q.clone(),
        params.psi.clone(),
        params.psi_inv.clone(),
        params.w.clone(),
        params.w_inv.clone(),
        params.n_inv_montgomery(),
        params.r.clone(),
    ];
    for field in &fields {
        writeln!(writer, "{:<width$}", to_hex(field), width = PARAM_FIELD_WIDTH)?;
    }
    writer.flush()
}

/// N uniformly random field elements in [0, q).
pub fn random_sequence(n: usize, q: &BigUint, rng: &mut impl Rng) -> Vec<BigUint> {
    let byte_len = (q.bits() as usize).div_ceil(8) + 8;
    let mut bytes = vec![0u8; byte_len];
    (0..n)
        .map(|_| {
            rng.fill(&mut bytes[..]);
            BigUint::from_bytes_le(&bytes) % q
        })
        .collect()
}

/// Compare an expected and an actual vector, reporting the first difference.
pub fn compare_vectors(expected: &[BigUint], actual: &[BigUint]) -> Result<(), VectorError> {
    if expected.len() != actual.len() {
        return Err(VectorError::LengthMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    match expected.iter().zip(actual).position(|(e, a)| e != a) {
        Some(i) => Err(VectorError::ValueMismatch {
            position: i + 1,
            expected: format!("{:#x}", expected[i]),
            actual: format!("{:#x}", actual[i]),
        }),
        None => Ok(()),
    }
}

/// File variant of [`compare_vectors`].
pub fn compare_vector_files(
    expected: impl AsRef<Path>,
    actual: impl AsRef<Path>,
) -> Result<(), VectorError> {
    let expected = read_hex_file(expected)?;
    let actual = read_hex_file(actual)?;
    compare_vectors(&expected, &actual)
}
