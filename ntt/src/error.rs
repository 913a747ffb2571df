//! Errors raised by the transform core and the parameter search.

use num_bigint::BigUint;

/// Failure of a single core operation.
///
/// Every variant is terminal for the call that produced it. Only the modulus
/// search in [`crate::params`] retries internally, and it reports
/// [`NttError::ParameterSearchExhausted`] once its budget is spent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NttError {
    #[error("sequence length {len} is not a power of two")]
    InvalidLength { len: usize },

    #[error("{value} has no inverse modulo {modulus}")]
    NoInverseExists { value: BigUint, modulus: BigUint },

    #[error("no {bit_length}-bit prime q with q mod {two_n} == 1 after {attempts} candidates")]
    ParameterSearchExhausted {
        attempts: usize,
        bit_length: u64,
        two_n: u64,
    },

    #[error("no primitive {two_n}-th root of unity found modulo {modulus}")]
    NoPrimitiveRootFound { modulus: BigUint, two_n: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("modulus {modulus} is not congruent to 1 mod {two_n}")]
    ModulusNotNttFriendly { modulus: BigUint, two_n: u64 },

    #[error("{root} is not a primitive root of unity of the requested order modulo {modulus}")]
    NotPrimitiveRoot { root: BigUint, modulus: BigUint },
}

pub type Result<T> = std::result::Result<T, NttError>;
