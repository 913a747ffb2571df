//! Field and transform parameters for an N-point NTT on P lanes.
//!
//! Derivation follows a fixed recipe:
//!
//! 1. draw K-bit prime candidates until one satisfies `q ≡ 1 (mod 2N)`,
//!    which guarantees a primitive 2N-th root of unity exists;
//! 2. scan `2, 3, ...` for the first element of order exactly 2N (`psi`);
//! 3. derive `psi^{-1}`, `w = psi^2`, `w^{-1}` and `N^{-1}`;
//! 4. size the Montgomery constant `R = 2^(b·ceil(K/b))` with `b = log2(N)+1`.
//!
//! The resulting [`NttParameters`] never change after construction.

use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{NttError, Result};
use crate::field::{mod_inv, mod_mul, mod_pow};
use crate::prime::PrimeOracle;
use crate::transform::NttEngine;

/// Upper bounds on the two search loops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Prime candidates drawn from the oracle before giving up.
    pub max_modulus_candidates: usize,
    /// Root candidates scanned before giving up; `None` scans up to `q - 1`.
    pub max_root_candidates: Option<u64>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_modulus_candidates: 1_000_000,
            max_root_candidates: None,
        }
    }
}

/// A known-good (q, psi) pair for an N-point transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preset {
    pub n: usize,
    pub bit_length: u64,
    pub q: u64,
    pub psi: u64,
}

/// N = 1024 over the 32-bit prime q = 2600685569 = 1269866 · 2048 + 1.
pub const DEFAULT_PRESET: Preset = Preset {
    n: 1024,
    bit_length: 32,
    q: 2600685569,
    psi: 5287415,
};

/// Everything a P-lane NTT implementation needs to be configured and checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NttParameters {
    /// Transform size N (power of two)
    pub n: usize,
    /// Bit length K of the modulus
    pub bit_length: u64,
    /// Number of parallel lanes P
    pub lanes: usize,
    /// Prime modulus, q ≡ 1 (mod 2N)
    pub q: BigUint,
    /// Primitive 2N-th root of unity
    pub psi: BigUint,
    pub psi_inv: BigUint,
    /// w = psi², primitive N-th root of unity
    pub w: BigUint,
    pub w_inv: BigUint,
    /// N^{-1} mod q
    pub n_inv: BigUint,
    /// Montgomery constant R = 2^(b·ceil(K/b)), b = log2(N)+1
    pub r: BigUint,
}

impl NttParameters {
    /// Parameters from [`DEFAULT_PRESET`] for the given lane count.
    pub fn predefined(lanes: usize) -> Result<Self> {
        Self::from_preset(&DEFAULT_PRESET, lanes)
    }

    pub fn from_preset(preset: &Preset, lanes: usize) -> Result<Self> {
        Self::from_modulus_and_root(
            preset.n,
            preset.bit_length,
            lanes,
            BigUint::from(preset.q),
            BigUint::from(preset.psi),
        )
    }

    /// Build parameters around a known modulus and 2N-th root.
    ///
    /// Both are checked: `q mod 2N` must be 1 and `psi` must have order
    /// exactly 2N.
    pub fn from_modulus_and_root(
        n: usize,
        bit_length: u64,
        lanes: usize,
        q: BigUint,
        psi: BigUint,
    ) -> Result<Self> {
        check_shape(n, lanes)?;
        let two_n = 2 * n as u64;

        if !(&q % two_n).is_one() {
            return Err(NttError::ModulusNotNttFriendly { modulus: q, two_n });
        }
        let psi = &psi % &q;
        if !is_primitive_root(&psi, n, &q) {
            return Err(NttError::NotPrimitiveRoot { root: psi, modulus: q });
        }

        Self::complete(n, bit_length, lanes, q, psi)
    }

    /// Steps 3 and 4: everything that follows from (q, psi).
    fn complete(n: usize, bit_length: u64, lanes: usize, q: BigUint, psi: BigUint) -> Result<Self> {
        let psi_inv = mod_inv(&psi, &q)?;
        let w = mod_mul(&psi, &psi, &q);
        let w_inv = mod_inv(&w, &q)?;
        let n_inv = mod_inv(&BigUint::from(n), &q)?;
        let r = montgomery_constant(n, bit_length);

        Ok(Self {
            n,
            bit_length,
            lanes,
            q,
            psi,
            psi_inv,
            w,
            w_inv,
            n_inv,
            r,
        })
    }

    /// Number of butterfly stages, log2(N).
    pub fn log_n(&self) -> u32 {
        self.n.trailing_zeros()
    }

    /// log2(R)
    pub fn log_r(&self) -> u64 {
        montgomery_exponent(self.n, self.bit_length)
    }

    /// N^{-1} in Montgomery form: (N^{-1} · R) mod q.
    pub fn n_inv_montgomery(&self) -> BigUint {
        mod_mul(&self.n_inv, &(&self.r % &self.q), &self.q)
    }

    /// Transform engine over (q, w, w^{-1}).
    pub fn engine(&self) -> NttEngine {
        NttEngine::new(self.q.clone(), self.w.clone(), self.w_inv.clone())
    }
}

/// Derive a fresh parameter set for an N-point transform with a K-bit
/// modulus on P lanes.
pub fn derive(
    n: usize,
    bit_length: u64,
    lanes: usize,
    oracle: &mut impl PrimeOracle,
    limits: &SearchLimits,
) -> Result<NttParameters> {
    check_config(n, bit_length, lanes)?;

    let q = find_modulus(n, bit_length, oracle, limits.max_modulus_candidates)?;
    let psi = find_primitive_root(n, &q, limits.max_root_candidates)?;
    let params = NttParameters::complete(n, bit_length, lanes, q, psi)?;

    info!(
        n,
        bit_length,
        lanes,
        q = %params.q,
        psi = %params.psi,
        "derived NTT parameters"
    );
    Ok(params)
}

/// Montgomery constant R = 2^(b·ceil(K/b)) with b = log2(N)+1.
pub fn montgomery_constant(n: usize, bit_length: u64) -> BigUint {
    BigUint::one() << montgomery_exponent(n, bit_length)
}

fn montgomery_exponent(n: usize, bit_length: u64) -> u64 {
    let b = u64::from(n.trailing_zeros()) + 1;
    b * bit_length.div_ceil(b)
}

/// Draw K-bit candidates until one is a probable prime with q mod 2N == 1.
fn find_modulus(
    n: usize,
    bit_length: u64,
    oracle: &mut impl PrimeOracle,
    max_candidates: usize,
) -> Result<BigUint> {
    let two_n = 2 * n as u64;

    for attempt in 1..=max_candidates {
        let q = oracle.candidate(bit_length);
        // cheap congruence check before the primality test
        if !(&q % two_n).is_one() {
            continue;
        }
        if oracle.is_probable_prime(&q) {
            debug!(attempt, q = %q, "accepted modulus");
            return Ok(q);
        }
    }

    Err(NttError::ParameterSearchExhausted {
        attempts: max_candidates,
        bit_length,
        two_n,
    })
}

/// First `i` in `[2, q-1)` of multiplicative order exactly 2N.
///
/// Scanning stops early after `max_candidates` values when a cap is given.
pub fn find_primitive_root(n: usize, q: &BigUint, max_candidates: Option<u64>) -> Result<BigUint> {
    let two_n = 2 * n as u64;
    let upper = if *q > BigUint::one() {
        q - 1u32
    } else {
        BigUint::one()
    };

    let mut candidate = BigUint::from(2u32);
    let mut scanned = 0u64;
    while candidate < upper {
        if max_candidates.is_some_and(|cap| scanned >= cap) {
            break;
        }
        if is_primitive_root(&candidate, n, q) {
            debug!(scanned, psi = %candidate, "found primitive root");
            return Ok(candidate);
        }
        candidate += 1u32;
        scanned += 1;
    }

    Err(NttError::NoPrimitiveRootFound {
        modulus: q.clone(),
        two_n,
    })
}

/// True when `candidate` has multiplicative order exactly 2N modulo `q`.
///
/// Checks `c^(2N) = 1`, `c^N = q - 1`, and that no power `c^x` with
/// `1 <= x < 2N` equals 1.
pub fn is_primitive_root(candidate: &BigUint, n: usize, q: &BigUint) -> bool {
    if *q <= BigUint::one() {
        return false;
    }
    let q_minus_one = q - 1u32;

    let pow_n = mod_pow(candidate, n as u64, q);
    let pow_2n = mod_mul(&pow_n, &pow_n, q);
    if !pow_2n.is_one() || pow_n != q_minus_one {
        return false;
    }

    let mut power = BigUint::one();
    for _ in 1..2 * n {
        power = mod_mul(&power, candidate, q);
        if power.is_one() {
            return false;
        }
    }
    true
}

fn check_shape(n: usize, lanes: usize) -> Result<()> {
    if n < 2 || !n.is_power_of_two() {
        return Err(NttError::InvalidConfig(format!(
            "transform size {} must be a power of two >= 2",
            n
        )));
    }
    if lanes == 0 {
        return Err(NttError::InvalidConfig("lane count must be at least 1".into()));
    }
    Ok(())
}

fn check_config(n: usize, bit_length: u64, lanes: usize) -> Result<()> {
    check_shape(n, lanes)?;
    // A K-bit q ≡ 1 (mod 2N) exists only when 2N <= 2^(K-1).
    if bit_length < u64::from(n.trailing_zeros()) + 2 {
        return Err(NttError::InvalidConfig(format!(
            "no {}-bit modulus can be 1 mod {}",
            bit_length,
            2 * n
        )));
    }
    Ok(())
}
