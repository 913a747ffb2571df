//! Iterative decimation-in-frequency NTT over Z_q.
//!
//! The forward and inverse transforms share one butterfly network. For a
//! sequence of length N = 2^v, stage `i` pairs index `s = j·2^(v-i) + k` with
//! `t = s + 2^(v-i-1)` and scales the difference by `root^(2^i·k)`:
//!
//! ```text
//! a[s] <- a[s] + a[t]
//! a[t] <- (a[s] - a[t]) · root^(2^i·k)
//! ```
//!
//! Input is taken in natural order and the result comes out in bit-reversed
//! order. [`bit_reverse_permute`] restores natural order, so
//!
//! ```text
//! bit_reverse_permute(inverse(bit_reverse_permute(forward(a)))) == a
//! ```
//!
//! The inverse transform runs the same network with `w^{-1}` and finishes by
//! scaling every element with `N^{-1} mod q`.

use num_bigint::BigUint;

use crate::error::{NttError, Result};
use crate::field::{mod_add, mod_inv, mod_mul, mod_sub, powers, reduce};

/// Transform engine bound to a modulus and a primitive N-th root of unity.
///
/// The engine holds no per-call state: each transform copies its input and
/// returns a fresh sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NttEngine {
    q: BigUint,
    w: BigUint,
    w_inv: BigUint,
}

impl NttEngine {
    /// `w` must be a primitive N-th root of unity modulo `q` for every length
    /// the engine is used with, and `w_inv` its inverse.
    pub fn new(q: BigUint, w: BigUint, w_inv: BigUint) -> Self {
        Self { q, w, w_inv }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.q
    }

    pub fn root(&self) -> &BigUint {
        &self.w
    }

    pub fn root_inv(&self) -> &BigUint {
        &self.w_inv
    }

    /// Forward NTT: natural order in, bit-reversed order out.
    pub fn forward(&self, input: &[BigUint]) -> Result<Vec<BigUint>> {
        let mut out = self.load(input)?;
        dif_network(&mut out, &self.w, &self.q);
        Ok(out)
    }

    /// Inverse NTT: the DIF network with `w^{-1}`, then scaling by `N^{-1}`.
    ///
    /// Fails with [`NttError::NoInverseExists`] if `N` is not invertible
    /// modulo `q`, which only happens for a modulus that was not derived by
    /// [`crate::params`].
    pub fn inverse(&self, input: &[BigUint]) -> Result<Vec<BigUint>> {
        let mut out = self.load(input)?;
        let n_inv = mod_inv(&BigUint::from(out.len()), &self.q)?;

        dif_network(&mut out, &self.w_inv, &self.q);

        for x in out.iter_mut() {
            *x = mod_mul(x, &n_inv, &self.q);
        }
        Ok(out)
    }

    /// Copy the input into a fresh buffer reduced into [0, q).
    fn load(&self, input: &[BigUint]) -> Result<Vec<BigUint>> {
        log2_len(input.len())?;
        Ok(input.iter().map(|x| reduce(x, &self.q)).collect())
    }
}

/// Reorder a sequence so that `out[reverse_bits(i, v)] = input[i]`.
///
/// Applying it twice returns the original order.
pub fn bit_reverse_permute<T: Clone>(input: &[T]) -> Result<Vec<T>> {
    let bits = log2_len(input.len())?;
    let mut out = input.to_vec();
    for (i, x) in input.iter().enumerate() {
        out[reverse_bits(i, bits)] = x.clone();
    }
    Ok(out)
}

/// Reverse the low `bits` bits of an index.
#[inline]
pub fn reverse_bits(mut x: usize, bits: u32) -> usize {
    let mut result = 0;
    for _ in 0..bits {
        result = (result << 1) | (x & 1);
        x >>= 1;
    }
    result
}

/// log2 of a power-of-two length.
fn log2_len(len: usize) -> Result<u32> {
    if !len.is_power_of_two() {
        return Err(NttError::InvalidLength { len });
    }
    Ok(len.trailing_zeros())
}

/// In-place DIF butterfly network. `a.len()` must be a power of two.
fn dif_network(a: &mut [BigUint], root: &BigUint, q: &BigUint) {
    let v = a.len().trailing_zeros();

    // Twiddle exponents 2^i·k never reach N/2.
    let twiddles = powers(root, a.len() / 2, q);

    for i in 0..v {
        let half = 1usize << (v - i - 1);
        let span = half << 1;
        for j in 0..(1usize << i) {
            for k in 0..half {
                let s = j * span + k;
                let t = s + half;
                let exponent = (1usize << i) * k;

                let sum = mod_add(&a[s], &a[t], q);
                let diff = mod_sub(&a[s], &a[t], q);
                a[t] = mod_mul(&diff, &twiddles[exponent], q);
                a[s] = sum;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::mod_pow;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn seq(values: &[u64]) -> Vec<BigUint> {
        values.iter().map(|&v| BigUint::from(v)).collect()
    }

    /// q = 17, psi = 2 (order 8), w = 4, w^{-1} = 13
    fn engine_17() -> NttEngine {
        NttEngine::new(BigUint::from(17u32), BigUint::from(4u32), BigUint::from(13u32))
    }

    /// Engine for length n over q = 2600685569 whose 2048-th root is 5287415.
    fn engine_large(n: u64) -> NttEngine {
        let q = BigUint::from(2600685569u64);
        let psi = mod_pow(&BigUint::from(5287415u64), 1024 / n, &q);
        let w = mod_mul(&psi, &psi, &q);
        let w_inv = mod_inv(&w, &q).unwrap();
        NttEngine::new(q, w, w_inv)
    }

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(0b000, 3), 0b000);
        assert_eq!(reverse_bits(0b001, 3), 0b100);
        assert_eq!(reverse_bits(0b010, 3), 0b010);
        assert_eq!(reverse_bits(0b011, 3), 0b110);
        assert_eq!(reverse_bits(0b100, 3), 0b001);
        assert_eq!(reverse_bits(0b101, 3), 0b101);
        assert_eq!(reverse_bits(0b110, 3), 0b011);
        assert_eq!(reverse_bits(0b111, 3), 0b111);
        assert_eq!(reverse_bits(0, 0), 0);
    }

    #[test]
    fn test_small_field_scenario() {
        let engine = engine_17();

        let a_ntt = engine.forward(&seq(&[1, 2, 3, 4])).unwrap();
        assert_eq!(a_ntt, seq(&[10, 15, 7, 6]));

        let a_rev = bit_reverse_permute(&a_ntt).unwrap();
        assert_eq!(a_rev, seq(&[10, 7, 15, 6]));

        let a_rec = engine.inverse(&a_rev).unwrap();
        assert_eq!(a_rec, seq(&[1, 3, 2, 4]));

        let a_res = bit_reverse_permute(&a_rec).unwrap();
        assert_eq!(a_res, seq(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_invalid_length() {
        let engine = engine_17();
        assert_eq!(
            engine.forward(&seq(&[1, 2, 3])),
            Err(NttError::InvalidLength { len: 3 })
        );
        assert_eq!(
            engine.inverse(&seq(&[1, 2, 3, 4, 5, 6])),
            Err(NttError::InvalidLength { len: 6 })
        );
        assert_eq!(
            bit_reverse_permute::<u32>(&[]),
            Err(NttError::InvalidLength { len: 0 })
        );
    }

    #[test]
    fn test_length_one_is_identity() {
        let engine = engine_17();
        assert_eq!(engine.forward(&seq(&[5])).unwrap(), seq(&[5]));
        assert_eq!(engine.inverse(&seq(&[5])).unwrap(), seq(&[5]));
    }

    #[test]
    fn test_input_is_reduced_and_untouched() {
        let engine = engine_17();
        let input = seq(&[18, 19, 20, 21]);
        let out = engine.forward(&input).unwrap();
        assert_eq!(out, seq(&[10, 15, 7, 6]));
        assert_eq!(input, seq(&[18, 19, 20, 21]));
    }

    #[test]
    fn test_forward_matches_naive_evaluation() {
        // out[reverse_bits(k)] = sum_j a_j · w^(j·k)
        let engine = engine_large(16);
        let q = engine.modulus().clone();
        let a: Vec<BigUint> = (1..=16u64).map(|x| BigUint::from(x * 1_000_003)).collect();

        let out = engine.forward(&a).unwrap();

        for k in 0..16u64 {
            let mut expected = BigUint::from(0u32);
            for (j, aj) in a.iter().enumerate() {
                let w_jk = mod_pow(engine.root(), j as u64 * k, &q);
                expected = mod_add(&expected, &mod_mul(aj, &w_jk, &q), &q);
            }
            assert_eq!(out[reverse_bits(k as usize, 4)], expected, "k = {}", k);
        }
    }

    #[test]
    fn test_roundtrip_random() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);

        for log_n in [1, 2, 3, 5, 8, 10] {
            let n = 1u64 << log_n;
            let engine = engine_large(n);

            let original: Vec<BigUint> = (0..n)
                .map(|_| BigUint::from(rng.random_range(0..2600685569u64)))
                .collect();

            let a_ntt = engine.forward(&original).unwrap();
            let a_rev = bit_reverse_permute(&a_ntt).unwrap();
            let a_rec = engine.inverse(&a_rev).unwrap();
            let a_res = bit_reverse_permute(&a_rec).unwrap();

            assert_eq!(a_res, original, "Failed for n={}", n);
        }
    }

    #[test]
    fn test_bit_reverse_involution() {
        for log_n in 0..8 {
            let n = 1usize << log_n;
            let original: Vec<usize> = (0..n).map(|i| i * 3 + 1).collect();
            let once = bit_reverse_permute(&original).unwrap();
            let twice = bit_reverse_permute(&once).unwrap();
            assert_eq!(twice, original, "Failed for n={}", n);
        }
    }

    #[test]
    fn test_inverse_fails_without_n_inverse() {
        // N = 4 is not invertible modulo 2
        let engine = NttEngine::new(BigUint::from(2u32), BigUint::from(1u32), BigUint::from(1u32));
        assert!(matches!(
            engine.inverse(&seq(&[1, 0, 1, 0])),
            Err(NttError::NoInverseExists { .. })
        ));
    }
}
