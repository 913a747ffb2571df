//! Prime candidates and probabilistic primality testing.
//!
//! Parameter derivation only talks to the [`PrimeOracle`] trait. The bundled
//! [`MillerRabinOracle`] draws random odd candidates of an exact bit length,
//! filters them by trial division against the odd primes below 1000 and then
//! runs a configurable number of Miller-Rabin rounds with random bases.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Source of prime candidates consumed by [`crate::params::derive`].
pub trait PrimeOracle {
    /// An odd integer in `[2^(bit_length-1), 2^bit_length)`.
    fn candidate(&mut self, bit_length: u64) -> BigUint;

    /// Probabilistic primality test; false positives are bounded by the
    /// oracle's own security parameter.
    fn is_probable_prime(&mut self, n: &BigUint) -> bool;
}

/// Miller-Rabin rounds used unless configured otherwise (error < 2^-22 per
/// composite in the worst case, far lower for random candidates).
pub const DEFAULT_ROUNDS: usize = 11;

const LOW_PRIMES: [u32; 167] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307,
    311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421,
    431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509, 521, 523, 541, 547,
    557, 563, 569, 571, 577, 587, 593, 599, 601, 607, 613, 617, 619, 631, 641, 643, 647, 653, 659,
    661, 673, 677, 683, 691, 701, 709, 719, 727, 733, 739, 743, 751, 757, 761, 769, 773, 787, 797,
    809, 811, 821, 823, 827, 829, 839, 853, 857, 859, 863, 877, 881, 883, 887, 907, 911, 919, 929,
    937, 941, 947, 953, 967, 971, 977, 983, 991, 997,
];

/// Random-candidate prime oracle backed by the Miller-Rabin test.
#[derive(Clone, Debug)]
pub struct MillerRabinOracle<R> {
    rng: R,
    rounds: usize,
}

impl MillerRabinOracle<ChaCha20Rng> {
    /// Reproducible oracle: the same seed yields the same candidate stream.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }

    /// Oracle seeded from the thread-local generator.
    pub fn from_thread_rng() -> Self {
        Self::new(ChaCha20Rng::from_rng(&mut rand::rng()))
    }
}

impl<R: Rng> MillerRabinOracle<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            rounds: DEFAULT_ROUNDS,
        }
    }

    /// Set the number of Miller-Rabin rounds (at least one round always runs).
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds.max(1);
        self
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Random value in `[0, bound)`. Oversamples by 64 bits so the modulo
    /// bias is negligible.
    fn random_below(&mut self, bound: &BigUint) -> BigUint {
        let byte_len = (bound.bits() as usize).div_ceil(8) + 8;
        let mut bytes = vec![0u8; byte_len];
        self.rng.fill(&mut bytes[..]);
        BigUint::from_bytes_le(&bytes) % bound
    }

    fn miller_rabin(&mut self, n: &BigUint) -> bool {
        // n - 1 = d · 2^s with d odd
        let n_minus_one = n - 1u32;
        let s = n_minus_one.trailing_zeros().unwrap_or(0);
        let d = &n_minus_one >> s;
        let witness_range = n - 3u32;

        'witness: for _ in 0..self.rounds {
            let a = self.random_below(&witness_range) + 2u32;
            let mut x = a.modpow(&d, n);
            if x.is_one() || x == n_minus_one {
                continue;
            }
            for _ in 1..s {
                x = (&x * &x) % n;
                if x == n_minus_one {
                    continue 'witness;
                }
            }
            return false;
        }
        true
    }
}

impl<R: Rng> PrimeOracle for MillerRabinOracle<R> {
    /// Bit lengths below 2 are raised to 2.
    fn candidate(&mut self, bit_length: u64) -> BigUint {
        let bit_length = bit_length.max(2);
        let byte_len = bit_length.div_ceil(8) as usize;
        let mut bytes = vec![0u8; byte_len];
        self.rng.fill(&mut bytes[..]);

        let mask = (BigUint::one() << bit_length) - 1u32;
        let top = BigUint::one() << (bit_length - 1);
        (BigUint::from_bytes_le(&bytes) & mask) | top | BigUint::one()
    }

    fn is_probable_prime(&mut self, n: &BigUint) -> bool {
        if *n <= BigUint::one() {
            return false;
        }
        if *n <= BigUint::from(3u32) {
            return true;
        }
        if (n % 2u32).is_zero() {
            return false;
        }

        for p in LOW_PRIMES {
            if *n == BigUint::from(p) {
                return true;
            }
            if (n % p).is_zero() {
                return false;
            }
        }

        self.miller_rabin(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_small_values() {
        let mut oracle = MillerRabinOracle::from_seed(1);
        assert!(!oracle.is_probable_prime(&big(0)));
        assert!(!oracle.is_probable_prime(&big(1)));
        assert!(oracle.is_probable_prime(&big(2)));
        assert!(oracle.is_probable_prime(&big(3)));
        assert!(!oracle.is_probable_prime(&big(4)));
        assert!(oracle.is_probable_prime(&big(17)));
        assert!(oracle.is_probable_prime(&big(997)));
        assert!(!oracle.is_probable_prime(&big(561)));
        assert!(!oracle.is_probable_prime(&big(1009 * 1013)));
    }

    #[test]
    fn test_known_primes() {
        let mut oracle = MillerRabinOracle::from_seed(2);
        for p in [1009u64, 12289, 40961, 2013265921, 2600685569] {
            assert!(oracle.is_probable_prime(&big(p)), "{} is prime", p);
        }
        let mersenne_127 = (BigUint::one() << 127u32) - 1u32;
        assert!(oracle.is_probable_prime(&mersenne_127));
    }

    #[test]
    fn test_rejects_carmichael_with_large_factors() {
        // 1171 · 2341 · 3511, no factor below 1000
        let mut oracle = MillerRabinOracle::from_seed(3);
        assert!(!oracle.is_probable_prime(&big(9624742921)));
    }

    #[test]
    fn test_candidate_bit_length_and_parity() {
        let mut oracle = MillerRabinOracle::from_seed(4);
        for bits in [2u64, 3, 8, 16, 32, 61, 64, 65, 130] {
            for _ in 0..20 {
                let c = oracle.candidate(bits);
                assert_eq!(c.bits(), bits, "bit length for {}", bits);
                assert_eq!(&c % 2u32, BigUint::one(), "odd for {}", bits);
            }
        }
    }

    #[test]
    fn test_seeded_oracles_agree() {
        let mut a = MillerRabinOracle::from_seed(99);
        let mut b = MillerRabinOracle::from_seed(99);
        for _ in 0..10 {
            assert_eq!(a.candidate(40), b.candidate(40));
        }
    }

    #[test]
    fn test_rounds_floor() {
        assert_eq!(MillerRabinOracle::from_seed(0).rounds(), DEFAULT_ROUNDS);
        assert_eq!(MillerRabinOracle::from_seed(0).with_rounds(0).rounds(), 1);
    }
}
