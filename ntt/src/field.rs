//! Modular arithmetic over Z_q with arbitrary-precision operands.
//!
//! Moduli may exceed a machine word, so every value is a [`BigUint`].
//! Operands of [`mod_add`], [`mod_sub`] and [`mod_mul`] are expected to be
//! reduced into `[0, q)` already; [`reduce`] does that for untrusted input.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

use crate::error::{NttError, Result};

/// `a mod q`
#[inline]
pub fn reduce(a: &BigUint, q: &BigUint) -> BigUint {
    a % q
}

/// Modular addition: (a + b) mod q
#[inline]
pub fn mod_add(a: &BigUint, b: &BigUint, q: &BigUint) -> BigUint {
    let sum = a + b;
    if &sum >= q {
        sum - q
    } else {
        sum
    }
}

/// Modular subtraction: (a - b) mod q, lifted into [0, q)
#[inline]
pub fn mod_sub(a: &BigUint, b: &BigUint, q: &BigUint) -> BigUint {
    if a >= b {
        a - b
    } else {
        q - b + a
    }
}

/// Modular multiplication: (a * b) mod q
#[inline]
pub fn mod_mul(a: &BigUint, b: &BigUint, q: &BigUint) -> BigUint {
    (a * b) % q
}

/// Modular exponentiation: base^exp mod q (square-and-multiply).
pub fn mod_pow(base: &BigUint, exp: u64, q: &BigUint) -> BigUint {
    base.modpow(&BigUint::from(exp), q)
}

/// Modular inverse using the extended Euclidean algorithm.
///
/// Fails with [`NttError::NoInverseExists`] when `gcd(a, q) != 1` or when
/// `q` is zero.
pub fn mod_inv(a: &BigUint, q: &BigUint) -> Result<BigUint> {
    let no_inverse = || NttError::NoInverseExists {
        value: a.clone(),
        modulus: q.clone(),
    };
    if q.is_zero() {
        return Err(no_inverse());
    }

    let m = BigInt::from(q.clone());
    let (mut old_r, mut r) = (BigInt::from(a % q), m.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    // old_r ≡ old_s · a (mod q) holds after every step
    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return Err(no_inverse());
    }

    let (_, magnitude) = (((old_s % &m) + &m) % &m).into_parts();
    Ok(magnitude)
}

/// Precompute powers of base: [base^0, base^1, ..., base^(count-1)] mod q
pub fn powers(base: &BigUint, count: usize, q: &BigUint) -> Vec<BigUint> {
    let mut out = Vec::with_capacity(count);
    let mut current = BigUint::one() % q;
    for _ in 0..count {
        let next = mod_mul(&current, base, q);
        out.push(current);
        current = next;
    }
    out
}
