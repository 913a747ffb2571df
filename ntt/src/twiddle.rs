//! Per-stage, per-lane twiddle tables for a P-lane NTT pipeline.
//!
//! The pipeline consumes one twiddle per lane per cycle. For stage `j`, group
//! `k` and lane `i` it needs `w^e` with
//!
//! ```text
//! e = ((P << j)·k + (i << j)) mod (N/2),   k in [0, max(1, N/(P·2^j)))
//! ```
//!
//! Entries are emitted stage-major, then group, then lane, and stored in
//! Montgomery form (`w^e · R mod q`). The order is part of the hardware
//! contract; reordering breaks compatibility even though the set of values
//! stays the same.

use num_bigint::BigUint;

use crate::error::{NttError, Result};
use crate::field::{mod_mul, powers};
use crate::params::NttParameters;

/// Position of one twiddle in the lane schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TwiddleIndex {
    pub stage: u32,
    pub group: usize,
    pub lane: usize,
    /// Power of the root consumed at this position, in `[0, N/2)`.
    pub exponent: usize,
}

/// Number of groups the lanes step through in `stage`: max(1, N/(P·2^stage)).
pub fn groups_in_stage(n: usize, lanes: usize, stage: u32) -> usize {
    lanes
        .checked_mul(1usize << stage)
        .and_then(|per_group| n.checked_div(per_group))
        .unwrap_or(0)
        .max(1)
}

/// Lazy (stage, group, lane) enumeration for an N-point transform on P lanes.
///
/// Yields nothing unless `n` is a power of two; `n = 1` has no stages.
pub fn schedule(n: usize, lanes: usize) -> impl Iterator<Item = TwiddleIndex> {
    let stages = if n.is_power_of_two() { n.trailing_zeros() } else { 0 };
    let half = n / 2;

    (0..stages).flat_map(move |stage| {
        (0..groups_in_stage(n, lanes, stage)).flat_map(move |group| {
            (0..lanes).map(move |lane| TwiddleIndex {
                stage,
                group,
                lane,
                exponent: ((lanes << stage) * group + (lane << stage)) % half,
            })
        })
    })
}

/// Number of entries [`schedule`] yields, i.e. the length of each table.
pub fn schedule_len(n: usize, lanes: usize) -> usize {
    if !n.is_power_of_two() {
        return 0;
    }
    (0..n.trailing_zeros())
        .map(|stage| groups_in_stage(n, lanes, stage) * lanes)
        .sum()
}

/// Forward (`w`) and inverse (`w^{-1}`) twiddle tables in schedule order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TwiddleTables {
    pub forward: Vec<BigUint>,
    pub inverse: Vec<BigUint>,
}

impl TwiddleTables {
    pub fn from_parameters(params: &NttParameters) -> Result<Self> {
        generate(params.n, &params.q, &params.w, &params.w_inv, &params.r, params.lanes)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Build both twiddle tables for an N-point transform on `lanes` lanes.
pub fn generate(
    n: usize,
    q: &BigUint,
    w: &BigUint,
    w_inv: &BigUint,
    r: &BigUint,
    lanes: usize,
) -> Result<TwiddleTables> {
    if n < 2 || !n.is_power_of_two() {
        return Err(NttError::InvalidConfig(format!(
            "transform size {} must be a power of two >= 2",
            n
        )));
    }
    if lanes == 0 {
        return Err(NttError::InvalidConfig("lane count must be at least 1".into()));
    }

    let r_mod_q = r % q;
    let montgomery = |base: &BigUint| -> Vec<BigUint> {
        powers(base, n / 2, q)
            .iter()
            .map(|p| mod_mul(p, &r_mod_q, q))
            .collect()
    };
    let forward_powers = montgomery(w);
    let inverse_powers = montgomery(w_inv);

    let (forward, inverse): (Vec<BigUint>, Vec<BigUint>) = schedule(n, lanes)
        .map(|idx| {
            (
                forward_powers[idx.exponent].clone(),
                inverse_powers[idx.exponent].clone(),
            )
        })
        .unzip();

    Ok(TwiddleTables { forward, inverse })
}
