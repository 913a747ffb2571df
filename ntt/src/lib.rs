//! Number-theoretic transform reference model for P-lane NTT hardware.
//!
//! The crate derives field parameters (prime modulus, primitive root,
//! Montgomery constant), builds the per-lane twiddle tables a parallel
//! pipeline consumes, and runs the reference forward/inverse transforms whose
//! outputs the hardware results are checked against.
//!
//! ```text
//! params::derive ──► NttParameters ──► twiddle::generate ──► W / WINV tables
//!                          │
//!                          └────────► NttEngine::forward / inverse ──► vectors
//! ```

pub mod error;
pub mod field;
pub mod params;
pub mod prime;
pub mod transform;
pub mod twiddle;
pub mod vectors;

// Re-export commonly used types for convenience
pub use error::{NttError, Result};
pub use params::{derive, NttParameters, Preset, SearchLimits, DEFAULT_PRESET};
pub use prime::{MillerRabinOracle, PrimeOracle};
pub use transform::{bit_reverse_permute, reverse_bits, NttEngine};
pub use twiddle::{schedule, schedule_len, TwiddleIndex, TwiddleTables};
pub use vectors::{compare_vector_files, compare_vectors, VectorError};
