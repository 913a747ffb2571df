//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::{Args, Parser};
use ntt::params::SearchLimits;
use ntt::prime::{MillerRabinOracle, DEFAULT_ROUNDS};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[derive(Parser, Debug)]
#[command(name = "ntt-testgen")]
#[command(version)]
#[command(
    about = "Generate and check NTT/INTT test vectors for P-lane hardware",
    long_about = None
)]
pub struct Cli {
    /// Derive parameters and write PARAM.txt
    #[arg(long)]
    pub params: bool,

    /// Generate forward NTT input/output vectors and twiddle tables
    #[arg(long)]
    pub ntt_gen: bool,

    /// Generate inverse NTT input/output vectors and twiddle tables
    #[arg(long)]
    pub intt_gen: bool,

    /// Compare NTT_DOUT.txt against the hardware result NTT_RES.txt
    #[arg(long)]
    pub ntt_test: bool,

    /// Compare INTT_DOUT.txt against the hardware result INTT_RES.txt
    #[arg(long)]
    pub intt_test: bool,

    #[command(flatten)]
    pub config: GeneratorConfig,
}

impl Cli {
    pub fn needs_parameters(&self) -> bool {
        self.params || self.ntt_gen || self.intt_gen
    }

    pub fn has_work(&self) -> bool {
        self.needs_parameters() || self.ntt_test || self.intt_test
    }
}

#[derive(Args, Debug, Clone)]
pub struct GeneratorConfig {
    /// Transform size N (power of two)
    #[arg(short = 'n', long = "size", env = "NTT_SIZE", default_value_t = 1024)]
    pub n: usize,

    /// Bit length K of the modulus
    #[arg(short = 'k', long, env = "NTT_BIT_LENGTH", default_value_t = 16)]
    pub bit_length: u64,

    /// Number of parallel lanes P
    #[arg(short = 'p', long, env = "NTT_LANES", default_value_t = 8)]
    pub lanes: usize,

    /// Use the built-in (q, psi) preset instead of searching; N and K come from the preset
    #[arg(long, env = "NTT_PREDEFINED")]
    pub predefined: bool,

    /// Directory the vector files are written to and read from
    #[arg(short, long, env = "NTT_OUT_DIR", default_value = "test")]
    pub out_dir: PathBuf,

    /// Seed for reproducible prime search and input data
    #[arg(long, env = "NTT_SEED")]
    pub seed: Option<u64>,

    /// Miller-Rabin rounds per candidate
    #[arg(long, default_value_t = DEFAULT_ROUNDS)]
    pub mr_rounds: usize,

    /// Prime candidates to draw before giving up
    #[arg(long, default_value_t = 1_000_000)]
    pub max_candidates: usize,

    /// Primitive-root candidates to scan before giving up; unbounded when unset
    #[arg(long, env = "NTT_MAX_ROOT_CANDIDATES")]
    pub max_root_candidates: Option<u64>,

    /// Also write the parameters as PARAM.json
    #[arg(long)]
    pub json: bool,
}

impl GeneratorConfig {
    /// Data generator; seeded when `--seed` is set.
    pub fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_rng(&mut rand::rng()),
        }
    }

    /// Prime oracle drawing its own stream from `rng`.
    pub fn oracle(&self, rng: &mut ChaCha20Rng) -> MillerRabinOracle<ChaCha20Rng> {
        MillerRabinOracle::new(ChaCha20Rng::from_rng(rng)).with_rounds(self.mr_rounds)
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_modulus_candidates: self.max_candidates,
            max_root_candidates: self.max_root_candidates,
        }
    }
}
