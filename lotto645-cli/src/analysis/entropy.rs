use anyhow::{Context, Result};
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng, TryRngCore};
use serde::{Deserialize, Serialize};

/// Supplies uniform values in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EntropyMethod {
    Pseudo,
    #[default]
    Hardware,
}

impl std::fmt::Display for EntropyMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntropyMethod::Pseudo => write!(f, "pseudo-random"),
            EntropyMethod::Hardware => write!(f, "OS entropy"),
        }
    }
}

pub struct PseudoRandom {
    rng: StdRng,
}

impl PseudoRandom {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { rng }
    }
}

impl RandomSource for PseudoRandom {
    fn next_unit(&mut self) -> Result<f64> {
        Ok(self.rng.random::<f64>())
    }
}

/// Reads the operating system entropy pool for every value.
#[derive(Debug, Default)]
pub struct OsEntropy;

impl RandomSource for OsEntropy {
    fn next_unit(&mut self) -> Result<f64> {
        let raw = OsRng
            .try_next_u32()
            .context("OS entropy source unavailable")?;
        Ok(raw as f64 / 4_294_967_296.0)
    }
}

/// The seed only applies to the pseudo-random source.
pub fn build_source(method: EntropyMethod, seed: Option<u64>) -> Box<dyn RandomSource> {
    match method {
        EntropyMethod::Pseudo => Box::new(PseudoRandom::new(seed)),
        EntropyMethod::Hardware => {
            if seed.is_some() {
                log::warn!("--seed is ignored with the hardware entropy source");
            }
            Box::new(OsEntropy)
        }
    }
}
