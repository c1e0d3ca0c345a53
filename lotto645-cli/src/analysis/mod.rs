pub mod entropy;
pub mod frequency;
pub mod sampler;

use anyhow::{Context, Result};
use std::path::Path;

use lotto645_db::models::{FrequencyTable, BUNDLED_FREQUENCIES};
use lotto645_db::store;

use crate::analysis::entropy::RandomSource;
use crate::analysis::sampler::sample_unique;

#[derive(Debug, Clone, PartialEq)]
pub struct NumberBreakdown {
    pub number: u8,
    pub main: u32,
    pub bonus: u32,
    pub total: u32,
    /// Share of all main + bonus hits, in percent.
    pub share: f64,
}

pub fn breakdown(table: &FrequencyTable) -> Vec<NumberBreakdown> {
    let total = table.total();
    let grand_total: u32 = total.iter().sum();

    (0..total.len())
        .map(|i| NumberBreakdown {
            number: (i + 1) as u8,
            main: table.main[i],
            bonus: table.bonus[i],
            total: total[i],
            share: if grand_total > 0 {
                100.0 * total[i] as f64 / grand_total as f64
            } else {
                0.0
            },
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawWeights {
    pub weights: Vec<f64>,
    /// Round of the frequency file, `None` for the bundled weights.
    pub latest_round: Option<u32>,
}

/// Sampling weights from the frequency file at `path`, or from the bundled
/// table. A missing file is an error.
pub fn load_weights(path: &Path, include_bonus: bool, bundled: bool) -> Result<DrawWeights> {
    if bundled {
        return Ok(DrawWeights {
            weights: BUNDLED_FREQUENCIES.iter().map(|&c| c as f64).collect(),
            latest_round: None,
        });
    }

    let stored = store::load(path)?.with_context(|| {
        format!(
            "No frequency data available at {}; run `lotto645 import` or `lotto645 add` first",
            path.display()
        )
    })?;
    if stored.table.is_empty() {
        log::warn!("{} holds no draws, picks will be uniform", path.display());
    }
    Ok(DrawWeights {
        weights: stored.table.weights(include_bonus),
        latest_round: Some(stored.latest_round),
    })
}

/// Samples `grids` independent picks of `count` numbers each.
pub fn generate_grids(
    weights: &[f64],
    count: usize,
    grids: usize,
    source: &mut dyn RandomSource,
) -> Result<Vec<Vec<u8>>> {
    let mut result = Vec::with_capacity(grids);
    for _ in 0..grids {
        result.push(sample_unique(weights, count, source)?);
    }
    Ok(result)
}
