use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{validate_draw, Draw, FrequencyTable, StoredFrequencies, MAIN_COUNT, POOL_SIZE};

/// Age in days from which the frequency file is reported as stale.
pub const STALE_AFTER_DAYS: i64 = 30;

/// On-disk shape of the frequency file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FrequencyRecord {
    #[serde(alias = "normal_frequencies")]
    main_frequencies: Vec<u32>,
    bonus_frequencies: Vec<u32>,
    #[serde(default, deserialize_with = "null_as_zero")]
    latest_round: u32,
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

fn to_counts(values: &[u32], field: &str) -> Result<[u32; POOL_SIZE]> {
    if values.len() != POOL_SIZE {
        bail!(
            "Field '{}' holds {} entries, expected {}",
            field,
            values.len(),
            POOL_SIZE
        );
    }
    let mut counts = [0u32; POOL_SIZE];
    counts.copy_from_slice(values);
    Ok(counts)
}

impl FrequencyRecord {
    fn into_stored(self) -> Result<StoredFrequencies> {
        let table = FrequencyTable {
            main: to_counts(&self.main_frequencies, "main_frequencies")?,
            bonus: to_counts(&self.bonus_frequencies, "bonus_frequencies")?,
        };
        // Bounding the grand total keeps every per-number and summed count in u32.
        if table.grand_total() > u32::MAX as u64 {
            bail!(
                "Frequency counts add up to {}, more than {} allowed",
                table.grand_total(),
                u32::MAX
            );
        }
        let main_sum: u64 = table.main.iter().map(|&c| c as u64).sum();
        let bonus_sum: u64 = table.bonus.iter().map(|&c| c as u64).sum();
        if main_sum != MAIN_COUNT as u64 * bonus_sum {
            log::warn!(
                "Frequency file is inconsistent: {} main hits for {} bonus hits",
                main_sum,
                bonus_sum
            );
        }
        Ok(StoredFrequencies {
            table,
            latest_round: self.latest_round,
        })
    }

    fn from_stored(stored: &StoredFrequencies) -> Self {
        Self {
            main_frequencies: stored.table.main.to_vec(),
            bonus_frequencies: stored.table.bonus.to_vec(),
            latest_round: stored.latest_round,
        }
    }
}

pub fn default_store_path() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("frequencies.json");
    path
}

/// Reads the frequency file. A missing file is `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<StoredFrequencies>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read frequency file {:?}", path))?;
    let record: FrequencyRecord = serde_json::from_str(&json)
        .with_context(|| format!("Invalid JSON in frequency file {:?}", path))?;
    let stored = record
        .into_stored()
        .with_context(|| format!("Invalid frequency file {:?}", path))?;
    Ok(Some(stored))
}

pub fn save(path: &Path, stored: &StoredFrequencies) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(&FrequencyRecord::from_stored(stored))?;
    std::fs::write(path, json)
        .with_context(|| format!("Cannot write frequency file {:?}", path))?;
    log::info!(
        "Saved {} draws (round {}) to {}",
        stored.table.draw_count(),
        stored.latest_round,
        path.display()
    );
    Ok(())
}

/// Adds one draw to the stored table and advances the round counter.
pub fn record_draw(path: &Path, draw: &Draw) -> Result<StoredFrequencies> {
    validate_draw(&draw.numbers, draw.bonus)?;
    let mut stored = load(path)?.unwrap_or_default();
    stored.table.try_add_draw(draw)?;
    stored.latest_round = stored
        .latest_round
        .checked_add(1)
        .context("Round counter overflow")?;
    save(path, &stored)?;
    Ok(stored)
}

/// Whole days since the file was last written, or `None` if it does not exist.
pub fn store_age_days(path: &Path) -> Result<Option<i64>> {
    if !path.exists() {
        return Ok(None);
    }
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("Cannot read modification time of {:?}", path))?;
    let modified: DateTime<Local> = modified.into();
    let days = (Local::now() - modified).num_days();
    Ok(Some(days.max(0)))
}

pub fn is_stale(age_days: i64) -> bool {
    age_days >= STALE_AFTER_DAYS
}
