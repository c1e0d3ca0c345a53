use anyhow::{bail, Result};

/// Highest number of the pool; numbers run from 1 to `POOL_SIZE`.
pub const POOL_SIZE: usize = 45;

/// Main numbers per draw, not counting the bonus.
pub const MAIN_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub numbers: [u8; MAIN_COUNT],
    pub bonus: u8,
}

impl Draw {
    /// Builds a draw after checking ranges and duplicates.
    pub fn new(numbers: [u8; MAIN_COUNT], bonus: u8) -> Result<Self> {
        validate_draw(&numbers, bonus)?;
        Ok(Self { numbers, bonus })
    }

    pub fn sorted_numbers(&self) -> [u8; MAIN_COUNT] {
        let mut sorted = self.numbers;
        sorted.sort();
        sorted
    }
}

pub fn validate_draw(numbers: &[u8; MAIN_COUNT], bonus: u8) -> Result<()> {
    for &n in numbers {
        if n < 1 || n as usize > POOL_SIZE {
            bail!("Number {} out of range (1-{})", n, POOL_SIZE);
        }
    }
    if bonus < 1 || bonus as usize > POOL_SIZE {
        bail!("Bonus number {} out of range (1-{})", bonus, POOL_SIZE);
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Duplicate number: {}", numbers[i]);
            }
        }
    }
    if numbers.contains(&bonus) {
        bail!("Bonus number {} repeats a main number", bonus);
    }
    Ok(())
}

/// Per-number occurrence counts, indexed by number minus one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    pub main: [u32; POOL_SIZE],
    pub bonus: [u32; POOL_SIZE],
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self {
            main: [0; POOL_SIZE],
            bonus: [0; POOL_SIZE],
        }
    }
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more draw. The draw must already be valid.
    pub fn add_draw(&mut self, draw: &Draw) {
        for &n in &draw.numbers {
            self.main[(n - 1) as usize] += 1;
        }
        self.bonus[(draw.bonus - 1) as usize] += 1;
    }

    /// Like `add_draw`, but fails instead of overflowing any count.
    pub fn try_add_draw(&mut self, draw: &Draw) -> Result<()> {
        if self.grand_total() + (MAIN_COUNT as u64 + 1) > u32::MAX as u64 {
            bail!("Frequency counts are too large to record another draw");
        }
        self.add_draw(draw);
        Ok(())
    }

    pub fn merge(&mut self, other: &FrequencyTable) {
        for i in 0..POOL_SIZE {
            self.main[i] += other.main[i];
            self.bonus[i] += other.bonus[i];
        }
    }

    pub fn total(&self) -> [u32; POOL_SIZE] {
        let mut total = [0u32; POOL_SIZE];
        for (i, t) in total.iter_mut().enumerate() {
            *t = self.main[i] + self.bonus[i];
        }
        total
    }

    /// Sum of every main and bonus count, widened so it cannot overflow.
    pub fn grand_total(&self) -> u64 {
        self.main
            .iter()
            .chain(self.bonus.iter())
            .map(|&c| c as u64)
            .sum()
    }

    /// Every draw contributes exactly one bonus number.
    pub fn draw_count(&self) -> u32 {
        self.bonus.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.main.iter().all(|&c| c == 0) && self.bonus.iter().all(|&c| c == 0)
    }

    /// Sampling weights: main + bonus counts, or main counts alone.
    pub fn weights(&self, include_bonus: bool) -> Vec<f64> {
        if include_bonus {
            self.total().iter().map(|&c| c as f64).collect()
        } else {
            self.main.iter().map(|&c| c as f64).collect()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredFrequencies {
    pub table: FrequencyTable,
    pub latest_round: u32,
}

/// Historical main-number counts shipped with the tool, usable when no
/// frequency file has been built yet.
pub const BUNDLED_FREQUENCIES: [u32; POOL_SIZE] = [
    192, 181, 191, 188, 172, 190, 192, 173, 151, 182,
    184, 199, 197, 188, 182, 184, 195, 188, 182, 192,
    183, 157, 159, 188, 165, 189, 198, 169, 163, 181,
    185, 171, 197, 203, 184, 180, 188, 191, 185, 187,
    158, 173, 194, 180, 187,
];
