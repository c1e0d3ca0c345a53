use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

use lotto645_db::models::{Draw, MAIN_COUNT, POOL_SIZE};

use crate::config::ImportConfig;

/// Cells needed at the end of a row to read it as a draw.
const DRAW_WIDTH: usize = MAIN_COUNT + 1;

#[derive(Debug, Default)]
pub struct ImportResult {
    pub draws: Vec<Draw>,
    pub latest_round: u32,
    pub total_records: u32,
    /// Rows without enough numbers to hold a draw (headers, blank lines).
    pub ignored: u32,
    /// Rows that looked like a draw but failed validation.
    pub skipped: u32,
    pub errors: u32,
}

impl ImportResult {
    fn absorb(&mut self, other: ImportResult) {
        self.draws.extend(other.draws);
        self.latest_round = self.latest_round.max(other.latest_round);
        self.total_records += other.total_records;
        self.ignored += other.ignored;
        self.skipped += other.skipped;
        self.errors += other.errors;
    }
}

fn parse_integral(cell: &str) -> Option<f64> {
    let value = cell.trim().parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        Some(value)
    } else {
        None
    }
}

fn row_round(cells: &[&str]) -> Option<u32> {
    let value = parse_integral(cells.get(1)?)?;
    if value >= 1.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

fn row_numbers(cells: &[&str]) -> Vec<u8> {
    cells
        .iter()
        .filter_map(|c| parse_integral(c))
        .filter(|v| *v >= 1.0 && *v <= POOL_SIZE as f64)
        .map(|v| v as u8)
        .collect()
}

/// The last seven pool numbers of a row are the six main numbers then the bonus.
fn parse_row(cells: &[&str]) -> Option<Result<Draw>> {
    let numbers = row_numbers(cells);
    if numbers.len() < DRAW_WIDTH {
        return None;
    }
    let tail = &numbers[numbers.len() - DRAW_WIDTH..];
    let mut main = [0u8; MAIN_COUNT];
    main.copy_from_slice(&tail[..MAIN_COUNT]);
    Some(Draw::new(main, tail[MAIN_COUNT]))
}

fn reader_builder(config: &ImportConfig) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(config.delimiter)
        .has_headers(false)
        .flexible(true);
    builder
}

pub fn extract_draws<R: Read>(reader: &mut csv::Reader<R>) -> ImportResult {
    let mut result = ImportResult::default();

    for record_result in reader.records() {
        result.total_records += 1;
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Cannot read row {}: {}", result.total_records, e);
                result.errors += 1;
                continue;
            }
        };

        let cells: Vec<&str> = record
            .iter()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();

        if let Some(round) = row_round(&cells) {
            result.latest_round = result.latest_round.max(round);
        }

        match parse_row(&cells) {
            Some(Ok(draw)) => result.draws.push(draw),
            Some(Err(e)) => {
                log::warn!("Skipping row {}: {}", result.total_records, e);
                result.skipped += 1;
            }
            None => result.ignored += 1,
        }
    }

    result
}

pub fn import_file(path: &Path, config: &ImportConfig) -> Result<ImportResult> {
    let mut reader = reader_builder(config)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;
    let result = extract_draws(&mut reader);
    log::info!(
        "{}: {} draws, latest round {}",
        path.display(),
        result.draws.len(),
        result.latest_round
    );
    Ok(result)
}

pub fn import_files(paths: &[PathBuf], config: &ImportConfig) -> Result<ImportResult> {
    let mut result = ImportResult::default();
    for path in paths {
        result.absorb(import_file(path, config)?);
    }
    Ok(result)
}
