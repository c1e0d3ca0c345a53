mod analysis;
mod config;
mod display;
mod import;
mod report;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::analysis::entropy::{build_source, EntropyMethod};
use crate::analysis::frequency::aggregate;
use crate::analysis::{generate_grids, load_weights};
use crate::config::{parse_delimiter, AppConfig};
use crate::display::{
    display_breakdown, display_frequency_arrays, display_grids, display_import_summary,
    display_status,
};
use crate::import::{import_files, ImportResult};
use crate::report::write_report;
use lotto645_db::models::{validate_draw, Draw, StoredFrequencies, MAIN_COUNT};
use lotto645_db::store;

#[derive(Parser)]
#[command(name = "lotto645", about = "Lotto 6/45 frequency analyzer and weighted picker")]
struct Cli {
    /// Frequency file location
    #[arg(long, global = true, env = "LOTTO645_STORE")]
    store: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze draw spreadsheets without saving anything
    Analyze {
        /// Spreadsheet exported as delimited text
        #[arg(short, long = "file", required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Cell delimiter (default ',')
        #[arg(short, long, value_parser = parse_delimiter)]
        delimiter: Option<u8>,

        /// Also write a text report to this path
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Analyze draw spreadsheets and overwrite the frequency file
    Import {
        #[arg(short, long = "file", required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        #[arg(short, long, value_parser = parse_delimiter)]
        delimiter: Option<u8>,
    },

    /// Add the latest draw to the frequency file
    Add {
        /// Six main numbers (prompted when absent)
        #[arg(short, long, num_args = MAIN_COUNT, requires = "bonus")]
        numbers: Option<Vec<u8>>,

        /// Bonus number (prompted when absent)
        #[arg(short, long, requires = "numbers")]
        bonus: Option<u8>,
    },

    /// Draw weighted picks from the stored frequencies
    Draw {
        /// Random source
        #[arg(short, long)]
        method: Option<EntropyMethod>,

        /// Weight by main numbers only
        #[arg(long)]
        no_bonus: bool,

        /// Number of picks to generate
        #[arg(short, long)]
        grids: Option<usize>,

        /// Seed for the pseudo-random source
        #[arg(long)]
        seed: Option<u64>,

        /// Use the bundled historical weights instead of the frequency file
        #[arg(long)]
        bundled: bool,
    },

    /// Show the age and content of the frequency file
    Status,

    /// Print the frequency file path
    StorePath,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let path = cli.store.clone().unwrap_or_else(store::default_store_path);

    match cli.command {
        Command::Analyze {
            files,
            delimiter,
            export,
        } => cmd_analyze(config, &files, delimiter, export.as_deref()),
        Command::Import { files, delimiter } => cmd_import(&path, config, &files, delimiter),
        Command::Add { numbers, bonus } => cmd_add(&path, numbers, bonus),
        Command::Draw {
            method,
            no_bonus,
            grids,
            seed,
            bundled,
        } => {
            let mut config = config;
            if let Some(m) = method {
                config.draw.method = m;
            }
            if no_bonus {
                config.draw.include_bonus = false;
            }
            if let Some(g) = grids {
                config.draw.grids = g;
            }
            if seed.is_some() {
                config.draw.seed = seed;
            }
            config.validate()?;
            cmd_draw(&path, &config, bundled)
        }
        Command::Status => cmd_status(&path),
        Command::StorePath => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn read_draws(
    mut config: AppConfig,
    files: &[PathBuf],
    delimiter: Option<u8>,
) -> Result<ImportResult> {
    if let Some(d) = delimiter {
        config.import.delimiter = d;
    }
    let result = import_files(files, &config.import)?;
    display_import_summary(&result);
    if result.draws.is_empty() {
        bail!("No draw found in the selected files");
    }
    Ok(result)
}

fn cmd_analyze(
    config: AppConfig,
    files: &[PathBuf],
    delimiter: Option<u8>,
    export: Option<&Path>,
) -> Result<()> {
    let result = read_draws(config, files, delimiter)?;
    let table = aggregate(&result.draws);

    display_frequency_arrays(&table);
    display_breakdown(&table);

    if let Some(path) = export {
        write_report(path, &table)?;
        println!("\nReport saved to {}", path.display());
    }
    Ok(())
}

fn cmd_import(
    path: &Path,
    config: AppConfig,
    files: &[PathBuf],
    delimiter: Option<u8>,
) -> Result<()> {
    let result = read_draws(config, files, delimiter)?;
    let stored = StoredFrequencies {
        table: aggregate(&result.draws),
        latest_round: result.latest_round,
    };
    store::save(path, &stored)?;
    println!(
        "\nFrequencies of {} draws saved to {} (latest round: {})",
        stored.table.draw_count(),
        path.display(),
        stored.latest_round
    );
    Ok(())
}

fn cmd_add(path: &Path, numbers: Option<Vec<u8>>, bonus: Option<u8>) -> Result<()> {
    let draw = match (numbers, bonus) {
        (Some(numbers), Some(bonus)) => {
            if numbers.len() != MAIN_COUNT {
                bail!("Expected {} main numbers, got {}", MAIN_COUNT, numbers.len());
            }
            let mut main = [0u8; MAIN_COUNT];
            main.copy_from_slice(&numbers);
            Draw::new(main, bonus)?
        }
        _ => prompt_draw()?,
    };

    let stored = store::record_draw(path, &draw)?;
    println!(
        "Draw {} + {} recorded. Latest round is now {}.",
        draw.sorted_numbers()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" "),
        draw.bonus,
        stored.latest_round
    );
    Ok(())
}

fn cmd_draw(path: &Path, config: &AppConfig, bundled: bool) -> Result<()> {
    let draw = &config.draw;
    let loaded = load_weights(path, draw.include_bonus, bundled)?;
    if let Some(round) = loaded.latest_round.filter(|&r| r > 0) {
        println!("Latest analysed round: {}", round);
    }

    let mut source = build_source(draw.method, draw.seed);
    let grids = generate_grids(&loaded.weights, draw.count, draw.grids, source.as_mut())?;
    display_grids(&grids, draw.method, draw.include_bonus && !bundled);
    Ok(())
}

fn cmd_status(path: &Path) -> Result<()> {
    let stored = store::load(path)?;
    let age = store::store_age_days(path)?;
    println!("{}", path.display());
    display_status(stored.as_ref(), age);
    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Cannot read from stdin")?;
    if read == 0 {
        bail!("Input closed");
    }
    Ok(input.trim().to_string())
}

fn prompt_draw() -> Result<Draw> {
    loop {
        let input = prompt("6 main numbers (space separated, 1-45): ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        let main: [u8; MAIN_COUNT] = match nums {
            Ok(v) if v.len() == MAIN_COUNT => [v[0], v[1], v[2], v[3], v[4], v[5]],
            _ => {
                println!("Enter exactly 6 numbers. Try again.");
                continue;
            }
        };

        let bonus = match prompt("Bonus number (1-45): ")?.parse::<u8>() {
            Ok(b) => b,
            Err(_) => {
                println!("Invalid bonus number. Try again.");
                continue;
            }
        };

        match validate_draw(&main, bonus) {
            Ok(()) => return Draw::new(main, bonus),
            Err(e) => println!("{}. Try again.", e),
        }
    }
}
