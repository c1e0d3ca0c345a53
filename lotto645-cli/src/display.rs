use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::analysis::breakdown;
use crate::analysis::entropy::EntropyMethod;
use crate::import::ImportResult;
use lotto645_db::models::{FrequencyTable, StoredFrequencies};
use lotto645_db::store::is_stale;

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn join_counts(counts: &[u32]) -> String {
    counts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import finished:");
    println!("  Rows read         : {}", result.total_records);
    println!("  Draws found       : {}", result.draws.len());
    println!("  Rows without draw : {}", result.ignored);
    if result.skipped > 0 {
        println!("  Invalid draws     : {}", result.skipped);
    }
    if result.errors > 0 {
        println!("  Read errors       : {}", result.errors);
    }
    if result.latest_round > 0 {
        println!("  Latest round      : {}", result.latest_round);
    }
}

pub fn display_frequency_arrays(table: &FrequencyTable) {
    println!("\nMain number frequencies (1-45):");
    println!("[{}]", join_counts(&table.main));
    println!("\nBonus number frequencies (1-45):");
    println!("[{}]", join_counts(&table.bonus));
    println!("\nTotal frequencies, main + bonus (1-45):");
    println!("[{}]", join_counts(&table.total()));
}

pub fn display_breakdown(table: &FrequencyTable) {
    println!("\n📊 Breakdown over {} draws\n", table.draw_count());

    let mut table_out = Table::new();
    table_out
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Number", "Main", "Bonus", "Total", "Share"]);

    for row in breakdown(table) {
        table_out.add_row(vec![
            &format!("{:2}", row.number),
            &row.main.to_string(),
            &row.bonus.to_string(),
            &row.total.to_string(),
            &format!("{:.2} %", row.share),
        ]);
    }
    println!("{table_out}");
}

pub fn display_grids(grids: &[Vec<u8>], method: EntropyMethod, include_bonus: bool) {
    let weighting = if include_bonus { "main + bonus" } else { "main only" };
    println!("\n🎯 Picks ({method}, weights: {weighting})\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Numbers"]);

    for (i, grid) in grids.iter().enumerate() {
        table.add_row(vec![&format!("{}", i + 1), &join_numbers(grid)]);
    }
    println!("{table}");
}

pub fn display_status(stored: Option<&StoredFrequencies>, age_days: Option<i64>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let (Some(stored), Some(age)) = (stored, age_days) else {
        table.add_row(vec![
            Cell::new("Frequency file"),
            Cell::new("missing").fg(Color::Red),
        ]);
        println!("{table}");
        return;
    };

    let age_cell = if is_stale(age) {
        Cell::new(format!("stale ({} days old)", age)).fg(Color::Red)
    } else {
        Cell::new(format!("updated {} days ago", age)).fg(Color::Green)
    };
    let round = if stored.latest_round > 0 {
        stored.latest_round.to_string()
    } else {
        "none".to_string()
    };

    table.add_row(vec![Cell::new("Frequency file"), age_cell]);
    table.add_row(vec![Cell::new("Latest round"), Cell::new(round)]);
    table.add_row(vec![
        Cell::new("Draws counted"),
        Cell::new(stored.table.draw_count()),
    ]);
    println!("{table}");
}
