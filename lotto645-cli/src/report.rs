use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use lotto645_db::models::FrequencyTable;

use crate::analysis::breakdown;

fn format_counts(counts: &[u32]) -> String {
    let joined = counts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}

pub fn render_report(table: &FrequencyTable) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Lotto 6/45 frequency report");
    let _ = writeln!(out, "{}\n", "=".repeat(50));
    let _ = writeln!(out, "Draws analysed: {}\n", table.draw_count());

    let _ = writeln!(out, "Main number frequencies (1-45):");
    let _ = writeln!(out, "{}\n", format_counts(&table.main));
    let _ = writeln!(out, "Bonus number frequencies (1-45):");
    let _ = writeln!(out, "{}\n", format_counts(&table.bonus));
    let _ = writeln!(out, "Total frequencies, main + bonus (1-45):");
    let _ = writeln!(out, "{}\n", format_counts(&table.total()));

    let _ = writeln!(out, "Breakdown:");
    let _ = writeln!(out, "Number\tMain\tBonus\tTotal");
    let _ = writeln!(out, "{}", "-".repeat(40));
    for row in breakdown(table) {
        let _ = writeln!(out, "{}\t{}\t{}\t{}", row.number, row.main, row.bonus, row.total);
    }
    out
}

pub fn write_report(path: &Path, table: &FrequencyTable) -> Result<()> {
    std::fs::write(path, render_report(table))
        .with_context(|| format!("Cannot write report {:?}", path))?;
    log::info!("Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto645_db::models::Draw;

    #[test]
    fn test_format_counts() {
        assert_eq!(format_counts(&[1, 0, 12]), "[1, 0, 12]");
    }

    #[test]
    fn test_report_contents() {
        let mut table = FrequencyTable::new();
        table.add_draw(&Draw::new([1, 2, 3, 4, 5, 6], 7).unwrap());
        table.add_draw(&Draw::new([1, 8, 9, 10, 11, 12], 45).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        write_report(&path, &table).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert!(text.contains("Draws analysed: 2"));
        assert!(text.contains("\n1\t2\t0\t2\n"));
        assert!(text.contains("\n45\t0\t1\t1\n"));
        assert_eq!(text.lines().filter(|l| l.contains('\t')).count(), 46);
    }
}
