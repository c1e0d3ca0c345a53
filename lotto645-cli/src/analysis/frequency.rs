use lotto645_db::models::{Draw, FrequencyTable};

/// Counts main and bonus occurrences over all draws.
pub fn aggregate(draws: &[Draw]) -> FrequencyTable {
    draws.iter().fold(FrequencyTable::new(), |mut table, draw| {
        table.add_draw(draw);
        table
    })
}
