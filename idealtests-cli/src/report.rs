use std::fmt::Write;

use idealtests::{
    MetricRecord,
    operators::{selection::TournamentOutcome, sorting::RankOrder},
};

fn key_value(record: &MetricRecord, key: &str) -> String {
    match record.field(key) {
        Some(Ok(value)) => format!("{:.6}", value.scalar()),
        _ => "-".to_string(),
    }
}

/// Ranked table followed by the lowest and highest test for `key`. `ranked`
/// must already be sorted in `order`.
pub fn ranking(ranked: &[MetricRecord], key: &str, order: RankOrder) -> String {
    let mut out = String::new();
    let width = ranked.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4);

    let _ = writeln!(out, "{:>4}  {:<width$}  {}", "#", "test", key);
    for (pos, record) in ranked.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<width$}  {}",
            pos + 1,
            record.name,
            key_value(record, key)
        );
    }

    let (lowest, highest) = match order {
        RankOrder::Ascending => (ranked.first(), ranked.last()),
        RankOrder::Descending => (ranked.last(), ranked.first()),
    };
    if let (Some(lowest), Some(highest)) = (lowest, highest) {
        let _ = writeln!(out);
        let _ = writeln!(out, "Lowest {key}:  {} ({})", lowest.name, key_value(lowest, key));
        let _ = writeln!(out, "Highest {key}: {} ({})", highest.name, key_value(highest, key));
    }
    out
}

pub fn selection(outcome: &TournamentOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Ran {} comparisons; {} ideal test(s):",
        outcome.n_comparisons(),
        outcome.ideal().len()
    );
    for name in outcome.ideal() {
        let _ = writeln!(out, "  {name}");
    }
    out
}
