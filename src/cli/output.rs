//! Shared CLI output helpers for consistent operator-facing text.

use std::fmt::Display;

use tabled::{Table, Tabled};

use crate::domain::{MemoryStats, QueryResult};

const RULE_WIDTH: usize = 56;

/// Print a section header and separator.
pub fn section(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "─".repeat(RULE_WIDTH));
}

/// Print a simple key/value line.
pub fn key_value(label: &str, value: impl Display) {
    println!("{label:<14} {value}");
}

/// Print a single-line note.
pub fn note(message: &str) {
    println!("{message}");
}

/// Print a table indented under the current section.
fn indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("  {line}");
    }
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&QueryResult> for ResultRow {
    fn from(result: &QueryResult) -> Self {
        let (kind, detail) = match result {
            QueryResult::Trade { record, .. } => (
                "trade",
                format!(
                    "{} {} {} @ {} on {}",
                    record.side.as_str(),
                    record.quantity,
                    record.symbol,
                    record.price,
                    record.venue.as_str()
                ),
            ),
            QueryResult::Regime { symbol, label } => ("regime", format!("{symbol}: {label}")),
            QueryResult::Decision { decision, .. } => (
                "decision",
                serde_json::Value::Object(decision.payload.clone()).to_string(),
            ),
        };
        Self {
            kind,
            key: result.key().unwrap_or("-").to_string(),
            detail,
        }
    }
}

/// Print query results as a table.
pub fn results(results: &[QueryResult]) {
    if results.is_empty() {
        note("  (no results)");
        return;
    }
    indented(&Table::new(results.iter().map(ResultRow::from)));
}

#[derive(Tabled)]
struct ExpertRow {
    #[tabled(rename = "Expert")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Hits")]
    hits: u64,
    #[tabled(rename = "Misses")]
    misses: u64,
    #[tabled(rename = "Hit Rate")]
    hit_rate: String,
    #[tabled(rename = "Evictions")]
    evictions: u64,
    #[tabled(rename = "Dispatched")]
    dispatched: u64,
}

/// Print the memory statistics snapshot.
pub fn stats(stats: &MemoryStats) {
    section("Experts");
    let rows = stats.per_expert.iter().map(|(name, cache)| ExpertRow {
        name: name.clone(),
        size: format!("{}/{}", cache.size, cache.max_size),
        hits: cache.hits,
        misses: cache.misses,
        hit_rate: format!("{:.1}%", cache.hit_rate * 100.0),
        evictions: cache.evictions,
        dispatched: stats
            .router
            .dispatch_counts
            .get(name)
            .copied()
            .unwrap_or(0),
    });
    indented(&Table::new(rows));

    section("Summary");
    key_value("Queries", stats.router.total_queries);
    key_value("History", stats.prefetch.history_len);
    key_value("Tracked keys", stats.prefetch.tracked_keys);
    key_value("Record size", format!("{} bytes", stats.record_size_bytes));
}
