//! Handler for the `replay` command.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::{output, read_lines, ReplayArgs};
use crate::domain::{Query, QueryResult};
use crate::error::Result;
use crate::memory::SharedMemory;

/// Outcome of applying one event line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Trade,
    Regime,
    Decision,
}

#[derive(Debug, Default, Serialize)]
struct IngestCounts {
    trades: usize,
    regimes: usize,
    decisions: usize,
    skipped: usize,
}

#[derive(Serialize)]
struct QueryReport<'a> {
    query: &'a Value,
    results: Vec<QueryResult>,
}

/// Execute the replay command.
pub fn execute(args: &ReplayArgs) -> Result<()> {
    let config = args.config.load()?;
    let queries = args
        .queries
        .iter()
        .map(|raw| serde_json::from_str::<Value>(raw))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let memory = SharedMemory::new(&config);
    let mut counts = IngestCounts::default();
    for (line_no, line) in read_lines(&args.events)? {
        match apply_line(&memory, &line) {
            Some(Applied::Trade) => counts.trades += 1,
            Some(Applied::Regime) => counts.regimes += 1,
            Some(Applied::Decision) => counts.decisions += 1,
            None => {
                warn!(line = line_no, "skipping malformed event");
                counts.skipped += 1;
            }
        }
    }
    info!(
        trades = counts.trades,
        regimes = counts.regimes,
        decisions = counts.decisions,
        skipped = counts.skipped,
        "replayed events"
    );

    let top_k = args.top_k.unwrap_or(config.router.top_k);
    let reports: Vec<_> = queries
        .iter()
        .map(|query| QueryReport {
            query,
            results: memory.query_top_k(&Query::from_request(query), top_k),
        })
        .collect();

    if args.json {
        let document = serde_json::json!({
            "ingested": counts,
            "queries": reports,
            "stats": memory.stats(),
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    output::section("Replay");
    output::key_value("Trades", counts.trades);
    output::key_value("Regimes", counts.regimes);
    output::key_value("Decisions", counts.decisions);
    output::key_value("Skipped", counts.skipped);

    for report in &reports {
        output::section(&format!("Query {}", report.query));
        output::results(&report.results);
    }

    output::stats(&memory.stats());
    println!();
    Ok(())
}

/// Apply one JSON event line to `memory`.
///
/// Returns `None` for lines that are not JSON objects, carry an unknown
/// `kind`, or lack the fields their kind needs.
pub fn apply_line(memory: &SharedMemory, line: &str) -> Option<Applied> {
    let Ok(Value::Object(mut event)) = serde_json::from_str::<Value>(line) else {
        return None;
    };
    let kind = event.remove("kind")?;
    match kind.as_str()? {
        "trade" => {
            memory.ingest_trade(&event);
            Some(Applied::Trade)
        }
        "regime" => {
            let symbol = event.get("symbol")?.as_str()?;
            let label = event.get("label")?.as_str()?;
            memory.update_regime(symbol, label);
            Some(Applied::Regime)
        }
        "decision" => {
            let agent_id = event.remove("agent_id")?.as_str()?.to_string();
            let payload = match event.remove("payload") {
                Some(Value::Object(payload)) => payload,
                Some(_) => return None,
                None => event,
            };
            memory.record_decision(&agent_id, payload);
            Some(Applied::Decision)
        }
        _ => None,
    }
}
