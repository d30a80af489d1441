//! Handler for the `pack` command.

use serde_json::Value;
use tracing::{info, warn};

use crate::cli::{output, read_lines, PackArgs};
use crate::domain::TradeRecord;
use crate::error::Result;
use crate::ingest::coerce_trade;
use crate::memory::SharedMemory;

/// Execute the pack command.
pub fn execute(args: &PackArgs) -> Result<()> {
    let config = args.config.load()?;
    let memory = SharedMemory::new(&config);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line_no, line) in read_lines(&args.trades)? {
        match parse_trade(&line) {
            Some(record) => records.push(record),
            None => {
                warn!(line = line_no, "skipping line that is not a JSON object");
                skipped += 1;
            }
        }
    }

    let wire = memory.encode_batch(&records)?;
    std::fs::write(&args.output, &wire)?;
    info!(
        records = records.len(),
        skipped,
        bytes = wire.len(),
        path = %args.output.display(),
        "packed trades"
    );

    output::section("Pack");
    output::key_value("Records", records.len());
    output::key_value("Skipped", skipped);
    output::key_value("Frame size", config.wire.max_packets);
    output::key_value("Bytes", wire.len());
    output::key_value("Output", args.output.display());
    Ok(())
}

/// Coerce one JSON line into a trade; only non-objects are rejected.
pub fn parse_trade(line: &str) -> Option<TradeRecord> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(fields)) => Some(coerce_trade(&fields)),
        _ => None,
    }
}
