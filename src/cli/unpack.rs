//! Handler for the `unpack` command.

use tracing::info;

use crate::cli::UnpackArgs;
use crate::error::Result;
use crate::memory::SharedMemory;

/// Execute the unpack command, printing one JSON record per line.
///
/// Symbols decode through the configured table, so `[symbols] extra` must
/// match the one used to pack.
pub fn execute(args: &UnpackArgs) -> Result<()> {
    let config = args.config.load()?;
    let memory = SharedMemory::new(&config);

    let bytes = std::fs::read(&args.input)?;
    let records = memory.decode_wire(&bytes)?;
    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }
    info!(
        records = records.len(),
        bytes = bytes.len(),
        path = %args.input.display(),
        "unpacked trades"
    );
    Ok(())
}
