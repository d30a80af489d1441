//! Fixed-width trade record codec.

use crate::domain::{Side, SymbolTable, TradeRecord, Venue};
use crate::error::CodecError;

/// Encoded size of one [`TradeRecord`].
pub const RECORD_SIZE: usize = 32;

/// Encode with the builtin symbol table.
#[must_use]
pub fn encode(record: &TradeRecord) -> [u8; RECORD_SIZE] {
    encode_with(record, SymbolTable::builtin())
}

/// Decode with the builtin symbol table.
///
/// # Errors
///
/// See [`decode_with`].
pub fn decode(bytes: &[u8]) -> Result<TradeRecord, CodecError> {
    decode_with(bytes, SymbolTable::builtin())
}

/// Encode a record. Unmapped symbols are written as the sentinel index.
///
/// The timestamp is truncated to its low 32 bits.
#[must_use]
pub fn encode_with(record: &TradeRecord, symbols: &SymbolTable) -> [u8; RECORD_SIZE] {
    let mut out = [0u8; RECORD_SIZE];
    out[0..4].copy_from_slice(&(record.timestamp as u32).to_le_bytes());
    out[4..6].copy_from_slice(&symbols.index_of(&record.symbol).to_le_bytes());
    out[6] = record.side.as_byte();
    out[7] = record.venue.as_byte();
    out[8..16].copy_from_slice(&record.price.to_le_bytes());
    out[16..24].copy_from_slice(&record.quantity.to_le_bytes());
    out[24..32].copy_from_slice(&record.id_hash());
    out
}

/// Decode a record.
///
/// # Errors
///
/// - [`CodecError::InvalidLength`] unless `bytes` is exactly 32 bytes long
/// - [`CodecError::InvalidField`] for an out-of-range side or venue byte
pub fn decode_with(bytes: &[u8], symbols: &SymbolTable) -> Result<TradeRecord, CodecError> {
    let bytes: &[u8; RECORD_SIZE] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
        expected: RECORD_SIZE,
        actual: bytes.len(),
    })?;

    let timestamp = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let symbol_index = u16::from_le_bytes([bytes[4], bytes[5]]);
    let side = Side::from_byte(bytes[6]).ok_or(CodecError::InvalidField {
        field: "side",
        value: bytes[6],
    })?;
    let venue = Venue::from_byte(bytes[7]).ok_or(CodecError::InvalidField {
        field: "venue",
        value: bytes[7],
    })?;
    let price = f64::from_le_bytes(array8(&bytes[8..16]));
    let quantity = f64::from_le_bytes(array8(&bytes[16..24]));
    let id_hash = array8(&bytes[24..32]);

    Ok(TradeRecord::from_parts(
        i64::from(timestamp),
        symbols.name_of(symbol_index),
        side,
        venue,
        price,
        quantity,
        id_hash,
    ))
}

fn array8(slice: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(slice);
    out
}
