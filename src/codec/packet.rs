//! Batched wire frames of trade records.

use tracing::{debug, warn};

use super::record::{decode_with, encode_with, RECORD_SIZE};
use crate::domain::{SymbolTable, TradeRecord};
use crate::error::CodecError;

/// Frame marker.
pub const FRAME_MAGIC: [u8; 2] = *b"TM";

/// Current frame layout version.
pub const FRAME_VERSION: u8 = 1;

/// Magic, version, count and checksum.
pub const HEADER_SIZE: usize = 9;

pub const DEFAULT_MAX_PACKETS: usize = 1000;

/// A batch of trade records bound for another process.
///
/// # Example
///
/// ```
/// use trademem::codec::PacketBuffer;
/// use trademem::domain::{Side, TradeRecord, Venue};
///
/// let mut buffer = PacketBuffer::new(16);
/// buffer.push(TradeRecord::new(1, "BTC", Side::Buy, Venue::Binance, 1.0, 2.0, "a")).unwrap();
///
/// let wire = buffer.to_wire();
/// assert_eq!(wire.len(), 9 + 32);
/// assert_eq!(PacketBuffer::from_wire(&wire).unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PacketBuffer {
    records: Vec<TradeRecord>,
    max_packets: usize,
}

impl PacketBuffer {
    /// Create an empty buffer holding at most `max_packets` records.
    ///
    /// The frame count field is 16 bits, so capacity is clamped to 1..=65535.
    #[must_use]
    pub fn new(max_packets: usize) -> Self {
        let max_packets = max_packets.clamp(1, usize::from(u16::MAX));
        Self {
            records: Vec::with_capacity(max_packets.min(DEFAULT_MAX_PACKETS)),
            max_packets,
        }
    }

    /// Append a record.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BufferFull`] at capacity.
    pub fn push(&mut self, record: TradeRecord) -> Result<(), CodecError> {
        if self.is_full() {
            return Err(CodecError::BufferFull {
                capacity: self.max_packets,
            });
        }
        self.records.push(record);
        Ok(())
    }

    #[must_use]
    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.max_packets
    }

    #[must_use]
    pub const fn max_packets(&self) -> usize {
        self.max_packets
    }

    /// Take the buffered records, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<TradeRecord> {
        std::mem::take(&mut self.records)
    }

    /// Serialize with the builtin symbol table.
    #[must_use]
    pub fn to_wire(&self) -> Vec<u8> {
        self.to_wire_with(SymbolTable::builtin())
    }

    /// Serialize into one frame.
    #[must_use]
    pub fn to_wire_with(&self, symbols: &SymbolTable) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.records.len() * RECORD_SIZE);
        for record in &self.records {
            payload.extend_from_slice(&encode_with(record, symbols));
        }

        // `push` caps the record count at u16::MAX.
        let count = self.records.len() as u16;
        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&FRAME_MAGIC);
        out.push(FRAME_VERSION);
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&checksum(&payload).to_le_bytes());
        out.extend_from_slice(&payload);
        out
    }

    /// Decode one frame with the builtin symbol table.
    ///
    /// Validation covers more than the magic bytes: the version byte must be
    /// [`FRAME_VERSION`] and a complete payload must match its checksum.
    ///
    /// # Errors
    ///
    /// See [`PacketBuffer::from_wire_with`].
    pub fn from_wire(bytes: &[u8]) -> Result<Vec<TradeRecord>, CodecError> {
        Self::from_wire_with(bytes, SymbolTable::builtin())
    }

    /// Decode one frame.
    ///
    /// A frame shorter than its declared record count is not an error: the
    /// complete records are returned and the trailing partial one is dropped.
    /// This loses data silently from the caller's point of view, so a warning
    /// is logged with the number of records missing. The checksum covers the
    /// whole payload, so it is only verified on complete frames.
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidMagic`] if the frame does not start with [`FRAME_MAGIC`]
    /// - [`CodecError::InvalidLength`] if the header itself is cut short
    /// - [`CodecError::UnsupportedVersion`] for any version but [`FRAME_VERSION`]
    /// - [`CodecError::ChecksumMismatch`] if a complete frame fails its checksum
    /// - any record decode error
    pub fn from_wire_with(
        bytes: &[u8],
        symbols: &SymbolTable,
    ) -> Result<Vec<TradeRecord>, CodecError> {
        let header = parse_header(bytes)?;
        let payload = &bytes[HEADER_SIZE..];
        let declared_len = header.count * RECORD_SIZE;

        let payload = if payload.len() >= declared_len {
            let payload = &payload[..declared_len];
            let actual = checksum(payload);
            if actual != header.checksum {
                return Err(CodecError::ChecksumMismatch {
                    expected: header.checksum,
                    actual,
                });
            }
            payload
        } else {
            let complete = payload.len() / RECORD_SIZE;
            warn!(
                declared = header.count,
                complete,
                dropped = header.count - complete,
                "truncated trade frame, dropping incomplete records"
            );
            &payload[..complete * RECORD_SIZE]
        };

        let records = payload
            .chunks_exact(RECORD_SIZE)
            .map(|chunk| decode_with(chunk, symbols))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = records.len(), "decoded trade frame");
        Ok(records)
    }
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PACKETS)
    }
}

/// Decode a stream of back-to-back frames.
///
/// Each frame's extent comes from its header. A truncated final frame yields
/// its complete records, as with [`PacketBuffer::from_wire`].
///
/// # Errors
///
/// Fails on the first malformed frame.
pub fn read_frames(bytes: &[u8], symbols: &SymbolTable) -> Result<Vec<TradeRecord>, CodecError> {
    let mut records = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let header = parse_header(rest)?;
        let frame_len = (HEADER_SIZE + header.count * RECORD_SIZE).min(rest.len());
        records.extend(PacketBuffer::from_wire_with(&rest[..frame_len], symbols)?);
        rest = &rest[frame_len..];
    }
    Ok(records)
}

struct FrameHeader {
    count: usize,
    checksum: u32,
}

fn parse_header(bytes: &[u8]) -> Result<FrameHeader, CodecError> {
    if bytes.len() < FRAME_MAGIC.len() || bytes[..2] != FRAME_MAGIC {
        return Err(CodecError::InvalidMagic {
            found: bytes.iter().take(FRAME_MAGIC.len()).copied().collect(),
        });
    }
    if bytes.len() < HEADER_SIZE {
        return Err(CodecError::InvalidLength {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    if bytes[2] != FRAME_VERSION {
        return Err(CodecError::UnsupportedVersion { version: bytes[2] });
    }
    Ok(FrameHeader {
        count: usize::from(u16::from_le_bytes([bytes[3], bytes[4]])),
        checksum: u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]),
    })
}

/// Sum of all payload bytes modulo 2^32.
fn checksum(payload: &[u8]) -> u32 {
    payload
        .iter()
        .fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b)))
}
