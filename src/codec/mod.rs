//! Binary trade encoding and wire framing.
//!
//! - [`encode`] / [`decode`] - fixed 32-byte little-endian trade records
//! - [`PacketBuffer`] - batches of records behind a 9-byte frame header
//!
//! ```text
//! record:  timestamp:u32 | symbol:u16 | side:u8 | venue:u8 | price:f64 | quantity:f64 | id_hash:[u8; 8]
//! frame:   magic:[u8; 2] | version:u8 | count:u16 | checksum:u32 | record * count
//! ```

mod packet;
mod record;

pub use packet::{read_frames, PacketBuffer, DEFAULT_MAX_PACKETS, FRAME_MAGIC, FRAME_VERSION, HEADER_SIZE};
pub use record::{decode, decode_with, encode, encode_with, RECORD_SIZE};
