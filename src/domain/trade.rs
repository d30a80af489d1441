//! Trade event types.
//!
//! [`TradeRecord`] is the canonical in-memory trade event shared between the
//! venue execution services. It is immutable once built and maps one-to-one
//! onto the 32-byte binary layout in [`crate::codec`].
//!
//! # Examples
//!
//! ```
//! use trademem::domain::{Side, TradeRecord, Venue};
//!
//! let trade = TradeRecord::new(1_700_000_000, "SOL", Side::Buy, Venue::Binance, 142.5, 3.0, "fill-81");
//!
//! assert_eq!(trade.cache_key(), "SOL:1700000000");
//! assert_ne!(trade.id_hash(), [0u8; 8]);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Order side as reported by a venue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    #[default]
    Buy,
    Sell,
    Long,
    Short,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Buy, Side::Sell, Side::Long, Side::Short];

    /// Wire byte for this side.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Buy => 0,
            Self::Sell => 1,
            Self::Long => 2,
            Self::Short => 3,
        }
    }

    /// Inverse of [`Side::as_byte`].
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Buy),
            1 => Some(Self::Sell),
            2 => Some(Self::Long),
            3 => Some(Self::Short),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Long => "LONG",
            Self::Short => "SHORT",
        }
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|side| side.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trading venues served by the platform.
///
/// Declaration order is the wire encoding; the first venue is the fallback
/// for unrecognised venue names during ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    #[default]
    Hyperliquid,
    Binance,
    Coinbase,
    Kraken,
    Bybit,
    Okx,
    Polymarket,
    Kalshi,
}

impl Venue {
    pub const ALL: [Venue; 8] = [
        Venue::Hyperliquid,
        Venue::Binance,
        Venue::Coinbase,
        Venue::Kraken,
        Venue::Bybit,
        Venue::Okx,
        Venue::Polymarket,
        Venue::Kalshi,
    ];

    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(usize::from(byte)).copied()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hyperliquid => "hyperliquid",
            Self::Binance => "binance",
            Self::Coinbase => "coinbase",
            Self::Kraken => "kraken",
            Self::Bybit => "bybit",
            Self::Okx => "okx",
            Self::Polymarket => "polymarket",
            Self::Kalshi => "kalshi",
        }
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|venue| venue.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Truncated SHA-256 of a producer-assigned trade id.
///
/// Only these 8 bytes survive ingestion. They are enough to deduplicate
/// replayed fills but the original id cannot be recovered from them.
pub fn hash_trade_id(id: &str) -> [u8; 8] {
    let digest = Sha256::digest(id.as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// A single trade event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Unix seconds. Encoded modulo 2^32.
    pub timestamp: i64,
    pub symbol: String,
    pub side: Side,
    pub venue: Venue,
    pub price: f64,
    pub quantity: f64,
    #[serde(with = "hex_hash")]
    id_hash: [u8; 8],
}

impl TradeRecord {
    /// Build a record, hashing `id` for deduplication.
    #[must_use]
    pub fn new(
        timestamp: i64,
        symbol: impl Into<String>,
        side: Side,
        venue: Venue,
        price: f64,
        quantity: f64,
        id: &str,
    ) -> Self {
        Self::from_parts(
            timestamp,
            symbol,
            side,
            venue,
            price,
            quantity,
            hash_trade_id(id),
        )
    }

    /// Build a record from an already hashed id, as the decoder does.
    #[must_use]
    pub fn from_parts(
        timestamp: i64,
        symbol: impl Into<String>,
        side: Side,
        venue: Venue,
        price: f64,
        quantity: f64,
        id_hash: [u8; 8],
    ) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            side,
            venue,
            price,
            quantity,
            id_hash,
        }
    }

    #[must_use]
    pub const fn id_hash(&self) -> [u8; 8] {
        self.id_hash
    }

    /// True when this record was built from `id`.
    #[must_use]
    pub fn matches_id(&self, id: &str) -> bool {
        self.id_hash == hash_trade_id(id)
    }

    /// Key under which the trade-history expert stores this record.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.symbol, self.timestamp)
    }

    /// Notional value (price times quantity).
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.price * self.quantity
    }
}

mod hex_hash {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &[u8; 8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 8], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("id_hash must be 8 bytes"))
    }
}
