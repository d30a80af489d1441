use thiserror::Error;

/// Binary codec and wire-frame errors.
///
/// Malformed transport input fails fast with one of these. Truncated frames
/// are not an error; see [`PacketBuffer::from_wire`](crate::codec::PacketBuffer::from_wire).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid frame magic: {found:02x?}")]
    InvalidMagic { found: Vec<u8> },

    #[error("unsupported frame version {version}")]
    UnsupportedVersion { version: u8 },

    #[error("frame checksum mismatch: header says {expected:#010x}, payload sums to {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("invalid {field} byte: {value}")]
    InvalidField { field: &'static str, value: u8 },

    #[error("packet buffer full ({capacity} records)")]
    BufferFull { capacity: usize },

    #[error("symbol table full")]
    SymbolTableFull,
}

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
