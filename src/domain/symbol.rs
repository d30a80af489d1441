//! Symbol name to wire index mapping.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::CodecError;

/// Wire index written for symbols that are not in the table.
pub const UNKNOWN_SYMBOL_INDEX: u16 = 0xFFFF;

/// Symbols every table starts with, in index order.
pub const BUILTIN_SYMBOLS: &[&str] = &[
    "BTC", "ETH", "SOL", "XRP", "DOGE", "AVAX", "LINK", "ARB", "OP", "SUI", "HYPE", "BNB", "ADA",
    "MATIC", "LTC", "APT",
];

/// Bidirectional symbol table.
///
/// Indices are assigned densely in registration order. Index `0xFFFF` is
/// reserved: an unmapped symbol encodes to it and decodes to
/// `"UNKNOWN_65535"`, which is lossy by design.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    names: Vec<String>,
    indices: HashMap<String, u16>,
}

impl SymbolTable {
    /// An empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            indices: HashMap::new(),
        }
    }

    /// A table holding [`BUILTIN_SYMBOLS`] plus `extra`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SymbolTableFull`] if the table would overflow.
    pub fn with_symbols<I, S>(extra: I) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for name in extra {
            table.register(name.as_ref())?;
        }
        Ok(table)
    }

    /// Shared read-only table of the builtin symbols.
    pub fn builtin() -> &'static SymbolTable {
        static BUILTIN: OnceLock<SymbolTable> = OnceLock::new();
        BUILTIN.get_or_init(SymbolTable::default)
    }

    /// Register a symbol, returning its index. Re-registering is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SymbolTableFull`] once every index below the
    /// sentinel is taken.
    pub fn register(&mut self, name: &str) -> Result<u16, CodecError> {
        if let Some(&index) = self.indices.get(name) {
            return Ok(index);
        }
        let index = u16::try_from(self.names.len())
            .ok()
            .filter(|&i| i < UNKNOWN_SYMBOL_INDEX)
            .ok_or(CodecError::SymbolTableFull)?;
        self.names.push(name.to_string());
        self.indices.insert(name.to_string(), index);
        Ok(index)
    }

    /// Wire index for `name`, or the sentinel when unmapped.
    #[must_use]
    pub fn index_of(&self, name: &str) -> u16 {
        self.indices
            .get(name)
            .copied()
            .unwrap_or(UNKNOWN_SYMBOL_INDEX)
    }

    /// Symbol name for `index`; unmapped indices yield `UNKNOWN_{index}`.
    #[must_use]
    pub fn name_of(&self, index: u16) -> String {
        self.names
            .get(usize::from(index))
            .cloned()
            .unwrap_or_else(|| format!("UNKNOWN_{index}"))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (index, name) in BUILTIN_SYMBOLS.iter().enumerate() {
            // Builtins are far below the sentinel.
            let index = index as u16;
            table.names.push((*name).to_string());
            table.indices.insert((*name).to_string(), index);
        }
        table
    }
}
