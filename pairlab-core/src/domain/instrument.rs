//! Instrument identity and the traded universe.
//!
//! A run trades at most two instruments. Per-instrument state everywhere in the
//! engine is addressed by [`InstrumentId`], an index into the [`Universe`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of instruments in a universe.
pub const MAX_INSTRUMENTS: usize = 2;

/// Index of an instrument inside its [`Universe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentId(pub usize);

impl InstrumentId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum UniverseError {
    #[error("universe must contain 1..={MAX_INSTRUMENTS} symbols, got {0}")]
    BadSize(usize),

    #[error("empty symbol in universe")]
    EmptySymbol,

    #[error("duplicate symbol in universe: {0}")]
    Duplicate(String),
}

/// Ordered set of one or two symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    symbols: Vec<String>,
}

impl Universe {
    pub fn new<S: AsRef<str>>(symbols: &[S]) -> Result<Self, UniverseError> {
        if symbols.is_empty() || symbols.len() > MAX_INSTRUMENTS {
            return Err(UniverseError::BadSize(symbols.len()));
        }
        let mut out: Vec<String> = Vec::with_capacity(symbols.len());
        for s in symbols {
            let s = s.as_ref().trim();
            if s.is_empty() {
                return Err(UniverseError::EmptySymbol);
            }
            if out.iter().any(|existing| existing == s) {
                return Err(UniverseError::Duplicate(s.to_string()));
            }
            out.push(s.to_string());
        }
        Ok(Self { symbols: out })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn symbol(&self, id: InstrumentId) -> &str {
        &self.symbols[id.0]
    }

    pub fn id_of(&self, symbol: &str) -> Option<InstrumentId> {
        self.symbols.iter().position(|s| s == symbol).map(InstrumentId)
    }

    pub fn ids(&self) -> impl Iterator<Item = InstrumentId> {
        (0..self.symbols.len()).map(InstrumentId)
    }
}
