//! Typed errors for the engine's external boundaries.
//!
//! Everything that can fail at a boundary (purchases, storage, import,
//! content generation) is converted to one of these; nothing from outside
//! is allowed to panic into the tick loop.

use std::fmt;

/// A purchase that could not be completed. Always recoverable; the ledger
/// and upgrade counts are untouched when this is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseError {
    /// Total cost exceeds the available balance.
    InsufficientFunds { cost: f64, balance: f64 },
    /// The item is already at its maximum owned count.
    MaxedOut { item: &'static str },
    /// Requested quantity was zero.
    ZeroQuantity,
    /// Requested quantity exceeds the per-call bulk limit.
    BulkLimit { limit: u32 },
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseError::InsufficientFunds { cost, balance } => {
                write!(f, "insufficient funds: cost {cost} > balance {balance}")
            }
            PurchaseError::MaxedOut { item } => write!(f, "'{item}' is at max count"),
            PurchaseError::ZeroQuantity => write!(f, "purchase quantity must be at least 1"),
            PurchaseError::BulkLimit { limit } => {
                write!(f, "at most {limit} units can be bought per call")
            }
        }
    }
}

impl std::error::Error for PurchaseError {}

/// Failure talking to the durable key-value store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No storage backend is available (e.g. LocalStorage disabled).
    Unavailable,
    /// The backend rejected the operation.
    Backend(String),
    /// A record could not be serialized.
    Serialize(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "storage backend unavailable"),
            StoreError::Backend(msg) => write!(f, "storage backend error: {msg}"),
            StoreError::Serialize(msg) => write!(f, "record serialization failed: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Failure decoding an imported backup token. Existing saves are never
/// modified when this is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// The token was empty or whitespace.
    Empty,
    /// The token did not decode to a valid save bundle.
    Malformed(String),
    /// The bundle decoded but a record inside it failed validation.
    BadRecord { key: String, reason: String },
    /// The decoded bundle could not be written back to the store.
    Store(StoreError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Empty => write!(f, "import token is empty"),
            ImportError::Malformed(msg) => write!(f, "import token is malformed: {msg}"),
            ImportError::BadRecord { key, reason } => {
                write!(f, "record '{key}' in import token is invalid: {reason}")
            }
            ImportError::Store(e) => write!(f, "import failed writing to store: {e}"),
        }
    }
}

impl std::error::Error for ImportError {}

/// Failure from the remote flavor-text generator. Always recovered via the
/// deterministic offline pool.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorError {
    Timeout,
    MalformedResponse(String),
    MissingCredential,
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::Timeout => write!(f, "content generator timed out"),
            GeneratorError::MalformedResponse(msg) => {
                write!(f, "content generator returned malformed response: {msg}")
            }
            GeneratorError::MissingCredential => write!(f, "content generator credential missing"),
        }
    }
}

impl std::error::Error for GeneratorError {}
