//! Core symbol types for the ink reasoning engine.
//!
//! Every entity and every verb is an interned atomic symbol. Entities are
//! [`Identifier`]s and relations are [`Verb`]s; the two live in separate
//! namespaces so that `loves` the verb and `loves` the entity never collide.
//! The [`AtomicSymbolAllocator`] provides thread-safe ID generation.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{SymbolError, SymbolResult};

/// Unique, niche-optimized identifier for an interned symbol.
///
/// Uses `NonZeroU64` so that `Option<SymbolId>` is the same size as `SymbolId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SymbolId(NonZeroU64);

impl SymbolId {
    /// Smallest possible ID, used as a lower range bound in ordered indexes.
    pub const MIN: SymbolId = SymbolId(NonZeroU64::MIN);
    /// Largest possible ID, used as an upper range bound in ordered indexes.
    pub const MAX: SymbolId = SymbolId(NonZeroU64::MAX);

    /// Create a `SymbolId` from a raw `u64`.
    ///
    /// Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(SymbolId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sym:{}", self.0)
    }
}

/// An interned entity: a subject, object, classification node or proposition tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Identifier(SymbolId);

impl Identifier {
    pub const MIN: Identifier = Identifier(SymbolId::MIN);
    pub const MAX: Identifier = Identifier(SymbolId::MAX);

    pub fn new(id: SymbolId) -> Self {
        Self(id)
    }

    pub fn id(self) -> SymbolId {
        self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "id:{}", self.0.get())
    }
}

/// An interned relation symbol. Must be declared in the
/// [`Lexicon`](crate::lexicon::Lexicon) before facts may use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Verb(SymbolId);

impl Verb {
    pub fn new(id: SymbolId) -> Self {
        Self(id)
    }

    pub fn id(self) -> SymbolId {
        self.0
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "verb:{}", self.0.get())
    }
}

/// Which namespace a symbol was interned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// An entity identifier.
    Identifier,
    /// A relation verb.
    Verb,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Identifier => write!(f, "Identifier"),
            SymbolKind::Verb => write!(f, "Verb"),
        }
    }
}

/// Thread-safe symbol ID allocator.
///
/// Produces monotonically increasing IDs starting from 1.
#[derive(Debug)]
pub struct AtomicSymbolAllocator {
    next: AtomicU64,
}

impl AtomicSymbolAllocator {
    /// Create a new allocator that starts from ID 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next symbol ID.
    ///
    /// Returns an error once the ID space is exhausted.
    pub fn next_id(&self, kind: SymbolKind) -> SymbolResult<SymbolId> {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        SymbolId::new(raw).ok_or(SymbolError::AllocatorExhausted { kind })
    }

    /// Return the next ID that *would* be allocated, without consuming it.
    pub fn peek_next(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for AtomicSymbolAllocator {
    fn default() -> Self {
        Self::new()
    }
}
