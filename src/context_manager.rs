//! ROHC (Robust Header Compression) decompression context management.
//!
//! Provides a `ContextManager` responsible for storing, retrieving, and
//! removing decompression contexts by CID. It operates on trait objects
//! (`Box<dyn RohcDecompressorContext>`) to remain independent of specific
//! ROHC profile implementations; context creation is delegated to a
//! [`DecompressorProfile`](crate::traits::DecompressorProfile).

use std::collections::HashMap;

use crate::error::{DecompressionError, RohcError};
use crate::traits::RohcDecompressorContext;
use crate::types::ContextId;

/// Manages decompression contexts indexed by CID.
#[derive(Debug, Default)]
pub struct ContextManager {
    /// Active decompressor contexts, keyed by their Context ID (CID).
    contexts: HashMap<ContextId, Box<dyn RohcDecompressorContext>>,
}

impl ContextManager {
    /// Creates a new, empty `ContextManager`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a decompression context, replacing any existing context for the
    /// same CID (a fresh IR legitimately re-establishes a flow).
    pub fn add_context(&mut self, cid: ContextId, context: Box<dyn RohcDecompressorContext>) {
        self.contexts.insert(cid, context);
    }

    /// Retrieves a mutable reference to a context by its CID.
    ///
    /// # Errors
    /// - `RohcError::Decompression(ContextNotFound)` - No context for this CID
    pub fn get_context_mut(
        &mut self,
        cid: ContextId,
    ) -> Result<&mut Box<dyn RohcDecompressorContext>, RohcError> {
        self.contexts.get_mut(&cid).ok_or(RohcError::Decompression(
            DecompressionError::ContextNotFound { cid },
        ))
    }

    /// Retrieves an immutable reference to a context by its CID.
    ///
    /// # Errors
    /// - `RohcError::Decompression(ContextNotFound)` - No context for this CID
    pub fn get_context(
        &self,
        cid: ContextId,
    ) -> Result<&dyn RohcDecompressorContext, RohcError> {
        self.contexts
            .get(&cid)
            .map(|boxed| boxed.as_ref())
            .ok_or(RohcError::Decompression(
                DecompressionError::ContextNotFound { cid },
            ))
    }

    /// Removes the context for `cid`, if any, and returns whether one existed.
    pub fn remove_context(&mut self, cid: ContextId) -> bool {
        self.contexts.remove(&cid).is_some()
    }

    /// Number of active contexts.
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Removes every context.
    pub fn clear(&mut self) {
        self.contexts.clear();
    }
}
