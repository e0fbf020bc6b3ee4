//! Validity Token
//!
//! A token is a shared flag that answers one question: is this attachment
//! still live? Exactly one token is created per slot when it is connected.
//! The slot and every connection handle referring to it share the token
//! through an `Arc`, so a handle can keep asking after the slot itself has
//! been freed.
//!
//! The flag starts valid and flips to invalid exactly once. It never flips
//! back.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared liveness flag for one slot.
#[derive(Debug)]
pub struct ValidityToken {
    valid: AtomicBool,
}

impl ValidityToken {
    /// Create a new token in the valid state.
    pub(crate) fn new() -> Self {
        Self {
            valid: AtomicBool::new(true),
        }
    }

    /// Check whether the attachment is still live.
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// Mark the attachment as severed.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub(crate) fn invalidate(&self) -> bool {
        self.valid.swap(false, Ordering::AcqRel)
    }
}
