//! Trackable objects.
//!
//! An object that embeds a [`Trackable`] can have closures connected on its
//! behalf with [`Signal::connect_tracked`](crate::signal::Signal::connect_tracked).
//! When the object (and therefore the trackable) is dropped, every slot
//! connected that way is invalidated on the spot. Emission skips invalid
//! slots and the next sweep removes them from their signals, so a closure
//! never runs against an object that no longer exists.
//!
//! The trackable only holds weak references to tokens. It never keeps a
//! slot or a signal alive.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::token::ValidityToken;

/// Invalidates the slots tied to an object when that object is dropped.
#[derive(Default)]
pub struct Trackable {
    tokens: Mutex<Vec<Weak<ValidityToken>>>,
}

impl Trackable {
    /// Create a trackable with no slots attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a slot's token so it is invalidated with this object.
    pub(crate) fn track(&self, token: &Arc<ValidityToken>) {
        let mut tokens = self.tokens.lock();
        // Forget slots that were already severed elsewhere
        tokens.retain(|t| t.upgrade().is_some_and(|t| t.is_valid()));
        tokens.push(Arc::downgrade(token));
    }

    /// Number of slots currently tied to this object.
    pub fn tracked(&self) -> usize {
        self.tokens
            .lock()
            .iter()
            .filter(|t| t.upgrade().is_some_and(|t| t.is_valid()))
            .count()
    }

    /// Invalidate every slot tied to this object now.
    ///
    /// Returns the number of slots that were still live.
    pub fn untrack_all(&self) -> usize {
        let tokens = std::mem::take(&mut *self.tokens.lock());
        let severed = tokens
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|t| t.invalidate())
            .count();

        if severed > 0 {
            tracing::debug!(severed, "trackable severed its slots");
        }
        severed
    }
}

impl Drop for Trackable {
    fn drop(&mut self) {
        self.untrack_all();
    }
}

impl Clone for Trackable {
    /// A copy of an object is a different object: it starts untracked.
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Trackable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trackable")
            .field("tracked", &self.tracked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_invalidates_tracked_tokens() {
        let token = Arc::new(ValidityToken::new());
        let trackable = Trackable::new();
        trackable.track(&token);
        assert_eq!(trackable.tracked(), 1);

        drop(trackable);
        assert!(!token.is_valid());
    }

    #[test]
    fn untrack_all_counts_live_tokens() {
        let live = Arc::new(ValidityToken::new());
        let dead = Arc::new(ValidityToken::new());
        let trackable = Trackable::new();
        trackable.track(&live);
        trackable.track(&dead);

        dead.invalidate();
        assert_eq!(trackable.tracked(), 1);

        assert_eq!(trackable.untrack_all(), 1);
        assert!(!live.is_valid());
        assert_eq!(trackable.tracked(), 0);
    }

    #[test]
    fn clone_starts_untracked() {
        let token = Arc::new(ValidityToken::new());
        let trackable = Trackable::new();
        trackable.track(&token);

        let copy = trackable.clone();
        assert_eq!(copy.tracked(), 0);

        drop(copy);
        assert!(token.is_valid());
    }
}
