//! Slot types for the signal system.
//!
//! A Slot wraps one connected callable together with its blocked flag and
//! its validity token. Slots are owned by exactly one signal; connection
//! handles only refer to them weakly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::functor::{Functor, FunctorId};
use super::token::ValidityToken;
use crate::error::{Result, SignalError};

/// One callable attached to a signal.
pub(crate) struct Slot<Args, R> {
    functor: Functor<Args, R>,

    /// Blocked slots are skipped during emission.
    blocked: AtomicBool,

    /// Shared with every connection handle for this slot.
    token: Arc<ValidityToken>,
}

impl<Args: 'static, R: 'static> Slot<Args, R> {
    pub(crate) fn new(functor: Functor<Args, R>, token: Arc<ValidityToken>) -> Self {
        Self {
            functor,
            blocked: AtomicBool::new(false),
            token,
        }
    }

    /// Invoke the wrapped callable.
    ///
    /// Fails with [`SignalError::BadInvocation`] if the callable is bound to
    /// an object that has been dropped; the slot is invalidated in that case.
    pub(crate) fn activate(&self, args: Args) -> Result<R> {
        self.try_activate(args).ok_or(SignalError::BadInvocation)
    }

    /// Invoke, returning `None` and invalidating the slot if its target is gone.
    pub(crate) fn try_activate(&self, args: Args) -> Option<R> {
        let result = self.functor.invoke(args);
        if result.is_none() && self.token.invalidate() {
            tracing::debug!(functor = ?self.functor.id(), "slot target dropped, invalidating");
        }
        result
    }
}

impl<Args, R> Slot<Args, R> {
    /// Block or unblock this slot.
    pub(crate) fn block(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::Release);
    }

    /// Check whether this slot is blocked.
    pub(crate) fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Acquire)
    }

    /// Identity of the wrapped callable.
    pub(crate) fn functor_id(&self) -> FunctorId {
        self.functor.id()
    }

    /// Check whether this slot's token is still valid.
    pub(crate) fn is_valid(&self) -> bool {
        self.token.is_valid()
    }

    pub(crate) fn token(&self) -> &Arc<ValidityToken> {
        &self.token
    }

    /// Sever this slot. Returns `true` if it was still valid.
    pub(crate) fn invalidate(&self) -> bool {
        self.token.invalidate()
    }
}

impl<Args, R> Drop for Slot<Args, R> {
    fn drop(&mut self) {
        self.token.invalidate();
    }
}

impl<Args, R> std::fmt::Debug for Slot<Args, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("functor", &self.functor.id())
            .field("blocked", &self.is_blocked())
            .field("valid", &self.is_valid())
            .finish()
    }
}
