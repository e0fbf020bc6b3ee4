//! Connection handles.
//!
//! A [`Connection`] is what `connect` returns. It holds three things: a weak
//! reference to the slot, a weak reference to the owning signal, and a
//! strong reference to the slot's validity token. It never keeps the slot
//! or the signal alive, and whether it is connected is decided by the token
//! alone.
//!
//! A [`ScopedConnection`] disconnects its slot when dropped, unless the
//! plain connection was handed back first with
//! [`release`](ScopedConnection::release).

use std::ops::Deref;
use std::sync::{Arc, Weak};

use super::signal::SignalCore;
use crate::error::{Result, SignalError};
use crate::slot::{Slot, ValidityToken};

/// Handle to one slot attached to a signal.
///
/// Checking [`is_connected`](Self::is_connected) and then acting on the
/// handle is two separate steps. Another thread may disconnect the slot in
/// between, so check right before acting rather than caching the answer.
pub struct Connection<Args, R = ()> {
    slot: Weak<Slot<Args, R>>,
    signal: Weak<SignalCore<Args, R>>,
    token: Option<Arc<ValidityToken>>,
}

impl<Args, R> Connection<Args, R> {
    pub(crate) fn new(slot: &Arc<Slot<Args, R>>, signal: &Arc<SignalCore<Args, R>>) -> Self {
        Self {
            slot: Arc::downgrade(slot),
            signal: Arc::downgrade(signal),
            token: Some(Arc::clone(slot.token())),
        }
    }

    /// Check whether the slot is still attached.
    pub fn is_connected(&self) -> bool {
        self.token.as_ref().is_some_and(|token| token.is_valid())
    }

    /// Block or unblock the slot. Does nothing if disconnected.
    pub fn block(&self, blocked: bool) {
        if let Some(slot) = self.live_slot() {
            slot.block(blocked);
        }
    }

    /// Unblock the slot. Does nothing if disconnected.
    pub fn unblock(&self) {
        self.block(false);
    }

    /// Check whether the slot is blocked. A disconnected slot counts as
    /// blocked.
    pub fn is_blocked(&self) -> bool {
        self.live_slot().map_or(true, |slot| slot.is_blocked())
    }

    /// Exchange the contents of two handles.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    pub(crate) fn token(&self) -> Option<&Arc<ValidityToken>> {
        self.token.as_ref()
    }

    pub(crate) fn slot(&self) -> Option<Arc<Slot<Args, R>>> {
        self.slot.upgrade()
    }

    pub(crate) fn belongs_to(&self, signal: &Arc<SignalCore<Args, R>>) -> bool {
        std::ptr::eq(self.signal.as_ptr(), Arc::as_ptr(signal))
    }

    fn live_slot(&self) -> Option<Arc<Slot<Args, R>>> {
        if self.is_connected() {
            self.slot.upgrade()
        } else {
            None
        }
    }
}

impl<Args: 'static, R: 'static> Connection<Args, R> {
    /// Sever the connection. Does nothing if already disconnected.
    pub fn disconnect(&self) {
        if !self.is_connected() {
            return;
        }
        if let (Some(signal), Some(slot)) = (self.signal.upgrade(), self.slot.upgrade()) {
            signal.remove_slot(&slot);
        }
    }

    /// Invoke the slot directly, bypassing the signal.
    ///
    /// Fails with [`SignalError::NotConnected`] if the connection has been
    /// severed, and with [`SignalError::BadInvocation`] if the slot's bound
    /// object is gone. Blocking does not apply to direct activation.
    pub fn activate(&self, args: Args) -> Result<R> {
        self.live_slot()
            .ok_or(SignalError::NotConnected)?
            .activate(args)
    }
}

impl<Args, R> Default for Connection<Args, R> {
    /// A handle that was never connected.
    fn default() -> Self {
        Self {
            slot: Weak::new(),
            signal: Weak::new(),
            token: None,
        }
    }
}

impl<Args, R> Clone for Connection<Args, R> {
    fn clone(&self) -> Self {
        Self {
            slot: Weak::clone(&self.slot),
            signal: Weak::clone(&self.signal),
            token: self.token.clone(),
        }
    }
}

impl<Args, R> PartialEq for Connection<Args, R> {
    /// Two handles are equal when they share the same token.
    fn eq(&self, other: &Self) -> bool {
        match (&self.token, &other.token) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<Args, R> Eq for Connection<Args, R> {}

impl<Args, R> std::fmt::Debug for Connection<Args, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("connected", &self.is_connected())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

/// A connection that disconnects its slot when dropped.
///
/// # Example
///
/// ```rust
/// use sigslot_core::signal::{ScopedConnection, Signal};
///
/// let signal: Signal<()> = Signal::new();
/// {
///     let _scoped = ScopedConnection::from(signal.connect(|| {}).unwrap());
///     assert_eq!(signal.len(), 1);
/// }
/// assert!(signal.is_empty());
/// ```
pub struct ScopedConnection<Args: 'static, R: 'static = ()> {
    connection: Connection<Args, R>,
}

impl<Args: 'static, R: 'static> ScopedConnection<Args, R> {
    /// Take ownership of `connection`'s lifetime.
    pub fn new(connection: Connection<Args, R>) -> Self {
        Self { connection }
    }

    /// Replace the held connection, disconnecting the previous one.
    ///
    /// Assigning the connection already held is a no-op.
    pub fn assign(&mut self, connection: Connection<Args, R>) {
        if self.connection == connection {
            return;
        }
        let previous = std::mem::replace(&mut self.connection, connection);
        previous.disconnect();
    }

    /// Hand back the plain connection without disconnecting it.
    ///
    /// This handle is left empty, so dropping it afterwards does nothing.
    pub fn release(&mut self) -> Connection<Args, R> {
        std::mem::take(&mut self.connection)
    }
}

impl<Args: 'static, R: 'static> From<Connection<Args, R>> for ScopedConnection<Args, R> {
    fn from(connection: Connection<Args, R>) -> Self {
        Self::new(connection)
    }
}

impl<Args: 'static, R: 'static> Default for ScopedConnection<Args, R> {
    fn default() -> Self {
        Self::new(Connection::default())
    }
}

impl<Args: 'static, R: 'static> Deref for ScopedConnection<Args, R> {
    type Target = Connection<Args, R>;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl<Args: 'static, R: 'static> Drop for ScopedConnection<Args, R> {
    fn drop(&mut self) {
        self.connection.disconnect();
    }
}

impl<Args: 'static, R: 'static> std::fmt::Debug for ScopedConnection<Args, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ScopedConnection")
            .field(&self.connection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use std::sync::atomic::{AtomicI32, Ordering};

    fn counting_signal() -> (Signal<()>, Arc<AtomicI32>) {
        (Signal::new(), Arc::new(AtomicI32::new(0)))
    }

    #[test]
    fn disconnect_stops_delivery() {
        let (signal, calls) = counting_signal();
        let calls_clone = calls.clone();
        let connection = signal
            .connect(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert!(connection.is_connected());
        connection.disconnect();
        assert!(!connection.is_connected());

        signal.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!connection.is_connected());

        // Second disconnect is a no-op
        connection.disconnect();
        assert!(signal.is_empty());
    }

    #[test]
    fn block_through_connection() {
        let (signal, calls) = counting_signal();
        let calls_clone = calls.clone();
        let connection = signal
            .connect(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        connection.block(true);
        assert!(connection.is_blocked());
        signal.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        connection.unblock();
        signal.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disconnected_handle_reports_blocked_and_ignores_block() {
        let connection: Connection<()> = Connection::default();
        assert!(!connection.is_connected());
        assert!(connection.is_blocked());

        connection.block(false);
        assert!(connection.is_blocked());
    }

    #[test]
    fn activate_requires_connection() {
        let signal: Signal<(i32, i32), i32> = Signal::new();
        let connection = signal.connect(|a: i32, b: i32| a - b).unwrap();

        assert_eq!(connection.activate((10, 4)), Ok(6));

        connection.disconnect();
        assert_eq!(connection.activate((10, 4)), Err(SignalError::NotConnected));
    }

    #[test]
    fn equality_follows_token() {
        let signal: Signal<()> = Signal::new();
        let a = signal.connect(|| {}).unwrap();
        let b = signal.connect(|| {}).unwrap();
        let a_copy = a.clone();

        assert_eq!(a, a_copy);
        assert_ne!(a, b);
        assert_eq!(Connection::<()>::default(), Connection::default());
    }

    #[test]
    fn swap_exchanges_handles() {
        let signal: Signal<()> = Signal::new();
        let mut a = signal.connect(|| {}).unwrap();
        let mut b = Connection::default();
        let original = a.clone();

        a.swap(&mut b);
        assert!(!a.is_connected());
        assert!(b.is_connected());
        assert_eq!(b, original);
    }

    #[test]
    fn scoped_connection_disconnects_on_drop() {
        let signal: Signal<()> = Signal::new();
        let connection = signal.connect(|| {}).unwrap();

        {
            let _scoped = ScopedConnection::from(connection.clone());
            assert!(connection.is_connected());
        }

        assert!(!connection.is_connected());
        assert!(signal.is_empty());
    }

    #[test]
    fn released_connection_survives_scope() {
        let signal: Signal<()> = Signal::new();

        let released = {
            let mut scoped = ScopedConnection::from(signal.connect(|| {}).unwrap());
            let released = scoped.release();
            assert!(!scoped.is_connected());
            released
        };

        assert!(released.is_connected());
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn assign_disconnects_previous() {
        let signal: Signal<()> = Signal::new();
        let first = signal.connect(|| {}).unwrap();
        let second = signal.connect(|| {}).unwrap();

        let mut scoped = ScopedConnection::from(first.clone());
        scoped.assign(first.clone());
        assert!(first.is_connected());

        scoped.assign(second.clone());
        assert!(!first.is_connected());
        assert!(second.is_connected());

        drop(scoped);
        assert!(!second.is_connected());
    }
}
