//! Signal Implementation
//!
//! A Signal is an event source. It keeps an ordered list of slots and
//! invokes every eligible one when emitted.
//!
//! # How Emission Works
//!
//! 1. If the signal is blocked, return at once. No slot is touched.
//!
//! 2. Sweep out slots whose validity token has already been invalidated.
//!
//! 3. Copy the slot list under the lock, then release the lock.
//!
//! 4. Walk the copy in connection order (or reversed), skipping slots that
//!    are blocked or were invalidated after the copy was taken, and invoke
//!    the rest with a clone of the arguments.
//!
//! Because the walk runs over a copy, a slot may connect or disconnect
//! itself or a sibling from inside its own invocation. The live list
//! changes; the pass in progress does not, except that a sibling severed
//! mid-pass is skipped when its turn comes.
//!
//! # Thread Safety
//!
//! The slot list sits behind a re-entrant mutex, held while connecting,
//! disconnecting, clearing, sweeping and copying. It is never held while a
//! slot runs. Re-entrancy covers the remaining case where dropping a
//! removed slot's callable disconnects something from the same signal on
//! the same thread.
//!
//! # Failures
//!
//! A panicking slot halts the pass and unwinds to the caller of `emit`.
//! Slots returning `Result` can use [`Signal::try_emit`], which stops at the
//! first `Err` and hands it back untouched. Either way the signal is left
//! exactly as it was.

use std::cell::RefCell;
use std::fmt::Debug;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::ReentrantMutex;
use smallvec::SmallVec;

use super::combiner::Combiner;
use super::connection::Connection;
use crate::error::{Result, SignalError};
use crate::slot::{
    method_id, FnPtr, Functor, FunctorId, Handler, MethodPtr, Slot, Trackable, ValidityToken,
};

type SlotList<Args, R> = Vec<Arc<Slot<Args, R>>>;

/// Slots copied out for one emission pass.
type Snapshot<Args, R> = SmallVec<[Arc<Slot<Args, R>>; 8]>;

/// Direction of an emission pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Order {
    Forward,
    Reverse,
}

/// Shared state behind a [`Signal`].
///
/// Connections refer to it weakly so they can reach the slot list without
/// keeping the signal alive.
pub(crate) struct SignalCore<Args, R> {
    slots: ReentrantMutex<RefCell<SlotList<Args, R>>>,
    blocked: AtomicBool,
}

impl<Args: 'static, R: 'static> SignalCore<Args, R> {
    fn new() -> Self {
        Self {
            slots: ReentrantMutex::new(RefCell::new(Vec::new())),
            blocked: AtomicBool::new(false),
        }
    }

    /// Store a new slot and hand back its connection.
    ///
    /// Space is reserved before the token and slot exist, so a failed
    /// reservation leaves nothing behind.
    fn attach(self: &Arc<Self>, functor: Functor<Args, R>) -> Result<Connection<Args, R>> {
        let id = functor.id();
        let guard = self.slots.lock();
        let mut slots = guard.borrow_mut();

        if slots.try_reserve(1).is_err() {
            return Err(SignalError::ConnectionFailed("could not reserve slot storage"));
        }

        let token = Arc::new(ValidityToken::new());
        let slot = Arc::new(Slot::new(functor, token));
        slots.push(Arc::clone(&slot));

        tracing::trace!(functor = ?id, slots = slots.len(), "slot connected");
        Ok(Connection::new(&slot, self))
    }

    /// Remove one specific slot. Returns `false` if it is not in this list.
    pub(crate) fn remove_slot(&self, slot: &Arc<Slot<Args, R>>) -> bool {
        let removed = {
            let guard = self.slots.lock();
            let mut slots = guard.borrow_mut();
            let position = slots.iter().position(|s| Arc::ptr_eq(s, slot));
            let removed = position.map(|index| slots.remove(index));
            if let Some(slot) = &removed {
                slot.invalidate();
            }
            removed
        };

        if let Some(slot) = &removed {
            tracing::trace!(functor = ?slot.functor_id(), "slot disconnected");
        }
        // The slot itself is dropped here, outside the list borrow
        removed.is_some()
    }

    /// Remove slots matching `predicate`, stopping after the first unless
    /// `all` is set. Removed slots are dropped after the list borrow ends.
    fn remove_where<P>(&self, mut predicate: P, all: bool) -> Vec<Arc<Slot<Args, R>>>
    where
        P: FnMut(&Slot<Args, R>) -> bool,
    {
        let guard = self.slots.lock();
        let mut slots = guard.borrow_mut();
        let mut removed = Vec::new();

        let mut index = 0;
        while index < slots.len() {
            if predicate(&slots[index]) {
                let slot = slots.remove(index);
                slot.invalidate();
                removed.push(slot);
                if !all {
                    break;
                }
            } else {
                index += 1;
            }
        }

        removed
    }

    fn disconnect_matching(&self, id: FunctorId, all: bool) -> usize {
        let removed = self.remove_where(|slot| slot.is_valid() && slot.functor_id().matches(&id), all);
        tracing::trace!(functor = ?id, removed = removed.len(), "disconnected by identity");
        removed.len()
    }

    fn remove_invalidated(&self) -> usize {
        let removed = self.remove_where(|slot| !slot.is_valid(), true);
        if !removed.is_empty() {
            tracing::debug!(removed = removed.len(), "swept invalidated slots");
        }
        removed.len()
    }

    fn clear(&self) -> usize {
        let removed = {
            let guard = self.slots.lock();
            let mut slots = guard.borrow_mut();
            let removed = std::mem::take(&mut *slots);
            for slot in &removed {
                slot.invalidate();
            }
            removed
        };

        tracing::debug!(removed = removed.len(), "signal cleared");
        removed.len()
    }

    fn len(&self) -> usize {
        self.slots.lock().borrow().len()
    }

    fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Acquire)
    }

    fn block(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::Release);
    }

    /// Sweep, then copy the slot list for one pass.
    ///
    /// Returns `None` if the signal is blocked.
    fn snapshot(&self) -> Option<Snapshot<Args, R>> {
        if self.is_blocked() {
            tracing::trace!("emission skipped, signal blocked");
            return None;
        }

        let guard = self.slots.lock();
        // Re-enters the lock we already hold
        self.remove_invalidated();
        let slots = guard.borrow();
        let snapshot: Snapshot<Args, R> = slots.iter().cloned().collect();
        Some(snapshot)
    }

    /// Run one emission pass, feeding each slot's return value to `sink`.
    ///
    /// The pass stops early when `sink` breaks. Returns `false` if the
    /// signal was blocked and nothing ran.
    pub(crate) fn traverse<F>(&self, args: Args, order: Order, mut sink: F) -> bool
    where
        Args: Clone,
        F: FnMut(R) -> ControlFlow<()>,
    {
        let Some(snapshot) = self.snapshot() else {
            return false;
        };

        let mut visit = |slot: &Arc<Slot<Args, R>>| {
            if !slot.is_valid() || slot.is_blocked() {
                return ControlFlow::Continue(());
            }
            match slot.try_activate(args.clone()) {
                Some(value) => sink(value),
                None => ControlFlow::Continue(()),
            }
        };

        let _ = match order {
            Order::Forward => snapshot.iter().try_for_each(&mut visit),
            Order::Reverse => snapshot.iter().rev().try_for_each(&mut visit),
        };
        true
    }
}

impl<Args, R> Drop for SignalCore<Args, R> {
    fn drop(&mut self) {
        for slot in self.slots.get_mut().get_mut().iter() {
            slot.invalidate();
        }
    }
}

/// A typed event source with an ordered list of connected slots.
///
/// # Type Parameters
///
/// - `Args`: the argument tuple slots are called with: `()`, `(A,)`,
///   `(A, B)` and so on up to eight elements.
/// - `R`: the slots' return type. Plain emission discards it.
///
/// # Example
///
/// ```rust
/// use sigslot_core::signal::Signal;
///
/// let signal: Signal<(i32,), i32> = Signal::new();
/// signal.connect(|x: i32| x + 1).unwrap();
/// signal.connect(|x: i32| x * 2).unwrap();
///
/// assert_eq!(signal.collected().emit((5,)), vec![6, 10]);
/// assert_eq!(signal.collected().emit_reverse((5,)), vec![10, 6]);
/// ```
///
/// # Copy and Move
///
/// Cloning a signal yields a new, empty signal: connections belong to one
/// signal instance. Moving keeps everything; `std::mem::take` moves the
/// slots and blocked flag out and leaves an empty signal behind.
pub struct Signal<Args, R = ()> {
    core: Arc<SignalCore<Args, R>>,
}

impl<Args: 'static, R: 'static> Signal<Args, R> {
    /// Create a new signal with no slots.
    pub fn new() -> Self {
        Self {
            core: Arc::new(SignalCore::new()),
        }
    }

    /// Connect a closure or other function object.
    ///
    /// Closures have no identity, so they can only be disconnected through
    /// the returned connection, [`clear`](Self::clear), or a [`Trackable`].
    pub fn connect<H>(&self, handler: H) -> Result<Connection<Args, R>>
    where
        H: Handler<Args, R>,
    {
        self.core.attach(Functor::from_handler(handler))
    }

    /// Connect a plain function pointer.
    ///
    /// The slot can later be removed with [`disconnect_fn`](Self::disconnect_fn).
    pub fn connect_fn<P>(&self, function: P) -> Result<Connection<Args, R>>
    where
        P: FnPtr<Args, R>,
    {
        self.core.attach(Functor::from_fn(function))
    }

    /// Connect `method` bound to `object`.
    ///
    /// The slot holds the object weakly. Once the object is dropped the
    /// slot is invalidated the next time it would run.
    pub fn connect_method<T, M>(&self, object: &Arc<T>, method: M) -> Result<Connection<Args, R>>
    where
        T: Send + Sync + 'static,
        M: MethodPtr<T, Args, R>,
    {
        self.core
            .attach(Functor::from_method(Arc::downgrade(object), method))
    }

    /// Connect `method` bound to a weakly held object.
    ///
    /// Fails with [`SignalError::InvalidArgument`] if the object is already
    /// gone.
    pub fn connect_weak<T, M>(&self, object: &Weak<T>, method: M) -> Result<Connection<Args, R>>
    where
        T: Send + Sync + 'static,
        M: MethodPtr<T, Args, R>,
    {
        if object.strong_count() == 0 {
            return Err(SignalError::InvalidArgument("object already dropped"));
        }
        self.core.attach(Functor::from_method(object.clone(), method))
    }

    /// Connect a closure whose lifetime is tied to `trackable`.
    ///
    /// Dropping the trackable severs the connection.
    pub fn connect_tracked<H>(&self, trackable: &Trackable, handler: H) -> Result<Connection<Args, R>>
    where
        H: Handler<Args, R>,
    {
        let connection = self.connect(handler)?;
        if let Some(token) = connection.token() {
            trackable.track(token);
        }
        Ok(connection)
    }

    /// Disconnect the slot `connection` refers to.
    ///
    /// Returns `false` if the connection is already severed or belongs to a
    /// different signal.
    pub fn disconnect(&self, connection: &Connection<Args, R>) -> bool {
        if !connection.belongs_to(&self.core) {
            return false;
        }
        match connection.slot() {
            Some(slot) => self.core.remove_slot(&slot),
            None => false,
        }
    }

    /// Disconnect slots connected with [`connect_fn`](Self::connect_fn).
    ///
    /// Removes the first match in connection order, or every match if `all`
    /// is set. Returns the number of slots removed.
    pub fn disconnect_fn<P>(&self, function: P, all: bool) -> usize
    where
        P: FnPtr<Args, R>,
    {
        self.core
            .disconnect_matching(FunctorId::Function(function.addr()), all)
    }

    /// Disconnect slots connected with `method` bound to `object`.
    ///
    /// Removes the first match in connection order, or every match if `all`
    /// is set. Returns the number of slots removed.
    pub fn disconnect_method<T, M>(&self, object: &Arc<T>, method: M, all: bool) -> usize
    where
        M: MethodPtr<T, Args, R>,
    {
        let id = method_id(&Arc::downgrade(object), method);
        self.core.disconnect_matching(id, all)
    }

    /// Remove every slot whose token has been invalidated.
    ///
    /// Emission does this on its own; call it directly to prune slots bound
    /// to objects that have gone away without emitting.
    pub fn remove_invalidated(&self) -> usize {
        self.core.remove_invalidated()
    }

    /// Remove every slot, valid or not. Returns the number removed.
    pub fn clear(&self) -> usize {
        self.core.clear()
    }

    /// Number of slots in the list, including invalidated ones not yet swept.
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Check whether the slot list is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block or unblock the whole signal.
    pub fn block(&self, blocked: bool) {
        self.core.block(blocked);
    }

    /// Unblock the signal.
    pub fn unblock(&self) {
        self.core.block(false);
    }

    /// Check whether the signal is blocked.
    pub fn is_blocked(&self) -> bool {
        self.core.is_blocked()
    }

    /// Get a handle that can reach this signal without keeping it alive.
    pub fn downgrade(&self) -> WeakSignal<Args, R> {
        WeakSignal {
            core: Arc::downgrade(&self.core),
        }
    }

    pub(crate) fn core(&self) -> &Arc<SignalCore<Args, R>> {
        &self.core
    }
}

impl<Args: Clone + 'static, R: 'static> Signal<Args, R> {
    /// Invoke every eligible slot in connection order, discarding results.
    pub fn emit(&self, args: Args) {
        self.core
            .traverse(args, Order::Forward, |_| ControlFlow::Continue(()));
    }

    /// Invoke every eligible slot in reverse connection order.
    pub fn emit_reverse(&self, args: Args) {
        self.core
            .traverse(args, Order::Reverse, |_| ControlFlow::Continue(()));
    }

    /// Emit in connection order, folding each result into `combiner`.
    ///
    /// Returns `combiner.value()`. A blocked signal leaves the combiner
    /// untouched.
    pub fn emit_with<C>(&self, args: Args, combiner: &mut C) -> C::Output
    where
        C: Combiner<R>,
    {
        self.fold(args, Order::Forward, combiner)
    }

    /// Emit in reverse connection order, folding each result into `combiner`.
    pub fn emit_reverse_with<C>(&self, args: Args, combiner: &mut C) -> C::Output
    where
        C: Combiner<R>,
    {
        self.fold(args, Order::Reverse, combiner)
    }

    fn fold<C>(&self, args: Args, order: Order, combiner: &mut C) -> C::Output
    where
        C: Combiner<R>,
    {
        self.core.traverse(args, order, |value| {
            combiner.combine(value);
            ControlFlow::Continue(())
        });
        combiner.value()
    }

    /// Emission that gathers every slot's return value in call order.
    ///
    /// Only available when `R` carries data; asking for collected results
    /// of a `()` signal fails to compile.
    pub fn collected(&self) -> Collected<'_, Args, R> {
        #[allow(clippy::let_unit_value)]
        let () = AssertCollectable::<R>::OK;
        Collected { signal: self }
    }
}

impl<Args, T, E> Signal<Args, std::result::Result<T, E>>
where
    Args: Clone + 'static,
    T: 'static,
    E: 'static,
{
    /// Emit in connection order, stopping at the first slot that fails.
    ///
    /// The failing slot's error is returned as is; later slots do not run.
    pub fn try_emit(&self, args: Args) -> std::result::Result<(), E> {
        self.try_fold(args, Order::Forward)
    }

    /// Emit in reverse connection order, stopping at the first failure.
    pub fn try_emit_reverse(&self, args: Args) -> std::result::Result<(), E> {
        self.try_fold(args, Order::Reverse)
    }

    fn try_fold(&self, args: Args, order: Order) -> std::result::Result<(), E> {
        let mut failure = None;
        self.core.traverse(args, order, |result| match result {
            Ok(_) => ControlFlow::Continue(()),
            Err(err) => {
                failure = Some(err);
                ControlFlow::Break(())
            }
        });
        failure.map_or(Ok(()), Err)
    }
}

/// Compile-time guard: collecting `()` results is meaningless.
struct AssertCollectable<R>(std::marker::PhantomData<R>);

impl<R> AssertCollectable<R> {
    const OK: () = assert!(
        std::mem::size_of::<R>() != 0,
        "collected emission requires a return type that carries data"
    );
}

/// Collected-results view of a signal, from [`Signal::collected`].
pub struct Collected<'a, Args, R> {
    signal: &'a Signal<Args, R>,
}

impl<Args: Clone + 'static, R: 'static> Collected<'_, Args, R> {
    /// Emit in connection order and return every result.
    ///
    /// Returns an empty vector if the signal is blocked.
    pub fn emit(&self, args: Args) -> Vec<R> {
        self.gather(args, Order::Forward)
    }

    /// Emit in reverse connection order and return every result.
    pub fn emit_reverse(&self, args: Args) -> Vec<R> {
        self.gather(args, Order::Reverse)
    }

    fn gather(&self, args: Args, order: Order) -> Vec<R> {
        let mut results = Vec::new();
        self.signal.core.traverse(args, order, |value| {
            results.push(value);
            ControlFlow::Continue(())
        });
        results
    }
}

impl<Args: 'static, R: 'static> Default for Signal<Args, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static, R: 'static> Clone for Signal<Args, R> {
    /// Produces a new, empty signal. Slots are never shared or copied.
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<Args: 'static, R: 'static> Debug for Signal<Args, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.len())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

/// Non-owning handle to a [`Signal`].
///
/// Lets code that does not own the signal connect to it or emit it for as
/// long as the signal exists.
pub struct WeakSignal<Args, R = ()> {
    core: Weak<SignalCore<Args, R>>,
}

impl<Args: 'static, R: 'static> WeakSignal<Args, R> {
    /// Check whether the signal still exists.
    pub fn is_alive(&self) -> bool {
        self.core.strong_count() > 0
    }

    /// Connect a closure to the signal.
    ///
    /// Fails with [`SignalError::ConnectionFailed`] once the signal is gone.
    pub fn connect<H>(&self, handler: H) -> Result<Connection<Args, R>>
    where
        H: Handler<Args, R>,
    {
        let core = self
            .core
            .upgrade()
            .ok_or(SignalError::ConnectionFailed("signal no longer exists"))?;
        core.attach(Functor::from_handler(handler))
    }

    /// Emit the signal in connection order.
    ///
    /// Returns `false` if the signal is gone or blocked.
    pub fn emit(&self, args: Args) -> bool
    where
        Args: Clone,
    {
        self.core.upgrade().is_some_and(|core| {
            core.traverse(args, Order::Forward, |_| ControlFlow::Continue(()))
        })
    }
}

impl<Args, R> Clone for WeakSignal<Args, R> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
        }
    }
}

impl<Args: 'static, R: 'static> Debug for WeakSignal<Args, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakSignal")
            .field("alive", &self.is_alive())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicI32, Ordering};

    fn double(x: i32) -> i32 {
        x * 2
    }

    fn triple(x: i32) -> i32 {
        x * 3
    }

    #[test]
    fn signal_emits_in_connection_order() {
        let signal: Signal<(i32,)> = Signal::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in 1..=3 {
            let log = log.clone();
            signal
                .connect(move |x: i32| log.lock().push((tag, x)))
                .unwrap();
        }

        signal.emit((7,));
        assert_eq!(*log.lock(), vec![(1, 7), (2, 7), (3, 7)]);

        log.lock().clear();
        signal.emit_reverse((8,));
        assert_eq!(*log.lock(), vec![(3, 8), (2, 8), (1, 8)]);
    }

    #[test]
    fn blocked_signal_invokes_nothing() {
        let signal: Signal<(), i32> = Signal::new();
        let calls = Arc::new(AtomicI32::new(0));
        let calls_clone = calls.clone();
        signal
            .connect(move || calls_clone.fetch_add(1, Ordering::SeqCst))
            .unwrap();

        signal.block(true);
        assert!(signal.is_blocked());
        signal.emit(());
        assert!(signal.collected().emit(()).is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        signal.unblock();
        signal.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disconnect_fn_removes_first_match_only() {
        let signal: Signal<(i32,), i32> = Signal::new();
        signal.connect_fn(double as fn(i32) -> i32).unwrap();
        signal.connect_fn(triple as fn(i32) -> i32).unwrap();
        signal.connect_fn(double as fn(i32) -> i32).unwrap();

        assert_eq!(signal.disconnect_fn(double as fn(i32) -> i32, false), 1);
        assert_eq!(signal.collected().emit((1,)), vec![3, 2]);
    }

    #[test]
    fn disconnect_fn_all_removes_every_match() {
        let signal: Signal<(i32,), i32> = Signal::new();
        signal.connect_fn(double as fn(i32) -> i32).unwrap();
        signal.connect_fn(triple as fn(i32) -> i32).unwrap();
        signal.connect_fn(double as fn(i32) -> i32).unwrap();

        assert_eq!(signal.disconnect_fn(double as fn(i32) -> i32, true), 2);
        assert_eq!(signal.len(), 1);
        assert_eq!(signal.collected().emit((1,)), vec![3]);
    }

    #[test]
    fn disconnect_fn_ignores_closures() {
        let signal: Signal<(i32,), i32> = Signal::new();
        signal.connect(|x: i32| x * 2).unwrap();

        assert_eq!(signal.disconnect_fn(double as fn(i32) -> i32, true), 0);
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn clear_invalidates_everything() {
        let signal: Signal<()> = Signal::new();
        let c1 = signal.connect(|| {}).unwrap();
        let c2 = signal.connect(|| {}).unwrap();

        assert_eq!(signal.clear(), 2);
        assert!(signal.is_empty());
        assert!(!c1.is_connected());
        assert!(!c2.is_connected());
    }

    #[test]
    fn clone_starts_empty() {
        let signal: Signal<()> = Signal::new();
        signal.connect(|| {}).unwrap();
        signal.connect(|| {}).unwrap();

        let copy = signal.clone();
        assert_eq!(copy.len(), 0);
        assert_eq!(signal.len(), 2);
    }

    #[test]
    fn take_moves_slots_and_blocked_flag() {
        let mut signal: Signal<()> = Signal::new();
        let connection = signal.connect(|| {}).unwrap();
        signal.block(true);

        let moved = std::mem::take(&mut signal);
        assert_eq!(moved.len(), 1);
        assert!(moved.is_blocked());
        assert!(signal.is_empty());
        assert!(!signal.is_blocked());

        // The handle follows the slot, not the variable
        assert!(connection.is_connected());
        assert!(moved.disconnect(&connection));
    }

    #[test]
    fn dropping_signal_invalidates_connections() {
        let signal: Signal<()> = Signal::new();
        let connection = signal.connect(|| {}).unwrap();

        drop(signal);
        assert!(!connection.is_connected());
    }

    #[test]
    fn weak_signal_connects_while_alive() {
        let signal: Signal<(i32,), i32> = Signal::new();
        let weak = signal.downgrade();

        let connection = weak.connect(|x: i32| x + 100).unwrap();
        assert!(connection.is_connected());
        assert_eq!(signal.collected().emit((1,)), vec![101]);

        drop(signal);
        assert!(!weak.is_alive());
        assert!(!weak.emit((1,)));
        assert_eq!(
            weak.connect(|x: i32| x).unwrap_err(),
            SignalError::ConnectionFailed("signal no longer exists")
        );
    }

    #[test]
    fn try_emit_stops_at_first_error() {
        let signal: Signal<(i32,), std::result::Result<i32, String>> = Signal::new();
        let reached = Arc::new(AtomicI32::new(0));

        let r1 = reached.clone();
        signal
            .connect(move |x: i32| {
                r1.fetch_add(1, Ordering::SeqCst);
                Ok(x)
            })
            .unwrap();
        signal
            .connect(|x: i32| Err(format!("rejected {x}")))
            .unwrap();
        let r3 = reached.clone();
        signal
            .connect(move |x: i32| {
                r3.fetch_add(1, Ordering::SeqCst);
                Ok(x)
            })
            .unwrap();

        assert_eq!(signal.try_emit((4,)), Err("rejected 4".to_string()));
        assert_eq!(reached.load(Ordering::SeqCst), 1);

        // Reverse order hits the third slot before the failing one
        assert_eq!(signal.try_emit_reverse((5,)), Err("rejected 5".to_string()));
        assert_eq!(reached.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn remove_invalidated_leaves_only_valid_slots() {
        let signal: Signal<()> = Signal::new();
        let keep = signal.connect(|| {}).unwrap();
        let gone = signal.connect(|| {}).unwrap();
        let trackable = Trackable::new();
        signal.connect_tracked(&trackable, || {}).unwrap();

        drop(trackable);
        assert_eq!(signal.len(), 3);

        assert_eq!(signal.remove_invalidated(), 1);
        assert_eq!(signal.len(), 2);

        gone.disconnect();
        assert_eq!(signal.remove_invalidated(), 0);
        assert_eq!(signal.len(), 1);
        assert!(keep.is_connected());
    }

    #[test]
    fn disconnect_rejects_foreign_connection() {
        let a: Signal<()> = Signal::new();
        let b: Signal<()> = Signal::new();
        let connection = a.connect(|| {}).unwrap();

        assert!(!b.disconnect(&connection));
        assert!(connection.is_connected());
        assert!(a.disconnect(&connection));
        assert!(!connection.is_connected());
    }
}
