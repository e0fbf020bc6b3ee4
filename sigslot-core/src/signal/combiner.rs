//! Result combiners.
//!
//! A combiner folds the return values of one emission into a single
//! result. [`Signal::emit_with`] takes one by reference for a single pass;
//! [`CombinedSignal`] owns one and feeds it on every emission.

use std::ops::{AddAssign, ControlFlow, Deref};

use parking_lot::Mutex;

use super::signal::{Order, Signal};

/// Folds slot return values.
pub trait Combiner<R> {
    /// What [`value`](Self::value) reports.
    type Output;

    /// Accept one slot's return value.
    fn combine(&mut self, value: R);

    /// Report the folded result.
    fn value(&self) -> Self::Output;
}

/// Keeps the most recent value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastValue<R> {
    last: Option<R>,
}

impl<R> Default for LastValue<R> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<R: Clone> Combiner<R> for LastValue<R> {
    type Output = Option<R>;

    fn combine(&mut self, value: R) {
        self.last = Some(value);
    }

    fn value(&self) -> Option<R> {
        self.last.clone()
    }
}

/// Adds every value to a running total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sum<R> {
    total: R,
}

impl<R> Sum<R> {
    /// Start the total at `initial`.
    pub fn starting_at(initial: R) -> Self {
        Self { total: initial }
    }
}

impl<R: AddAssign + Clone> Combiner<R> for Sum<R> {
    type Output = R;

    fn combine(&mut self, value: R) {
        self.total += value;
    }

    fn value(&self) -> R {
        self.total.clone()
    }
}

/// A signal that owns a combiner and feeds it on every emission.
///
/// The combiner persists across emissions; use
/// [`reset_combiner`](Self::reset_combiner) to start over. Everything other
/// than emission (connecting, blocking, disconnecting) is reached through
/// `Deref` to the inner [`Signal`].
///
/// Cloning yields an empty signal with a deep copy of the combiner.
///
/// # Example
///
/// ```rust
/// use sigslot_core::signal::{CombinedSignal, Sum};
///
/// let signal: CombinedSignal<(i32,), i32, Sum<i32>> = CombinedSignal::default();
/// signal.connect(|x: i32| x + 1).unwrap();
/// signal.connect(|x: i32| x * 2).unwrap();
///
/// assert_eq!(signal.emit((5,)), 16);
/// ```
pub struct CombinedSignal<Args, R, C> {
    signal: Signal<Args, R>,
    combiner: Mutex<C>,
}

impl<Args: 'static, R: 'static, C: Combiner<R>> CombinedSignal<Args, R, C> {
    /// Create an empty signal feeding `combiner`.
    pub fn new(combiner: C) -> Self {
        Self {
            signal: Signal::new(),
            combiner: Mutex::new(combiner),
        }
    }

    /// Report the combiner's current value without emitting.
    pub fn value(&self) -> C::Output {
        self.combiner.lock().value()
    }

    /// Run `f` with mutable access to the combiner.
    pub fn with_combiner<T>(&self, f: impl FnOnce(&mut C) -> T) -> T {
        f(&mut self.combiner.lock())
    }

    /// Replace the combiner with a fresh default one.
    pub fn reset_combiner(&self)
    where
        C: Default,
    {
        *self.combiner.lock() = C::default();
    }

    /// Split into the plain signal and the combiner.
    pub fn into_parts(self) -> (Signal<Args, R>, C) {
        (self.signal, self.combiner.into_inner())
    }
}

impl<Args: Clone + 'static, R: 'static, C: Combiner<R>> CombinedSignal<Args, R, C> {
    /// Emit in connection order and return the combiner's value.
    ///
    /// A blocked signal feeds nothing and returns the combiner's current
    /// value, which still holds whatever earlier emissions accumulated.
    pub fn emit(&self, args: Args) -> C::Output {
        self.combine(args, Order::Forward)
    }

    /// Emit in reverse connection order and return the combiner's value.
    pub fn emit_reverse(&self, args: Args) -> C::Output {
        self.combine(args, Order::Reverse)
    }

    fn combine(&self, args: Args, order: Order) -> C::Output {
        // Lock per value so a slot may emit this signal again
        self.signal.core().traverse(args, order, |value| {
            self.combiner.lock().combine(value);
            ControlFlow::Continue(())
        });
        self.value()
    }
}

impl<Args: 'static, R: 'static, C: Combiner<R> + Default> Default for CombinedSignal<Args, R, C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<Args: 'static, R: 'static, C: Combiner<R> + Clone> Clone for CombinedSignal<Args, R, C> {
    fn clone(&self) -> Self {
        Self::new(self.combiner.lock().clone())
    }
}

impl<Args, R, C> Deref for CombinedSignal<Args, R, C> {
    type Target = Signal<Args, R>;

    fn deref(&self) -> &Self::Target {
        &self.signal
    }
}

impl<Args: 'static, R: 'static, C> std::fmt::Debug for CombinedSignal<Args, R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedSignal")
            .field("signal", &self.signal)
            .finish_non_exhaustive()
    }
}
