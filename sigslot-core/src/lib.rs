//! Sigslot Core
//!
//! This crate provides typed signals and slots: an in-process observer
//! pattern where a signal invokes every callable connected to it.
//! It implements:
//!
//! - Signals generic over their argument tuple and return type
//! - Connection handles that can block, query and sever one attachment
//! - Scoped connections that sever themselves when dropped
//! - Collected, combined and fallible emission
//! - Trackable objects whose slots die with them
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `slot`: validity tokens, slots, callable adapters and trackables
//! - `signal`: signals, connections and emission modes
//!
//! Every slot gets a validity token when it is connected. The slot and all
//! of its connection handles share that token, and it is the only thing
//! `Connection::is_connected` looks at. Handles hold the slot and the signal
//! weakly, so they never extend either lifetime.
//!
//! # Example
//!
//! ```rust
//! use sigslot_core::signal::Signal;
//!
//! // Create a signal taking one argument and returning a value
//! let signal: Signal<(i32,), i32> = Signal::new();
//!
//! // Connect two slots
//! signal.connect(|x: i32| x + 1).unwrap();
//! let doubled = signal.connect(|x: i32| x * 2).unwrap();
//!
//! assert_eq!(signal.collected().emit((5,)), vec![6, 10]);
//!
//! // Block one slot through its connection
//! doubled.block(true);
//! assert_eq!(signal.collected().emit((5,)), vec![6]);
//! ```

pub mod error;
pub mod signal;
pub mod slot;

pub use error::{Result, SignalError};
pub use signal::{
    Collected, CombinedSignal, Combiner, Connection, LastValue, ScopedConnection, Signal, Sum,
    WeakSignal,
};
pub use slot::{FnPtr, FunctorId, Handler, MethodPtr, Trackable, ValidityToken};
