//! Signals and Connections
//!
//! This module implements the sending side of the library: signals, the
//! handles returned when a slot is connected, and the emission modes.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A [`Signal`] owns an ordered list of slots. Emitting it calls every slot
//! that is neither blocked nor invalidated, in connection order
//! ([`Signal::emit`]) or reversed ([`Signal::emit_reverse`]).
//!
//! ## Connections
//!
//! [`Signal::connect`] returns a [`Connection`]: a handle that can query,
//! block or sever that one attachment. A [`ScopedConnection`] severs it
//! when dropped.
//!
//! ## Emission Modes
//!
//! - Plain: results are discarded.
//! - Collected: [`Signal::collected`] returns every result in call order.
//! - Combined: results are folded by a [`Combiner`], either per call with
//!   [`Signal::emit_with`] or persistently by a [`CombinedSignal`].
//! - Fallible: [`Signal::try_emit`] stops at the first slot returning `Err`.
//!
//! # Implementation Notes
//!
//! Emission iterates over a copy of the slot list taken under the signal's
//! lock, so slots are free to connect and disconnect (themselves included)
//! while being called.

mod combiner;
mod connection;
#[allow(clippy::module_inception)]
mod signal;

pub use combiner::{CombinedSignal, Combiner, LastValue, Sum};
pub use connection::{Connection, ScopedConnection};
pub use signal::{Collected, Signal, WeakSignal};
