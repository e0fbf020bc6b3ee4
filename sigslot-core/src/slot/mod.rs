//! Slots and their liveness.
//!
//! This module holds everything that lives on the receiving side of a
//! connection:
//!
//! - [`ValidityToken`]: the shared flag that is the single source of truth
//!   for whether an attachment is still live.
//! - `Slot`: one connected callable, with its blocked flag and token.
//! - Callable adapters ([`Handler`], [`FnPtr`], [`MethodPtr`]) that let
//!   closures, function pointers and object-bound methods be connected with
//!   any arity from zero to eight arguments.
//! - [`Trackable`]: ties slots to an object's lifetime so they are severed
//!   when the object is dropped.
//!
//! # Validity
//!
//! A slot's token is valid from the moment it is connected until the first
//! of: the signal removes it, the slot is dropped, the signal is dropped,
//! the trackable it was tied to is dropped, or its bound object is found to
//! be gone during invocation. Connection handles consult only the token.

mod functor;
#[allow(clippy::module_inception)]
mod slot;
mod token;
mod trackable;

pub use functor::{FnPtr, FunctorId, Handler, MethodPtr};
pub(crate) use functor::{method_id, Functor};
pub(crate) use slot::Slot;
pub use token::ValidityToken;
pub use trackable::Trackable;
