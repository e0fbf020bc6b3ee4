//! Error types for connecting and activating slots.
//!
//! Failures raised by user callables never pass through this type. A slot
//! that returns `Result<T, E>` hands its `E` back untouched (see
//! [`Signal::try_emit`](crate::signal::Signal::try_emit)), and a panicking
//! slot unwinds straight through emission.

/// Errors produced by the signal/slot machinery itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The slot could not be stored, or the target signal no longer exists.
    #[error("connection could not be established: {0}")]
    ConnectionFailed(&'static str),

    /// The caller supplied an argument that cannot be connected.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A slot was activated after the object it is bound to was dropped.
    #[error("slot target is no longer available")]
    BadInvocation,

    /// A connection handle was activated while not connected.
    #[error("connection is not connected")]
    NotConnected,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SignalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_context() {
        let err = SignalError::InvalidArgument("object already dropped");
        assert_eq!(err.to_string(), "invalid argument: object already dropped");

        let err = SignalError::ConnectionFailed("signal dropped");
        assert_eq!(
            err.to_string(),
            "connection could not be established: signal dropped"
        );
    }

    #[test]
    fn failure_kinds_are_distinguishable() {
        assert_ne!(
            SignalError::ConnectionFailed("x"),
            SignalError::InvalidArgument("x")
        );
        assert_ne!(SignalError::BadInvocation, SignalError::NotConnected);
    }
}
