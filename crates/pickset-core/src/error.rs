//! Error types for Pickset core.

use std::fmt;

/// Timer-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The timer ID is invalid, already fired, or has been stopped.
    InvalidTimerId,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimerId => write!(f, "Invalid or expired timer ID"),
        }
    }
}

impl std::error::Error for TimerError {}

/// Errors from the fetch runtime and its completion channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncRuntimeError {
    /// The Tokio runtime or its thread could not be started.
    CreationFailed(String),
    /// The event loop dropped the receiving half of a completion channel.
    ReceiverDropped,
}

impl fmt::Display for AsyncRuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreationFailed(msg) => write!(f, "Failed to create async runtime: {msg}"),
            Self::ReceiverDropped => write!(f, "Completion receiver has been dropped"),
        }
    }
}

impl std::error::Error for AsyncRuntimeError {}
