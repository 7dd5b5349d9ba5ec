//! Error types used throughout the lifecycle runtime.
//!
//! A refused close negotiation is not an error: refusals are valid negative
//! decisions and flow through normal return values. Errors are reserved for
//! protocol misuse at the call site.

/// Errors raised by lifecycle transitions and conductor operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The screen already reached the terminal `Closed` state and must not
    /// be activated or deactivated again.
    #[error("screen closed and cannot be reused: {0}")]
    ScreenClosed(String),
    /// A close was requested on a screen that no live conductor owns.
    #[error("no conductor owns screen: {0}")]
    NotConducted(String),
}
