//! Notification payloads published over per-instance broadcast channels.
//!
//! Two channels exist: every screen's [`LifecycleNode`](crate::LifecycleNode)
//! publishes [`LifecycleEvent`]s for its own transitions, and every conductor
//! publishes [`ActivationProcessed`] after each `activate_item` attempt. The
//! host layer observes these to update presentation without the runtime
//! knowing anything about presentation.

use crate::screen::ScreenHandle;

/// Lifecycle transitions of a single screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The screen became active. `first` is set on the very first
    /// activation, immediately after the one-time initialization hook ran.
    Activated { first: bool },
    /// Deactivation is about to run; the hook has not fired yet.
    AttemptingDeactivation { close: bool },
    /// Deactivation finished. With `close` set the screen is now terminal.
    Deactivated { close: bool },
}

/// Outcome notification for one `activate_item` attempt, success or failure.
///
/// A failure means the outgoing item refused its close negotiation and the
/// conductor left all state untouched.
#[derive(Clone)]
pub struct ActivationProcessed {
    pub item: ScreenHandle,
    pub success: bool,
}
