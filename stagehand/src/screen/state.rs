//! Screen lifecycle state container.
//!
//! [`LifecycleNode`] is the bookkeeping embedded in every managed screen:
//! the current state, the one-time initialization latch, the advisory parent
//! back-reference, and the screen's lifecycle-event channel. Screens stay
//! ignorant of their position in any tree; conductors maintain the node.

use tokio::sync::broadcast;

use crate::conductor::ParentRef;
use crate::events::LifecycleEvent;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Lifecycle states of a screen.
///
/// `Closed` is terminal: a closed screen is removed from its owner and must
/// never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    Uninitialized,
    Initialized,
    Active,
    Inactive,
    Closed,
}

/// Per-screen lifecycle bookkeeping.
pub struct LifecycleNode {
    state: ScreenState,
    initialized: bool,
    parent: Option<ParentRef>,
    events: broadcast::Sender<LifecycleEvent>,
}

impl LifecycleNode {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: ScreenState::Uninitialized,
            initialized: false,
            parent: None,
            events,
        }
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ScreenState::Active
    }

    pub fn is_closed(&self) -> bool {
        self.state == ScreenState::Closed
    }

    /// Whether the one-time initialization hook has already fired.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Latch initialization. Never repeats for the life of the screen.
    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
        if self.state == ScreenState::Uninitialized {
            self.state = ScreenState::Initialized;
        }
    }

    pub(crate) fn set_state(&mut self, state: ScreenState) {
        self.state = state;
    }

    /// Weak handle to the owning conductor, if any. Advisory only: it
    /// carries no ownership and must be existence-checked via `upgrade`.
    pub fn parent(&self) -> Option<ParentRef> {
        self.parent.clone()
    }

    pub fn set_parent(&mut self, parent: Option<ParentRef>) {
        self.parent = parent;
    }

    /// Subscribe to this screen's lifecycle transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Publish a lifecycle event. Send failures mean nobody is listening.
    pub(crate) fn emit(&self, event: LifecycleEvent) {
        let _ = self.events.send(event);
    }
}

impl Default for LifecycleNode {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_uninitialized() {
        let node = LifecycleNode::new();
        assert_eq!(node.state(), ScreenState::Uninitialized);
        assert!(!node.is_initialized());
        assert!(!node.is_active());
        assert!(node.parent().is_none());
    }

    #[test]
    fn mark_initialized_latches_once() {
        let mut node = LifecycleNode::new();
        node.mark_initialized();
        assert_eq!(node.state(), ScreenState::Initialized);
        assert!(node.is_initialized());

        // The latch survives later state changes.
        node.set_state(ScreenState::Active);
        node.set_state(ScreenState::Inactive);
        assert!(node.is_initialized());

        node.mark_initialized();
        assert_eq!(node.state(), ScreenState::Inactive);
    }

    #[test]
    fn emitted_events_reach_subscribers() {
        let node = LifecycleNode::new();
        let mut events = node.subscribe();
        node.emit(LifecycleEvent::Activated { first: true });
        assert_eq!(
            events.try_recv().unwrap(),
            LifecycleEvent::Activated { first: true }
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn emit_without_subscribers_is_harmless() {
        let node = LifecycleNode::new();
        node.emit(LifecycleEvent::Deactivated { close: false });
    }
}
