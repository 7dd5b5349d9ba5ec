//! Screen trait - the unit managed by a conductor.
//!
//! A screen is any long-lived stateful component with a lifecycle: it is
//! created uninitialized, initialized exactly once on first activation,
//! toggles between active and inactive any number of times, and finally
//! closes, which is terminal.
//!
//! ## State machine
//!
//! ```text
//! Uninitialized → Initialized → Active ⇄ Inactive
//!                                  \        |
//!                                   v       v
//!                                    Closed (terminal)
//! ```
//!
//! Implementors embed a [`LifecycleNode`] and expose it through
//! [`node`](Screen::node)/[`node_mut`](Screen::node_mut); the provided
//! [`activate`](Screen::activate) and [`deactivate`](Screen::deactivate)
//! drivers run the state machine and call the overridable hooks.

pub mod state;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::LifecycleError;
use crate::events::LifecycleEvent;

pub use state::{LifecycleNode, ScreenState};

/// Shared handle to a managed screen. Conductors and the host layer both
/// hold clones; identity is the `Arc` allocation (see [`same_screen`]).
pub type ScreenHandle = Arc<Mutex<dyn Screen>>;

/// Whether two handles refer to the same screen instance.
pub fn same_screen(a: &ScreenHandle, b: &ScreenHandle) -> bool {
    Arc::ptr_eq(a, b)
}

/// A manageable lifecycle unit.
///
/// The hooks (`on_initialize`, `on_activate`, `on_deactivate`, `can_close`)
/// are the extension points; the provided `activate`/`deactivate` drivers
/// should not normally be overridden.
#[async_trait]
pub trait Screen: Send {
    /// Lifecycle bookkeeping for this screen.
    fn node(&self) -> &LifecycleNode;
    fn node_mut(&mut self) -> &mut LifecycleNode;

    /// Short name used in tracing output.
    fn label(&self) -> &str {
        "screen"
    }

    /// One-time setup, run immediately before the first activation. Fires
    /// exactly once for the life of the screen.
    async fn on_initialize(&mut self) -> Result<(), LifecycleError> {
        Ok(())
    }

    /// Runs on every transition to `Active`.
    async fn on_activate(&mut self) -> Result<(), LifecycleError> {
        Ok(())
    }

    /// Runs on every deactivation. `close` marks the terminal one.
    async fn on_deactivate(&mut self, _close: bool) -> Result<(), LifecycleError> {
        Ok(())
    }

    /// Vote on whether this screen may close.
    ///
    /// The default approves immediately. Override to defer the answer, e.g.
    /// by awaiting a confirmation decision on a `oneshot` channel.
    ///
    /// Contract: the returned future must resolve exactly once, eventually.
    /// An implementation that never resolves permanently blocks every close
    /// negotiation this screen participates in; the runtime cannot detect
    /// or recover from that.
    async fn can_close(&mut self) -> bool {
        true
    }

    /// Drive the screen to `Active`. Idempotent: a second call without an
    /// intervening deactivation is a no-op and emits no event.
    async fn activate(&mut self) -> Result<(), LifecycleError> {
        if self.node().is_closed() {
            return Err(LifecycleError::ScreenClosed(self.label().to_string()));
        }
        if self.node().is_active() {
            return Ok(());
        }
        let first = !self.node().is_initialized();
        if first {
            self.on_initialize().await?;
            self.node_mut().mark_initialized();
        }
        self.node_mut().set_state(ScreenState::Active);
        self.on_activate().await?;
        debug!(screen = %self.label(), first, "screen activated");
        self.node().emit(LifecycleEvent::Activated { first });
        Ok(())
    }

    /// Drive the screen to `Inactive`, or to the terminal `Closed` state
    /// when `close` is set. Closing clears the parent back-reference.
    async fn deactivate(&mut self, close: bool) -> Result<(), LifecycleError> {
        if self.node().is_closed() {
            return Err(LifecycleError::ScreenClosed(self.label().to_string()));
        }
        if self.node().is_active() || (self.node().is_initialized() && close) {
            self.node()
                .emit(LifecycleEvent::AttemptingDeactivation { close });
            self.on_deactivate(close).await?;
            if close {
                self.node_mut().set_state(ScreenState::Closed);
                self.node_mut().set_parent(None);
            } else {
                self.node_mut().set_state(ScreenState::Inactive);
            }
            debug!(screen = %self.label(), close, "screen deactivated");
            self.node().emit(LifecycleEvent::Deactivated { close });
        }
        Ok(())
    }
}

/// Ask the owning conductor to close a screen, running the usual close
/// negotiation. Fails with [`LifecycleError::NotConducted`] when no live
/// conductor owns the screen.
pub async fn try_close(item: &ScreenHandle) -> Result<(), LifecycleError> {
    let (label, parent) = {
        let guard = item.lock().await;
        (guard.label().to_string(), guard.node().parent())
    };
    let parent = parent
        .and_then(|weak| weak.upgrade())
        .ok_or(LifecycleError::NotConducted(label))?;
    let mut parent = parent.lock().await;
    parent.deactivate_item(item.clone(), true).await
}
