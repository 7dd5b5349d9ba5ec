//! Conductors - owners of screen collections and their activation policy.
//!
//! Two policies are provided:
//!
//! - [`OneActive`]: at most one item active at a time; switching away from
//!   the active item requires a successful close negotiation on it.
//! - [`AllActive`]: every owned item is active whenever the conductor is;
//!   closing the conductor drains individually-approving items even when
//!   the aggregate verdict is refusal.
//!
//! Conductors are themselves screens, so trees nest: activating a conductor
//! activates its item(s), closing it closes them.
//!
//! ## Ownership
//!
//! A conductor owns its items as [`ScreenHandle`]s; each item's
//! [`LifecycleNode`](crate::LifecycleNode) holds a [`ParentRef`] back to the
//! conductor. The back edge is weak: dropping a conductor never destroys
//! items the host still holds, and the cycle
//! conductor → item → parent → conductor never leaks.

pub mod all_active;
pub mod one_active;

#[cfg(test)]
mod tests;

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};

use crate::error::LifecycleError;
use crate::events::ActivationProcessed;
use crate::screen::{Screen, ScreenHandle};

pub use all_active::AllActive;
pub use one_active::OneActive;

/// Shared handle to a conductor, as stored by the host layer.
pub type ConductorHandle = Arc<Mutex<dyn Conductor>>;

/// Non-owning back-reference from a screen to its conductor. Must be
/// existence-checked via `upgrade`; it never keeps a conductor alive.
pub type ParentRef = Weak<Mutex<dyn Conductor>>;

const PROCESSED_CHANNEL_CAPACITY: usize = 32;

/// Operations a conductor exposes to the host layer.
///
/// Hosts must never mutate `items` or the active set directly; every
/// mutation goes through `activate_item`/`deactivate_item` so the close
/// negotiation and parent bookkeeping stay consistent.
#[async_trait]
pub trait Conductor: Screen {
    /// Make `item` part of this conductor and activate it according to the
    /// policy. Always publishes an [`ActivationProcessed`] notification,
    /// success or failure.
    async fn activate_item(&mut self, item: ScreenHandle) -> Result<(), LifecycleError>;

    /// Deactivate an item in place, or, with `close`, negotiate its removal.
    /// A refused negotiation mutates nothing.
    async fn deactivate_item(&mut self, item: ScreenHandle, close: bool)
        -> Result<(), LifecycleError>;

    /// Ordered read-only view of the owned items.
    fn items(&self) -> &[ScreenHandle];

    /// Subscribe to [`ActivationProcessed`] notifications.
    fn subscribe_processed(&self) -> broadcast::Receiver<ActivationProcessed>;
}

/// Notification channel for `activate_item` outcomes.
pub(crate) fn processed_channel() -> broadcast::Sender<ActivationProcessed> {
    let (sender, _) = broadcast::channel(PROCESSED_CHANNEL_CAPACITY);
    sender
}

/// Neighbor rule: which item replaces the one closing at `last_index`.
///
/// The list still contains the closing item. Index 0 falls forward to the
/// item currently at index 1; any later index falls back to its left-hand
/// neighbor; a list with no other items yields none.
pub(crate) fn next_item_to_activate(
    items: &[ScreenHandle],
    last_index: usize,
) -> Option<ScreenHandle> {
    if last_index == 0 && items.len() > 1 {
        return Some(items[1].clone());
    }
    if last_index > 0 && last_index < items.len() {
        return Some(items[last_index - 1].clone());
    }
    None
}
