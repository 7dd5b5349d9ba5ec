//! Single-active conductor: an ordered collection with at most one active
//! item, like a tab strip or a navigation stack.
//!
//! Switching the active item negotiates closing with the outgoing item but
//! leaves it owned and merely inactive; only `deactivate_item(_, true)`
//! removes an item from the collection.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::close_guard::{CloseGuard, PollEachGuard};
use crate::error::LifecycleError;
use crate::events::ActivationProcessed;
use crate::screen::{same_screen, LifecycleNode, Screen, ScreenHandle};

use super::{next_item_to_activate, processed_channel, Conductor, ParentRef};

/// Conductor with the one-active policy.
pub struct OneActive {
    node: LifecycleNode,
    guard: Arc<dyn CloseGuard>,
    processed: broadcast::Sender<ActivationProcessed>,
    weak_self: ParentRef,
    items: Vec<ScreenHandle>,
    active: Option<ScreenHandle>,
}

impl OneActive {
    /// New conductor with the default always-approve guard.
    pub fn new() -> Arc<Mutex<Self>> {
        Self::with_guard(Arc::new(PollEachGuard))
    }

    /// New conductor with a custom close guard.
    pub fn with_guard(guard: Arc<dyn CloseGuard>) -> Arc<Mutex<Self>> {
        Arc::new_cyclic(|weak: &Weak<Mutex<Self>>| {
            let weak_self: ParentRef = weak.clone();
            Mutex::new(Self {
                node: LifecycleNode::new(),
                guard,
                processed: processed_channel(),
                weak_self,
                items: Vec::new(),
                active: None,
            })
        })
    }

    /// The currently active item, if any. Always a member of `items`.
    pub fn active_item(&self) -> Option<ScreenHandle> {
        self.active.clone()
    }

    fn is_current(&self, item: &ScreenHandle) -> bool {
        self.active.as_ref().is_some_and(|active| same_screen(active, item))
    }

    fn emit_processed(&self, item: ScreenHandle, success: bool) {
        debug!(success, "activation processed");
        let _ = self.processed.send(ActivationProcessed { item, success });
    }

    /// Insert the item if absent (matched by identity, never duplicated)
    /// and point its parent back-reference at this conductor.
    async fn ensure_item(&mut self, item: ScreenHandle) -> ScreenHandle {
        if !self.items.iter().any(|existing| same_screen(existing, &item)) {
            self.items.push(item.clone());
        }
        item.lock()
            .await
            .node_mut()
            .set_parent(Some(self.weak_self.clone()));
        item
    }

    /// Swap the active item. The outgoing item is fully deactivated before
    /// the incoming one begins activating; the incoming item is activated
    /// only while the conductor itself is active.
    async fn change_active_item(
        &mut self,
        new_item: Option<ScreenHandle>,
        close_previous: bool,
    ) -> Result<(), LifecycleError> {
        if let Some(previous) = self.active.take() {
            previous.lock().await.deactivate(close_previous).await?;
        }
        let new_item = match new_item {
            Some(item) => Some(self.ensure_item(item).await),
            None => None,
        };
        if let Some(item) = &new_item {
            if self.node.is_active() {
                item.lock().await.activate().await?;
            }
        }
        self.active = new_item.clone();
        if let Some(item) = new_item {
            self.emit_processed(item, true);
        }
        Ok(())
    }

    /// Close an approved item: remove it from the collection and, when it
    /// was the active item, activate its neighbor.
    async fn close_item(&mut self, item: ScreenHandle) -> Result<(), LifecycleError> {
        if self.is_current(&item) {
            let index = self
                .items
                .iter()
                .position(|existing| same_screen(existing, &item))
                .unwrap_or(0);
            let replacement = next_item_to_activate(&self.items, index);
            self.change_active_item(replacement, true).await?;
        } else {
            item.lock().await.deactivate(true).await?;
        }
        self.items.retain(|existing| !same_screen(existing, &item));
        // A never-activated item skips deactivate's bookkeeping; the parent
        // edge still has to go once the item is no longer owned.
        item.lock().await.node_mut().set_parent(None);
        info!(remaining = self.items.len(), "item closed");
        Ok(())
    }
}

#[async_trait]
impl Conductor for OneActive {
    async fn activate_item(&mut self, item: ScreenHandle) -> Result<(), LifecycleError> {
        // Reject terminal screens before any state changes.
        {
            let guard = item.lock().await;
            if guard.node().is_closed() {
                return Err(LifecycleError::ScreenClosed(guard.label().to_string()));
            }
        }
        if self.is_current(&item) && self.node.is_active() {
            item.lock().await.activate().await?;
            self.emit_processed(item, true);
            return Ok(());
        }

        // Negotiate with the outgoing item before any state changes.
        let outgoing: Vec<ScreenHandle> = self.active.iter().cloned().collect();
        let verdict = self.guard.evaluate(&outgoing).await;
        if !verdict.approved {
            self.emit_processed(item, false);
            return Ok(());
        }
        self.change_active_item(Some(item), false).await
    }

    async fn deactivate_item(
        &mut self,
        item: ScreenHandle,
        close: bool,
    ) -> Result<(), LifecycleError> {
        if !close {
            if self.is_current(&item) {
                item.lock().await.deactivate(false).await?;
            }
            return Ok(());
        }
        let targets = [item.clone()];
        let verdict = self.guard.evaluate(&targets).await;
        if verdict.approved {
            self.close_item(item).await?;
        }
        Ok(())
    }

    fn items(&self) -> &[ScreenHandle] {
        &self.items
    }

    fn subscribe_processed(&self) -> broadcast::Receiver<ActivationProcessed> {
        self.processed.subscribe()
    }
}

#[async_trait]
impl Screen for OneActive {
    fn node(&self) -> &LifecycleNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut LifecycleNode {
        &mut self.node
    }

    fn label(&self) -> &str {
        "one-active"
    }

    async fn on_activate(&mut self) -> Result<(), LifecycleError> {
        if let Some(item) = self.active.clone() {
            item.lock().await.activate().await?;
        }
        Ok(())
    }

    async fn on_deactivate(&mut self, close: bool) -> Result<(), LifecycleError> {
        if close {
            for item in std::mem::take(&mut self.items) {
                let mut guard = item.lock().await;
                guard.deactivate(true).await?;
                guard.node_mut().set_parent(None);
            }
            self.active = None;
        } else if let Some(item) = self.active.clone() {
            item.lock().await.deactivate(false).await?;
        }
        Ok(())
    }

    /// Only the active item is asked; parked inactive items get their say
    /// when they are closed individually.
    async fn can_close(&mut self) -> bool {
        let outgoing: Vec<ScreenHandle> = self.active.iter().cloned().collect();
        self.guard.evaluate(&outgoing).await.approved
    }
}
