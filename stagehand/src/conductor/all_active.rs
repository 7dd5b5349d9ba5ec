//! Multi-active conductor: every owned item is active whenever the
//! conductor is, like a dashboard of concurrently live panels.
//!
//! Adding an item never requires negotiation. Closing the conductor runs
//! one negotiation round over the whole collection with partial-drain
//! semantics: items that individually approve are closed and removed even
//! when the aggregate verdict is refusal, so repeated attempts converge as
//! holdouts come around. That asymmetry is deliberate.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::close_guard::{CloseGuard, PollEachGuard};
use crate::error::LifecycleError;
use crate::events::ActivationProcessed;
use crate::screen::{same_screen, LifecycleNode, Screen, ScreenHandle};

use super::{processed_channel, Conductor, ParentRef};

/// Conductor with the all-active policy.
pub struct AllActive {
    node: LifecycleNode,
    guard: Arc<dyn CloseGuard>,
    processed: broadcast::Sender<ActivationProcessed>,
    weak_self: ParentRef,
    items: Vec<ScreenHandle>,
}

impl AllActive {
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
            })
        })
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

    async fn close_item(&mut self, item: ScreenHandle) -> Result<(), LifecycleError> {
        item.lock().await.deactivate(true).await?;
        self.items.retain(|existing| !same_screen(existing, &item));
        // A never-activated item skips deactivate's bookkeeping; the parent
        // edge still has to go once the item is no longer owned.
        item.lock().await.node_mut().set_parent(None);
        info!(remaining = self.items.len(), "item closed");
        Ok(())
    }
}

#[async_trait]
impl Conductor for AllActive {
    /// Adding an item to the active set needs no negotiation; the attempt
    /// always succeeds.
    async fn activate_item(&mut self, item: ScreenHandle) -> Result<(), LifecycleError> {
        // Reject terminal screens before any state changes.
        {
            let guard = item.lock().await;
            if guard.node().is_closed() {
                return Err(LifecycleError::ScreenClosed(guard.label().to_string()));
            }
        }
        let item = self.ensure_item(item).await;
        if self.node.is_active() {
            item.lock().await.activate().await?;
        }
        self.emit_processed(item, true);
        Ok(())
    }

    async fn deactivate_item(
        &mut self,
        item: ScreenHandle,
        close: bool,
    ) -> Result<(), LifecycleError> {
        if !close {
            item.lock().await.deactivate(false).await?;
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
impl Screen for AllActive {
    fn node(&self) -> &LifecycleNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut LifecycleNode {
        &mut self.node
    }

    fn label(&self) -> &str {
        "all-active"
    }

    async fn on_activate(&mut self) -> Result<(), LifecycleError> {
        for item in self.items.clone() {
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
        } else {
            for item in self.items.clone() {
                item.lock().await.deactivate(false).await?;
            }
        }
        Ok(())
    }

    /// One negotiation round over the whole collection, with partial drain:
    /// individually-approving items are closed and removed even when the
    /// aggregate verdict is refusal. Holdouts stay untouched.
    async fn can_close(&mut self) -> bool {
        let items = self.items.clone();
        let verdict = self.guard.evaluate(&items).await;
        if !verdict.approved && !verdict.ready.is_empty() {
            for item in &verdict.ready {
                let mut guard = item.lock().await;
                if let Err(error) = guard.deactivate(true).await {
                    warn!(error = %error, "failed to close approved item during drain");
                }
                guard.node_mut().set_parent(None);
            }
            self.items
                .retain(|existing| !verdict.ready.iter().any(|ready| same_screen(existing, ready)));
            info!(
                drained = verdict.ready.len(),
                remaining = self.items.len(),
                "partial drain after refused close"
            );
        }
        verdict.approved
    }
}
