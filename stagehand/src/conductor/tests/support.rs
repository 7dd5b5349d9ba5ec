use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};

use crate::error::LifecycleError;
use crate::screen::{LifecycleNode, Screen, ScreenHandle};

/// How a [`TestScreen`] votes in close negotiations.
pub(crate) enum CloseBehavior {
    Approve,
    Refuse,
    /// Refuse the first `n` polls, approve afterwards.
    RefuseFirst(usize),
    /// Await an out-of-band decision; a consumed or dropped sender refuses.
    Deferred(Option<oneshot::Receiver<bool>>),
}

pub(crate) struct TestScreen {
    node: LifecycleNode,
    label: String,
    pub(crate) behavior: CloseBehavior,
    pub(crate) initializations: usize,
    pub(crate) activations: usize,
    pub(crate) closes: usize,
}

pub(crate) fn screen(label: &str) -> Arc<Mutex<TestScreen>> {
    screen_with(label, CloseBehavior::Approve)
}

pub(crate) fn screen_with(label: &str, behavior: CloseBehavior) -> Arc<Mutex<TestScreen>> {
    Arc::new(Mutex::new(TestScreen {
        node: LifecycleNode::new(),
        label: label.to_string(),
        behavior,
        initializations: 0,
        activations: 0,
        closes: 0,
    }))
}

/// Coerce a typed test screen into the handle form conductors work with.
pub(crate) fn as_screen(screen: &Arc<Mutex<TestScreen>>) -> ScreenHandle {
    screen.clone()
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[async_trait]
impl Screen for TestScreen {
    fn node(&self) -> &LifecycleNode {
        &self.node
    }

    fn node_mut(&mut self) -> &mut LifecycleNode {
        &mut self.node
    }

    fn label(&self) -> &str {
        &self.label
    }

    async fn on_initialize(&mut self) -> Result<(), LifecycleError> {
        self.initializations += 1;
        Ok(())
    }

    async fn on_activate(&mut self) -> Result<(), LifecycleError> {
        self.activations += 1;
        Ok(())
    }

    async fn on_deactivate(&mut self, close: bool) -> Result<(), LifecycleError> {
        if close {
            self.closes += 1;
        }
        Ok(())
    }

    async fn can_close(&mut self) -> bool {
        match &mut self.behavior {
            CloseBehavior::Approve => true,
            CloseBehavior::Refuse => false,
            CloseBehavior::RefuseFirst(remaining) => {
                if *remaining > 0 {
                    *remaining -= 1;
                    false
                } else {
                    true
                }
            }
            CloseBehavior::Deferred(receiver) => match receiver.take() {
                Some(receiver) => receiver.await.unwrap_or(false),
                None => false,
            },
        }
    }
}
