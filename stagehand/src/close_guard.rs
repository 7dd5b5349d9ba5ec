//! Close negotiation protocol.
//!
//! A [`CloseGuard`] takes a finite set of screens, polls each screen's
//! `can_close` exactly once, and combines the answers with logical AND.
//! Answers may resolve immediately or be deferred; the guard resolves once
//! every poll has. The verdict also carries the subset of screens that
//! individually approved, which drives the multi-active conductor's
//! partial-drain behavior.

use async_trait::async_trait;
use tracing::debug;

use crate::screen::ScreenHandle;

/// Aggregate outcome of one close negotiation round.
pub struct CloseVerdict {
    /// True iff every polled screen approved.
    pub approved: bool,
    /// The screens that individually approved, in poll order.
    pub ready: Vec<ScreenHandle>,
}

/// Strategy deciding whether a set of screens may close.
///
/// Implementations must poll each screen's `can_close` exactly once per
/// evaluation and must not mutate conductor state; mutation happens in the
/// conductor, only after the verdict resolves.
#[async_trait]
pub trait CloseGuard: Send + Sync {
    async fn evaluate(&self, items: &[ScreenHandle]) -> CloseVerdict;
}

/// Default guard: ask every screen, approve iff all approve. An empty set
/// approves trivially.
pub struct PollEachGuard;

#[async_trait]
impl CloseGuard for PollEachGuard {
    async fn evaluate(&self, items: &[ScreenHandle]) -> CloseVerdict {
        let mut approved = true;
        let mut ready = Vec::new();
        for item in items {
            let vote = item.lock().await.can_close().await;
            if vote {
                ready.push(item.clone());
            } else {
                approved = false;
            }
        }
        debug!(polled = items.len(), approved, "close negotiation resolved");
        CloseVerdict { approved, ready }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::{same_screen, LifecycleNode, Screen};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct Voter {
        node: LifecycleNode,
        vote: bool,
        polls: usize,
    }

    #[async_trait]
    impl Screen for Voter {
        fn node(&self) -> &LifecycleNode {
            &self.node
        }

        fn node_mut(&mut self) -> &mut LifecycleNode {
            &mut self.node
        }

        async fn can_close(&mut self) -> bool {
            self.polls += 1;
            self.vote
        }
    }

    fn voter(vote: bool) -> Arc<Mutex<Voter>> {
        Arc::new(Mutex::new(Voter {
            node: LifecycleNode::new(),
            vote,
            polls: 0,
        }))
    }

    #[tokio::test]
    async fn empty_set_approves() {
        let verdict = PollEachGuard.evaluate(&[]).await;
        assert!(verdict.approved);
        assert!(verdict.ready.is_empty());
    }

    #[tokio::test]
    async fn unanimous_approval() {
        let a = voter(true);
        let b = voter(true);
        let items: Vec<ScreenHandle> = vec![a.clone(), b.clone()];

        let verdict = PollEachGuard.evaluate(&items).await;
        assert!(verdict.approved);
        assert_eq!(verdict.ready.len(), 2);
    }

    #[tokio::test]
    async fn one_refusal_fails_the_round_but_keeps_approvers() {
        let yes = voter(true);
        let no = voter(false);
        let items: Vec<ScreenHandle> = vec![yes.clone(), no.clone()];

        let verdict = PollEachGuard.evaluate(&items).await;
        assert!(!verdict.approved);
        assert_eq!(verdict.ready.len(), 1);
        let yes_handle: ScreenHandle = yes.clone();
        assert!(same_screen(&verdict.ready[0], &yes_handle));
    }

    #[tokio::test]
    async fn each_screen_is_polled_exactly_once() {
        let a = voter(false);
        let items: Vec<ScreenHandle> = vec![a.clone()];

        PollEachGuard.evaluate(&items).await;
        assert_eq!(a.lock().await.polls, 1);
    }
}
