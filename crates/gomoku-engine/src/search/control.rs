//! Search control: cooperative cancellation and wall-clock budgets.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct TokenNode {
    stopped: AtomicBool,
    parent: Option<Arc<TokenNode>>,
}

/// A cooperative cancellation signal.
///
/// Tokens form a tree: cancelling a token cancels every token derived from
/// it with [`child`](CancelToken::child), but never its parent. Clones share
/// the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    node: Arc<TokenNode>,
}

impl CancelToken {
    /// A fresh, uncancelled root token.
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// A token that is cancelled together with `self`, and can also be
    /// cancelled on its own.
    pub fn child(&self) -> CancelToken {
        CancelToken {
            node: Arc::new(TokenNode {
                stopped: AtomicBool::new(false),
                parent: Some(Arc::clone(&self.node)),
            }),
        }
    }

    /// Signal cancellation to this token and its descendants.
    pub fn cancel(&self) {
        self.node.stopped.store(true, Ordering::Release);
    }

    /// Whether this token or any ancestor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        let mut node = Some(&self.node);
        while let Some(n) = node {
            if n.stopped.load(Ordering::Acquire) {
                return true;
            }
            node = n.parent.as_ref();
        }
        false
    }
}

/// Controls when a search should stop.
///
/// Combines a [`CancelToken`] with an optional wall-clock budget measured
/// from construction.
#[derive(Debug, Clone)]
pub struct SearchControl {
    cancel: CancelToken,
    start: Instant,
    limit: Option<Duration>,
}

impl SearchControl {
    /// Control that only responds to cancellation.
    pub fn new_infinite(cancel: CancelToken) -> Self {
        Self {
            cancel,
            start: Instant::now(),
            limit: None,
        }
    }

    /// Control with a wall-clock budget; the clock starts immediately.
    pub fn new_timed(cancel: CancelToken, limit: Duration) -> Self {
        Self {
            cancel,
            start: Instant::now(),
            limit: Some(limit),
        }
    }

    /// The cancellation token this control watches.
    pub fn token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Whether the search must abort now: cancelled, or over budget.
    pub fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.is_over_budget()
    }

    /// Whether the budget has been spent. Always `false` without a budget.
    pub fn is_over_budget(&self) -> bool {
        self.limit.is_some_and(|limit| self.elapsed() > limit)
    }

    /// Whether another iteration fits, assuming it costs `factor` times the
    /// time spent so far.
    pub fn should_stop_iterating(&self, factor: u32) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        self.limit.is_some_and(|limit| self.elapsed() * factor > limit)
    }

    /// Time since the control was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// The configured budget, if any.
    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }
}
