//! Cancellation context handed to every `run` and `stop` call.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Carries the service-wide cancellation token and an optional deadline.
///
/// `run` receives a context without a deadline that is cancelled when the
/// service shuts down. `stop` receives the same (already cancelled) token plus
/// the deadline after which the coordinator abandons the call.
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a context whose deadline is `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            token: self.token.clone(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Resolves once the service is shutting down.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let ctx = Context::new(token.clone());
        let child = ctx.with_timeout(Duration::from_secs(1));
        assert!(!child.is_cancelled());

        token.cancel();
        ctx.cancelled().await;
        assert!(child.is_cancelled());
    }

    #[test]
    fn deadline_only_set_by_with_timeout() {
        let ctx = Context::new(CancellationToken::new());
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());

        let bounded = ctx.with_timeout(Duration::from_secs(30));
        let remaining = bounded.remaining().unwrap();
        assert!(remaining <= Duration::from_secs(30));
        assert!(remaining > Duration::from_secs(25));
    }
}
