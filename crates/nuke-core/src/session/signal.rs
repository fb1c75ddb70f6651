//! Read-only view of a session's cancellation token

use tokio_util::sync::CancellationToken;

/// Observed by a delete loop; only the registry can trigger it.
///
/// Goes from live to cancelled once and never back.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    token: CancellationToken,
}

impl CancellationSignal {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the session is cancelled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signal_follows_token() {
        let token = CancellationToken::new();
        let signal = CancellationSignal::new(token.clone());
        let observer = signal.clone();
        assert!(!signal.is_cancelled());

        token.cancel();
        assert!(signal.is_cancelled());
        assert!(observer.is_cancelled());
        observer.cancelled().await;
    }
}
