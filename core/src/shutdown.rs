//! Process-wide, one-shot shutdown signal
//!
//! Every publisher and the stats reporter sleep through
//! [`ShutdownSignal::wait`], so a fire preempts the sleep instead of
//! waiting out the remaining interval.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// One-shot cancellation shared by every running unit
///
/// Cloning is cheap and yields a handle to the same signal. Firing is
/// permanent and idempotent.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    /// Create an unfired signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal
    ///
    /// Safe from any task or thread. Calls after the first are no-ops.
    pub fn fire(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("Shutdown signal fired");
        }
        self.token.cancel();
    }

    /// Non-blocking check
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Sleep for up to `timeout`, waking early on fire
    ///
    /// Returns `true` if the signal is (or becomes) fired, `false` when the
    /// timeout elapses first.
    pub async fn wait(&self, timeout: Duration) -> bool {
        tokio::select! {
            biased;

            _ = self.token.cancelled() => true,
            _ = tokio::time::sleep(timeout) => false,
        }
    }

    /// Wait with no upper bound until the signal fires
    pub async fn fired(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_when_not_fired() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();

        assert!(!signal.wait(Duration::from_millis(250)).await);
        assert_eq!(start.elapsed(), Duration::from_millis(250));
        assert!(!signal.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_immediately_when_already_fired() {
        let signal = ShutdownSignal::new();
        signal.fire();

        let start = Instant::now();
        assert!(signal.wait(Duration::from_secs(60)).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_wakes_waiter_early() {
        let signal = ShutdownSignal::new();
        let waiter = signal.clone();

        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let fired = waiter.wait(Duration::from_secs(5)).await;
            (fired, start.elapsed())
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        signal.fire();

        let (fired, elapsed) = handle.await.unwrap();
        assert!(fired);
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_fire_is_idempotent() {
        let signal = ShutdownSignal::new();
        signal.fire();
        signal.fire();
        signal.clone().fire();

        assert!(signal.is_set());
        signal.fired().await;
    }

    #[tokio::test]
    async fn test_all_clones_observe_fire() {
        let signal = ShutdownSignal::new();
        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let s = signal.clone();
                tokio::spawn(async move { s.wait(Duration::from_secs(30)).await })
            })
            .collect();

        signal.fire();

        for waiter in waiters {
            assert!(waiter.await.unwrap());
        }
    }

    #[test]
    fn test_fire_from_plain_thread() {
        let signal = ShutdownSignal::new();
        let remote = signal.clone();
        std::thread::spawn(move || remote.fire()).join().unwrap();
        assert!(signal.is_set());
    }
}
