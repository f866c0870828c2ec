//! Periodic liveness pings to the simulation server.
//!
//! The server shuts itself down once it stops hearing from the client, so
//! a background task pings it on a fixed interval for as long as the
//! [`KeepAlive`] handle lives.

use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Handle to a running keepalive task; the task is aborted on drop.
#[derive(Debug)]
pub struct KeepAlive {
    handle: JoinHandle<()>,
}

impl KeepAlive {
    /// Start pinging `transport` every `interval`.
    ///
    /// The first ping is sent immediately. Failed pings are logged and
    /// retried on the next tick; they never stop the loop.
    pub fn spawn<T: Transport>(transport: Arc<T>, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match transport.ping().await {
                    Ok(alive) => debug!(alive = %alive.trim(), "server ping"),
                    Err(e) => warn!(error = %e, "server ping failed"),
                }
            }
        });
        Self { handle }
    }

    /// Stop pinging.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{InitPayload, StatePayload, TransportError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingServer {
        pings: AtomicUsize,
    }

    impl Transport for CountingServer {
        async fn init(&self, _state: u64) -> Result<InitPayload, TransportError> {
            Ok(InitPayload::default())
        }

        async fn succ(&self, _state: u64, _mode: u64) -> Result<StatePayload, TransportError> {
            Ok(StatePayload::default())
        }

        async fn ping(&self) -> Result<String, TransportError> {
            self.pings.fetch_add(1, Ordering::SeqCst);
            Ok("alive".to_string())
        }

        async fn quit(&self) -> Result<String, TransportError> {
            Ok("Bye!".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pings_on_every_interval() {
        let server = Arc::new(CountingServer::default());
        let keepalive = KeepAlive::spawn(Arc::clone(&server), Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(server.pings.load(Ordering::SeqCst), 3);
        assert!(keepalive.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_the_loop() {
        let server = Arc::new(CountingServer::default());
        let keepalive = KeepAlive::spawn(Arc::clone(&server), Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(1)).await;
        keepalive.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(server.pings.load(Ordering::SeqCst), 1);
        assert!(!keepalive.is_running());
    }
}
