use std::sync::Arc;
use std::time::Duration;

use crate::remote::RemoteService;

/// One-shot reachability check against the generation service.
#[derive(Clone)]
pub struct Prober {
    remote: Arc<dyn RemoteService>,
    timeout: Duration,
}

impl Prober {
    pub fn new(remote: Arc<dyn RemoteService>, timeout: Duration) -> Self {
        Self { remote, timeout }
    }

    /// Never fails: every error means "unreachable".
    pub async fn probe(&self) -> bool {
        match tokio::time::timeout(self.timeout, self.remote.hello()).await {
            Ok(Ok(())) => {
                tracing::info!("generation service reachable");
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "generation service unreachable");
                false
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "generation service probe timed out");
                false
            }
        }
    }
}
