//! Paced AI Provider - Wrapper that enforces a minimum interval between calls.
//!
//! Every model call in a turn goes through the same wrapper, so consecutive
//! calls start at least `min_interval` apart. The interval is fixed; there
//! is no way to skip it per call.
//!
//! # Example
//!
//! ```ignore
//! let provider = PacedAIProvider::new(OpenAIProvider::new(config), Duration::from_secs(1));
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// AI provider wrapper that spaces out calls.
pub struct PacedAIProvider<P: AIProvider> {
    inner: P,
    min_interval: Duration,
    /// Start time of the previous call; held across the wait so calls queue.
    last_call: Mutex<Option<Instant>>,
}

impl<P: AIProvider> PacedAIProvider<P> {
    pub fn new(inner: P, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: AIProvider> AIProvider for PacedAIProvider<P> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        {
            let mut last_call = self.last_call.lock().await;
            if let Some(previous) = *last_call {
                let ready_at = previous + self.min_interval;
                let now = Instant::now();
                if ready_at > now {
                    tracing::debug!(
                        wait_ms = (ready_at - now).as_millis() as u64,
                        purpose = request.metadata.purpose.as_str(),
                        "Pacing model call"
                    );
                    sleep_until(ready_at).await;
                }
            }
            *last_call = Some(Instant::now());
        }

        self.inner.complete(request).await
    }

    fn provider_info(&self) -> ProviderInfo {
        self.inner.provider_info()
    }
}
