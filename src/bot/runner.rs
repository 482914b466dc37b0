//! The receive loop.
//!
//! Updates are handled one at a time in arrival order. The offset moves past
//! an update before it is handled, so an update that keeps failing is not
//! redelivered forever. Shutdown is observed between polls.

use crate::bot::context::BotContext;
use crate::bot::handler::handle_update;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// Pause after a failed poll before trying again.
pub const DEFAULT_RETRY_PAUSE: Duration = Duration::from_secs(3);

pub struct ReceiveLoop {
    retry_pause: Duration,
}

impl Default for ReceiveLoop {
    fn default() -> Self {
        Self {
            retry_pause: DEFAULT_RETRY_PAUSE,
        }
    }
}

impl ReceiveLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }

    /// Poll and handle updates until `shutdown` resolves.
    ///
    /// Returns the number of updates handled.
    pub async fn run<F>(&self, ctx: &BotContext, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset: Option<i64> = None;
        let mut handled = 0u64;

        info!("Receive loop started");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, {} updates handled", handled);
                    break;
                }
                polled = ctx.transport.poll(offset) => match polled {
                    Ok(updates) => {
                        for update in updates {
                            offset = Some(update.update_id + 1);
                            if let Err(e) = handle_update(ctx, &update).await {
                                error!("Update {} failed: {}", update.update_id, e);
                            }
                            handled += 1;
                        }
                    }
                    Err(e) => {
                        warn!("Polling failed: {}; retrying in {:?}", e, self.retry_pause);
                        tokio::time::sleep(self.retry_pause).await;
                    }
                }
            }
        }

        handled
    }
}
