//! Response stream — where a finished answer goes.
//!
//! The transport owns the stream; the router only calls `send` once per
//! request. An implementation is provided for `tokio::sync::mpsc::Sender` so
//! in-process callers (the CLI, tests) can collect answers from a channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::NormalizedAnswer;

/// Session-scoped sink for the normalized answer.
#[async_trait]
pub trait ResponseStream: Send + Sync {
    /// Deliver the answer. An error means the channel itself is broken.
    async fn send(&self, answer: NormalizedAnswer) -> anyhow::Result<()>;
}

#[async_trait]
impl ResponseStream for mpsc::Sender<NormalizedAnswer> {
    async fn send(&self, answer: NormalizedAnswer) -> anyhow::Result<()> {
        mpsc::Sender::send(self, answer)
            .await
            .map_err(|e| anyhow::anyhow!("response channel closed: {e}"))
    }
}
