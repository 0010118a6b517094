//! Errors that escape request handling.
//!
//! Provider failures never show up here: they are turned into a spoken
//! sentence by the dispatcher. Only a broken response channel is fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    /// The caller's response stream rejected the answer.
    #[error("failed to send answer for session {session}: {source}")]
    ChannelClosed {
        session: String,
        #[source]
        source: anyhow::Error,
    },
}
