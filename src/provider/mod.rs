//! Provider integration - the outbound half of the bridge.
//!
//! The visual-generation provider is an asynchronous job API: submit a
//! request, poll its status, download the finished file. The poller in this
//! module is the only code that talks to it.

pub mod poller;

pub use poller::{GenerationOutcome, JobPoller, PollPolicy, VisualFormat};

use thiserror::Error;

/// Errors the generation pipeline can surface to a tool handler.
///
/// Provider error bodies are embedded verbatim so operators can diagnose
/// provider-side problems from the tool output alone.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("provider rejected the submission (HTTP {status}): {body}")]
    Submission { status: u16, body: String },
    #[error("provider response did not contain a job id")]
    MissingJobId,
    #[error("generation failed: {0}")]
    Failed(String),
    #[error("generation timed out after {0} seconds")]
    Timeout(u64),
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}
