//! Error taxonomy for the ingestion pipeline.
//!
//! Two failure classes surface per refresh tick: the remote store could
//! not be reached (or answered non-2xx), or a stored record could not be
//! turned into a normalized reading. Neither is fatal to the process;
//! the dashboard shell shows an error state for that tick and the next
//! scheduled tick retries on its own.

use thiserror::Error;

// ---

/// Failure of one fetch-and-normalize pass.
#[derive(Debug, Error)]
pub enum IngestError {
    // ---
    /// Network failure, timeout, or non-2xx response from the store.
    #[error("failed to fetch readings from the store: {0}")]
    Fetch(#[from] reqwest::Error),

    /// A record was present but missing a required field or carried a
    /// time value that cannot be parsed.
    #[error("malformed record {id:?}: {reason}")]
    Malformed { id: String, reason: String },
}
