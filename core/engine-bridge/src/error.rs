//! FILENAME: core/engine-bridge/src/error.rs

use thiserror::Error;

/// Failures while talking to the external calculation engine. All of these
/// are terminal for the request in progress; nothing here is retried.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine instance cannot be reached or opened.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The engine rejected a slot write - usually schema drift between the
    /// mapping table and the artifact actually loaded.
    #[error("engine rejected write to slot {slot}: {reason}")]
    Write { slot: String, reason: String },

    /// Recomputation did not converge or signalled an internal fault.
    #[error("engine recalculation failed: {0}")]
    Compute(String),

    /// The output region came back malformed (wrong shape or unreadable).
    #[error("engine output region malformed: {0}")]
    Read(String),
}

/// Failure to obtain an engine instance from the pool.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// Every instance stayed busy for the whole bounded wait. A
    /// backpressure signal: callers may retry with backoff.
    #[error("no engine instance became available within {waited_ms} ms")]
    Exhausted { waited_ms: u64 },

    /// Opening a fresh instance failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
