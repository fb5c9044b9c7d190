// crates/dpf-core/src/error.rs

//! Error taxonomy: configuration, readiness, protocol-state, I/O, and
//! key-mismatch failures. No silent recovery and no retries happen inside
//! the core; every error is fatal to the call that produced it.

use thiserror::Error;

/// Errors surfaced by the DPF core, dealer, evaluators, and wildcard
/// completion.
#[derive(Debug, Error)]
pub enum DpfError {
    /// Output types inconsistent, domain/range mismatch, endpoints unsorted,
    /// or a memoizer sized below its required pivot.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Evaluator invoked on a key with an outstanding wildcard relevant to
    /// the requested outputs. `slot == usize::MAX` means the input `α`
    /// itself is still a wildcard.
    #[error("not ready: slot {slot} is still a wildcard")]
    NotReady { slot: usize },

    /// Illegal state transition during wildcard completion (e.g. a second
    /// completion attempt, or an out-of-order message). Poisons the slot
    /// permanently.
    #[error("protocol state error at slot {slot}: {reason}")]
    ProtocolState { slot: usize, reason: String },

    /// Short read/write from a stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `common_part_hash` differs between the two parties' keys.
    #[error("key mismatch: common part hash differs between parties")]
    KeyMismatch,
}

pub type Result<T> = core::result::Result<T, DpfError>;
