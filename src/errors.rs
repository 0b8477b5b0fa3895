use crate::github::GitHubError;
use thiserror::Error;

/// Failure taxonomy for event processing. `Ignored` events are not errors
/// and never reach this type; they surface as a success outcome with zero
/// actions (see `crate::processor::Outcome`).
#[derive(Debug, Error)]
pub enum AutomationError {
    /// The GitHub-side project/column structure violates the naming
    /// convention: no project, no closed-marker column, issue without a
    /// card. Nothing can safely be inferred; the event is dropped after
    /// logging.
    #[error("{0}")]
    Configuration(String),

    /// A remote query or mutation failed. Prior actions in the same
    /// sequence stay applied; no retry, no rollback.
    #[error("GitHub call failed: {0}")]
    Remote(#[from] GitHubError),
}
