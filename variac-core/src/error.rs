//! Errors reported by the profile runner

/// Errors that can occur when controlling profile execution
///
/// Everything else (degenerate steps, pause/stop in any phase) is
/// normalized instead of reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    /// `start()` was called with no profile, or with an empty one
    #[error("no profile loaded")]
    NoProfileLoaded,
}
