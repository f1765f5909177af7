use crate::AttemptId;

/// Side effects requested by [`crate::update`] for the engine to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Begin the one network request for a newly running item.
    StartAnalysis { attempt: AttemptId, url: String },
    /// Fire the cancellation token of a live attempt.
    CancelAnalysis { attempt: AttemptId },
}
