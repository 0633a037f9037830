/// Request state definitions for tracking traversal progress
///
/// Every traversal request moves through this lifecycle exactly once.
/// Nothing ever moves back to `Queued`; revisiting a target requires a fresh
/// request with a dedup key the engine has not dispatched yet.
use std::fmt;

/// Represents the current state of a traversal request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    // ===== Active States =====
    /// Request is in the frontier waiting for dispatch
    Queued,

    /// Request was handed to the fetch client and is in flight
    Dispatched,

    /// A response (possibly carrying the failed transport status) arrived
    Completed,

    // ===== Terminal States =====
    /// The step handler ran on the response
    Handled,

    /// The response status is not one the step handles; dropped
    Discarded,

    /// The fetch task itself died before producing a response
    Failed,

    // ===== Terminal Skip States =====
    /// Dedup key was already dispatched in this run
    Duplicate,

    /// Target host is outside the vendor's allowed domains
    Offsite,

    /// Target is excluded by the host's robots.txt
    RobotsDenied,
}

/// Error returned for a transition the lifecycle does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid request state transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: RequestState,
    pub to: RequestState,
}

impl RequestState {
    /// Returns true if this is a terminal state (no further processing)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if the request may still be processed
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Dispatched | Self::Completed)
    }

    /// Returns true if the request was skipped before reaching the fetcher
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Duplicate | Self::Offsite | Self::RobotsDenied)
    }

    /// Returns whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Queued, Dispatched)
                | (Queued, Duplicate)
                | (Queued, Offsite)
                | (Dispatched, RobotsDenied)
                | (Dispatched, Completed)
                | (Dispatched, Failed)
                | (Completed, Handled)
                | (Completed, Discarded)
        )
    }

    /// Moves to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(self, next: RequestState) -> Result<RequestState, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Returns a stable lowercase label for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Handled => "handled",
            Self::Discarded => "discarded",
            Self::Failed => "failed",
            Self::Duplicate => "duplicate",
            Self::Offsite => "offsite",
            Self::RobotsDenied => "robots_denied",
        }
    }

    /// Returns all possible request states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Queued,
            Self::Dispatched,
            Self::Completed,
            Self::Handled,
            Self::Discarded,
            Self::Failed,
            Self::Duplicate,
            Self::Offsite,
            Self::RobotsDenied,
        ]
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!RequestState::Queued.is_terminal());
        assert!(!RequestState::Dispatched.is_terminal());
        assert!(!RequestState::Completed.is_terminal());

        assert!(RequestState::Handled.is_terminal());
        assert!(RequestState::Discarded.is_terminal());
        assert!(RequestState::Failed.is_terminal());
        assert!(RequestState::Duplicate.is_terminal());
        assert!(RequestState::Offsite.is_terminal());
        assert!(RequestState::RobotsDenied.is_terminal());
    }

    #[test]
    fn test_is_skipped() {
        assert!(RequestState::Duplicate.is_skipped());
        assert!(RequestState::Offsite.is_skipped());
        assert!(RequestState::RobotsDenied.is_skipped());

        assert!(!RequestState::Handled.is_skipped());
        assert!(!RequestState::Failed.is_skipped());
    }

    #[test]
    fn test_happy_path() {
        let state = RequestState::Queued
            .transition(RequestState::Dispatched)
            .and_then(|s| s.transition(RequestState::Completed))
            .and_then(|s| s.transition(RequestState::Handled))
            .unwrap();
        assert_eq!(state, RequestState::Handled);
    }

    #[test]
    fn test_never_back_to_queued() {
        for state in RequestState::all_states() {
            assert!(
                !state.can_transition_to(RequestState::Queued),
                "{} must not return to queued",
                state
            );
        }
    }

    #[test]
    fn test_terminal_states_have_no_successor() {
        for from in RequestState::all_states()
            .into_iter()
            .filter(|s| s.is_terminal())
        {
            for to in RequestState::all_states() {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_duplicate_is_decided_before_dispatch() {
        assert!(RequestState::Queued.can_transition_to(RequestState::Duplicate));
        assert!(!RequestState::Dispatched.can_transition_to(RequestState::Duplicate));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = RequestState::Queued
            .transition(RequestState::Handled)
            .unwrap_err();
        assert_eq!(err.from, RequestState::Queued);
        assert_eq!(err.to, RequestState::Handled);
        assert_eq!(
            err.to_string(),
            "Invalid request state transition: queued -> handled"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RequestState::RobotsDenied), "robots_denied");
        assert_eq!(format!("{}", RequestState::Dispatched), "dispatched");
    }
}
