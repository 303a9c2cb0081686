//! State machine trait for status enums.
//!
//! Gives iterative procedures (such as the constrained allocation loop) a
//! uniform way to validate moves between their states.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// let next = AllocationStatus::Running.transition_to(AllocationStatus::ConvergedStable)?;
/// assert!(next.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Phase {
        Warmup,
        Iterating,
        Done,
    }

    impl StateMachine for Phase {
        fn can_transition_to(&self, target: &Self) -> bool {
            use Phase::*;
            matches!((self, target), (Warmup, Iterating) | (Iterating, Iterating) | (Iterating, Done))
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Phase::*;
            match self {
                Warmup => vec![Iterating],
                Iterating => vec![Iterating, Done],
                Done => vec![],
            }
        }
    }

    #[test]
    fn transition_to_accepts_listed_target() {
        assert_eq!(Phase::Warmup.transition_to(Phase::Iterating), Ok(Phase::Iterating));
    }

    #[test]
    fn transition_to_rejects_skipped_phase() {
        let err = Phase::Warmup.transition_to(Phase::Done).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn self_loops_are_allowed_when_declared() {
        assert!(Phase::Iterating.transition_to(Phase::Iterating).is_ok());
    }

    #[test]
    fn only_done_is_terminal() {
        assert!(Phase::Done.is_terminal());
        assert!(!Phase::Warmup.is_terminal());
        assert!(!Phase::Iterating.is_terminal());
    }
}
