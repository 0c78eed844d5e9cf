//! Per-class pass state.
//!
//! A class must be registered by pass 0 before its body can be resolved
//! by pass 1; only a template specialization may re-enter resolution
//! after pass 1 has completed. Transitions outside this lattice are
//! programmer errors surfaced as typed faults.

use thiserror::Error;

/// Where a class sits in the two-pass lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Unregistered,
    RegisteredPass0,
    ResolvedPass1,
    SpecializationResolved,
}

/// An illegal pass transition was attempted.
#[derive(Debug, Clone, Error)]
#[error("illegal pass transition for `{name}`: {from:?} -> {to:?}")]
pub struct StateError {
    pub name: String,
    pub from: PassState,
    pub to: PassState,
}

impl PassState {
    /// Validate and perform a transition.
    pub fn advance(self, to: PassState, name: &str) -> Result<PassState, StateError> {
        use PassState::*;
        let legal = matches!(
            (self, to),
            (Unregistered, RegisteredPass0)
                | (RegisteredPass0, ResolvedPass1)
                | (ResolvedPass1, SpecializationResolved)
                | (SpecializationResolved, SpecializationResolved)
        );
        if legal {
            Ok(to)
        } else {
            Err(StateError {
                name: name.to_string(),
                from: self,
                to,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PassState::*;

    #[test]
    fn straight_line_is_legal() {
        let s = Unregistered.advance(RegisteredPass0, "A").unwrap();
        let s = s.advance(ResolvedPass1, "A").unwrap();
        let s = s.advance(SpecializationResolved, "A").unwrap();
        // further specializations may re-enter
        s.advance(SpecializationResolved, "A").unwrap();
    }

    #[test]
    fn skipping_pass0_is_rejected() {
        assert!(Unregistered.advance(ResolvedPass1, "A").is_err());
    }

    #[test]
    fn reentering_pass1_is_rejected() {
        assert!(ResolvedPass1.advance(ResolvedPass1, "A").is_err());
    }
}
