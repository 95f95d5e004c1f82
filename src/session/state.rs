//! Onboarding state machine — tracks which step the vendor application is in.

use serde::{Deserialize, Serialize};

/// The steps of the vendor-onboarding workflow.
///
/// Progresses linearly: AwaitingLookup → AwaitingCompliance →
/// AwaitingAccessRequirements → Complete. The driver never sees a backward
/// transition; a re-lookup in a later step overwrites the company profile
/// without moving the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    AwaitingLookup,
    AwaitingCompliance,
    AwaitingAccessRequirements,
    Complete,
}

impl OnboardingStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: OnboardingStep) -> bool {
        use OnboardingStep::*;
        matches!(
            (self, target),
            (AwaitingLookup, AwaitingCompliance)
                | (AwaitingCompliance, AwaitingAccessRequirements)
                | (AwaitingAccessRequirements, Complete)
        )
    }

    /// Whether this step is terminal (the application is complete).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            AwaitingLookup => Some(AwaitingCompliance),
            AwaitingCompliance => Some(AwaitingAccessRequirements),
            AwaitingAccessRequirements => Some(Complete),
            Complete => None,
        }
    }
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::AwaitingLookup
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitingLookup => "awaiting_lookup",
            Self::AwaitingCompliance => "awaiting_compliance",
            Self::AwaitingAccessRequirements => "awaiting_access_requirements",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use OnboardingStep::*;
        let transitions = [
            (AwaitingLookup, AwaitingCompliance),
            (AwaitingCompliance, AwaitingAccessRequirements),
            (AwaitingAccessRequirements, Complete),
        ];
        for (from, to) in transitions {
            assert!(
                from.can_transition_to(to),
                "{from} should transition to {to}"
            );
        }
    }

    #[test]
    fn invalid_transitions() {
        use OnboardingStep::*;
        // Skip steps
        assert!(!AwaitingLookup.can_transition_to(AwaitingAccessRequirements));
        assert!(!AwaitingLookup.can_transition_to(Complete));
        // Go backward
        assert!(!AwaitingCompliance.can_transition_to(AwaitingLookup));
        // Terminal
        assert!(!Complete.can_transition_to(AwaitingLookup));
        // Self-transition
        assert!(!AwaitingCompliance.can_transition_to(AwaitingCompliance));
    }

    #[test]
    fn steps_are_totally_ordered() {
        use OnboardingStep::*;
        assert!(AwaitingLookup < AwaitingCompliance);
        assert!(AwaitingCompliance < AwaitingAccessRequirements);
        assert!(AwaitingAccessRequirements < Complete);
    }

    #[test]
    fn is_terminal() {
        use OnboardingStep::*;
        assert!(Complete.is_terminal());
        assert!(!AwaitingLookup.is_terminal());
        assert!(!AwaitingAccessRequirements.is_terminal());
    }

    #[test]
    fn next_walks_all_steps() {
        use OnboardingStep::*;
        let expected = [AwaitingCompliance, AwaitingAccessRequirements, Complete];
        let mut current = AwaitingLookup;
        for expected_next in expected {
            let next = current.next().unwrap();
            assert_eq!(next, expected_next);
            current = next;
        }
        assert!(current.next().is_none());
    }

    #[test]
    fn display_matches_serde() {
        use OnboardingStep::*;
        for step in [
            AwaitingLookup,
            AwaitingCompliance,
            AwaitingAccessRequirements,
            Complete,
        ] {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            // JSON wraps in quotes
            assert_eq!(
                format!("\"{display}\""),
                json,
                "Display and serde should match for {step:?}"
            );
        }
    }
}
