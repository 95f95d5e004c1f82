//! Per-conversation onboarding record: state machine, data model, store.

pub mod model;
pub mod state;
pub mod store;

pub use model::{CompanyProfile, EvidenceSnippet, OnboardingSession, OnboardingSummary};
pub use state::OnboardingStep;
pub use store::SessionStore;
