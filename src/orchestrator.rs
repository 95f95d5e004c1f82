//! Workflow orchestrator — the step-state machine behind the four
//! onboarding actions.
//!
//! The conversational driver decides *when* to call an action; the
//! orchestrator decides whether it is legal and what it does to the
//! session. Free-form text never mutates state directly — everything
//! passes through a validated action, and each action's mutation is
//! all-or-nothing: validation and retrieval happen before the first write.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::config::COMPANY_DIRECTORY_NAMESPACE;
use crate::error::{RetrievalError, SessionError};
use crate::retrieval::RetrievalService;
use crate::session::{
    CompanyProfile, OnboardingSession, OnboardingStep, OnboardingSummary, SessionStore,
};

/// Failure of one action, in the shape the driver consumes: either a
/// recoverable validation problem to re-prompt on, or a retryable
/// dependency failure the conversation can continue without.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Retrieval(#[from] RetrievalError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Whether the driver may retry the same action later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retrieval(e) if e.is_retryable())
    }
}

/// Result of the company-lookup action.
#[derive(Debug, Clone, Serialize)]
pub struct LookupOutcome {
    pub profile: CompanyProfile,
    pub step: OnboardingStep,
    /// Whether this call moved the workflow forward.
    pub advanced: bool,
    /// False when the index had no matching entries — a legitimate
    /// outcome the driver should relay, not paper over.
    pub evidence_found: bool,
}

/// Result of either save action.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub step: OnboardingStep,
    pub advanced: bool,
    /// Entries actually added by this call (post-dedup for
    /// certifications; everything for requirements).
    pub added: usize,
    /// The full stored list after this call.
    pub stored: Vec<String>,
}

/// Coordinates the session store and the retrieval service behind the
/// fixed action set.
pub struct Orchestrator {
    sessions: Arc<SessionStore>,
    retrieval: Arc<RetrievalService>,
}

impl Orchestrator {
    pub fn new(sessions: Arc<SessionStore>, retrieval: Arc<RetrievalService>) -> Self {
        Self {
            sessions,
            retrieval,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Look up a company in the vendor directory and store the evidence.
    ///
    /// Always permitted: a re-lookup overwrites the company profile and
    /// leaves later-step data untouched. Advances the workflow only from
    /// the lookup step. Zero matches still count as a successful lookup.
    pub async fn lookup_company(
        &self,
        session_id: Uuid,
        company_name: &str,
        country: Option<&str>,
    ) -> Result<LookupOutcome, ActionError> {
        let company_name = company_name.trim();
        if company_name.is_empty() {
            return Err(ActionError::Validation(
                "company_name must not be blank".to_string(),
            ));
        }
        let country = country.map(str::trim).filter(|c| !c.is_empty());

        let mut query = format!("company information for {company_name}");
        if let Some(country) = country {
            query.push_str(&format!(" incorporated in {country}"));
        }

        let handle = self.sessions.get_or_create(session_id).await;
        let mut session = handle.lock().await;

        // Retrieval before any write: a dependency failure leaves the
        // session exactly as it was.
        let evidence = self
            .retrieval
            .search(
                &query,
                COMPANY_DIRECTORY_NAMESPACE,
                self.retrieval.config().top_k,
                None,
            )
            .await?;

        let profile = CompanyProfile {
            legal_name: company_name.to_string(),
            country: country.map(String::from),
            lookup_evidence: evidence,
        };
        let evidence_found = !profile.lookup_evidence.is_empty();

        session.set_company_profile(profile.clone());
        let advanced = advance(&mut session, OnboardingStep::AwaitingLookup)?;

        tracing::info!(
            %session_id,
            company = company_name,
            evidence_found,
            advanced,
            "Company lookup completed"
        );
        Ok(LookupOutcome {
            profile,
            step: session.current_step,
            advanced,
            evidence_found,
        })
    }

    /// Merge compliance certifications into the session, case-insensitively.
    ///
    /// Blank entries are filtered; a call with nothing usable is a
    /// validation failure and changes nothing. Only the first successful
    /// call advances the step — later calls just enrich the record.
    pub async fn save_compliance_certifications(
        &self,
        session_id: Uuid,
        certifications: Vec<String>,
    ) -> Result<SaveOutcome, ActionError> {
        let cleaned = clean_entries(certifications);
        if cleaned.is_empty() {
            return Err(ActionError::Validation(
                "no usable certifications provided — entries were empty or blank".to_string(),
            ));
        }

        let handle = self.sessions.get_or_create(session_id).await;
        let mut session = handle.lock().await;

        let added = session.merge_certifications(&cleaned);
        let advanced = advance(&mut session, OnboardingStep::AwaitingCompliance)?;

        tracing::info!(%session_id, added, advanced, "Saved compliance certifications");
        Ok(SaveOutcome {
            step: session.current_step,
            advanced,
            added,
            stored: session.compliance_certifications.clone(),
        })
    }

    /// Append data-access requirements to the session.
    ///
    /// Same emptiness rule as certifications; entries are appended without
    /// deduplication. Only the first successful call advances the step.
    pub async fn save_data_access_requirements(
        &self,
        session_id: Uuid,
        requirements: Vec<String>,
    ) -> Result<SaveOutcome, ActionError> {
        let cleaned = clean_entries(requirements);
        if cleaned.is_empty() {
            return Err(ActionError::Validation(
                "no usable requirements provided — entries were empty or blank".to_string(),
            ));
        }

        let handle = self.sessions.get_or_create(session_id).await;
        let mut session = handle.lock().await;

        let added = cleaned.len();
        session.append_requirements(&cleaned);
        let advanced = advance(&mut session, OnboardingStep::AwaitingAccessRequirements)?;

        tracing::info!(%session_id, added, advanced, "Saved data access requirements");
        Ok(SaveOutcome {
            step: session.current_step,
            advanced,
            added,
            stored: session.data_access_requirements.clone(),
        })
    }

    /// Snapshot the session. Pure read, permitted in any state.
    pub async fn get_onboarding_summary(
        &self,
        session_id: Uuid,
    ) -> Result<OnboardingSummary, ActionError> {
        let handle = self.sessions.get(session_id).await.map_err(|e| match e {
            SessionError::NotFound(_) => ActionError::Validation(
                "no application data found — start the vendor application first".to_string(),
            ),
            other => ActionError::Internal(other.to_string()),
        })?;
        let session = handle.lock().await;
        Ok(session.summary())
    }
}

/// Trim entries and drop the blanks.
fn clean_entries(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Advance the session if it sits at `expected`. A StateViolation here is
/// a programming-contract breach; log it rather than swallowing it.
fn advance(
    session: &mut OnboardingSession,
    expected: OnboardingStep,
) -> Result<bool, ActionError> {
    session.advance_from(expected).map_err(|e| {
        tracing::error!(session_id = %session.session_id, error = %e, "State violation");
        ActionError::Internal(e.to_string())
    })
}
