//! Onboarding session data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;

use super::state::OnboardingStep;

/// A bounded excerpt of indexed text returned by retrieval.
///
/// Immutable once produced; ordered by descending relevance score with
/// stable ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSnippet {
    /// Identifier of the source document the excerpt came from.
    pub source_id: String,
    /// Truncated, whitespace-normalized excerpt.
    pub text: String,
    /// Similarity score from the index (higher is more relevant).
    pub relevance_score: f32,
}

/// Company record built by the lookup action.
///
/// Stores the raw retrieval evidence, not a parsed risk score — risk
/// interpretation belongs to the conversational driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub legal_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Evidence snippets in relevance order. May be empty: absence of
    /// evidence is a valid lookup outcome.
    pub lookup_evidence: Vec<EvidenceSnippet>,
}

/// The mutable onboarding record for one conversation.
///
/// Lives only in memory; destroyed when the conversation ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingSession {
    pub session_id: Uuid,
    pub current_step: OnboardingStep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_profile: Option<CompanyProfile>,
    /// Certification names, deduplicated case-insensitively. First-seen
    /// casing is preserved, insertion order kept for stable summaries.
    pub compliance_certifications: Vec<String>,
    /// Free-text requirement statements, appended in call order. Not
    /// deduplicated: requirements may legitimately repeat phrasing.
    pub data_access_requirements: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl OnboardingSession {
    /// Create a fresh session at the lookup step.
    pub fn new(session_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            current_step: OnboardingStep::default(),
            company_profile: None,
            compliance_certifications: Vec::new(),
            data_access_requirements: Vec::new(),
            created_at: now,
            last_updated_at: now,
        }
    }

    /// Replace the company profile. Later-step data is left untouched.
    pub fn set_company_profile(&mut self, profile: CompanyProfile) {
        self.company_profile = Some(profile);
        self.touch();
    }

    /// Merge certifications case-insensitively. Returns the number of
    /// entries that were actually new.
    pub fn merge_certifications(&mut self, certifications: &[String]) -> usize {
        let mut added = 0;
        for cert in certifications {
            let known = self
                .compliance_certifications
                .iter()
                .any(|existing| existing.to_lowercase() == cert.to_lowercase());
            if !known {
                self.compliance_certifications.push(cert.clone());
                added += 1;
            }
        }
        if added > 0 {
            self.touch();
        }
        added
    }

    /// Append data-access requirements in call order.
    pub fn append_requirements(&mut self, requirements: &[String]) {
        self.data_access_requirements
            .extend(requirements.iter().cloned());
        if !requirements.is_empty() {
            self.touch();
        }
    }

    /// Advance the step, but only if the session is currently at
    /// `expected`. Returns whether an advance happened.
    ///
    /// Advancing past the terminal step is a contract breach: none of the
    /// public actions pass `Complete` as the expected step.
    pub fn advance_from(&mut self, expected: OnboardingStep) -> Result<bool, SessionError> {
        if self.current_step != expected {
            return Ok(false);
        }
        let next = expected.next().ok_or_else(|| {
            SessionError::StateViolation(format!(
                "attempted to advance past terminal step {}",
                expected
            ))
        })?;
        self.current_step = next;
        self.touch();
        Ok(true)
    }

    /// Snapshot the session for the driver. Pure read.
    pub fn summary(&self) -> OnboardingSummary {
        OnboardingSummary {
            session_id: self.session_id,
            current_step: self.current_step,
            company_profile: self.company_profile.clone(),
            compliance_certifications: self.compliance_certifications.clone(),
            data_access_requirements: self.data_access_requirements.clone(),
            created_at: self.created_at,
            last_updated_at: self.last_updated_at,
        }
    }

    fn touch(&mut self) {
        self.last_updated_at = Utc::now();
    }
}

/// Read model of a session, returned by the summary action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingSummary {
    pub session_id: Uuid,
    pub current_step: OnboardingStep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_profile: Option<CompanyProfile>,
    pub compliance_certifications: Vec<String>,
    pub data_access_requirements: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl OnboardingSummary {
    /// Which of the three data sections are still missing.
    pub fn pending_sections(&self) -> Vec<&'static str> {
        let mut pending = Vec::new();
        if self.company_profile.is_none() {
            pending.push("Company information");
        }
        if self.compliance_certifications.is_empty() {
            pending.push("Compliance certifications");
        }
        if self.data_access_requirements.is_empty() {
            pending.push("Data access requirements");
        }
        pending
    }

    /// Number of completed sections out of three.
    pub fn sections_completed(&self) -> usize {
        3 - self.pending_sections().len()
    }

    /// Render the summary as text the driver can relay conversationally.
    pub fn render(&self) -> String {
        let mut parts = vec!["VENDOR APPLICATION SUMMARY".to_string()];

        if let Some(ref profile) = self.company_profile {
            match profile.country {
                Some(ref country) => {
                    parts.push(format!("Company: {} ({})", profile.legal_name, country))
                }
                None => parts.push(format!("Company: {}", profile.legal_name)),
            }
            parts.push(format!(
                "Lookup evidence: {} snippet(s) on file",
                profile.lookup_evidence.len()
            ));
        }

        if !self.compliance_certifications.is_empty() {
            parts.push(format!(
                "Compliance certifications: {}",
                self.compliance_certifications.join(", ")
            ));
        }

        if !self.data_access_requirements.is_empty() {
            parts.push(format!(
                "Data access requirements: {}",
                self.data_access_requirements.join("; ")
            ));
        }

        parts.push(format!(
            "Application status: {}/3 sections completed",
            self.sections_completed()
        ));

        let pending = self.pending_sections();
        if pending.is_empty() {
            parts.push("Application complete — all required information collected.".to_string());
        } else {
            parts.push(format!("Pending: {}", pending.join(", ")));
        }

        parts.join("\n")
    }
}
