//! Vendor-onboarding tools — the four actions the driver can dispatch.
//!
//! The driver chooses among these; the orchestrator behind them enforces
//! step ordering and validation, so calling a tool "too early" is always
//! safe.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::context::SessionContext;
use crate::orchestrator::{ActionError, Orchestrator};
use crate::tools::ToolRegistry;
use crate::tools::tool::{Tool, ToolError, ToolOutput, optional_str, require_str, require_str_array};

fn map_action_err(e: ActionError) -> ToolError {
    match e {
        ActionError::Validation(reason) => ToolError::InvalidParameters(reason),
        ActionError::Retrieval(err) if err.is_retryable() => ToolError::Retryable(err.to_string()),
        ActionError::Retrieval(err) => ToolError::InvalidParameters(err.to_string()),
        ActionError::Internal(reason) => ToolError::ExecutionFailed(reason),
    }
}

/// Register all four onboarding tools against one orchestrator.
pub async fn register_onboarding_tools(registry: &ToolRegistry, orchestrator: Arc<Orchestrator>) {
    registry
        .register(Arc::new(LookupCompanyTool::new(orchestrator.clone())))
        .await;
    registry
        .register(Arc::new(SaveComplianceCertificationsTool::new(
            orchestrator.clone(),
        )))
        .await;
    registry
        .register(Arc::new(SaveDataAccessRequirementsTool::new(
            orchestrator.clone(),
        )))
        .await;
    registry
        .register(Arc::new(OnboardingSummaryTool::new(orchestrator)))
        .await;
}

// ── lookup_company_information ──────────────────────────────────────

/// Tool that looks a prospective vendor up in the company directory.
pub struct LookupCompanyTool {
    orchestrator: Arc<Orchestrator>,
}

impl LookupCompanyTool {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl Tool for LookupCompanyTool {
    fn name(&self) -> &str {
        "lookup_company_information"
    }

    fn description(&self) -> &str {
        "Look up information about a company in the vendor database. Searches \
         company risk-profile documents for legal information, compliance status, \
         and risk assessments, returning ranked evidence snippets. Call this first \
         when the vendor's legal name is known."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "company_name": {
                    "type": "string",
                    "description": "The legal name of the company to look up"
                },
                "country": {
                    "type": "string",
                    "description": "Optional country of incorporation to narrow the search"
                }
            },
            "required": ["company_name"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let company_name = require_str(&params, "company_name")?;
        let country = optional_str(&params, "country");

        let outcome = self
            .orchestrator
            .lookup_company(ctx.session_id, company_name, country)
            .await
            .map_err(map_action_err)?;

        let message = if outcome.evidence_found {
            format!(
                "Found {} evidence snippet(s) for {}.",
                outcome.profile.lookup_evidence.len(),
                outcome.profile.legal_name
            )
        } else {
            format!(
                "No matching records found for {} in the vendor database.",
                outcome.profile.legal_name
            )
        };

        Ok(ToolOutput::success(
            serde_json::json!({
                "company": outcome.profile.legal_name,
                "country": outcome.profile.country,
                "evidence": outcome.profile.lookup_evidence,
                "evidence_found": outcome.evidence_found,
                "step": outcome.step,
                "advanced": outcome.advanced,
                "message": message,
            }),
            start.elapsed(),
        ))
    }
}

// ── save_compliance_certifications ──────────────────────────────────

/// Tool that records the vendor's compliance certifications.
pub struct SaveComplianceCertificationsTool {
    orchestrator: Arc<Orchestrator>,
}

impl SaveComplianceCertificationsTool {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl Tool for SaveComplianceCertificationsTool {
    fn name(&self) -> &str {
        "save_compliance_certifications"
    }

    fn description(&self) -> &str {
        "Save the compliance certifications a vendor holds (e.g. \"SOC 2 Type II\", \
         \"ISO 27001\", \"GDPR compliant\") for the risk assessment. Certifications \
         are merged into the application; repeated names are deduplicated."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "certifications": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Certification names the vendor holds"
                }
            },
            "required": ["certifications"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let certifications = require_str_array(&params, "certifications")?;

        let outcome = self
            .orchestrator
            .save_compliance_certifications(ctx.session_id, certifications)
            .await
            .map_err(map_action_err)?;

        Ok(ToolOutput::success(
            serde_json::json!({
                "status": "saved",
                "certifications": outcome.stored,
                "added": outcome.added,
                "step": outcome.step,
                "advanced": outcome.advanced,
                "message": format!(
                    "Compliance certifications saved: {}. Stored for the vendor risk assessment.",
                    outcome.stored.join(", ")
                ),
            }),
            start.elapsed(),
        ))
    }
}

// ── save_data_access_requirements ───────────────────────────────────

/// Tool that records what data the vendor wants to access.
pub struct SaveDataAccessRequirementsTool {
    orchestrator: Arc<Orchestrator>,
}

impl SaveDataAccessRequirementsTool {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl Tool for SaveDataAccessRequirementsTool {
    fn name(&self) -> &str {
        "save_data_access_requirements"
    }

    fn description(&self) -> &str {
        "Save the data access requirements a vendor has stated (what data they \
         need and why). Requirements are appended to the application for review."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "requirements": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Free-text data access requirement statements"
                }
            },
            "required": ["requirements"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let requirements = require_str_array(&params, "requirements")?;

        let outcome = self
            .orchestrator
            .save_data_access_requirements(ctx.session_id, requirements)
            .await
            .map_err(map_action_err)?;

        Ok(ToolOutput::success(
            serde_json::json!({
                "status": "saved",
                "requirements": outcome.stored,
                "added": outcome.added,
                "step": outcome.step,
                "advanced": outcome.advanced,
                "message": format!(
                    "Data access requirements saved ({} entr{}). Stored for review.",
                    outcome.added,
                    if outcome.added == 1 { "y" } else { "ies" }
                ),
            }),
            start.elapsed(),
        ))
    }
}

// ── get_onboarding_summary ──────────────────────────────────────────

/// Tool that reads back the application so far.
pub struct OnboardingSummaryTool {
    orchestrator: Arc<Orchestrator>,
}

impl OnboardingSummaryTool {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl Tool for OnboardingSummaryTool {
    fn name(&self) -> &str {
        "get_onboarding_summary"
    }

    fn description(&self) -> &str {
        "Get a summary of the vendor application so far: company profile, \
         certifications, data access requirements, and which sections are still \
         pending. Read-only; safe to call at any point."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: &SessionContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();

        let summary = self
            .orchestrator
            .get_onboarding_summary(ctx.session_id)
            .await
            .map_err(map_action_err)?;

        Ok(ToolOutput::success(
            serde_json::json!({
                "summary": summary.render(),
                "step": summary.current_step,
                "sections_completed": summary.sections_completed(),
                "pending": summary.pending_sections(),
                "data": summary,
            }),
            start.elapsed(),
        ))
    }
}
