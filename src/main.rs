use std::sync::Arc;

use vendor_assist::config::{COMPANY_DIRECTORY_NAMESPACE, ChunkingConfig, RetrievalConfig};
use vendor_assist::context::SessionContext;
use vendor_assist::error::ConfigError;
use vendor_assist::orchestrator::Orchestrator;
use vendor_assist::retrieval::{
    EmbeddingIndex, Indexer, OpenAiEmbedder, RetrievalService, SourceDocument,
};
use vendor_assist::session::SessionStore;
use vendor_assist::tools::ToolRegistry;
use vendor_assist::tools::builtin::register_onboarding_tools;

/// A tiny built-in corpus so the demo works without the real company
/// directory mounted.
const DEMO_CORPUS: &[(&str, &str)] = &[
    (
        "tech-solutions.md",
        "## Tech Solutions Inc.\n\nTech Solutions Inc. is a software vendor incorporated in \
         the United States. It holds SOC 2 Type II and ISO 27001 certifications.\n\n\
         ## Risk assessment\n\nLow risk. No outstanding regulatory findings.",
    ),
    (
        "globex.md",
        "## Globex Corporation\n\nGlobex Corporation is incorporated in Germany and is \
         currently under regulatory review for data-handling practices.\n\n\
         ## Risk assessment\n\nElevated risk. A GDPR inquiry was opened in 2024.",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Read API key from environment
    let api_key = match std::env::var("OPENAI_API_KEY") {
        Ok(key) => key,
        Err(_) => {
            eprintln!("  export OPENAI_API_KEY=sk-...");
            return Err(ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()).into());
        }
    };
    let model = std::env::var("VENDOR_ASSIST_EMBED_MODEL").ok();

    eprintln!("Vendor Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Embedding model: {}", model.as_deref().unwrap_or("text-embedding-3-large"));
    eprintln!();

    // ── Retrieval stack ─────────────────────────────────────────────
    let embedder = Arc::new(OpenAiEmbedder::new(
        secrecy::SecretString::from(api_key),
        model,
        None,
    ));
    let index = Arc::new(EmbeddingIndex::new());

    let indexer = Indexer::new(embedder.clone(), index.clone(), ChunkingConfig::default());
    if !indexer.namespace_is_populated(COMPANY_DIRECTORY_NAMESPACE).await {
        let docs: Vec<SourceDocument> = DEMO_CORPUS
            .iter()
            .map(|(id, text)| SourceDocument::new(*id, *text))
            .collect();
        let report = indexer
            .index_documents(&docs, COMPANY_DIRECTORY_NAMESPACE)
            .await?;
        eprintln!(
            "   Indexed demo corpus: {} documents, {} chunks",
            report.documents, report.chunks
        );
    }

    let retrieval = Arc::new(RetrievalService::new(
        embedder,
        index,
        RetrievalConfig::default(),
    ));

    // ── Orchestrator + tool registry ────────────────────────────────
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(SessionStore::new()),
        retrieval,
    ));
    let registry = ToolRegistry::new();
    register_onboarding_tools(&registry, orchestrator).await;

    eprintln!("   Tools: {}", registry.list().await.join(", "));
    eprintln!();

    // ── Scripted onboarding run (stands in for the chat driver) ─────
    let ctx = SessionContext::default();
    let script: &[(&str, serde_json::Value)] = &[
        (
            "lookup_company_information",
            serde_json::json!({"company_name": "Tech Solutions Inc.", "country": "United States"}),
        ),
        (
            "save_compliance_certifications",
            serde_json::json!({"certifications": ["SOC 2 Type II", "ISO 27001"]}),
        ),
        (
            "save_data_access_requirements",
            serde_json::json!({"requirements": ["customer contact info", "billing data"]}),
        ),
        ("get_onboarding_summary", serde_json::json!({})),
    ];

    for (name, params) in script {
        let tool = registry
            .get(name)
            .await
            .ok_or_else(|| anyhow::anyhow!("tool {name} not registered"))?;
        match tool.execute(params.clone(), &ctx).await {
            Ok(output) => {
                if let Some(summary) = output.result.get("summary").and_then(|v| v.as_str()) {
                    println!("{summary}");
                } else if let Some(message) = output.result.get("message").and_then(|v| v.as_str())
                {
                    println!("[{name}] {message}");
                }
            }
            Err(e) => println!("[{name}] failed: {}", e.user_message()),
        }
    }

    Ok(())
}
