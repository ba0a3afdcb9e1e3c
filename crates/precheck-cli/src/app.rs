//! Wiring between configuration, intake and the extractor.

use crate::cli::ExtractArgs;
use crate::config::{AppConfig, EmbeddingSettings};
use crate::error::Result;
use crate::source::{merge_sources, MergedInput};
use precheck_domain::{FieldGroup, LlmProvider};
use precheck_embed::{EmbeddingModel, SharedEmbedder, TokenHashEmbedder};
use precheck_extractor::Extractor;
use precheck_llm::GatewayProvider;
use serde::Serialize;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// The JSON document printed by `extract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    /// Document identifier
    pub filename: String,

    /// Description template, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Resolution template, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// Build the gateway provider described by `config`.
pub fn build_provider(config: &AppConfig) -> GatewayProvider {
    let llm = &config.llm;
    let api_key = llm.api_key().unwrap_or_else(|| {
        warn!(
            "{} is not set; gateway calls will fail and yield empty templates",
            llm.api_key_env
        );
        String::new()
    });

    let provider = GatewayProvider::new(&llm.endpoint, &llm.model, api_key)
        .with_auth(llm.auth)
        .with_system_prompt(&llm.system_prompt)
        .with_sampling(llm.temperature, llm.top_p)
        .with_timeout(Duration::from_secs(llm.timeout_secs))
        .with_max_retries(llm.max_retries);

    match &llm.workspace {
        Some(workspace) => provider.with_workspace(workspace),
        None => provider,
    }
}

/// Build the embedding model described by `settings`.
///
/// A configured `model_dir` loads the ONNX sentence-transformer and any
/// failure to do so is an error; otherwise the token-hash embedder is used.
pub fn build_embedder(settings: &EmbeddingSettings) -> Result<SharedEmbedder> {
    match &settings.model_dir {
        Some(dir) => load_onnx(dir),
        None => {
            info!(
                "No embedding model_dir configured, using token-hash embeddings ({} dims)",
                settings.dimension
            );
            Ok(Arc::new(TokenHashEmbedder::new(settings.dimension)))
        }
    }
}

#[cfg(feature = "onnx-embeddings")]
fn load_onnx(dir: &Path) -> Result<SharedEmbedder> {
    Ok(Arc::new(precheck_embed::OnnxEmbedder::load(dir)?))
}

#[cfg(not(feature = "onnx-embeddings"))]
fn load_onnx(dir: &Path) -> Result<SharedEmbedder> {
    Err(crate::error::CliError::Config(format!(
        "embedding.model_dir is set to {} but precheck was built without the onnx-embeddings feature",
        dir.display()
    )))
}

/// Build the production extractor: gateway completions plus the configured
/// embedding model.
pub fn build_extractor(config: &AppConfig) -> Result<Extractor<GatewayProvider, SharedEmbedder>> {
    Ok(Extractor::new(
        build_provider(config),
        build_embedder(&config.embedding)?,
        config.extractor.clone(),
    )?)
}

/// Run the requested groups over one merged document.
pub async fn extract_report<L, E>(
    extractor: &Extractor<L, E>,
    input: &MergedInput,
    groups: &[FieldGroup],
) -> ExtractionReport
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
    E: EmbeddingModel + Send + Sync + 'static,
{
    let mut report = ExtractionReport {
        filename: input.filename.clone(),
        description: None,
        resolution: None,
    };

    for &group in groups {
        let result = match group {
            FieldGroup::Description => {
                extractor.extract_description(&input.text, &input.filename).await
            }
            FieldGroup::Resolution => {
                extractor.extract_resolution(&input.text, &input.filename).await
            }
        };
        match group {
            FieldGroup::Description => report.description = Some(result.content),
            FieldGroup::Resolution => report.resolution = Some(result.content),
        }
    }

    report
}

/// Read the inputs, extract, and render the report as JSON.
pub async fn run_extract<L, E>(
    args: &ExtractArgs,
    extractor: &Extractor<L, E>,
) -> Result<String>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
    E: EmbeddingModel + Send + Sync + 'static,
{
    let inline = if args.stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Some(buffer)
    } else {
        None
    };

    let input = merge_sources(&args.files, inline.as_deref(), extractor.normalizer())?;
    info!(
        "Merged {} file(s) into '{}' ({} chars)",
        args.files.len(),
        input.filename,
        input.text.chars().count()
    );

    let report = extract_report(extractor, &input, args.group.groups()).await;
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}
