//! Core Extractor implementation

use crate::chunking::{NoiseFilter, TextChunker};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::normalize::{char_len, truncate_chars, TextNormalizer};
use crate::parser::{finalize_completion, parse_structured};
use crate::prompt::PromptBuilder;
use crate::retrieval::{ContextAssembler, RelevanceSelector};
use crate::types::{
    ExtractionMetadata, ExtractionOutcome, ExtractionPath, ExtractionRequest, FieldGroupResult,
};
use precheck_domain::{FieldGroup, LlmProvider};
use precheck_embed::EmbeddingModel;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Bounded prompt input produced by the retrieval path
struct RetrievedContext {
    text: String,
    chunks_total: usize,
    chunks_selected: usize,
}

/// Extracts description and resolution triplets from document bodies
///
/// Holds no per-call state: one instance may serve any number of concurrent
/// extractions.
pub struct Extractor<L, E>
where
    L: LlmProvider,
    E: EmbeddingModel,
{
    llm_provider: Arc<L>,
    embedder: Arc<E>,
    config: ExtractorConfig,
    normalizer: TextNormalizer,
    chunker: TextChunker,
    noise_filter: NoiseFilter,
    selector: RelevanceSelector,
    assembler: ContextAssembler,
}

impl<L, E> Extractor<L, E>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
    E: EmbeddingModel + Send + Sync + 'static,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, embedder: E, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::from_shared(Arc::new(llm_provider), Arc::new(embedder), config)
    }

    /// Create an Extractor over capabilities that are already shared
    pub fn from_shared(
        llm_provider: Arc<L>,
        embedder: Arc<E>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate()?;

        Ok(Self {
            llm_provider,
            embedder,
            normalizer: TextNormalizer::from_config(&config)?,
            chunker: TextChunker::new(config.chunk_size_chars, config.sentence_coverage_ratio),
            noise_filter: NoiseFilter::new(config.min_chunk_length),
            selector: RelevanceSelector::new(config.top_k_per_query, config.fallback_chunk_count),
            assembler: ContextAssembler::new(config.max_assembled_context_chars),
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The text normalizer built from the configuration
    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Apply the text normalizer alone
    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Extract the test steps / expected result / actual result triplet
    pub async fn extract_description(&self, body: &str, source_id: &str) -> FieldGroupResult {
        self.extract(ExtractionRequest::new(body, FieldGroup::Description, source_id))
            .await
            .result
    }

    /// Extract the workaround / correction / test requirements triplet
    pub async fn extract_resolution(&self, body: &str, source_id: &str) -> FieldGroupResult {
        self.extract(ExtractionRequest::new(body, FieldGroup::Resolution, source_id))
            .await
            .result
    }

    /// Run one extraction
    ///
    /// Never fails: parse, embedding and LLM failures are logged and
    /// recovered, and the worst case is the group's empty template.
    pub async fn extract(&self, request: ExtractionRequest) -> ExtractionOutcome {
        let start_time = Instant::now();
        let group = request.group;

        info!(
            "Starting {} extraction for source '{}', text length {}",
            group,
            request.source_id,
            char_len(&request.text)
        );

        let body = self.normalizer.normalize(&request.text);
        let input_chars = char_len(&body);

        match parse_structured(group, &body) {
            Ok(Some(triplet)) => {
                info!("Source '{}' already carries {} sections", request.source_id, group);
                let metadata = ExtractionMetadata {
                    source_id: request.source_id,
                    group: group.code(),
                    path: ExtractionPath::Structured,
                    input_chars,
                    context_chars: 0,
                    chunks_total: 0,
                    chunks_selected: 0,
                    llm_called: false,
                    processing_time_ms: start_time.elapsed().as_millis() as u64,
                };
                return ExtractionOutcome {
                    result: FieldGroupResult::new(group, triplet.render(group)),
                    metadata,
                };
            }
            Ok(None) => {}
            Err(e) => warn!(
                "Structured parse of {} for source '{}' failed, falling back to LLM: {}",
                group, request.source_id, e
            ),
        }

        let (context, path, chunks_total, chunks_selected) =
            if input_chars <= self.config.max_direct_context_chars {
                (body, ExtractionPath::Direct, 0, 0)
            } else {
                debug!("Body has {} chars, assembling context", input_chars);
                let retrieved = self.retrieve(&body, group).await;
                (
                    retrieved.text,
                    ExtractionPath::Retrieval,
                    retrieved.chunks_total,
                    retrieved.chunks_selected,
                )
            };

        let context_chars =
            char_len(truncate_chars(&context, self.config.max_direct_context_chars));
        let prompt = PromptBuilder::new(&context, group)
            .with_max_chars(self.config.max_direct_context_chars)
            .build();

        debug!("Prompt length: {} chars", char_len(&prompt));

        let raw = self.call_llm(prompt).await.unwrap_or_else(|e| {
            warn!(
                "LLM call for {} of source '{}' failed, using empty output: {}",
                group, request.source_id, e
            );
            String::new()
        });

        debug!("LLM response length: {} chars", char_len(&raw));

        let content = finalize_completion(group, &raw);
        let processing_time_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Extraction of {} for source '{}' complete via {:?} in {} ms",
            group, request.source_id, path, processing_time_ms
        );

        ExtractionOutcome {
            result: FieldGroupResult::new(group, content),
            metadata: ExtractionMetadata {
                source_id: request.source_id,
                group: group.code(),
                path,
                input_chars,
                context_chars,
                chunks_total,
                chunks_selected,
                llm_called: true,
                processing_time_ms,
            },
        }
    }

    /// Segment, filter, rank and assemble a long body
    async fn retrieve(&self, body: &str, group: FieldGroup) -> RetrievedContext {
        let chunks = self.noise_filter.filter(self.chunker.chunk(body));
        debug!("{} chunks after noise filtering", chunks.len());

        if chunks.is_empty() {
            warn!("{}, using truncated raw text", ExtractorError::NoChunks);
            return self.raw_fallback(body, 0);
        }

        let selected = match self.select(chunks.clone(), group).await {
            Ok(selected) => selected,
            Err(e) => {
                warn!(
                    "Relevance selection failed, using the first {} chunks: {}",
                    self.config.fallback_chunk_count, e
                );
                self.selector.sequential(chunks.len())
            }
        };
        debug!("Selected chunks: {:?}", selected);

        let assembled = self.assembler.assemble(&chunks, &selected);
        if assembled.is_empty() {
            warn!("No chunk fits the context budget, using truncated raw text");
            return self.raw_fallback(body, chunks.len());
        }

        debug!(
            "Assembled {} of {} chunks into {} chars",
            assembled.included.len(),
            chunks.len(),
            char_len(&assembled.text)
        );

        RetrievedContext {
            chunks_selected: assembled.included.len(),
            text: assembled.text,
            chunks_total: chunks.len(),
        }
    }

    fn raw_fallback(&self, body: &str, chunks_total: usize) -> RetrievedContext {
        RetrievedContext {
            text: truncate_chars(body, self.config.max_assembled_context_chars).to_string(),
            chunks_total,
            chunks_selected: 0,
        }
    }

    /// Run relevance selection off the async executor
    async fn select(
        &self,
        chunks: Vec<String>,
        group: FieldGroup,
    ) -> Result<Vec<usize>, ExtractorError> {
        let embedder = Arc::clone(&self.embedder);
        let selector = self.selector;

        // Embedding is CPU bound and synchronous
        tokio::task::spawn_blocking(move || selector.select(&*embedder, &chunks, group))
            .await
            .map_err(|e| ExtractorError::Task(format!("Selection task failed: {}", e)))?
    }

    /// Call the LLM provider
    async fn call_llm(&self, prompt: String) -> Result<String, ExtractorError> {
        let llm = Arc::clone(&self.llm_provider);
        let max_tokens = self.config.max_llm_output_tokens;

        // Call in a blocking context since LlmProvider is not async
        tokio::task::spawn_blocking(move || {
            llm.generate(&prompt, max_tokens)
                .map_err(|e| ExtractorError::Llm(e.to_string()))
        })
        .await
        .map_err(|e| ExtractorError::Task(format!("LLM task failed: {}", e)))?
    }
}
