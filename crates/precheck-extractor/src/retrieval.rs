//! Relevance selection and bounded context assembly
//!
//! The selector ranks chunks against the group's intent queries and the
//! assembler packs the winners (then filler, in document order) into a
//! character budget.

use crate::error::ExtractorError;
use crate::normalize::char_len;
use precheck_domain::FieldGroup;
use precheck_embed::{cosine_similarity, EmbeddingError, EmbeddingModel};
use tracing::debug;

/// Characters charged per included chunk for the blank-line separator
const SEPARATOR_OVERHEAD: usize = 2;

/// Picks the chunks most similar to a field group's intent queries
#[derive(Debug, Clone, Copy)]
pub struct RelevanceSelector {
    top_k: usize,
    fallback_count: usize,
}

impl RelevanceSelector {
    /// Keep `top_k` chunks per query; `fallback_count` sequential chunks
    /// are used when ranking yields nothing
    pub fn new(top_k: usize, fallback_count: usize) -> Self {
        Self {
            top_k,
            fallback_count,
        }
    }

    /// Ordered, de-duplicated indices into `chunks`
    ///
    /// Queries are visited in their fixed order. For each one the chunks are
    /// ranked by cosine similarity with a stable sort, so equal scores keep
    /// document order, and the first `top_k` unseen indices are appended.
    pub fn select<E>(
        &self,
        embedder: &E,
        chunks: &[String],
        group: FieldGroup,
    ) -> Result<Vec<usize>, ExtractorError>
    where
        E: EmbeddingModel + ?Sized,
    {
        if chunks.is_empty() {
            return Err(ExtractorError::NoChunks);
        }

        let chunk_refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let chunk_vectors = embed_checked(embedder, &chunk_refs)?;
        let query_vectors = embed_checked(embedder, &group.intent_queries())?;

        let mut selected: Vec<usize> = Vec::new();
        for (query_idx, query) in query_vectors.iter().enumerate() {
            let mut ranked: Vec<(usize, f32)> = chunk_vectors
                .iter()
                .enumerate()
                .map(|(idx, chunk)| (idx, cosine_similarity(query, chunk)))
                .collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

            for (idx, score) in ranked.into_iter().take(self.top_k) {
                if !selected.contains(&idx) {
                    debug!(query = query_idx, chunk = idx, score, "Selected chunk");
                    selected.push(idx);
                }
            }
        }

        if selected.is_empty() {
            selected = self.sequential(chunks.len());
        }
        Ok(selected)
    }

    /// The first `fallback_count` indices of `chunk_count` chunks
    pub fn sequential(&self, chunk_count: usize) -> Vec<usize> {
        (0..chunk_count.min(self.fallback_count)).collect()
    }
}

/// Embed a batch and check it is well formed
fn embed_checked<E>(embedder: &E, texts: &[&str]) -> Result<Vec<Vec<f32>>, ExtractorError>
where
    E: EmbeddingModel + ?Sized,
{
    let vectors = embedder.embed_batch(texts)?;
    if vectors.len() != texts.len() {
        return Err(ExtractorError::Embedding(format!(
            "Expected {} embeddings, got {}",
            texts.len(),
            vectors.len()
        )));
    }

    let expected = embedder.dimension();
    if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
        return Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: bad.len(),
        }
        .into());
    }
    Ok(vectors)
}

/// Result of packing chunks into the context budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    /// Included chunks joined with a blank line
    pub text: String,

    /// Indices of the included chunks, in join order
    pub included: Vec<usize>,
}

impl AssembledContext {
    /// Nothing fit
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }
}

/// Packs selected chunks, then filler, into at most `max_chars` characters
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_chars: usize,
}

impl ContextAssembler {
    /// Create an assembler with a character budget
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Assemble context from `chunks`, prioritizing `selected`
    ///
    /// Each chunk costs its length plus the separator overhead. Selected
    /// chunks are taken in order until the first one that would overflow;
    /// the remaining budget is then filled from all chunks in document
    /// order, again stopping at the first overflow.
    pub fn assemble(&self, chunks: &[String], selected: &[usize]) -> AssembledContext {
        let mut included: Vec<usize> = Vec::new();
        let mut total = 0;

        for &idx in selected {
            let Some(chunk) = chunks.get(idx) else {
                continue;
            };
            if included.contains(&idx) {
                continue;
            }
            let cost = char_len(chunk) + SEPARATOR_OVERHEAD;
            if total + cost > self.max_chars {
                break;
            }
            total += cost;
            included.push(idx);
        }

        if total < self.max_chars {
            for (idx, chunk) in chunks.iter().enumerate() {
                if included.contains(&idx) {
                    continue;
                }
                let cost = char_len(chunk) + SEPARATOR_OVERHEAD;
                if total + cost > self.max_chars {
                    break;
                }
                total += cost;
                included.push(idx);
            }
        }

        let text = included
            .iter()
            .map(|&idx| chunks[idx].as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        AssembledContext { text, included }
    }
}
