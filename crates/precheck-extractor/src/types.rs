//! Request and response types for extraction

use precheck_domain::FieldGroup;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Request to extract one field group from a document body
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Raw document text
    pub text: String,

    /// Which triplet to extract
    pub group: FieldGroup,

    /// Source identifier (file name or generated id), used for logging
    pub source_id: String,
}

impl ExtractionRequest {
    /// Create a request
    pub fn new(text: impl Into<String>, group: FieldGroup, source_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            group,
            source_id: source_id.into(),
        }
    }
}

/// The rendered template for one field group
///
/// Serializes as a single-key object: `{"description": "..."}` or
/// `{"resolution": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroupResult {
    /// The group this content belongs to
    pub group: FieldGroup,

    /// Template text, possibly with empty sections
    pub content: String,
}

impl FieldGroupResult {
    /// Create a result
    pub fn new(group: FieldGroup, content: impl Into<String>) -> Self {
        Self {
            group,
            content: content.into(),
        }
    }

    /// Key the content is reported under
    pub fn key(&self) -> &'static str {
        self.group.result_key()
    }
}

impl Serialize for FieldGroupResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key(), &self.content)?;
        map.end()
    }
}

/// Route a request took through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPath {
    /// Markers were already present; no LLM call
    Structured,

    /// Whole normalized body sent to the LLM
    Direct,

    /// Chunked, ranked and assembled before the LLM call
    Retrieval,
}

/// Metadata about an extraction
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetadata {
    /// Source identifier
    pub source_id: String,

    /// Group code (`desc` or `reso`)
    pub group: &'static str,

    /// Route taken
    pub path: ExtractionPath,

    /// Characters in the normalized body
    pub input_chars: usize,

    /// Characters of text embedded in the prompt (0 on the structured path)
    pub context_chars: usize,

    /// Chunks surviving the noise filter
    pub chunks_total: usize,

    /// Chunks included in the assembled context
    pub chunks_selected: usize,

    /// Whether the completion capability was invoked
    pub llm_called: bool,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Result plus metadata
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    /// The rendered field group
    pub result: FieldGroupResult,

    /// How it was produced
    pub metadata: ExtractionMetadata,
}
