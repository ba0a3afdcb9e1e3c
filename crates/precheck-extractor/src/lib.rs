//! Precheck Extractor
//!
//! Turns unstructured support artifacts (mail threads, tickets, notes) into
//! the two rigid three-section templates used by test engineers.
//!
//! # Overview
//!
//! A body is normalized first. If it already carries the group's bracketed
//! section markers the sections are parsed directly and no LLM is involved.
//! Otherwise a short body is sent to the LLM as is, while a long one is
//! segmented, filtered, ranked against fixed intent queries and assembled
//! into bounded context before the single completion call.
//!
//! # Architecture
//!
//! ```text
//! Text → Normalizer → Structured parser ──────────────────────────────→ Result
//!                          │ (no markers)
//!                          ├─ short → Prompt → LLM ───────────────────→ Result
//!                          └─ long  → Chunker → Noise filter → Selector
//!                                     → Assembler → Prompt → LLM ─────→ Result
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use precheck_embed::TokenHashEmbedder;
//! use precheck_extractor::{Extractor, ExtractorConfig};
//! use precheck_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("[1. Workaround:]\nRestart the board");
//! let embedder = TokenHashEmbedder::new(384);
//! let extractor = Extractor::new(llm, embedder, ExtractorConfig::default())?;
//!
//! let result = extractor
//!     .extract_resolution("The board hangs after the upgrade.", "mail_001.eml")
//!     .await;
//!
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod normalize;
mod parser;
mod prompt;
mod retrieval;
mod types;


pub use chunking::{split_sentences, NoiseFilter, TextChunker};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use normalize::TextNormalizer;
pub use parser::{finalize_completion, has_all_markers, parse_structured};
pub use prompt::{PromptBuilder, INPUT_END, INPUT_START};
pub use retrieval::{AssembledContext, ContextAssembler, RelevanceSelector};
pub use types::{
    ExtractionMetadata, ExtractionOutcome, ExtractionPath, ExtractionRequest, FieldGroupResult,
};
