//! Precheck Domain Layer
//!
//! Core vocabulary shared by every Precheck crate. It has no external
//! dependencies and defines the field groups, their literal section markers
//! and intent queries, the output template, and the completion trait.
//!
//! ## Key Concepts
//!
//! - **Field group**: one of the two triplets extracted from a support
//!   artifact (`desc` = test steps / expected / actual, `reso` =
//!   workaround / correction / test requirements)
//! - **Section markers**: bracketed headers such as `[1. Workaround:]`
//! - **Intent queries**: fixed questions used to rank document chunks
//! - **Template**: the rigid three-section layout every result follows

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field_group;
pub mod template;
pub mod traits;

// Re-exports for convenience
pub use field_group::FieldGroup;
pub use template::{empty_template, SectionTriplet};
pub use traits::LlmProvider;
