//! Precheck CLI library.
//!
//! This library provides the pieces behind the `precheck` binary: argument
//! parsing, configuration loading, source file intake and the wiring that
//! runs the extractor over the merged input.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod source;

pub use app::{build_embedder, build_extractor, extract_report, run_extract, ExtractionReport};
pub use cli::{Cli, Command, ExtractArgs, GroupArg};
pub use config::AppConfig;
pub use error::{CliError, Result};
pub use source::{merge_sources, MergedInput, SourceFormat};
