//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use precheck_domain::FieldGroup;
use std::path::PathBuf;

/// Precheck - Extract test and resolution triplets from support artifacts.
#[derive(Debug, Parser)]
#[command(name = "precheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "PRECHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract description and resolution from one or more files
    Extract(ExtractArgs),

    /// Print the effective configuration as TOML
    ShowConfig,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Input files (.eml, .msg, .txt, .jpg, .jpeg, .png)
    #[arg(required_unless_present = "stdin")]
    pub files: Vec<PathBuf>,

    /// Also read document text from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Which field groups to extract
    #[arg(short, long, value_enum, default_value = "both")]
    pub group: GroupArg,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Field group selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GroupArg {
    /// Test steps, expected result, actual result
    Desc,
    /// Workaround, correction, test requirements
    Reso,
    /// Both groups
    Both,
}

impl GroupArg {
    /// The groups to run, in output order
    pub fn groups(self) -> &'static [FieldGroup] {
        match self {
            GroupArg::Desc => &[FieldGroup::Description],
            GroupArg::Reso => &[FieldGroup::Resolution],
            GroupArg::Both => &FieldGroup::ALL,
        }
    }
}
