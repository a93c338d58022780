//! CLI argument parsing for docval.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Docval: validate customer documents against per-type rule sets.
///
/// Documents are JSON or YAML files tagged by `type` (BankStatement, Payslip,
/// IRP, PPSN, TaxRecord). Each type has an ordered rule set; every failing
/// rule becomes a severity-tagged issue.
#[derive(Parser, Debug)]
#[command(name = "docval")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (default: ./docval.yaml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// How command results are printed on stdout.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Available commands for docval.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate document files.
    ///
    /// Each file holds one document or an array of documents. Exits 2 when
    /// any document has issues, 3 when a document type is not supported.
    Validate(ValidateArgs),

    /// List the rules applied to a document type.
    Rules(RulesArgs),

    /// Manage the document session.
    ///
    /// The session keeps submitted documents and their validation results
    /// in the session directory between runs.
    Session(SessionCommand),

    /// Report service health.
    Health,
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Document files (JSON, or YAML by extension).
    pub files: Vec<PathBuf>,

    /// Also validate files found under this directory.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Glob applied to paths under --dir.
    #[arg(long, default_value = "**/*.{json,yaml,yml}", requires = "dir")]
    pub glob: String,

    /// Worker threads (default from config, 0 = available parallelism).
    #[arg(long)]
    pub workers: Option<usize>,
}

/// Arguments for the `rules` command.
#[derive(Parser, Debug)]
pub struct RulesArgs {
    /// Document type (e.g. BankStatement, "Tax Record"). All types when omitted.
    pub document_type: Option<String>,
}

/// Session subcommands.
#[derive(Parser, Debug)]
pub struct SessionCommand {
    #[command(subcommand)]
    pub action: SessionAction,
}

/// Available session actions.
#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// Add documents to the session.
    Add(SessionAddArgs),

    /// List session documents with their latest verdict.
    List,

    /// Remove a document and its results.
    Remove(SessionRemoveArgs),

    /// Validate every session document and record the results.
    Validate(SessionValidateArgs),

    /// Summarize the session by verdict, type, and severity.
    Report,

    /// Show the session event log, oldest first.
    Log,

    /// Remove every document and result.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(ForceArgs),

    /// Clear a stale session lock.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Unlock(ForceArgs),
}

/// Arguments for the `session add` command.
#[derive(Parser, Debug)]
pub struct SessionAddArgs {
    /// Document files to add.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the `session remove` command.
#[derive(Parser, Debug)]
pub struct SessionRemoveArgs {
    /// Id of the document to remove.
    pub id: String,
}

/// Arguments for the `session validate` command.
#[derive(Parser, Debug)]
pub struct SessionValidateArgs {
    /// Worker threads (default from config, 0 = available parallelism).
    #[arg(long)]
    pub workers: Option<usize>,
}

/// Confirmation flag for destructive session actions.
#[derive(Parser, Debug)]
pub struct ForceArgs {
    /// Confirm the action.
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
