//! Clap derive structures for the `adminkit` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// adminkit -- list, tree and CRUD screens over a JSON data file
#[derive(Debug, Parser)]
#[command(
    name = "adminkit",
    version,
    about = "Browse and edit admin records from the command line",
    long_about = "Drives the adminkit screen engine against a JSON data file.\n\n\
        Records are JSON objects with an `id`, optional nested `children`,\n\
        and arbitrary fields. Deletes go through the same confirmation\n\
        flow an admin UI would show.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// JSON data file holding the records
    #[arg(long, short = 'd', env = "ADMINKIT_DATA", global = true)]
    pub data: Option<PathBuf>,

    /// Screen whose configuration applies (selects `[screens.<name>]`)
    #[arg(long, short = 's', env = "ADMINKIT_SCREEN", default_value = "default", global = true)]
    pub screen: String,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "ADMINKIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ADMINKIT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List top-level records, one page at a time
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show records as an indented tree
    Tree(TreeArgs),

    /// Create a record
    Create(CreateArgs),

    /// Update fields of a record
    Update(UpdateArgs),

    /// Delete one or more records (asks for confirmation)
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Compute a selection, optionally pulling in ancestors
    Select(SelectArgs),

    /// Show the effective screen configuration
    Config,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page to show (1-based)
    #[arg(long, short = 'p')]
    pub page: Option<u32>,

    /// Records per page (overrides the screen configuration)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Filter by a case-insensitive search term
    #[arg(long, short = 'S')]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Collapse the given node (repeatable)
    #[arg(long = "collapse", value_name = "ID")]
    pub collapse: Vec<String>,

    /// Start with every node collapsed
    #[arg(long, conflicts_with = "expand_all")]
    pub collapse_all: bool,

    /// Start with every node expanded
    #[arg(long)]
    pub expand_all: bool,

    /// Filter roots by a search term matched anywhere in their subtree
    #[arg(long, short = 'S')]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Record fields as a JSON object; `parent` nests it under an id
    #[arg(long, value_name = "JSON")]
    pub json: String,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Record id
    pub id: String,

    /// Fields to change as a JSON object; `null` removes a field
    #[arg(long, value_name = "JSON")]
    pub json: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Record ids; more than one performs a batch delete
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Ids to toggle, in order
    #[arg(num_args = 0..)]
    pub ids: Vec<String>,

    /// Select every record instead
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,

    /// Also select the ancestors of each newly selected id
    #[arg(long)]
    pub propagate: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
