use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::types::{ActionArg, ConflictArg, MigrateModeArg, OutputFormatArg};

/// Transactional bulk file reorganization: dissolve wrapper directories,
/// migrate file sets, batch-rename, and undo any of it
#[derive(Parser, Debug)]
#[command(name = "reorgify")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "summary")]
    pub output: OutputFormatArg,

    /// Run every decision without touching the filesystem
    #[arg(short = 'n', long = "preview", global = true)]
    pub preview: bool,

    /// Suppress progress and log lines on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Override the journal directory
    #[arg(long, global = true, env = "REORGIFY_JOURNAL_DIR", value_name = "DIR")]
    pub journal_dir: Option<PathBuf>,
}

/// Conflict-policy arguments shared by the mutating commands
#[derive(Args, Debug, Clone)]
pub struct ConflictArgs {
    /// Policy when a file destination already exists
    #[arg(long, value_enum, default_value = "auto")]
    pub file_conflict: ConflictArg,

    /// Policy when a directory destination already exists
    #[arg(long, value_enum, default_value = "auto")]
    pub dir_conflict: ConflictArg,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collapse redundant wrapper directories under a root
    Dissolve {
        /// Directory to scan (or, with --direct, to dissolve)
        path: PathBuf,

        /// Collapse nested single-subfolder wrappers
        #[arg(long)]
        nested: bool,

        /// Collapse folders holding a single media file
        #[arg(long)]
        media: bool,

        /// Collapse folders holding a single archive
        #[arg(long)]
        archive: bool,

        /// Dissolve the named directory itself into its parent
        #[arg(long, conflicts_with_all = ["nested", "media", "archive"])]
        direct: bool,

        /// Comma-separated keywords; matching subtrees are skipped
        #[arg(long, default_value = "")]
        exclude: String,

        /// Similarity threshold in [0,1]; 0 disables gating
        #[arg(long)]
        threshold: Option<f64>,

        /// Disable the similarity gate entirely
        #[arg(long)]
        no_similarity: bool,

        /// Worker-pool bound for file-level operations
        #[arg(long)]
        max_concurrency: Option<usize>,

        #[command(flatten)]
        conflicts: ConflictArgs,
    },

    /// Migrate files or directories into a new layout
    Migrate {
        /// Source files or directories
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Target root directory
        #[arg(short, long)]
        target: PathBuf,

        /// Layout strategy
        #[arg(long, value_enum, default_value = "preserve")]
        mode: MigrateModeArg,

        /// Move or copy
        #[arg(long, value_enum, default_value = "move")]
        action: ActionArg,

        /// Comma-separated keywords; matching subtrees are skipped
        #[arg(long, default_value = "")]
        exclude: String,

        /// Worker-pool bound for file-level operations
        #[arg(long)]
        max_concurrency: Option<usize>,

        #[command(flatten)]
        conflicts: ConflictArgs,
    },

    /// Batch-rename items from a naming template
    Rename {
        /// Files, or directories whose immediate files are renamed
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Naming template, e.g. "{index}_{stem} - {description}"
        #[arg(short, long)]
        template: String,

        /// JSON file of extra fields per item, keyed by file name
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Truncate the description field to this many characters
        #[arg(long)]
        max_description_len: Option<usize>,

        /// Truncate the final name to this many characters
        #[arg(long)]
        max_name_len: Option<usize>,

        /// Comma-separated keywords; matching items are skipped
        #[arg(long, default_value = "")]
        exclude: String,

        /// Worker-pool bound for file-level operations
        #[arg(long)]
        max_concurrency: Option<usize>,

        #[command(flatten)]
        conflicts: ConflictArgs,
    },

    /// Replay a journaled batch in reverse
    Undo {
        /// Batch id (defaults to the most recent batch)
        id: Option<String>,
    },

    /// List recent journaled batches
    History {
        /// Maximum entries to show
        #[arg(short, long, default_value_t = reorgify_core::DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
