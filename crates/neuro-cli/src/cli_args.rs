use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "neurocode", version, about = "Structural code intelligence for Python repositories")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for every command
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Build or verify the repository IR snapshot
    Ir {
        /// Repository root (defaults to the current directory)
        path: Option<PathBuf>,
        /// Verify the existing snapshot's freshness instead of rebuilding it
        #[arg(long)]
        check: bool,
    },

    /// Render a module's structural summary
    Explain {
        /// Source file to explain
        file: PathBuf,
    },

    /// Run the six structural checks against a file's module
    Check {
        /// Source file to check
        file: PathBuf,
    },

    /// Structural query over the resolved call graph
    Query {
        /// Repository root (defaults to the current directory)
        path: Option<PathBuf>,
        /// Query kind
        #[arg(long, value_enum)]
        kind: QueryKindArg,
        /// Target symbol (required for `callers`/`callees`)
        #[arg(long)]
        symbol: Option<String>,
        /// Restrict `fan-in`/`fan-out` to a module name, path, or path suffix
        #[arg(long)]
        module: Option<String>,
    },

    /// Build or update the semantic embedding store
    Embed {
        /// Repository root (defaults to the current directory)
        path: Option<PathBuf>,
        /// Embedding provider to use (only `dummy` ships with the engine)
        #[arg(long, default_value = "dummy")]
        provider: String,
        /// Reuse stored vectors for functions whose embedding text is unchanged
        #[arg(long)]
        update: bool,
    },

    /// Cosine-similarity search over the embedding store
    Search {
        /// Repository root (defaults to the current directory)
        path: Option<PathBuf>,
        /// Free-text query, embedded on the fly
        #[arg(long, conflicts_with = "like")]
        text: Option<String>,
        /// Reuse an existing symbol's stored vector as the query
        #[arg(long, conflicts_with = "text")]
        like: Option<String>,
        /// Number of results to return
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// Restrict results to a module name, path, or path suffix
        #[arg(long)]
        module: Option<String>,
        /// Embedding provider to use for `--text` queries
        #[arg(long, default_value = "dummy")]
        provider: String,
    },

    /// Report per-module and repository-wide IR freshness
    Status {
        /// Repository root (defaults to the current directory)
        path: Option<PathBuf>,
    },

    /// Apply a direct guard/todo/inject patch to a single function
    Patch {
        /// Source file to patch
        file: PathBuf,
        /// Fix text: a condition/action pair for `guard`, free text otherwise
        #[arg(long)]
        fix: String,
        /// Patch strategy
        #[arg(long, value_enum, default_value = "todo")]
        strategy: PatchStrategyArg,
        /// Target function name (required when the file has more than one function)
        #[arg(long)]
        target: Option<String>,
        /// Compute the diff without writing the file
        #[arg(long)]
        dry_run: bool,
        /// Always print the unified diff
        #[arg(long)]
        show_diff: bool,
        /// Fail instead of patching if the repository IR is stale or missing
        #[arg(long)]
        require_fresh_ir: bool,
        /// Fail instead of silently falling back when no target can be determined
        #[arg(long)]
        require_target: bool,
    },

    /// List the append-only patch history
    #[command(name = "patch-history")]
    PatchHistory {
        /// Repository root (defaults to the current directory)
        path: Option<PathBuf>,
        /// Show only the most recent N entries
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Emit the LLM-ready explain bundle for a file or symbol
    #[command(name = "explain-bundle")]
    ExplainBundle {
        /// Source file to bundle
        file: PathBuf,
        /// Anchor the bundle to a specific symbol
        #[arg(long)]
        symbol: Option<String>,
    },

    /// Emit a seeded patch plan, or apply a filled-in one
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub(crate) struct PlanArgs {
    #[command(subcommand)]
    pub action: Option<PlanAction>,

    /// Source file to plan against (omit when running `plan apply`)
    pub file: Option<PathBuf>,

    /// Target symbol to seed the plan for
    #[arg(long)]
    pub symbol: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum PlanAction {
    /// Validate and apply a filled-in patch plan
    Apply {
        /// Path to the patch plan JSON document
        plan_file: PathBuf,
        /// Validate and diff without writing
        #[arg(long)]
        dry_run: bool,
        /// Always print the unified diff
        #[arg(long)]
        show_diff: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum QueryKindArg {
    Callers,
    Callees,
    FanIn,
    FanOut,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum PatchStrategyArg {
    Guard,
    Todo,
    Inject,
}
