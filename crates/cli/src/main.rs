mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vgraph", version, about = "Knowledge graph sync for markdown vaults")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved settings
    Doctor,

    /// Create the vault settings directory
    Init(InitArgs),

    /// Reconcile the vault with the document index
    Sync(SyncArgs),

    /// Find documents related to a query
    Related(RelatedArgs),

    /// Suggest documents to reference from a note
    Suggest(SuggestArgs),

    /// Show outgoing links and backlinks of a note
    Links(LinksArgs),

    /// Show graph statistics
    Graph(GraphArgs),
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Vault root (defaults to the profile's vault_root)
    #[arg(long)]
    pub vault: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Index namespace (overrides the profile)
    #[arg(long)]
    pub namespace: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RelatedArgs {
    pub query: String,

    #[arg(long, default_value_t = vaultgraph_core::knowledge::DEFAULT_RELATED_LIMIT)]
    pub limit: usize,

    #[arg(long, default_value_t = vaultgraph_core::knowledge::DEFAULT_RELATED_THRESHOLD)]
    pub threshold: f32,

    /// Index namespace (overrides the profile)
    #[arg(long)]
    pub namespace: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Note to read content from (vault-relative or absolute)
    #[arg(long, required_unless_present = "content", conflicts_with = "content")]
    pub file: Option<PathBuf>,

    /// Content to find references for
    #[arg(long)]
    pub content: Option<String>,

    /// Path of the note being edited, excluded from suggestions
    #[arg(long)]
    pub current: Option<String>,

    #[arg(long, default_value_t = vaultgraph_core::knowledge::DEFAULT_SUGGEST_LIMIT)]
    pub limit: usize,

    #[arg(long, default_value_t = vaultgraph_core::knowledge::DEFAULT_SUGGEST_THRESHOLD)]
    pub threshold: f32,

    /// Index namespace (overrides the profile)
    #[arg(long)]
    pub namespace: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LinksArgs {
    /// Vault-relative path of the note
    pub note: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct GraphArgs {
    #[arg(long)]
    pub json: bool,
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config, profile),
        Commands::Init(args) => cmd::init::run(config, profile, args),
        Commands::Sync(args) => cmd::sync::run(config, profile, args),
        Commands::Related(args) => cmd::related::run(config, profile, args),
        Commands::Suggest(args) => cmd::suggest::run(config, profile, args),
        Commands::Links(args) => cmd::links::run(config, profile, args),
        Commands::Graph(args) => cmd::graph::run(config, profile, args),
    }

    logging::shutdown();
}
