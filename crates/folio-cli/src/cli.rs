use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio: a versioned wiki on a content-addressed object store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository directory
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub repo: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new wiki repository
    Init(InitArgs),
    /// Print a page
    Show(ShowArgs),
    /// Create an empty page
    Create(CreateArgs),
    /// Replace a page's content from a file or stdin
    Edit(EditArgs),
    /// List pages
    Pages(PagesArgs),
    /// Show commit history of the wiki branch
    Log(LogArgs),
    /// Show changes to a page between two commits
    Diff(DiffArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize; defaults to --repo
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Page path; empty for the default page
    #[arg(default_value = "")]
    pub path: String,
    /// Read the page as of this commit
    #[arg(long, conflicts_with = "branch")]
    pub commit: Option<String>,
    /// Read the page from another branch
    #[arg(long)]
    pub branch: Option<String>,
}

#[derive(Args)]
pub struct CreateArgs {
    pub path: String,
    #[arg(short, long, default_value = folio_sdk::DEFAULT_FORMAT)]
    pub format: String,
    /// Author as `Name <email>`
    #[arg(short, long)]
    pub author: String,
}

#[derive(Args)]
pub struct EditArgs {
    pub path: String,
    #[arg(short, long)]
    pub author: String,
    #[arg(short, long, default_value = "")]
    pub message: String,
    /// Read new content from this file instead of stdin
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Commit the edit was based on; defaults to the branch head
    #[arg(long)]
    pub base: Option<String>,
}

#[derive(Args)]
pub struct PagesArgs {
    #[arg(long)]
    pub commit: Option<String>,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
    #[arg(long)]
    pub oneline: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    pub path: String,
    pub from: String,
    pub to: String,
    /// Print only added/removed line counts
    #[arg(long)]
    pub stat: bool,
}
