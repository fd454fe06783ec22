use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pagesync")]
#[command(about = "Post CMS entries to a social media page, once")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Optional path to the sync record database
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Post or update one entry
    Sync {
        /// Entry JSON file, or `-` for stdin
        entry: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the sync record of an entry
    Show {
        /// CMS entry id
        entry_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget the record pointing at a remote post
    Forget {
        /// Remote post id
        remote_post_id: String,
    },
}
