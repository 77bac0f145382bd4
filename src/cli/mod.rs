pub mod audit;
pub mod import;
pub mod init;
pub mod migrate;
pub mod reslug;
pub mod serve;
pub mod slug;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "almofasir")]
#[command(version)]
#[command(about = "Publishing tools for the Almofasir dream interpretation site", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "almofasir.toml", env = "ALMOFASIR_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a site directory with a default config
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// Run the JSON API
    Serve {
        #[arg(short = 'H', long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply database migrations
    Migrate {
        #[command(subcommand)]
        command: Option<MigrateCommand>,
    },
    /// Print the slug for a title
    Slugify {
        text: String,
        #[arg(long)]
        max_length: Option<usize>,
        #[arg(long)]
        max_tokens: Option<usize>,
    },
    /// Check slugs against the publishing rules
    Validate {
        #[arg(required = true)]
        slugs: Vec<String>,
    },
    /// Import markdown articles with frontmatter
    Import {
        dir: PathBuf,
    },
    /// Regenerate stored slugs from article titles
    Reslug {
        #[arg(long)]
        dry_run: bool,
        /// Only touch articles whose current slug fails validation
        #[arg(long)]
        only_invalid: bool,
        /// Write the full JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Report stored slugs that fail validation
    Audit {
        #[arg(long)]
        json: bool,
        #[arg(long, default_value = "20")]
        samples: usize,
    },
}

#[derive(Subcommand)]
pub enum MigrateCommand {
    /// Show applied and pending migrations
    Status,
}
