use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Treat the provider as unreachable without probing it
    #[arg(long)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a single text
    Translate {
        /// Text to translate
        #[arg(short, long)]
        text: String,

        /// Target language code
        #[arg(short = 'l', long)]
        target: String,

        /// Source language code
        #[arg(short, long, default_value = "en")]
        source: String,
    },

    /// Translate every line of a file, one request at a time
    Batch {
        /// Input file with one text per line
        #[arg(short, long)]
        input: PathBuf,

        /// Target language code
        #[arg(short = 'l', long)]
        target: String,

        /// Source language code
        #[arg(short, long, default_value = "en")]
        source: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show statistics about stored translations
    Stats {
        /// Number of most recent translations to list
        #[arg(short, long, default_value = "10")]
        recent: usize,
    },

    /// List stored translations
    Records {
        /// Only translations into this language
        #[arg(short = 'l', long)]
        target: Option<String>,

        /// Only translations from this language
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Export stored translations and the cache to a JSON file
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import translations from a JSON export
    Import {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Clear the in-memory cache and its persisted copy (stored records are kept)
    Clear,

    /// List language codes with known display names
    Languages,

    /// Write a default configuration file
    InitConfig {
        #[arg(short, long, default_value = "lingua.toml")]
        output: PathBuf,
    },
}
