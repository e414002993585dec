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

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract text from a media file, translate it and record it in the history
    Extract {
        /// Audio, video, image or text file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Translate text typed on the command line or read from a file
    Translate {
        /// Text to translate
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the text to translate from this file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Browse and manage the translation history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Interactive session over stdin
    Session,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List history records, newest first
    List {
        /// Case-insensitive search over file names, source text and translations
        #[arg(short, long, default_value = "")]
        query: String,

        /// Only show one kind of source: text, stt or itt
        #[arg(short, long, default_value = "")]
        kind: String,
    },

    /// Show one record with all its translations
    Show {
        id: u64,
    },

    /// Remove one record
    Remove {
        id: u64,
    },

    /// Remove every record
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration
    Init {
        /// Where to write it
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },

    /// Print the effective configuration
    Show,
}
