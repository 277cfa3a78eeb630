use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "nbu")]
#[command(about = "NBU phone backup inspection and export toolkit")]
#[command(version)]
pub struct Cli {
    /// Control colored output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

/// Record categories that can be listed or dumped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Category {
    Calendar,
    Contacts,
    Memos,
    Bookmarks,
    Messages,
    Mms,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show backup time, phone identity, and the section table
    Info {
        /// Path to the NBU backup file
        #[arg(short, long)]
        file: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List records as file offsets and lengths
    List {
        /// Path to the NBU backup file
        #[arg(short, long)]
        file: String,

        /// Only list this category (default: all)
        #[arg(short, long, value_enum)]
        category: Option<Category>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Hex dump of a single record
    Dump {
        /// Path to the NBU backup file
        #[arg(short, long)]
        file: String,

        /// Record category
        #[arg(short, long, value_enum)]
        category: Category,

        /// Record index within the category or folder (starting at 0)
        #[arg(short, long)]
        index: usize,

        /// Folder name (bookmarks, messages, MMS; default: first folder)
        #[arg(long)]
        folder: Option<String>,

        /// Output raw record bytes (no formatting)
        #[arg(long)]
        raw: bool,
    },

    /// Export calendar, contacts, memos, messages, and MMS to a directory
    Export {
        /// Path to the NBU backup file
        #[arg(short, long)]
        file: String,

        /// Output directory (created if missing)
        #[arg(short, long, default_value = ".")]
        dir: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
