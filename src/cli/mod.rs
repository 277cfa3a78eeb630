//! CLI subcommand implementations for the `nbu` binary.
//!
//! The top-level [`app::Cli`] struct and [`app::Commands`] enum live in
//! [`app`] and are shared between `main.rs` and `build.rs` (for man pages
//! and completions) via `include!()`.
//!
//! Each subcommand module has an `Options` struct and a
//! `pub fn execute(opts, writer) -> Result<(), NbuError>` entry point. The
//! `writer: &mut dyn Write` parameter lets tests capture output and lets the
//! global `--output` flag redirect it to a file.
//!
//! | Command | Module | Purpose |
//! |---------|--------|---------|
//! | `nbu info` | [`info`] | Backup time, phone identity, section table, record counts |
//! | `nbu list` | [`list`] | Every record as folder, index, offset, length |
//! | `nbu dump` | [`dump`] | Hex dump or raw bytes of one record |
//! | `nbu export` | [`export`] | Write records to files under a directory |
//!
//! `info` and `list` support `--json` through `serde_json`. `export` shows
//! an [`indicatif`] progress bar on stderr.

pub mod app;
pub mod dump;
pub mod export;
pub mod info;
pub mod list;

/// Write a line to the given writer, converting io::Error to NbuError.
macro_rules! wprintln {
    ($w:expr) => {
        writeln!($w).map_err(|e| $crate::NbuError::Io(e.to_string()))
    };
    ($w:expr, $($arg:tt)*) => {
        writeln!($w, $($arg)*).map_err(|e| $crate::NbuError::Io(e.to_string()))
    };
}

/// Write (without newline) to the given writer, converting io::Error to NbuError.
macro_rules! wprint {
    ($w:expr, $($arg:tt)*) => {
        write!($w, $($arg)*).map_err(|e| $crate::NbuError::Io(e.to_string()))
    };
}

pub(crate) use wprint;
pub(crate) use wprintln;

use crate::backup::container::Container;
use crate::backup::record::RecordList;
use crate::cli::app::Category;
use indicatif::{ProgressBar, ProgressStyle};

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Calendar,
        Category::Contacts,
        Category::Memos,
        Category::Bookmarks,
        Category::Messages,
        Category::Mms,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Calendar => "calendar",
            Category::Contacts => "contacts",
            Category::Memos => "memos",
            Category::Bookmarks => "bookmarks",
            Category::Messages => "messages",
            Category::Mms => "mms",
        }
    }
}

/// The record lists of one category, keyed by folder name.
///
/// Flat categories yield a single entry with no folder. Absent categories
/// yield nothing.
pub(crate) fn category_lists(
    backup: &Container,
    category: Category,
) -> Vec<(Option<String>, RecordList)> {
    let flat = |list: Option<&RecordList>| -> Vec<(Option<String>, RecordList)> {
        list.map(|l| vec![(None, l.clone())]).unwrap_or_default()
    };
    let folders = match category {
        Category::Calendar => return flat(backup.calendar()),
        Category::Contacts => return flat(backup.contacts()),
        Category::Memos => return flat(backup.memos()),
        Category::Bookmarks => backup.bookmarks(),
        Category::Messages => backup.messages(),
        Category::Mms => backup.mmses(),
    };
    folders
        .map(|list| {
            list.iter()
                .map(|f| (Some(f.name.clone()), f.items.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Create a styled progress bar for exported files.
pub(crate) fn create_progress_bar(count: u64, unit: &str) -> ProgressBar {
    let pb = ProgressBar::new(count);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{eta}})",
            unit
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}
