//! NBU backup file toolkit.
//!
//! The `nbu-utils` crate (library name `nbu`) decodes the binary backup
//! containers (`.nbu`) written by Nokia PC Suite style phone backup tools and
//! exports their calendar, contact, memo, message, and MMS records as
//! ordinary files.
//!
//! # CLI Reference
//!
//! | Command | Purpose |
//! |---------|---------|
//! | [`nbu info`](cli::app::Commands::Info) | Show backup time, phone identity, and the section table |
//! | [`nbu list`](cli::app::Commands::List) | List every record as a file offset and length |
//! | [`nbu dump`](cli::app::Commands::Dump) | Hex dump (or raw bytes) of a single record |
//! | [`nbu export`](cli::app::Commands::Export) | Write calendar, contacts, memos, messages, and MMS to a directory |
//! | [`nbu completions`](cli::app::Commands::Completions) | Generate shell completions |
//!
//! All subcommands accept `--color <auto|always|never>`, `--output <file>`,
//! and `-v` (repeatable) to raise the log level. `NBU_LOG` overrides the
//! log filter entirely.
//!
//! # Library API
//!
//! ```no_run
//! use nbu::backup::container::Container;
//! use nbu::backup::export::export_all;
//!
//! let mut backup = Container::open("backup.nbu").unwrap();
//! println!("Phone: {}", backup.phone_model());
//! if let Some(memos) = backup.memos() {
//!     println!("{} memos", memos.len());
//! }
//! let report = export_all(&mut backup, "out").unwrap();
//! println!("{} files written", report.written.len());
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`backup::reader`] | Little-endian primitives, UTF-16 strings, position save/restore |
//! | [`backup::utf16`] | UTF-16 to UTF-8 conversion with surrogate pairs |
//! | [`backup::record`] | Byte ranges, record lists, and folders |
//! | [`backup::section`] | Section GUID table and dispatcher |
//! | [`backup::vcard`] | Calendar, contacts, and bookmark readers |
//! | [`backup::message`] | Message and MMS folder readers |
//! | [`backup::memo`] | Memo reader |
//! | [`backup::group`] | Group and advanced-settings readers |
//! | [`backup::container`] | Header parsing and the open/close lifecycle |
//! | [`backup::export`] | Materializing records as files |

pub mod backup;
#[cfg(feature = "cli")]
pub mod cli;
pub mod util;

use thiserror::Error;

use crate::backup::section::Guid;

/// Errors returned by `nbu` operations.
#[derive(Error, Debug)]
pub enum NbuError {
    /// An I/O error occurred outside the decoder's reads (open, create, write).
    #[error("I/O error: {0}")]
    Io(String),

    /// The file ended before a complete value could be read.
    #[error("Unexpected end of file at offset {offset} (wanted {wanted} bytes)")]
    Truncated { offset: u64, wanted: usize },

    /// A seek could not be performed or its target overflows.
    #[error("Seek failed: {0}")]
    SeekFailed(String),

    /// A UTF-16 string length cannot be allocated.
    #[error("UTF-16 string too long at offset {offset}")]
    StringTooLong { offset: u64 },

    /// The UTF-8 size of a converted string overflows `usize`.
    #[error("UTF-16 string too long to convert")]
    TooLong,

    /// The section table names a GUID this decoder does not know.
    #[error("Unsupported backup section {guid}")]
    UnsupportedSection { guid: Guid },

    /// A memo declares more code units than fit in its byte length field.
    #[error("Memo too large at offset {offset}: {units} code units")]
    MemoTooLarge { offset: u64, units: u16 },

    /// A structural sanity check failed.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Output could not be serialized to JSON.
    #[error("JSON serialization error: {0}")]
    Json(String),

    /// An invalid argument was supplied (unknown category, index out of range, etc.).
    #[error("Invalid argument: {0}")]
    Argument(String),
}
