//! Shared utilities (hex dump formatting, export filesystem helpers).

pub mod fs;
pub mod hex;
