use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::backup::container::Container;
use crate::cli::app::Category;
use crate::cli::{category_lists, wprintln};
use crate::NbuError;

/// Options for the `nbu list` subcommand.
pub struct ListOptions {
    pub file: String,
    /// Restrict output to one category.
    pub category: Option<Category>,
    pub json: bool,
}

#[derive(Serialize)]
struct RecordJson {
    category: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder: Option<String>,
    index: usize,
    position: u64,
    length: u32,
}

fn collect(backup: &Container, categories: &[Category]) -> Vec<RecordJson> {
    let mut rows = Vec::new();
    for &category in categories {
        for (folder, list) in category_lists(backup, category) {
            for (index, range) in list.iter().enumerate() {
                rows.push(RecordJson {
                    category: category.name(),
                    folder: folder.clone(),
                    index,
                    position: range.position,
                    length: range.length,
                });
            }
        }
    }
    rows
}

/// List every decoded record with its file position and length.
pub fn execute(opts: &ListOptions, writer: &mut dyn Write) -> Result<(), NbuError> {
    let backup = Container::open(&opts.file)?;
    let categories = match opts.category {
        Some(c) => vec![c],
        None => Category::ALL.to_vec(),
    };
    let rows = collect(&backup, &categories);

    if opts.json {
        let json =
            serde_json::to_string_pretty(&rows).map_err(|e| NbuError::Json(e.to_string()))?;
        wprintln!(writer, "{}", json)?;
        return Ok(());
    }

    if rows.is_empty() {
        wprintln!(writer, "No records.")?;
        return Ok(());
    }

    wprintln!(
        writer,
        "{}",
        format!(
            "{:<10} {:<20} {:>6} {:>12} {:>10}",
            "CATEGORY", "FOLDER", "INDEX", "POSITION", "LENGTH"
        )
        .bold()
    )?;
    for row in &rows {
        wprintln!(
            writer,
            "{:<10} {:<20} {:>6} {:>12} {:>10}",
            row.category,
            row.folder.as_deref().unwrap_or("-"),
            row.index,
            row.position,
            row.length
        )?;
    }
    wprintln!(writer)?;
    wprintln!(writer, "{} records", rows.len())?;

    Ok(())
}
