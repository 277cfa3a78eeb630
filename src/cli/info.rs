use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::backup::container::{BackupHeader, Container};
use crate::backup::section::{SectionOutcome, SectionSummary};
use crate::cli::app::Category;
use crate::cli::{category_lists, wprint, wprintln};
use crate::NbuError;

/// Options for the `nbu info` subcommand.
pub struct InfoOptions {
    /// Path to the backup file.
    pub file: String,
    /// Emit output as JSON.
    pub json: bool,
}

#[derive(Serialize)]
struct CategoryCount {
    category: &'static str,
    folders: usize,
    records: usize,
    bytes: u64,
}

#[derive(Serialize)]
struct InfoJson<'a> {
    file: &'a str,
    file_size: u64,
    #[serde(flatten)]
    header: &'a BackupHeader,
    backup_time_utc: Option<String>,
    sections: &'a [SectionSummary],
    categories: Vec<CategoryCount>,
}

fn category_counts(backup: &Container) -> Vec<CategoryCount> {
    Category::ALL
        .iter()
        .filter_map(|&category| {
            let lists = category_lists(backup, category);
            if lists.is_empty() {
                return None;
            }
            Some(CategoryCount {
                category: category.name(),
                folders: lists.iter().filter(|(folder, _)| folder.is_some()).count(),
                records: lists.iter().map(|(_, l)| l.len()).sum(),
                bytes: lists.iter().map(|(_, l)| l.total_bytes()).sum(),
            })
        })
        .collect()
}

/// Show the backup header, the section table, and per-category record counts.
///
/// Categories whose section is missing from the backup are left out of the
/// counts. Groups and advanced settings appear in the section table only,
/// since their records are not decoded.
pub fn execute(opts: &InfoOptions, writer: &mut dyn Write) -> Result<(), NbuError> {
    let backup = Container::open(&opts.file)?;
    let header = backup.header();
    let counts = category_counts(&backup);

    if opts.json {
        let info = InfoJson {
            file: &opts.file,
            file_size: backup.file_size(),
            header,
            backup_time_utc: header.backup_time.to_datetime().map(|dt| dt.to_rfc3339()),
            sections: backup.sections(),
            categories: counts,
        };
        let json = serde_json::to_string_pretty(&info)
            .map_err(|e| NbuError::Json(e.to_string()))?;
        wprintln!(writer, "{}", json)?;
        return Ok(());
    }

    wprintln!(writer, "{}", "Backup".bold())?;
    wprintln!(writer, "  File:       {} ({} bytes)", opts.file, backup.file_size())?;
    wprintln!(
        writer,
        "  Time:       {} ({} ticks)",
        header.backup_time,
        header.backup_time.ticks()
    )?;
    wprintln!(writer)?;

    wprintln!(writer, "{}", "Phone".bold())?;
    wprintln!(writer, "  IMEI:       {}", header.phone_imei)?;
    wprintln!(writer, "  Model:      {}", header.phone_model)?;
    wprintln!(writer, "  Name:       {}", header.phone_name)?;
    wprintln!(writer, "  Firmware:   {}", header.phone_firmware)?;
    wprintln!(writer, "  Language:   {}", header.phone_language)?;
    wprintln!(writer)?;

    wprintln!(writer, "{}", format!("Sections ({})", backup.sections().len()).bold())?;
    for (i, section) in backup.sections().iter().enumerate() {
        wprint!(
            writer,
            "  {:>2}. {:<18} {}  start {:>10}  length {:>10}  ",
            i + 1,
            section.kind.name(),
            section.entry.guid,
            section.entry.start_offset,
            section.entry.declared_length
        )?;
        match &section.outcome {
            SectionOutcome::Materialized { folders, items } => {
                if *folders > 0 {
                    wprintln!(writer, "{} records in {} folders", items, folders)?;
                } else {
                    wprintln!(writer, "{} records", items)?;
                }
            }
            SectionOutcome::Unmaterialized {
                declared_items,
                folder_offsets,
            } => {
                wprintln!(
                    writer,
                    "{} ({} items declared, {} folders)",
                    "not decoded".yellow(),
                    declared_items,
                    folder_offsets.len()
                )?;
            }
        }
    }

    if !counts.is_empty() {
        wprintln!(writer)?;
        wprintln!(writer, "{}", "Records".bold())?;
        for c in &counts {
            wprintln!(
                writer,
                "  {:<10} {:>6} records {:>10} bytes",
                c.category,
                c.records,
                c.bytes
            )?;
        }
    }

    Ok(())
}
