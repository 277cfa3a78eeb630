use std::io::Write;

use crate::backup::container::Container;
use crate::cli::app::Category;
use crate::cli::{category_lists, wprintln};
use crate::util::hex::{format_offset, hex_dump};
use crate::NbuError;

pub struct DumpOptions {
    pub file: String,
    pub category: Category,
    pub index: usize,
    /// Folder to pick the record from; defaults to the first folder.
    pub folder: Option<String>,
    pub raw: bool,
}

pub fn execute(opts: &DumpOptions, writer: &mut dyn Write) -> Result<(), NbuError> {
    let mut backup = Container::open(&opts.file)?;
    let lists = category_lists(&backup, opts.category);

    let (folder, list) = match &opts.folder {
        Some(name) => lists
            .into_iter()
            .find(|(folder, _)| folder.as_deref() == Some(name.as_str()))
            .ok_or_else(|| {
                NbuError::Argument(format!(
                    "No {} folder named {:?} in {}",
                    opts.category.name(),
                    name,
                    opts.file
                ))
            })?,
        None => lists.into_iter().next().ok_or_else(|| {
            NbuError::Argument(format!(
                "{} has no {} records",
                opts.file,
                opts.category.name()
            ))
        })?,
    };

    let range = *list.get(opts.index).ok_or_else(|| {
        NbuError::Argument(format!(
            "Record index {} out of range ({} records)",
            opts.index,
            list.len()
        ))
    })?;
    let data = backup.read_range(range)?;

    if opts.raw {
        writer
            .write_all(&data)
            .map_err(|e| NbuError::Io(format!("Cannot write to stdout: {}", e)))?;
    } else {
        let location = match &folder {
            Some(name) => format!("{} folder {:?}", opts.category.name(), name),
            None => opts.category.name().to_string(),
        };
        wprintln!(
            writer,
            "Hex dump of {} record {} at offset {} ({} bytes):",
            location,
            opts.index,
            format_offset(range.position),
            range.length
        )?;
        wprintln!(writer)?;
        wprintln!(writer, "{}", hex_dump(&data, range.position))?;
    }

    Ok(())
}
