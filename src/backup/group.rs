//! Contact groups and advanced settings.
//!
//! Both sections are recognized but their items are not decoded. Groups
//! are walked far enough to read each group's name and item count; the
//! advanced settings reader only locates its folders.

use std::io::{Read, Seek};

use tracing::debug;

use crate::backup::reader::NbuReader;
use crate::backup::section::{read_folder_table, read_folders, SectionOutcome};
use crate::NbuError;

pub(crate) fn read_groups_section<R: Read + Seek>(
    reader: &mut NbuReader<R>,
) -> Result<SectionOutcome, NbuError> {
    let mut folder_offsets = Vec::new();
    let (declared_items, _) = read_folders(reader, |r, folder, name| {
        folder_offsets.push(folder.offset);
        let count = r.read_u32()?;
        debug!("group \"{}\", {} items", name, count);
        Ok(())
    })?;
    Ok(SectionOutcome::Unmaterialized {
        declared_items,
        folder_offsets,
    })
}

pub(crate) fn read_advanced_settings_section<R: Read + Seek>(
    reader: &mut NbuReader<R>,
) -> Result<SectionOutcome, NbuError> {
    let (declared_items, refs) = read_folder_table(reader)?;
    let folder_offsets: Vec<u64> = refs.iter().map(|f| f.offset).collect();
    debug!("advanced settings folders at {:?}", folder_offsets);
    Ok(SectionOutcome::Unmaterialized {
        declared_items,
        folder_offsets,
    })
}
