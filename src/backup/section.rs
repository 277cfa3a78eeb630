//! Section table and section dispatch.
//!
//! After the header, an NBU container lists its sections: a `u32` count
//! followed by fixed-size entries of a 16-byte GUID, a `u64` start offset,
//! and a `u64` declared length. The GUID identifies the record category;
//! [`SECTION_GUIDS`] maps the eight known GUIDs to a [`SectionKind`].
//!
//! An unknown GUID aborts the parse with [`NbuError::UnsupportedSection`].
//! The declared length is not trusted enough to skip a section the decoder
//! does not understand.
//!
//! Category readers are entered through [`NbuReader::at_offset`], so the
//! cursor is back at the next table entry no matter how far a reader
//! wandered. The folder-table walker shared by the folder-based readers
//! lives here too.

use std::fmt;
use std::io::{Read, Seek};

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::backup::constants::*;
use crate::backup::reader::{offset_from, NbuReader};
use crate::backup::record::Records;
use crate::backup::{group, memo, message, utf16, vcard};
use crate::NbuError;

/// A 16-byte section identifier, compared byte for byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid(pub [u8; GUID_LEN]);

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Record category of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Calendar,
    Groups,
    AdvancedSettings,
    Mms,
    Memos,
    Messages,
    Bookmarks,
    Contacts,
}

/// Known section GUIDs, as stored on disk.
pub const SECTION_GUIDS: [(Guid, SectionKind); 8] = [
    (
        Guid([
            0x16, 0xcd, 0xf8, 0xe8, 0x23, 0x5e, 0x5a, 0x4e, 0xb7, 0x35, 0xdd, 0xdf, 0xf1, 0x48,
            0x12, 0x22,
        ]),
        SectionKind::Calendar,
    ),
    (
        Guid([
            0x1f, 0x0e, 0x58, 0x65, 0xa1, 0x9f, 0x3c, 0x49, 0x9e, 0x23, 0x0e, 0x25, 0xeb, 0x24,
            0x0f, 0xe1,
        ]),
        SectionKind::Groups,
    ),
    (
        Guid([
            0x2d, 0xf5, 0x68, 0x6b, 0x1f, 0x4b, 0x22, 0x4a, 0x92, 0x83, 0x1b, 0x06, 0xc3, 0xc3,
            0x9a, 0x35,
        ]),
        SectionKind::AdvancedSettings,
    ),
    (
        Guid([
            0x47, 0x1d, 0xd4, 0x65, 0xef, 0xe3, 0x32, 0x40, 0x8c, 0x77, 0x64, 0xca, 0xa3, 0x83,
            0xaa, 0x33,
        ]),
        SectionKind::Mms,
    ),
    (
        Guid([
            0x5c, 0x62, 0x97, 0x3b, 0xdc, 0xa7, 0x54, 0x41, 0xa1, 0xc3, 0x05, 0x9d, 0xe3, 0x24,
            0x68, 0x08,
        ]),
        SectionKind::Memos,
    ),
    (
        Guid([
            0x61, 0x7a, 0xef, 0xd1, 0xaa, 0xbe, 0xa1, 0x49, 0x9d, 0x9d, 0x15, 0x5a, 0xbb, 0x4c,
            0xeb, 0x8e,
        ]),
        SectionKind::Messages,
    ),
    (
        Guid([
            0x7f, 0x77, 0x90, 0x56, 0x31, 0xf9, 0x57, 0x49, 0x8d, 0x96, 0xee, 0x44, 0x5d, 0xbe,
            0xbc, 0x5a,
        ]),
        SectionKind::Bookmarks,
    ),
    (
        Guid([
            0xef, 0xd4, 0x2e, 0xd0, 0xa3, 0x51, 0x38, 0x47, 0x9d, 0xd7, 0x30, 0x5c, 0x7a, 0xf0,
            0x68, 0xd3,
        ]),
        SectionKind::Contacts,
    ),
];

impl SectionKind {
    /// Look up the category for a GUID.
    pub fn from_guid(guid: &Guid) -> Option<Self> {
        SECTION_GUIDS
            .iter()
            .find(|(known, _)| known == guid)
            .map(|(_, kind)| *kind)
    }

    /// The on-disk GUID for this category.
    pub fn guid(self) -> Guid {
        SECTION_GUIDS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(guid, _)| *guid)
            .unwrap_or(Guid([0; GUID_LEN]))
    }

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Calendar => "calendar",
            SectionKind::Groups => "groups",
            SectionKind::AdvancedSettings => "advanced settings",
            SectionKind::Mms => "MMS",
            SectionKind::Memos => "memos",
            SectionKind::Messages => "messages",
            SectionKind::Bookmarks => "bookmarks",
            SectionKind::Contacts => "contacts",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of the section table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionEntry {
    pub guid: Guid,
    /// Absolute offset of the section body.
    pub start_offset: u64,
    /// Length recorded in the table; informational only.
    pub declared_length: u64,
}

/// What a category reader did with its section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SectionOutcome {
    /// Records were added to the container.
    Materialized { folders: usize, items: usize },
    /// The section was recognized and its headers consumed, but its items
    /// are not decoded.
    Unmaterialized {
        declared_items: u32,
        folder_offsets: Vec<u64>,
    },
}

/// A decoded section table entry and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub kind: SectionKind,
    #[serde(flatten)]
    pub entry: SectionEntry,
    #[serde(flatten)]
    pub outcome: SectionOutcome,
}

fn read_entry<R: Read + Seek>(reader: &mut NbuReader<R>) -> Result<SectionEntry, NbuError> {
    let guid = Guid(reader.read_array::<GUID_LEN>()?);
    let start_offset = reader.read_u64()?;
    let declared_length = reader.read_u64()?;
    Ok(SectionEntry {
        guid,
        start_offset,
        declared_length,
    })
}

/// Read the section table at the cursor and decode every section into `records`.
///
/// Stops at the first failure; sections after a failing entry are never read.
pub(crate) fn read_sections<R: Read + Seek>(
    reader: &mut NbuReader<R>,
    records: &mut Records,
) -> Result<Vec<SectionSummary>, NbuError> {
    let count = reader.read_u32()?;
    debug!("backup contains {} sections", count);

    let mut summaries = Vec::new();
    for index in 0..count {
        let entry = read_entry(reader)?;
        let kind = SectionKind::from_guid(&entry.guid)
            .ok_or(NbuError::UnsupportedSection { guid: entry.guid })?;

        debug!(
            "section {}: guid {} ({}) at offset {}",
            index + 1,
            entry.guid,
            kind,
            entry.start_offset
        );

        let outcome = reader.at_offset(entry.start_offset, |r| {
            read_section(r, kind, entry.start_offset, records)
        })?;

        summaries.push(SectionSummary {
            kind,
            entry,
            outcome,
        });
    }

    Ok(summaries)
}

/// Run the category reader for `kind` with the cursor at `section_start`.
fn read_section<R: Read + Seek>(
    reader: &mut NbuReader<R>,
    kind: SectionKind,
    section_start: u64,
    records: &mut Records,
) -> Result<SectionOutcome, NbuError> {
    let outcome = match kind {
        SectionKind::Calendar => {
            let list = vcard::read_vcard_section(reader, section_start)?;
            let outcome = flat_outcome(list.len());
            replace(&mut records.calendar, list, kind);
            outcome
        }
        SectionKind::Contacts => {
            let list = vcard::read_vcard_section(reader, section_start)?;
            let outcome = flat_outcome(list.len());
            replace(&mut records.contacts, list, kind);
            outcome
        }
        SectionKind::Memos => {
            let list = memo::read_memos_section(reader, section_start)?;
            let outcome = flat_outcome(list.len());
            replace(&mut records.memos, list, kind);
            outcome
        }
        SectionKind::Bookmarks => {
            let folders = vcard::read_bookmarks_section(reader)?;
            let outcome = SectionOutcome::Materialized {
                folders: folders.len(),
                items: folders.item_count(),
            };
            replace(&mut records.bookmarks, folders, kind);
            outcome
        }
        SectionKind::Messages => {
            let folders = message::read_messages_section(reader)?;
            let outcome = SectionOutcome::Materialized {
                folders: folders.len(),
                items: folders.item_count(),
            };
            replace(&mut records.messages, folders, kind);
            outcome
        }
        SectionKind::Mms => {
            let folders = message::read_mms_section(reader)?;
            let outcome = SectionOutcome::Materialized {
                folders: folders.len(),
                items: folders.item_count(),
            };
            replace(&mut records.mmses, folders, kind);
            outcome
        }
        SectionKind::Groups => group::read_groups_section(reader)?,
        SectionKind::AdvancedSettings => group::read_advanced_settings_section(reader)?,
    };
    Ok(outcome)
}

fn flat_outcome(items: usize) -> SectionOutcome {
    SectionOutcome::Materialized { folders: 0, items }
}

fn replace<T>(slot: &mut Option<T>, value: T, kind: SectionKind) {
    if slot.replace(value).is_some() {
        warn!("duplicate {} section; keeping the later one", kind);
    }
}

/// A folder table entry: where the folder body lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FolderRef {
    pub offset: u64,
}

/// Read the `(item_count, folder_count)` pair and the folder table entries.
///
/// Each entry is a 4-byte folder id (ignored) and a `u64` folder offset.
pub(crate) fn read_folder_table<R: Read + Seek>(
    reader: &mut NbuReader<R>,
) -> Result<(u32, Vec<FolderRef>), NbuError> {
    let item_count = reader.read_u32()?;
    let folder_count = reader.read_u32()?;
    debug!("{} items in {} folders", item_count, folder_count);

    let mut refs = Vec::new();
    for _ in 0..folder_count {
        reader.skip(FOLDER_ID_LEN)?;
        let offset = reader.read_u64()?;
        refs.push(FolderRef { offset });
    }
    Ok((item_count, refs))
}

/// Walk a section's folder table, reading each folder body in place.
///
/// For every table entry the cursor moves to the folder offset past its
/// type tag, the name is read, and `read_body` consumes the kind-specific
/// items. The cursor then returns to the table for the next entry, so
/// folder bodies may appear anywhere in the file and in any order.
pub(crate) fn read_folders<R, T, F>(
    reader: &mut NbuReader<R>,
    mut read_body: F,
) -> Result<(u32, Vec<T>), NbuError>
where
    R: Read + Seek,
    F: FnMut(&mut NbuReader<R>, FolderRef, String) -> Result<T, NbuError>,
{
    let item_count = reader.read_u32()?;
    let folder_count = reader.read_u32()?;
    debug!("{} items in {} folders", item_count, folder_count);

    let mut folders = Vec::new();
    for _ in 0..folder_count {
        reader.skip(FOLDER_ID_LEN)?;
        let folder_ref = FolderRef {
            offset: reader.read_u64()?,
        };
        let body = offset_from(folder_ref.offset, FOLDER_TAG_LEN)?;

        let folder = reader.at_offset(body, |r| {
            let name = utf16::to_utf8_string(&r.read_utf16_string()?)?;
            read_body(r, folder_ref, name)
        })?;
        folders.push(folder);
    }
    Ok((item_count, folders))
}
