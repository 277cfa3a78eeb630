//! vCard-style item lists: calendar, contacts, and bookmarks.
//!
//! Each item is an optional pair of `u32` test fields, a `u32` length, and
//! the raw payload. The first test field is always present; the second
//! only follows when the first equals `0x10`. Neither field is understood,
//! so unexpected values are logged and decoding carries on.

use std::io::{Read, Seek};

use tracing::{debug, warn};

use crate::backup::constants::*;
use crate::backup::reader::{offset_from, NbuReader};
use crate::backup::record::{Folder, FolderList, RecordList};
use crate::backup::section::read_folders;
use crate::NbuError;

/// Read a `u32` item count followed by that many vCard items.
pub(crate) fn read_vcard_items<R: Read + Seek>(
    reader: &mut NbuReader<R>,
    items: &mut RecordList,
) -> Result<(), NbuError> {
    let count = reader.read_u32()?;
    debug!("{} items", count);

    for _ in 0..count {
        let test = reader.read_u32()?;
        if test != VCARD_TEST_MARKER {
            warn!(
                "vCard test field 1 at offset {}: {:#x} != {:#x}",
                reader.position() - 4,
                test,
                VCARD_TEST_MARKER
            );
        } else {
            let flag = reader.read_u32()?;
            if flag > VCARD_TEST_FLAG_MAX {
                warn!(
                    "vCard test field 2 at offset {}: {:#x} > {}",
                    reader.position() - 4,
                    flag,
                    VCARD_TEST_FLAG_MAX
                );
            }
        }

        let length = reader.read_u32()?;
        items.push(reader.skip_payload(length)?);
    }
    Ok(())
}

/// Read a calendar or contacts section.
///
/// The section header holds an item count and a folder count; the folder
/// count must be zero. The items themselves start at a fixed offset from
/// the section start.
pub(crate) fn read_vcard_section<R: Read + Seek>(
    reader: &mut NbuReader<R>,
    section_start: u64,
) -> Result<RecordList, NbuError> {
    let item_count = reader.read_u32()?;
    let folder_count = reader.read_u32()?;
    debug!("{} items", item_count);

    if folder_count != 0 {
        return Err(NbuError::InvalidRecord(format!(
            "section at offset {} unexpectedly contains {} folders",
            section_start, folder_count
        )));
    }

    let items_at = offset_from(section_start, VCARD_ITEMS_OFFSET)?;
    reader.at_offset(items_at, |r| {
        let mut items = RecordList::new();
        read_vcard_items(r, &mut items)?;
        Ok(items)
    })
}

/// Read the bookmarks section: named folders of vCard items.
pub(crate) fn read_bookmarks_section<R: Read + Seek>(
    reader: &mut NbuReader<R>,
) -> Result<FolderList, NbuError> {
    let (_, folders) = read_folders(reader, |r, _, name| {
        debug!("folder \"{}\"", name);
        let mut folder = Folder::new(name);
        read_vcard_items(r, &mut folder.items)?;
        Ok(folder)
    })?;
    Ok(FolderList::from(folders))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::record::ByteRange;
    use std::io::Cursor;

    fn reader(bytes: Vec<u8>) -> NbuReader<Cursor<Vec<u8>>> {
        NbuReader::new(Cursor::new(bytes)).unwrap()
    }

    fn put_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    #[test]
    fn test_items_with_and_without_second_test_field() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 2);
        // item 1: marker, flag, len 3
        put_u32(&mut buf, 0x10);
        put_u32(&mut buf, 0);
        put_u32(&mut buf, 3);
        buf.extend_from_slice(b"abc");
        // item 2: no marker, so no flag; len 2
        put_u32(&mut buf, 0x7);
        put_u32(&mut buf, 2);
        buf.extend_from_slice(b"de");

        let mut r = reader(buf);
        let mut items = RecordList::new();
        read_vcard_items(&mut r, &mut items).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items.get(0), Some(&ByteRange::new(16, 3)));
        assert_eq!(items.get(1), Some(&ByteRange::new(27, 2)));
        assert_eq!(r.position(), 29);
    }

    #[test]
    fn test_unexpected_flag_is_not_fatal() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 1);
        put_u32(&mut buf, 0x10);
        put_u32(&mut buf, 7);
        put_u32(&mut buf, 1);
        buf.push(b'x');

        let mut items = RecordList::new();
        read_vcard_items(&mut reader(buf), &mut items).unwrap();
        assert_eq!(items.get(0), Some(&ByteRange::new(16, 1)));
    }

    #[test]
    fn test_section_rejects_folders() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 0);
        put_u32(&mut buf, 1);
        let result = read_vcard_section(&mut reader(buf), 0);
        assert!(matches!(result, Err(NbuError::InvalidRecord(_))));
    }

    #[test]
    fn test_section_items_at_fixed_offset() {
        let mut buf = vec![0u8; 44];
        buf[0..4].copy_from_slice(&1u32.to_le_bytes());
        put_u32(&mut buf, 1);
        put_u32(&mut buf, 0x10);
        put_u32(&mut buf, 1);
        put_u32(&mut buf, 4);
        buf.extend_from_slice(b"VCAL");

        let mut r = reader(buf);
        let items = read_vcard_section(&mut r, 0).unwrap();
        assert_eq!(items.get(0), Some(&ByteRange::new(60, 4)));
        // Cursor is left just past the section header.
        assert_eq!(r.position(), 8);
    }

    #[test]
    fn test_payload_past_end_surfaces_on_next_read() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 1);
        put_u32(&mut buf, 0x10);
        put_u32(&mut buf, 0);
        put_u32(&mut buf, 100);
        buf.extend_from_slice(b"short");

        // Skipping past the end of a cursor succeeds; the next read does not.
        let mut r = reader(buf);
        let mut items = RecordList::new();
        read_vcard_items(&mut r, &mut items).unwrap();
        assert!(matches!(r.read_u8(), Err(NbuError::Truncated { .. })));
    }
}
