//! Text message and MMS folders.
//!
//! Both sections are folder tables. A message folder body is the folder
//! name, a `u32` item count, and per item 8 unknown bytes, a `u32` length,
//! and the payload. MMS items carry a variable run of auxiliary UTF-16
//! strings and a fixed trailer before their length; the strings are decoded
//! for the debug log only.

use std::io::{Read, Seek};

use tracing::debug;

use crate::backup::constants::*;
use crate::backup::reader::NbuReader;
use crate::backup::record::{Folder, FolderList};
use crate::backup::section::read_folders;
use crate::backup::utf16;
use crate::NbuError;

pub(crate) fn read_messages_section<R: Read + Seek>(
    reader: &mut NbuReader<R>,
) -> Result<FolderList, NbuError> {
    let (total, folders) = read_folders(reader, |r, _, name| {
        let count = r.read_u32()?;
        debug!("folder \"{}\", {} messages", name, count);

        let mut folder = Folder::new(name);
        for _ in 0..count {
            r.skip(MESSAGE_HEADER_LEN)?;
            let length = r.read_u32()?;
            folder.items.push(r.skip_payload(length)?);
        }
        Ok(folder)
    })?;
    debug!("{} messages declared", total);
    Ok(FolderList::from(folders))
}

pub(crate) fn read_mms_section<R: Read + Seek>(
    reader: &mut NbuReader<R>,
) -> Result<FolderList, NbuError> {
    let (total, folders) = read_folders(reader, |r, _, name| {
        let count = r.read_u32()?;
        debug!("folder \"{}\", {} messages", name, count);

        let mut folder = Folder::new(name);
        for _ in 0..count {
            r.skip(MESSAGE_HEADER_LEN)?;
            let strings = r.read_u8()?;
            for n in 1..=u16::from(strings) {
                r.skip(MMS_STRING_HEADER_LEN)?;
                let text = utf16::to_utf8_string(&r.read_utf16_string()?)?;
                debug!("MMS string {}: \"{}\"", n, text);
            }
            r.skip(MMS_TRAILER_LEN)?;
            let length = r.read_u32()?;
            folder.items.push(r.skip_payload(length)?);
        }
        Ok(folder)
    })?;
    debug!("{} MMS declared", total);
    Ok(FolderList::from(folders))
}
