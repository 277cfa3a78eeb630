//! Memos section.
//!
//! A flat list of UTF-16 notes at a fixed offset from the section start.
//! Unlike every other category, a memo's length is counted in UTF-16 code
//! units, not bytes. It is stored as a `u16`, and the byte length must fit
//! a `u16` too.

use std::io::{Read, Seek};

use tracing::debug;

use crate::backup::constants::*;
use crate::backup::reader::{offset_from, NbuReader};
use crate::backup::record::RecordList;
use crate::NbuError;

pub(crate) fn read_memos_section<R: Read + Seek>(
    reader: &mut NbuReader<R>,
    section_start: u64,
) -> Result<RecordList, NbuError> {
    let count = reader.read_u32()?;
    debug!("{} memos", count);

    let items_at = offset_from(section_start, MEMO_ITEMS_OFFSET)?;
    reader.at_offset(items_at, |r| {
        let mut memos = RecordList::new();
        for _ in 0..count {
            r.skip(MEMO_HEADER_LEN)?;
            let offset = r.position();
            let units = r.read_u16()?;
            if units > MEMO_MAX_UNITS {
                return Err(NbuError::MemoTooLarge { offset, units });
            }
            memos.push(r.skip_payload(u32::from(units) * 2)?);
        }
        Ok(memos)
    })
}
