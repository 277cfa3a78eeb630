//! NBU container open and close.
//!
//! [`Container`] is the entry point for decoding a backup. Opening reads the
//! root pointer, the header (backup time and phone identity), and the
//! section table, dispatching each section to its category reader. Decoding
//! either succeeds completely or returns the first error; there is no
//! partially decoded container.
//!
//! Records are kept as byte ranges into the open source, so the container
//! holds its reader until it is dropped. [`Container::read_range`] resolves
//! a range into its bytes.

use std::io::{Cursor, Read, Seek};

use serde::Serialize;
use tracing::info;

use crate::backup::constants::*;
use crate::backup::filetime::FileTime;
use crate::backup::reader::{offset_from, NbuReader, ReadSeek};
use crate::backup::record::{ByteRange, FolderList, RecordList, Records};
use crate::backup::section::{read_sections, SectionSummary};
use crate::backup::utf16;
use crate::NbuError;

/// Backup time and phone identity from the container header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupHeader {
    pub backup_time: FileTime,
    pub phone_imei: String,
    pub phone_model: String,
    pub phone_name: String,
    pub phone_firmware: String,
    pub phone_language: String,
}

impl BackupHeader {
    fn read<R: Read + Seek>(reader: &mut NbuReader<R>) -> Result<Self, NbuError> {
        let backup_time = reader.read_file_time()?;
        let mut text = || -> Result<String, NbuError> {
            utf16::to_utf8_string(&reader.read_utf16_string()?)
        };
        Ok(BackupHeader {
            backup_time,
            phone_imei: text()?,
            phone_model: text()?,
            phone_name: text()?,
            phone_firmware: text()?,
            phone_language: text()?,
        })
    }
}

/// A decoded NBU backup.
pub struct Container {
    reader: NbuReader<Box<dyn ReadSeek>>,
    file_size: u64,
    header: BackupHeader,
    records: Records,
    sections: Vec<SectionSummary>,
}

impl Container {
    /// Open and decode a backup file.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, NbuError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| NbuError::Io(format!("Cannot open {}: {}", path.display(), e)))?;

        let file_size = file
            .metadata()
            .map_err(|e| NbuError::Io(format!("Cannot stat {}: {}", path.display(), e)))?
            .len();

        Self::init(Box::new(file), file_size)
    }

    /// Decode a backup image held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, NbuError> {
        let file_size = data.len() as u64;
        Self::init(Box::new(Cursor::new(data)), file_size)
    }

    fn init(source: Box<dyn ReadSeek>, file_size: u64) -> Result<Self, NbuError> {
        let mut reader = NbuReader::new(source)?;

        reader.seek_to(ROOT_POINTER_OFFSET)?;
        let root = reader.read_u64()?;
        reader.seek_to(offset_from(root, ROOT_HEADER_OFFSET)?)?;

        let header = BackupHeader::read(&mut reader)?;
        info!(
            "backup of {} ({}, IMEI {}) taken {}",
            header.phone_name, header.phone_model, header.phone_imei, header.backup_time
        );

        reader.skip(HEADER_GAP)?;

        let mut records = Records::default();
        let sections = read_sections(&mut reader, &mut records)?;

        Ok(Container {
            reader,
            file_size,
            header,
            records,
            sections,
        })
    }

    /// Size of the backup in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn header(&self) -> &BackupHeader {
        &self.header
    }

    pub fn backup_time(&self) -> FileTime {
        self.header.backup_time
    }

    pub fn phone_imei(&self) -> &str {
        &self.header.phone_imei
    }

    pub fn phone_model(&self) -> &str {
        &self.header.phone_model
    }

    pub fn phone_name(&self) -> &str {
        &self.header.phone_name
    }

    pub fn phone_firmware(&self) -> &str {
        &self.header.phone_firmware
    }

    pub fn phone_language(&self) -> &str {
        &self.header.phone_language
    }

    /// All decoded record categories.
    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn calendar(&self) -> Option<&RecordList> {
        self.records.calendar.as_ref()
    }

    pub fn contacts(&self) -> Option<&RecordList> {
        self.records.contacts.as_ref()
    }

    pub fn memos(&self) -> Option<&RecordList> {
        self.records.memos.as_ref()
    }

    pub fn bookmarks(&self) -> Option<&FolderList> {
        self.records.bookmarks.as_ref()
    }

    pub fn messages(&self) -> Option<&FolderList> {
        self.records.messages.as_ref()
    }

    pub fn mmses(&self) -> Option<&FolderList> {
        self.records.mmses.as_ref()
    }

    /// The section table in file order, with what was decoded from each entry.
    pub fn sections(&self) -> &[SectionSummary] {
        &self.sections
    }

    /// Read the payload bytes of a record.
    pub fn read_range(&mut self, range: ByteRange) -> Result<Vec<u8>, NbuError> {
        self.reader.seek_to(range.position)?;
        self.reader.read_exact(range.length as usize)
    }

    /// Read a UTF-16 payload and convert it to UTF-8.
    ///
    /// The byte length must be even.
    pub fn read_utf16_range(&mut self, range: ByteRange) -> Result<String, NbuError> {
        if range.length % 2 != 0 {
            return Err(NbuError::InvalidRecord(format!(
                "UTF-16 item at offset {} has odd length {}",
                range.position, range.length
            )));
        }
        self.reader.seek_to(range.position)?;
        let units = self.reader.read_utf16_units(range.length as usize / 2)?;
        utf16::to_utf8_string(&units)
    }

    /// Release the backup and everything decoded from it.
    pub fn close(self) {}
}
