//! Byte ranges, record lists, and folders.
//!
//! Decoding never copies record payloads. Each record is remembered as a
//! [`ByteRange`] (file offset and length) into the still-open container and
//! only read when exported. Ranges are grouped into [`RecordList`]s, which
//! either hang directly off the container (calendar, contacts, memos) or
//! belong to a named [`Folder`] (messages, MMS, bookmarks).
//!
//! Lists keep insertion order, which is the on-disk order.

use serde::Serialize;

/// A span of bytes in the container file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    /// Absolute file offset of the first payload byte.
    pub position: u64,
    /// Payload length in bytes.
    pub length: u32,
}

impl ByteRange {
    pub fn new(position: u64, length: u32) -> Self {
        ByteRange { position, length }
    }

    /// Offset one past the last payload byte.
    pub fn end(&self) -> u64 {
        self.position.saturating_add(u64::from(self.length))
    }
}

/// Ordered sequence of byte ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordList(Vec<ByteRange>);

impl RecordList {
    pub fn new() -> Self {
        RecordList(Vec::new())
    }

    pub fn push(&mut self, range: ByteRange) {
        self.0.push(range);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ByteRange> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ByteRange> {
        self.0.iter()
    }

    /// Sum of all payload lengths.
    pub fn total_bytes(&self) -> u64 {
        self.0.iter().map(|r| u64::from(r.length)).sum()
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a ByteRange;
    type IntoIter = std::slice::Iter<'a, ByteRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A named group of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Folder {
    pub name: String,
    pub items: RecordList,
}

impl Folder {
    pub fn new(name: String) -> Self {
        Folder {
            name,
            items: RecordList::new(),
        }
    }
}

/// Ordered sequence of folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FolderList(Vec<Folder>);

impl FolderList {
    pub fn new() -> Self {
        FolderList(Vec::new())
    }

    pub fn push(&mut self, folder: Folder) {
        self.0.push(folder);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Folder> {
        self.0.iter()
    }

    /// First folder with the given name.
    pub fn find(&self, name: &str) -> Option<&Folder> {
        self.0.iter().find(|f| f.name == name)
    }

    /// Number of records across all folders.
    pub fn item_count(&self) -> usize {
        self.0.iter().map(|f| f.items.len()).sum()
    }
}

impl From<Vec<Folder>> for FolderList {
    fn from(folders: Vec<Folder>) -> Self {
        FolderList(folders)
    }
}

impl<'a> IntoIterator for &'a FolderList {
    type Item = &'a Folder;
    type IntoIter = std::slice::Iter<'a, Folder>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Every record category the decoder materializes.
///
/// A category stays `None` when its section is absent from the backup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Records {
    pub bookmarks: Option<FolderList>,
    pub messages: Option<FolderList>,
    pub mmses: Option<FolderList>,
    pub calendar: Option<RecordList>,
    pub contacts: Option<RecordList>,
    pub memos: Option<RecordList>,
}
