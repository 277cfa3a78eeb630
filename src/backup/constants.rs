//! NBU container layout constants.
//!
//! All offsets are in bytes. Section-relative offsets are added to the
//! section's start offset from the section table; folder-relative offsets to
//! the folder offset stored in the section's folder table.

// Header

/// File offset of the `u64` pointer to the root block.
pub const ROOT_POINTER_OFFSET: u64 = 20;
/// Offset of the backup time within the root block.
pub const ROOT_HEADER_OFFSET: u64 = 20;
/// Unparsed bytes between the phone language string and the section table.
pub const HEADER_GAP: u64 = 20;

// Section table

/// Length of a section GUID.
pub const GUID_LEN: usize = 16;

// Folders

/// Unused folder id preceding each folder offset.
pub const FOLDER_ID_LEN: u64 = 4;
/// Folder-type tag at the start of each folder body.
pub const FOLDER_TAG_LEN: u64 = 4;

// vCard-style items (calendar, contacts, bookmarks)

/// Offset of the item list within a calendar or contacts section.
pub const VCARD_ITEMS_OFFSET: u64 = 44;
/// Expected value of the first vCard test field.
pub const VCARD_TEST_MARKER: u32 = 0x10;
/// Largest expected value of the second vCard test field.
pub const VCARD_TEST_FLAG_MAX: u32 = 1;

// Messages

/// Unparsed bytes before each message length.
pub const MESSAGE_HEADER_LEN: u64 = 8;
/// Unparsed bytes before each MMS auxiliary string.
pub const MMS_STRING_HEADER_LEN: u64 = 8;
/// Unparsed bytes between the MMS auxiliary strings and the payload length.
pub const MMS_TRAILER_LEN: u64 = 20;

// Memos

/// Offset of the memo list within the memos section.
pub const MEMO_ITEMS_OFFSET: u64 = 48;
/// Unparsed bytes before each memo length.
pub const MEMO_HEADER_LEN: u64 = 4;
/// Largest memo length, in code units, whose byte length fits a `u16`.
pub const MEMO_MAX_UNITS: u16 = u16::MAX / 2;
