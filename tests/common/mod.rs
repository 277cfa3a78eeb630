//! Synthetic NBU backup builder shared by the integration tests.
//!
//! Layout produced by [`BackupBuilder::build`]:
//!
//! ```text
//! 0      20 zero bytes
//! 20     u64 root pointer (= ROOT)
//! ROOT   20 zero bytes, file time, five UTF-16 strings, 20-byte gap
//!        section table
//!        section bodies, in the order they were added
//! ```

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};

pub const ROOT: u64 = 32;

pub const CALENDAR: [u8; 16] = guid("16cdf8e8235e5a4eb735dddff1481222");
pub const GROUPS: [u8; 16] = guid("1f0e5865a19f3c499e230e25eb240fe1");
pub const ADVANCED_SETTINGS: [u8; 16] = guid("2df5686b1f4b224a92831b06c3c39a35");
pub const MMS: [u8; 16] = guid("471dd465efe332408c7764caa383aa33");
pub const MEMOS: [u8; 16] = guid("5c62973bdca75441a1c3059de3246808");
pub const MESSAGES: [u8; 16] = guid("617aefd1aabea1499d9d155abb4ceb8e");
pub const BOOKMARKS: [u8; 16] = guid("7f77905631f957498d96ee445dbebc5a");
pub const CONTACTS: [u8; 16] = guid("efd42ed0a35138479dd7305c7af068d3");

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => panic!("bad hex digit"),
    }
}

const fn guid(hex: &str) -> [u8; 16] {
    let h = hex.as_bytes();
    let mut out = [0u8; 16];
    let mut i = 0;
    while i < 16 {
        out[i] = nibble(h[2 * i]) << 4 | nibble(h[2 * i + 1]);
        i += 1;
    }
    out
}

pub fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.write_u16::<LittleEndian>(v).unwrap();
}

pub fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.write_u32::<LittleEndian>(v).unwrap();
}

pub fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.write_u64::<LittleEndian>(v).unwrap();
}

/// UTF-16LE bytes of `s`, without a length prefix.
pub fn utf16_bytes(s: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    for u in s.encode_utf16() {
        put_u16(&mut buf, u);
    }
    buf
}

/// Length-prefixed UTF-16 string.
pub fn put_utf16(buf: &mut Vec<u8>, s: &str) {
    put_u16(buf, s.encode_utf16().count() as u16);
    buf.extend_from_slice(&utf16_bytes(s));
}

/// A section body generator; receives the absolute offset it will live at.
pub type SectionBody = Box<dyn FnOnce(u64) -> Vec<u8>>;

pub struct BackupBuilder {
    pub time_high: u32,
    pub time_low: u32,
    pub imei: String,
    pub model: String,
    pub name: String,
    pub firmware: String,
    pub language: String,
    sections: Vec<([u8; 16], SectionBody)>,
}

impl BackupBuilder {
    pub fn new() -> Self {
        BackupBuilder {
            time_high: 0x01D6_E02A,
            time_low: 0x5E6B_8000,
            imei: "356938035643809".to_string(),
            model: "RM-356".to_string(),
            name: "Nokia 5800 XpressMusic".to_string(),
            firmware: "V 52.0.007".to_string(),
            language: "en".to_string(),
            sections: Vec::new(),
        }
    }

    pub fn section(mut self, guid: [u8; 16], body: SectionBody) -> Self {
        self.sections.push((guid, body));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut buf = vec![0u8; 20];
        put_u64(&mut buf, ROOT);
        buf.resize(ROOT as usize + 20, 0);
        put_u32(&mut buf, self.time_high);
        put_u32(&mut buf, self.time_low);
        for s in [
            &self.imei,
            &self.model,
            &self.name,
            &self.firmware,
            &self.language,
        ] {
            put_utf16(&mut buf, s);
        }
        buf.extend_from_slice(&[0xEE; 20]);

        put_u32(&mut buf, self.sections.len() as u32);
        let table_at = buf.len();
        buf.resize(table_at + self.sections.len() * 32, 0);

        for (i, (guid, body)) in self.sections.into_iter().enumerate() {
            let start = buf.len() as u64;
            let bytes = body(start);

            let entry = table_at + i * 32;
            buf[entry..entry + 16].copy_from_slice(&guid);
            buf[entry + 16..entry + 24].copy_from_slice(&start.to_le_bytes());
            buf[entry + 24..entry + 32].copy_from_slice(&(bytes.len() as u64).to_le_bytes());

            buf.extend_from_slice(&bytes);
        }
        buf
    }
}

impl Default for BackupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn vcard_items(buf: &mut Vec<u8>, items: &[Vec<u8>]) {
    put_u32(buf, items.len() as u32);
    for item in items {
        put_u32(buf, 0x10);
        put_u32(buf, 0);
        put_u32(buf, item.len() as u32);
        buf.extend_from_slice(item);
    }
}

/// Calendar or contacts section holding `items`.
pub fn vcard_section(items: Vec<Vec<u8>>) -> SectionBody {
    Box::new(move |_| {
        let mut buf = Vec::new();
        put_u32(&mut buf, items.len() as u32);
        put_u32(&mut buf, 0);
        buf.resize(44, 0xCC);
        vcard_items(&mut buf, &items);
        buf
    })
}

/// Memo section with the given texts.
pub fn memo_section(memos: Vec<String>) -> SectionBody {
    Box::new(move |_| {
        let mut buf = Vec::new();
        put_u32(&mut buf, memos.len() as u32);
        buf.resize(48, 0xCC);
        for memo in &memos {
            buf.extend_from_slice(&[0xAB; 4]);
            put_u16(&mut buf, memo.encode_utf16().count() as u16);
            buf.extend_from_slice(&utf16_bytes(memo));
        }
        buf
    })
}

/// Section body taken verbatim.
pub fn raw_section(bytes: Vec<u8>) -> SectionBody {
    Box::new(move |_| bytes)
}

/// What a folder holds after its name.
pub enum FolderBody {
    VCards(Vec<Vec<u8>>),
    Messages(Vec<Vec<u8>>),
    /// `(auxiliary strings, payload)` per item.
    Mms(Vec<(Vec<String>, Vec<u8>)>),
    Group(u32),
}

impl FolderBody {
    fn write(&self, buf: &mut Vec<u8>) {
        match self {
            FolderBody::VCards(items) => vcard_items(buf, items),
            FolderBody::Messages(items) => {
                put_u32(buf, items.len() as u32);
                for item in items {
                    buf.extend_from_slice(&[0x11; 8]);
                    put_u32(buf, item.len() as u32);
                    buf.extend_from_slice(item);
                }
            }
            FolderBody::Mms(items) => {
                put_u32(buf, items.len() as u32);
                for (strings, payload) in items {
                    buf.extend_from_slice(&[0x22; 8]);
                    buf.push(strings.len() as u8);
                    for s in strings {
                        buf.extend_from_slice(&[0x33; 8]);
                        put_utf16(buf, s);
                    }
                    buf.extend_from_slice(&[0x44; 20]);
                    put_u32(buf, payload.len() as u32);
                    buf.extend_from_slice(payload);
                }
            }
            FolderBody::Group(count) => put_u32(buf, *count),
        }
    }
}

/// A folder-table section. Folder bodies follow the table with a 16-byte
/// gap between them; with `reverse`, they are laid out last folder first.
pub fn folder_section(folders: Vec<(String, FolderBody)>, reverse: bool) -> SectionBody {
    Box::new(move |start| {
        let mut buf = Vec::new();
        let total: u32 = folders
            .iter()
            .map(|(_, body)| match body {
                FolderBody::VCards(i) | FolderBody::Messages(i) => i.len() as u32,
                FolderBody::Mms(i) => i.len() as u32,
                FolderBody::Group(n) => *n,
            })
            .sum();
        put_u32(&mut buf, total);
        put_u32(&mut buf, folders.len() as u32);
        let table_at = buf.len();
        buf.resize(table_at + folders.len() * 12, 0);

        let mut order: Vec<usize> = (0..folders.len()).collect();
        if reverse {
            order.reverse();
        }
        for i in order {
            buf.extend_from_slice(&[0x5A; 16]);
            let offset = start + buf.len() as u64;
            let (name, body) = &folders[i];
            buf.extend_from_slice(&[0xF0, 0x0F, 0xF0, 0x0F]);
            put_utf16(&mut buf, name);
            body.write(&mut buf);

            let entry = table_at + i * 12;
            buf[entry..entry + 4].copy_from_slice(&(i as u32 + 100).to_le_bytes());
            buf[entry + 4..entry + 12].copy_from_slice(&offset.to_le_bytes());
        }
        buf
    })
}

/// Write a backup image to a temp file.
pub fn write_backup(bytes: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(bytes).unwrap();
    tmp.flush().unwrap();
    tmp
}
