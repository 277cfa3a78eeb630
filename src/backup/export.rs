//! Writing decoded records to files.
//!
//! [`export_all`] materializes a decoded [`Container`] into a directory:
//!
//! | Path | Content |
//! |------|---------|
//! | `calendar.ics` | all calendar payloads, verbatim |
//! | `contacts.vcf` | all contact payloads, verbatim |
//! | `memos/memo-N.txt` | each memo, converted from UTF-16 |
//! | `messages/<folder>.vmg` | each message folder, items converted from UTF-16 |
//! | `mms/<folder>/mms-N.bin` | each MMS payload, verbatim |
//!
//! Absent and empty categories produce nothing. Existing files are never
//! overwritten. A failure is recorded in the [`ExportReport`] and the
//! remaining files are still attempted; only a failure to create the output
//! directory itself aborts the export.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::backup::container::Container;
use crate::backup::record::{Folder, FolderList, RecordList, Records};
use crate::util::fs::{create_new, ensure_dir, validate_folder_name};
use crate::NbuError;

pub const CALENDAR_FILE: &str = "calendar.ics";
pub const CONTACTS_FILE: &str = "contacts.vcf";
pub const MEMOS_DIR: &str = "memos";
pub const MESSAGES_DIR: &str = "messages";
pub const MMS_DIR: &str = "mms";

/// A file (or directory) that could not be exported.
#[derive(Debug)]
pub struct ExportFailure {
    pub path: PathBuf,
    pub error: NbuError,
}

/// Result of an export run.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Files written, in the order they were created.
    pub written: Vec<PathBuf>,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    /// True if every planned file was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Number of files [`export_all`] will try to write for these records.
pub fn planned_files(records: &Records) -> u64 {
    let flat = |list: &Option<RecordList>| match list {
        Some(l) if !l.is_empty() => 1,
        _ => 0,
    };
    let memos = records.memos.as_ref().map_or(0, |l| l.len() as u64);
    let messages = records.messages.as_ref().map_or(0, |f| f.len() as u64);
    let mms = records.mmses.as_ref().map_or(0, |f| f.item_count() as u64);
    flat(&records.calendar) + flat(&records.contacts) + memos + messages + mms
}

/// Export every supported category of `container` into `dir`.
pub fn export_all<P: AsRef<Path>>(
    container: &mut Container,
    dir: P,
) -> Result<ExportReport, NbuError> {
    export_all_with_progress(container, dir, |_| {})
}

/// Like [`export_all`], calling `progress` after each file attempt.
pub fn export_all_with_progress<P, F>(
    container: &mut Container,
    dir: P,
    progress: F,
) -> Result<ExportReport, NbuError>
where
    P: AsRef<Path>,
    F: FnMut(&Path),
{
    let dir = dir.as_ref();
    ensure_dir(dir)?;

    let records = container.records().clone();
    let mut export = Exporter {
        container,
        report: ExportReport::default(),
        progress,
    };

    if let Some(list) = records.calendar.as_ref() {
        export.raw_list(list, &dir.join(CALENDAR_FILE));
    }
    if let Some(list) = records.contacts.as_ref() {
        export.raw_list(list, &dir.join(CONTACTS_FILE));
    }
    if let Some(list) = records.memos.as_ref() {
        export.memos(list, &dir.join(MEMOS_DIR));
    }
    if let Some(folders) = records.messages.as_ref() {
        export.messages(folders, &dir.join(MESSAGES_DIR));
    }
    if let Some(folders) = records.mmses.as_ref() {
        export.mmses(folders, &dir.join(MMS_DIR));
    }

    Ok(export.report)
}

struct Exporter<'a, F> {
    container: &'a mut Container,
    report: ExportReport,
    progress: F,
}

impl<F: FnMut(&Path)> Exporter<'_, F> {
    fn record(&mut self, path: PathBuf, result: Result<(), NbuError>) {
        (self.progress)(&path);
        match result {
            Ok(()) => {
                debug!("wrote {}", path.display());
                self.report.written.push(path);
            }
            Err(error) => {
                warn!("cannot export {}: {}", path.display(), error);
                self.report.failures.push(ExportFailure { path, error });
            }
        }
    }

    /// Record a failure that prevents `planned` files from being attempted.
    fn fail(&mut self, path: PathBuf, error: NbuError, planned: usize) {
        for _ in 0..planned {
            (self.progress)(&path);
        }
        warn!("cannot export {}: {}", path.display(), error);
        self.report.failures.push(ExportFailure { path, error });
    }

    fn raw_list(&mut self, list: &RecordList, path: &Path) {
        if list.is_empty() {
            return;
        }
        let result = create_new(path).and_then(|mut file| {
            for range in list {
                let bytes = self.container.read_range(*range)?;
                write_all(&mut file, &bytes, path)?;
            }
            Ok(())
        });
        self.record(path.to_path_buf(), result);
    }

    fn utf16_list(&mut self, list: &RecordList, path: &Path) -> Result<(), NbuError> {
        let mut file = create_new(path)?;
        for range in list {
            let text = self.container.read_utf16_range(*range)?;
            write_all(&mut file, text.as_bytes(), path)?;
        }
        Ok(())
    }

    fn memos(&mut self, memos: &RecordList, dir: &Path) {
        if memos.is_empty() {
            return;
        }
        if let Err(e) = ensure_dir(dir) {
            self.fail(dir.to_path_buf(), e, memos.len());
            return;
        }
        for (i, range) in memos.iter().enumerate() {
            let path = dir.join(format!("memo-{}.txt", i + 1));
            let result = create_new(&path).and_then(|mut file| {
                let text = self.container.read_utf16_range(*range)?;
                write_all(&mut file, text.as_bytes(), &path)
            });
            self.record(path, result);
        }
    }

    fn messages(&mut self, folders: &FolderList, dir: &Path) {
        if folders.is_empty() {
            return;
        }
        if let Err(e) = ensure_dir(dir) {
            self.fail(dir.to_path_buf(), e, folders.len());
            return;
        }
        for folder in folders {
            let path = dir.join(format!("{}.vmg", folder.name));
            let result =
                validate_folder_name(&folder.name).and_then(|_| self.utf16_list(&folder.items, &path));
            self.record(path, result);
        }
    }

    fn mmses(&mut self, folders: &FolderList, dir: &Path) {
        if folders.item_count() == 0 {
            return;
        }
        if let Err(e) = ensure_dir(dir) {
            self.fail(dir.to_path_buf(), e, folders.item_count());
            return;
        }
        for folder in folders.iter().filter(|f| !f.items.is_empty()) {
            self.mms_folder(folder, dir);
        }
    }

    fn mms_folder(&mut self, folder: &Folder, dir: &Path) {
        let folder_dir = dir.join(&folder.name);
        if let Err(e) = validate_folder_name(&folder.name).and_then(|_| ensure_dir(&folder_dir)) {
            self.fail(folder_dir, e, folder.items.len());
            return;
        }
        for (i, range) in folder.items.iter().enumerate() {
            let path = folder_dir.join(format!("mms-{}.bin", i + 1));
            let result = create_new(&path).and_then(|mut file| {
                let bytes = self.container.read_range(*range)?;
                write_all(&mut file, &bytes, &path)
            });
            self.record(path, result);
        }
    }
}

fn write_all(file: &mut File, bytes: &[u8], path: &Path) -> Result<(), NbuError> {
    file.write_all(bytes)
        .map_err(|e| NbuError::Io(format!("Cannot write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::record::ByteRange;

    #[test]
    fn test_planned_files() {
        let mut records = Records::default();
        assert_eq!(planned_files(&records), 0);

        records.calendar = Some(RecordList::new());
        let mut memos = RecordList::new();
        memos.push(ByteRange::new(0, 2));
        memos.push(ByteRange::new(2, 2));
        records.memos = Some(memos);

        let mut inbox = Folder::new("Inbox".to_string());
        inbox.items.push(ByteRange::new(4, 1));
        let mut folders = FolderList::new();
        folders.push(inbox.clone());
        folders.push(Folder::new("Sent".to_string()));
        records.messages = Some(folders.clone());
        records.mmses = Some(folders);

        // empty calendar: 0, memos: 2, message folders: 2, MMS items: 1
        assert_eq!(planned_files(&records), 5);
    }
}
