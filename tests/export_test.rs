//! Integration tests for exporting decoded backups to files.

mod common;

use std::fs;

use common::*;
use tempfile::TempDir;

use nbu::backup::container::Container;
use nbu::backup::export::{export_all, export_all_with_progress, planned_files};
use nbu::NbuError;

fn s(v: &str) -> String {
    v.to_string()
}

fn full_backup() -> Vec<u8> {
    BackupBuilder::new()
        .section(
            CALENDAR,
            vcard_section(vec![
                b"BEGIN:VCALENDAR\r\n".to_vec(),
                b"END:VCALENDAR\r\n".to_vec(),
            ]),
        )
        .section(CONTACTS, vcard_section(vec![b"BEGIN:VCARD\r\nEND:VCARD\r\n".to_vec()]))
        .section(MEMOS, memo_section(vec![s("first memo"), s("zweite Notiz ä")]))
        .section(
            MESSAGES,
            folder_section(
                vec![
                    (
                        s("Inbox"),
                        FolderBody::Messages(vec![utf16_bytes("BEGIN:VMSG\r\n"), utf16_bytes("END:VMSG\r\n")]),
                    ),
                    (s("Sent"), FolderBody::Messages(Vec::new())),
                ],
                true,
            ),
        )
        .section(
            MMS,
            folder_section(
                vec![(
                    s("Inbox"),
                    FolderBody::Mms(vec![(vec![s("+15550100")], vec![0x8C, 0x80, 0x98])]),
                )],
                false,
            ),
        )
        .build()
}

#[test]
fn test_export_writes_every_category() {
    let out = TempDir::new().unwrap();
    let dir = out.path().join("export");
    let mut backup = Container::from_bytes(full_backup()).unwrap();

    let report = export_all(&mut backup, &dir).unwrap();
    assert!(report.is_complete(), "{:?}", report.failures);

    assert_eq!(
        fs::read(dir.join("calendar.ics")).unwrap(),
        b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n"
    );
    assert_eq!(
        fs::read(dir.join("contacts.vcf")).unwrap(),
        b"BEGIN:VCARD\r\nEND:VCARD\r\n"
    );
    assert_eq!(
        fs::read_to_string(dir.join("memos/memo-1.txt")).unwrap(),
        "first memo"
    );
    assert_eq!(
        fs::read_to_string(dir.join("memos/memo-2.txt")).unwrap(),
        "zweite Notiz ä"
    );
    assert_eq!(
        fs::read_to_string(dir.join("messages/Inbox.vmg")).unwrap(),
        "BEGIN:VMSG\r\nEND:VMSG\r\n"
    );
    assert_eq!(fs::read(dir.join("messages/Sent.vmg")).unwrap(), b"");
    assert_eq!(
        fs::read(dir.join("mms/Inbox/mms-1.bin")).unwrap(),
        vec![0x8C, 0x80, 0x98]
    );

    assert_eq!(report.written.len(), 7);
    assert_eq!(planned_files(backup.records()), 7);
}

#[test]
fn test_export_skips_absent_and_empty_categories() {
    let out = TempDir::new().unwrap();
    let bytes = BackupBuilder::new()
        .section(CALENDAR, vcard_section(Vec::new()))
        .section(MEMOS, memo_section(vec![s("only memo")]))
        .build();
    let mut backup = Container::from_bytes(bytes).unwrap();

    let report = export_all(&mut backup, out.path()).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.written, vec![out.path().join("memos").join("memo-1.txt")]);
    assert!(!out.path().join("calendar.ics").exists());
    assert!(!out.path().join("contacts.vcf").exists());
    assert!(!out.path().join("messages").exists());
}

#[test]
fn test_export_never_overwrites() {
    let out = TempDir::new().unwrap();
    fs::write(out.path().join("calendar.ics"), b"keep me").unwrap();

    let mut backup = Container::from_bytes(full_backup()).unwrap();
    let report = export_all(&mut backup, out.path()).unwrap();

    assert_eq!(fs::read(out.path().join("calendar.ics")).unwrap(), b"keep me");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, out.path().join("calendar.ics"));
    assert!(matches!(report.failures[0].error, NbuError::Io(_)));
    // Everything else was still exported.
    assert_eq!(report.written.len(), 6);
    assert!(out.path().join("contacts.vcf").exists());
}

#[test]
fn test_export_twice_fails_every_file() {
    let out = TempDir::new().unwrap();
    let mut backup = Container::from_bytes(full_backup()).unwrap();

    let first = export_all(&mut backup, out.path()).unwrap();
    assert!(first.is_complete());
    let second = export_all(&mut backup, out.path()).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.failures.len(), first.written.len());
}

#[test]
fn test_invalid_folder_names_are_rejected() {
    let out = TempDir::new().unwrap();
    let bytes = BackupBuilder::new()
        .section(
            MESSAGES,
            folder_section(
                vec![
                    (s(".."), FolderBody::Messages(vec![utf16_bytes("escape")])),
                    (s("a/b"), FolderBody::Messages(vec![utf16_bytes("nested")])),
                    (s(""), FolderBody::Messages(Vec::new())),
                    (s("Inbox"), FolderBody::Messages(vec![utf16_bytes("ok")])),
                ],
                false,
            ),
        )
        .build();
    let mut backup = Container::from_bytes(bytes).unwrap();

    let report = export_all(&mut backup, out.path()).unwrap();
    assert_eq!(report.failures.len(), 3);
    assert!(report
        .failures
        .iter()
        .all(|f| matches!(f.error, NbuError::InvalidRecord(_))));
    assert_eq!(report.written, vec![out.path().join("messages").join("Inbox.vmg")]);
    assert!(!out.path().join("escape").exists());
    assert!(!out.path().join("..").join("escape.vmg").exists());
}

#[test]
fn test_odd_length_message_fails_its_folder_only() {
    let out = TempDir::new().unwrap();
    let bytes = BackupBuilder::new()
        .section(
            MESSAGES,
            folder_section(
                vec![
                    (s("Broken"), FolderBody::Messages(vec![vec![0x41, 0x00, 0x42]])),
                    (s("Inbox"), FolderBody::Messages(vec![utf16_bytes("fine")])),
                ],
                false,
            ),
        )
        .build();
    let mut backup = Container::from_bytes(bytes).unwrap();

    let report = export_all(&mut backup, out.path()).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].error, NbuError::InvalidRecord(_)));
    assert_eq!(
        fs::read_to_string(out.path().join("messages/Inbox.vmg")).unwrap(),
        "fine"
    );
}

#[test]
fn test_progress_called_once_per_planned_file() {
    let out = TempDir::new().unwrap();
    let mut backup = Container::from_bytes(full_backup()).unwrap();
    let planned = planned_files(backup.records());

    let mut calls = 0u64;
    export_all_with_progress(&mut backup, out.path(), |_| calls += 1).unwrap();
    assert_eq!(calls, planned);
}

#[test]
fn test_output_dir_that_is_a_file_fails() {
    let out = TempDir::new().unwrap();
    let path = out.path().join("not-a-dir");
    fs::write(&path, b"x").unwrap();

    let mut backup = Container::from_bytes(full_backup()).unwrap();
    assert!(matches!(export_all(&mut backup, &path), Err(NbuError::Io(_))));
}
