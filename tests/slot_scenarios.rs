use std::fs;
use std::path::Path;
use std::time::Duration;

use pdfslots::controller::{ControllerError, UploadApplied, ViewController, ViewState};
use pdfslots::slots::SLOT_COUNT;
use pdfslots::store::{FileKeyValueStore, MemoryKeyValueStore, SlotPersistence, SlotStore};
use pdfslots::test_utils::test_helpers::pdf_with_pages;
use pdfslots::upload::{FileSelection, UploadError};

const WAIT: Duration = Duration::from_secs(5);

fn write_pdf(dir: &Path, name: &str, pages: usize) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, pdf_with_pages(pages)).unwrap();
    path
}

#[test]
fn upload_into_first_slot_is_persisted() {
    let temp = tempfile::tempdir().unwrap();
    let pdf = write_pdf(temp.path(), "contract.pdf", 3);
    let kv = MemoryKeyValueStore::new();
    let mut controller = ViewController::new(Box::new(SlotStore::new(kv.clone())), 600);

    assert!(controller.collection().iter().all(|slot| slot.is_empty()));
    assert_eq!(controller.collection().len(), SLOT_COUNT);

    controller.select_slot(0).unwrap();
    assert_eq!(
        controller.state(),
        &ViewState::UploadModalOpen {
            slot: 0,
            pending: None
        }
    );

    controller.begin_upload(FileSelection::from_path(&pdf)).unwrap();
    assert!(controller.is_upload_pending());

    let applied = controller.wait_for_upload(WAIT).expect("upload should finish");
    assert_eq!(
        applied,
        UploadApplied::Stored {
            slot: 0,
            persisted: true
        }
    );
    assert_eq!(controller.state(), &ViewState::Idle);

    let slot = controller.collection().get(0).unwrap();
    let document = slot.document.expect("slot 0 should be filled");
    assert_eq!(document.name, "contract.pdf");
    assert!(document.file_data.starts_with("data:application/pdf;base64,"));
    assert!(!document.upload_date.is_empty());

    let reloaded = SlotStore::new(kv).load().expect("state should be stored");
    assert_eq!(&reloaded, controller.collection());
}

#[test]
fn text_file_is_rejected_and_nothing_is_written() {
    let kv = MemoryKeyValueStore::new();
    let mut controller = ViewController::new(Box::new(SlotStore::new(kv.clone())), 600);

    controller.select_slot(2).unwrap();
    let err = controller
        .begin_upload(FileSelection::new("notes.txt", "notes.txt", "text/plain"))
        .unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Upload(UploadError::InvalidFileType { .. })
    ));
    assert!(controller.collection().get(2).unwrap().is_empty());
    assert!(!controller.is_upload_pending());
    assert_eq!(kv.write_count(), 0);
    assert_eq!(kv.raw("documents"), None);
}

#[test]
fn documents_survive_a_restart() {
    let temp = tempfile::tempdir().unwrap();
    let pdf = write_pdf(temp.path(), "lease.pdf", 2);
    let data_dir = temp.path().join("data");

    {
        let store = SlotStore::new(FileKeyValueStore::with_root(&data_dir));
        let mut controller = ViewController::new(Box::new(store), 600);
        controller.select_slot(7).unwrap();
        controller.begin_upload(FileSelection::from_path(&pdf)).unwrap();
        controller.wait_for_upload(WAIT).expect("upload should finish");
    }

    let store = SlotStore::new(FileKeyValueStore::with_root(&data_dir));
    let controller = ViewController::new(Box::new(store), 600);
    let document = controller.collection().get(7).unwrap().document.cloned();
    assert_eq!(document.map(|d| d.name), Some("lease.pdf".to_string()));
    assert_eq!(controller.collection().filled_count(), 1);
}

#[test]
fn cancelled_upload_never_lands() {
    let temp = tempfile::tempdir().unwrap();
    let pdf = write_pdf(temp.path(), "late.pdf", 1);
    let kv = MemoryKeyValueStore::new();
    let mut controller = ViewController::new(Box::new(SlotStore::new(kv.clone())), 600);

    controller.select_slot(1).unwrap();
    controller.begin_upload(FileSelection::from_path(&pdf)).unwrap();
    controller.cancel_upload().unwrap();

    assert_eq!(
        controller.wait_for_upload(WAIT),
        Some(UploadApplied::Discarded)
    );
    assert!(controller.collection().is_empty());
    assert_eq!(kv.write_count(), 0);
}

#[test]
fn page_count_report_rebinds_extractions() {
    let temp = tempfile::tempdir().unwrap();
    let pdf = write_pdf(temp.path(), "brief.pdf", 12);
    let mut controller =
        ViewController::new(Box::new(SlotStore::new(MemoryKeyValueStore::new())), 600);
    controller.select_slot(0).unwrap();
    controller.begin_upload(FileSelection::from_path(&pdf)).unwrap();
    controller.wait_for_upload(WAIT).expect("upload should finish");

    controller.select_slot(0).unwrap();
    assert_eq!(controller.session().unwrap().total_pages, None);

    for _ in 0..50 {
        controller.close_viewer().unwrap();
        controller.select_slot(0).unwrap();
        assert!(controller.report_page_count(12));
        let session = controller.session().unwrap();
        assert_eq!(session.total_pages, Some(12));
        assert!(session.extractions.iter().all(|e| (1..=12).contains(&e.page)));
    }
}
