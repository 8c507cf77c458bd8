//! View controller: the single state machine behind the UI
//!
//! ```text
//! Idle --select empty slot--> UploadModalOpen(slot) --cancel / upload stored--> Idle
//! Idle --select filled slot--> ViewerOpen(session)  --close--> Idle
//! ```
//!
//! The controller owns the slot collection and is the only place it changes.
//! Every assignment is followed by a save; a failed save is reported to the
//! user and the in-memory collection stays authoritative for the session.

use std::time::Duration;

use chrono::{Local, NaiveDate};
use log::{debug, error, info, warn};

use crate::extraction::{self, ExtractionRecord};
use crate::navigation::{PageNavigator, ScrollContainer};
use crate::notification::{NotificationLevel, NotificationManager};
use crate::slots::{DocumentRecord, SlotCollection, SlotError};
use crate::store::SlotPersistence;
use crate::upload::{FileSelection, UploadCompletion, UploadError, UploadId, UploadOutcome, UploadReader};

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("slot {slot} cannot be opened while another view is open")]
    Busy { slot: usize },
    #[error("no upload is in progress")]
    NoUploadModal,
    #[error("no document is open")]
    NoViewer,
    #[error("there is no extraction #{index}")]
    NoSuchExtraction { index: usize },
}

/// Transient state of an open document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerSession {
    pub slot: usize,
    pub document: DocumentRecord,
    /// Set once the renderer reports the page count
    pub total_pages: Option<usize>,
    pub extractions: Vec<ExtractionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    UploadModalOpen {
        slot: usize,
        /// Read in progress for this modal, if any
        pending: Option<UploadId>,
    },
    ViewerOpen(ViewerSession),
}

/// What happened to a finished file read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadApplied {
    /// Slot filled. `persisted` is false when the save was rejected.
    Stored { slot: usize, persisted: bool },
    /// The modal it belonged to is gone or now serves another upload
    Discarded,
    /// Read failed; the modal stays open for another try
    Failed,
}

pub struct ViewController {
    collection: SlotCollection,
    store: Box<dyn SlotPersistence>,
    state: ViewState,
    reader: UploadReader,
    navigator: PageNavigator,
    notifications: NotificationManager,
}

impl ViewController {
    pub fn new(store: Box<dyn SlotPersistence>, page_height: u32) -> Self {
        let collection = SlotCollection::initialize(store.as_ref());
        Self {
            collection,
            store,
            state: ViewState::Idle,
            reader: UploadReader::new(),
            navigator: PageNavigator::new(page_height),
            notifications: NotificationManager::new(),
        }
    }

    pub fn with_navigator(mut self, navigator: PageNavigator) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn collection(&self) -> &SlotCollection {
        &self.collection
    }

    pub fn store(&self) -> &dyn SlotPersistence {
        self.store.as_ref()
    }

    pub fn navigator(&self) -> &PageNavigator {
        &self.navigator
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationManager {
        &mut self.notifications
    }

    pub fn session(&self) -> Option<&ViewerSession> {
        match &self.state {
            ViewState::ViewerOpen(session) => Some(session),
            _ => None,
        }
    }

    /// Open the upload modal for an empty slot or the viewer for a filled one
    pub fn select_slot(&mut self, index: usize) -> Result<&ViewState, ControllerError> {
        let slot = self.collection.get(index)?;
        if self.state != ViewState::Idle {
            return Err(ControllerError::Busy { slot: index });
        }
        self.state = match slot.document {
            None => {
                debug!("Opening upload modal for slot {index}");
                ViewState::UploadModalOpen {
                    slot: index,
                    pending: None,
                }
            }
            Some(document) => {
                info!("Opening {:?} from slot {index}", document.name);
                self.navigator.set_total_pages(None);
                self.navigator.set_measured_heights(Vec::new(), 0);
                ViewState::ViewerOpen(ViewerSession {
                    slot: index,
                    document: document.clone(),
                    total_pages: None,
                    extractions: extraction::generate(None),
                })
            }
        };
        Ok(&self.state)
    }

    /// Close the upload modal, abandoning any read in progress
    pub fn cancel_upload(&mut self) -> Result<(), ControllerError> {
        let ViewState::UploadModalOpen { slot, pending } = self.state else {
            return Err(ControllerError::NoUploadModal);
        };
        if let Some(id) = pending {
            self.reader.cancel(id);
            self.notifications.warn("Upload cancelled");
        }
        debug!("Upload for slot {slot} cancelled");
        self.state = ViewState::Idle;
        Ok(())
    }

    /// Validate the selection and start reading it. A rejected file type
    /// raises an alert and leaves the modal open and the slots untouched.
    pub fn begin_upload(&mut self, selection: FileSelection) -> Result<UploadId, ControllerError> {
        let ViewState::UploadModalOpen { slot, pending } = self.state else {
            return Err(ControllerError::NoUploadModal);
        };
        if pending.is_some() {
            return Err(UploadError::AlreadyPending { slot }.into());
        }
        if let Err(e) = selection.validate() {
            warn!("Rejected upload of {:?} ({}) into slot {slot}", selection.name, selection.mime_type);
            self.notifications.alert(e.to_string(), NotificationLevel::Error);
            return Err(e.into());
        }
        let id = self.reader.submit(slot, selection)?;
        self.state = ViewState::UploadModalOpen {
            slot,
            pending: Some(id),
        };
        Ok(id)
    }

    pub fn is_upload_pending(&self) -> bool {
        matches!(
            self.state,
            ViewState::UploadModalOpen {
                pending: Some(_),
                ..
            }
        )
    }

    /// Apply every read that has finished. Returns how many were handled.
    pub fn poll_uploads(&mut self) -> usize {
        let mut handled = 0;
        while let Some(completion) = self.reader.try_recv() {
            self.apply_upload(completion);
            handled += 1;
        }
        handled
    }

    /// Block up to `timeout` for the next finished read and apply it
    pub fn wait_for_upload(&mut self, timeout: Duration) -> Option<UploadApplied> {
        let completion = self.reader.recv_timeout(timeout)?;
        Some(self.apply_upload(completion))
    }

    pub fn apply_upload(&mut self, completion: UploadCompletion) -> UploadApplied {
        let current = match self.state {
            ViewState::UploadModalOpen {
                slot,
                pending: Some(id),
            } if slot == completion.slot && id == completion.id => slot,
            _ => {
                debug!(
                    "Discarding stale upload {:?} for slot {}",
                    completion.id, completion.slot
                );
                return UploadApplied::Discarded;
            }
        };

        let file_data = match completion.outcome {
            UploadOutcome::Completed { file_data } => file_data,
            UploadOutcome::Cancelled => {
                self.state = ViewState::UploadModalOpen {
                    slot: current,
                    pending: None,
                };
                return UploadApplied::Discarded;
            }
            UploadOutcome::Failed(e) => {
                error!("Upload into slot {current} failed: {e}");
                self.notifications
                    .alert(format!("Could not read file: {e}"), NotificationLevel::Error);
                self.state = ViewState::UploadModalOpen {
                    slot: current,
                    pending: None,
                };
                return UploadApplied::Failed;
            }
        };

        let record = DocumentRecord::new(
            completion.selection.name,
            display_date(Local::now().date_naive()),
            file_data,
        );
        let collection = match self.collection.assign(current, record) {
            Ok(collection) => collection,
            Err(e) => {
                error!("Upload targeted an invalid slot: {e}");
                self.state = ViewState::Idle;
                return UploadApplied::Discarded;
            }
        };
        self.collection = collection;
        let persisted = self.persist();
        info!("Stored document in slot {current}");
        if persisted {
            self.notifications
                .info(format!("Saved to Legal Document {}", current + 1));
        }
        self.state = ViewState::Idle;
        UploadApplied::Stored {
            slot: current,
            persisted,
        }
    }

    fn persist(&mut self) -> bool {
        match self.store.save(&self.collection) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save documents: {e}");
                self.notifications.alert(
                    format!("Could not save documents ({e}). Changes will be lost on restart."),
                    NotificationLevel::Warning,
                );
                false
            }
        }
    }

    /// Renderer callback. Regenerates extractions when the count changes.
    pub fn report_page_count(&mut self, total_pages: usize) -> bool {
        let ViewState::ViewerOpen(session) = &mut self.state else {
            return false;
        };
        let total = Some(total_pages).filter(|&n| n > 0);
        if session.total_pages == total {
            return false;
        }
        debug!("Document in slot {} has {total_pages} pages", session.slot);
        session.total_pages = total;
        session.extractions = extraction::generate(total);
        self.navigator.set_total_pages(total);
        true
    }

    /// Use real per-page heights for navigation instead of the fixed height
    pub fn set_measured_page_heights(&mut self, heights: Vec<u32>, separator_height: u16) {
        self.navigator.set_measured_heights(heights, separator_height);
    }

    pub fn go_to_page(
        &self,
        page: usize,
        container: &mut dyn ScrollContainer,
    ) -> Result<u32, ControllerError> {
        if self.session().is_none() {
            return Err(ControllerError::NoViewer);
        }
        Ok(self.navigator.scroll_to_page(page, container))
    }

    pub fn go_to_extraction(
        &self,
        index: usize,
        container: &mut dyn ScrollContainer,
    ) -> Result<u32, ControllerError> {
        let session = self.session().ok_or(ControllerError::NoViewer)?;
        let record = session
            .extractions
            .get(index)
            .ok_or(ControllerError::NoSuchExtraction { index })?;
        Ok(self.navigator.scroll_to_page(record.page, container))
    }

    pub fn close_viewer(&mut self) -> Result<(), ControllerError> {
        if self.session().is_none() {
            return Err(ControllerError::NoViewer);
        }
        self.state = ViewState::Idle;
        Ok(())
    }

    pub fn dismiss_alert(&mut self) -> bool {
        self.notifications.dismiss_alert()
    }
}

/// Short local date, e.g. `3/14/2024`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Viewport;
    use crate::slots::SLOT_COUNT;
    use crate::store::{MemoryKeyValueStore, SlotStore};
    use crate::upload::PDF_MIME;
    use std::path::PathBuf;

    fn controller() -> (ViewController, MemoryKeyValueStore) {
        let kv = MemoryKeyValueStore::new();
        let controller = ViewController::new(Box::new(SlotStore::new(kv.clone())), 600);
        (controller, kv)
    }

    fn completion(id: UploadId, slot: usize, name: &str) -> UploadCompletion {
        UploadCompletion {
            id,
            slot,
            selection: FileSelection::new(PathBuf::from(name), name, PDF_MIME),
            outcome: UploadOutcome::Completed {
                file_data: "data:application/pdf;base64,AAAA".to_string(),
            },
        }
    }

    fn with_document(slot: usize) -> (ViewController, MemoryKeyValueStore) {
        let (mut c, kv) = controller();
        c.select_slot(slot).unwrap();
        c.state = ViewState::UploadModalOpen {
            slot,
            pending: Some(UploadId(99)),
        };
        c.apply_upload(completion(UploadId(99), slot, "doc.pdf"));
        (c, kv)
    }

    #[test]
    fn display_date_has_no_padding() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(display_date(date), "3/4/2024");
    }

    #[test]
    fn selecting_empty_slot_opens_upload_modal() {
        let (mut c, _) = controller();
        assert_eq!(
            c.select_slot(0).unwrap(),
            &ViewState::UploadModalOpen {
                slot: 0,
                pending: None
            }
        );
        assert!(matches!(c.select_slot(1), Err(ControllerError::Busy { slot: 1 })));
        c.cancel_upload().unwrap();
        assert_eq!(c.state(), &ViewState::Idle);
    }

    #[test]
    fn invalid_slot_index_is_rejected() {
        let (mut c, _) = controller();
        assert!(matches!(
            c.select_slot(SLOT_COUNT),
            Err(ControllerError::Slot(SlotError::InvalidIndex { .. }))
        ));
        assert_eq!(c.state(), &ViewState::Idle);
    }

    #[test]
    fn non_pdf_upload_is_rejected_without_side_effects() {
        let (mut c, kv) = controller();
        c.select_slot(2).unwrap();

        let result = c.begin_upload(FileSelection::new("notes.txt", "notes.txt", "text/plain"));
        assert!(matches!(
            result,
            Err(ControllerError::Upload(UploadError::InvalidFileType { .. }))
        ));
        assert_eq!(
            c.state(),
            &ViewState::UploadModalOpen {
                slot: 2,
                pending: None
            }
        );
        assert!(c.collection().get(2).unwrap().is_empty());
        assert_eq!(kv.write_count(), 0);
        assert_eq!(
            c.notifications().pending_alert().unwrap().message,
            "Only PDF files are allowed."
        );
    }

    #[test]
    fn matching_completion_fills_slot_and_persists() {
        let (mut c, kv) = controller();
        c.select_slot(0).unwrap();
        c.state = ViewState::UploadModalOpen {
            slot: 0,
            pending: Some(UploadId(7)),
        };

        let applied = c.apply_upload(completion(UploadId(7), 0, "contract.pdf"));
        assert_eq!(
            applied,
            UploadApplied::Stored {
                slot: 0,
                persisted: true
            }
        );
        assert_eq!(c.state(), &ViewState::Idle);
        assert_eq!(kv.write_count(), 1);
        let stored = c.store().load().unwrap();
        assert_eq!(stored.get(0).unwrap().document.unwrap().name, "contract.pdf");

        let toast = c.notifications().current().unwrap();
        assert!(!toast.is_alert());
        assert_eq!(toast.message, "Saved to Legal Document 1");
    }

    #[test]
    fn stale_completion_is_discarded() {
        let (mut c, kv) = controller();
        c.select_slot(0).unwrap();
        c.state = ViewState::UploadModalOpen {
            slot: 0,
            pending: Some(UploadId(1)),
        };
        c.cancel_upload().unwrap();
        assert_eq!(
            c.apply_upload(completion(UploadId(1), 0, "late.pdf")),
            UploadApplied::Discarded
        );

        // Reopened for another slot: the old read must not land there either
        c.select_slot(1).unwrap();
        c.state = ViewState::UploadModalOpen {
            slot: 1,
            pending: Some(UploadId(2)),
        };
        assert_eq!(
            c.apply_upload(completion(UploadId(1), 0, "late.pdf")),
            UploadApplied::Discarded
        );
        assert!(c.collection().is_empty());
        assert_eq!(kv.write_count(), 0);
    }

    #[test]
    fn second_upload_while_pending_is_refused() {
        let (mut c, _) = controller();
        c.select_slot(3).unwrap();
        c.state = ViewState::UploadModalOpen {
            slot: 3,
            pending: Some(UploadId(5)),
        };
        assert!(matches!(
            c.begin_upload(FileSelection::from_path("other.pdf")),
            Err(ControllerError::Upload(UploadError::AlreadyPending { slot: 3 }))
        ));
    }

    #[test]
    fn failed_save_keeps_document_in_memory() {
        let kv = MemoryKeyValueStore::with_quota(8);
        let mut c = ViewController::new(Box::new(SlotStore::new(kv.clone())), 600);
        c.select_slot(4).unwrap();
        c.state = ViewState::UploadModalOpen {
            slot: 4,
            pending: Some(UploadId(1)),
        };

        let applied = c.apply_upload(completion(UploadId(1), 4, "big.pdf"));
        assert_eq!(
            applied,
            UploadApplied::Stored {
                slot: 4,
                persisted: false
            }
        );
        assert!(!c.collection().get(4).unwrap().is_empty());
        assert_eq!(c.store().load(), None);
        assert_eq!(
            c.notifications().pending_alert().unwrap().level,
            NotificationLevel::Warning
        );
    }

    #[test]
    fn read_failure_keeps_modal_open() {
        let (mut c, _) = controller();
        c.select_slot(0).unwrap();
        c.state = ViewState::UploadModalOpen {
            slot: 0,
            pending: Some(UploadId(3)),
        };
        let mut failed = completion(UploadId(3), 0, "gone.pdf");
        failed.outcome = UploadOutcome::Failed(UploadError::Read {
            path: PathBuf::from("gone.pdf"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });

        assert_eq!(c.apply_upload(failed), UploadApplied::Failed);
        assert_eq!(
            c.state(),
            &ViewState::UploadModalOpen {
                slot: 0,
                pending: None
            }
        );
        assert!(c.notifications().pending_alert().is_some());
    }

    #[test]
    fn viewer_regenerates_extractions_when_page_count_arrives() {
        let (mut c, _) = with_document(5);
        c.select_slot(5).unwrap();
        let session = c.session().unwrap();
        assert_eq!(session.total_pages, None);
        assert_eq!(session.extractions.len(), extraction::EXTRACTION_COUNT);

        assert!(c.report_page_count(12));
        let session = c.session().unwrap();
        assert_eq!(session.total_pages, Some(12));
        assert!(session.extractions.iter().all(|e| (1..=12).contains(&e.page)));

        assert!(!c.report_page_count(12));
    }

    #[test]
    fn extraction_navigation_scrolls_viewport() {
        let (mut c, _) = with_document(0);
        c.select_slot(0).unwrap();
        c.report_page_count(3);
        let page = c.session().unwrap().extractions[1].page;

        let mut viewport = Viewport::new(1);
        let offset = c.go_to_extraction(1, &mut viewport).unwrap();
        assert_eq!(offset, (page as u32 - 1) * 600);
        assert_eq!(viewport.target(), (offset != 0).then_some(offset));

        assert!(matches!(
            c.go_to_extraction(10, &mut viewport),
            Err(ControllerError::NoSuchExtraction { index: 10 })
        ));
        assert_eq!(c.go_to_page(50, &mut viewport).unwrap(), 1200);
    }

    #[test]
    fn measured_page_heights_drive_navigation_until_reopen() {
        let (mut c, _) = with_document(2);
        c.select_slot(2).unwrap();
        c.report_page_count(3);
        c.set_measured_page_heights(vec![500, 900, 700], 10);

        let mut viewport = Viewport::new(1);
        assert_eq!(c.go_to_page(2, &mut viewport).unwrap(), 510);
        assert_eq!(c.go_to_page(3, &mut viewport).unwrap(), 1420);
        assert_eq!(c.navigator().content_height(), Some(2130));

        c.close_viewer().unwrap();
        c.select_slot(2).unwrap();
        c.report_page_count(3);
        assert_eq!(c.go_to_page(3, &mut viewport).unwrap(), 1200);
    }

    #[test]
    fn closing_viewer_returns_to_idle() {
        let (mut c, _) = with_document(1);
        c.select_slot(1).unwrap();
        c.close_viewer().unwrap();
        assert_eq!(c.state(), &ViewState::Idle);
        assert!(c.session().is_none());
        assert!(matches!(c.close_viewer(), Err(ControllerError::NoViewer)));
    }
}
