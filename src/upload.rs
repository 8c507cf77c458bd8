//! Upload validation and background file reading
//!
//! Reading a selected file into its `data:` URI form happens on a reader
//! thread. Requests and completions travel over flume channels; each request
//! carries a cancel flag the worker checks before and after reading.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use flume::{Receiver, Sender};
use log::{debug, error, info, warn};

use crate::data_uri;

pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Only PDF files are allowed.")]
    InvalidFileType { mime_type: String },
    #[error("an upload is already pending for slot {slot}")]
    AlreadyPending { slot: usize },
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("upload reader has stopped")]
    ReaderStopped,
}

/// A file picked for upload, as a file input would describe it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub path: PathBuf,
    pub name: String,
    pub mime_type: String,
}

impl FileSelection {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Name and MIME type derived from the path
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let mime_type = mime_type_for(&path).to_string();
        Self {
            path,
            name,
            mime_type,
        }
    }

    pub fn validate(&self) -> Result<(), UploadError> {
        if self.mime_type == PDF_MIME {
            Ok(())
        } else {
            Err(UploadError::InvalidFileType {
                mime_type: self.mime_type.clone(),
            })
        }
    }
}

/// MIME type from the file extension. Content is not sniffed.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => PDF_MIME,
        "txt" | "text" => "text/plain",
        "html" | "htm" => "text/html",
        "epub" => "application/epub+zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadId(pub u64);

#[derive(Debug)]
pub enum UploadOutcome {
    /// File content as a `data:` URI
    Completed { file_data: String },
    Failed(UploadError),
    Cancelled,
}

#[derive(Debug)]
pub struct UploadCompletion {
    pub id: UploadId,
    pub slot: usize,
    pub selection: FileSelection,
    pub outcome: UploadOutcome,
}

struct ReadRequest {
    id: UploadId,
    slot: usize,
    selection: FileSelection,
    cancelled: Arc<AtomicBool>,
}

enum ReaderMessage {
    Read(ReadRequest),
    Shutdown,
}

/// Owns the reader thread and the in-flight requests
pub struct UploadReader {
    request_tx: Sender<ReaderMessage>,
    response_rx: Receiver<UploadCompletion>,
    next_id: u64,
    in_flight: HashMap<UploadId, Arc<AtomicBool>>,
    worker: Option<JoinHandle<()>>,
}

impl Default for UploadReader {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadReader {
    pub fn new() -> Self {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();
        let worker = thread::Builder::new()
            .name("upload-reader".to_string())
            .spawn(move || reader_worker(request_rx, response_tx))
            .map_err(|e| error!("Failed to start upload reader: {e}"))
            .ok();
        Self {
            request_tx,
            response_rx,
            next_id: 1,
            in_flight: HashMap::new(),
            worker,
        }
    }

    pub fn submit(&mut self, slot: usize, selection: FileSelection) -> Result<UploadId, UploadError> {
        let id = UploadId(self.next_id);
        self.next_id += 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        debug!("Queueing read of {:?} for slot {slot} as {id:?}", selection.path);
        self.request_tx
            .send(ReaderMessage::Read(ReadRequest {
                id,
                slot,
                selection,
                cancelled: cancelled.clone(),
            }))
            .map_err(|_| UploadError::ReaderStopped)?;
        self.in_flight.insert(id, cancelled);
        Ok(id)
    }

    pub fn cancel(&mut self, id: UploadId) {
        if let Some(flag) = self.in_flight.get(&id) {
            debug!("Cancelling upload {id:?}");
            flag.store(true, Ordering::Relaxed);
        }
    }

    pub fn is_in_flight(&self, id: UploadId) -> bool {
        self.in_flight.contains_key(&id)
    }

    /// Next finished read, if any, without blocking
    pub fn try_recv(&mut self) -> Option<UploadCompletion> {
        let completion = self.response_rx.try_recv().ok()?;
        self.in_flight.remove(&completion.id);
        Some(completion)
    }

    /// Blocks up to `timeout` for the next finished read
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<UploadCompletion> {
        let completion = self.response_rx.recv_timeout(timeout).ok()?;
        self.in_flight.remove(&completion.id);
        Some(completion)
    }
}

impl Drop for UploadReader {
    fn drop(&mut self) {
        for flag in self.in_flight.values() {
            flag.store(true, Ordering::Relaxed);
        }
        let _ = self.request_tx.send(ReaderMessage::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn reader_worker(requests: Receiver<ReaderMessage>, responses: Sender<UploadCompletion>) {
    while let Ok(message) = requests.recv() {
        let request = match message {
            ReaderMessage::Read(request) => request,
            ReaderMessage::Shutdown => break,
        };
        let outcome = read_selection(&request);
        let completion = UploadCompletion {
            id: request.id,
            slot: request.slot,
            selection: request.selection,
            outcome,
        };
        if responses.send(completion).is_err() {
            break;
        }
    }
    debug!("Upload reader stopped");
}

fn read_selection(request: &ReadRequest) -> UploadOutcome {
    if request.cancelled.load(Ordering::Relaxed) {
        return UploadOutcome::Cancelled;
    }
    let path = &request.selection.path;
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(source) => {
            warn!("Failed to read upload {path:?}: {source}");
            return UploadOutcome::Failed(UploadError::Read {
                path: path.clone(),
                source,
            });
        }
    };
    if request.cancelled.load(Ordering::Relaxed) {
        return UploadOutcome::Cancelled;
    }
    info!("Read {} bytes from {path:?}", bytes.len());
    UploadOutcome::Completed {
        file_data: data_uri::encode(&request.selection.mime_type, &bytes),
    }
}
