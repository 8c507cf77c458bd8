pub mod controller;
pub mod data_uri;
pub mod event_source;
pub mod extraction;
pub mod library;
pub mod main_app;
pub mod navigation;
pub mod notification;
pub mod page_probe;
pub mod panic_handler;
pub mod settings;
pub mod slots;
pub mod store;
pub mod theme;
pub mod ui;
pub mod upload;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use controller::{ViewController, ViewState, ViewerSession};
pub use main_app::{App, run_app_with_event_source};
pub use slots::{DocumentRecord, SLOT_COUNT, SlotCollection};
