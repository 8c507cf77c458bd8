use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};
use ratatui::Terminal;

use crate::controller::{ViewController, ViewState};
use crate::data_uri;
use crate::event_source::EventSource;
use crate::navigation::{ScrollBehavior, ScrollContainer, Viewport};
use crate::page_probe::PageCountProbe;
use crate::slots::SLOT_COUNT;
use crate::ui;
use crate::upload::FileSelection;

/// Slots per grid row
pub const GRID_COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

pub struct App {
    pub controller: ViewController,
    /// Highlighted grid tile
    pub selected_slot: usize,
    /// Path typed into the upload modal
    pub path_input: String,
    /// Scroll state of the viewer's page pane
    pub viewport: Viewport,
    /// Highlighted row in the extraction panel
    pub selected_extraction: usize,
    /// Height of the page pane at the last draw
    pub page_pane_height: u16,
    probe: Box<dyn PageCountProbe>,
}

impl App {
    pub fn new(controller: ViewController, probe: Box<dyn PageCountProbe>, scroll_step: u32) -> Self {
        Self {
            controller,
            selected_slot: 0,
            path_input: String::new(),
            viewport: Viewport::new(scroll_step),
            selected_extraction: 0,
            page_pane_height: 0,
            probe,
        }
    }

    /// Per-frame housekeeping: finished uploads, expired toasts, scroll animation
    pub fn tick(&mut self) {
        if self.controller.poll_uploads() > 0 && self.controller.state() == &ViewState::Idle {
            self.path_input.clear();
        }
        self.controller.notifications_mut().update();
        self.viewport.tick();
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<AppAction> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(*key),
            _ => None,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            return Some(AppAction::Quit);
        }

        // Alerts block everything until acknowledged
        if self.controller.notifications().pending_alert().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.controller.dismiss_alert();
            }
            return None;
        }

        match self.controller.state() {
            ViewState::Idle => self.handle_grid_key(key),
            ViewState::UploadModalOpen { .. } => {
                self.handle_upload_key(key);
                None
            }
            ViewState::ViewerOpen(_) => self.handle_viewer_key(key),
        }
    }

    fn handle_grid_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        let rows = SLOT_COUNT.div_ceil(GRID_COLUMNS);
        let (row, col) = (
            self.selected_slot / GRID_COLUMNS,
            self.selected_slot % GRID_COLUMNS,
        );
        match key.code {
            KeyCode::Char('q') => return Some(AppAction::Quit),
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected_slot = row * GRID_COLUMNS + col.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.selected_slot = row * GRID_COLUMNS + (col + 1).min(GRID_COLUMNS - 1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_slot = row.saturating_sub(1) * GRID_COLUMNS + col;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_slot = (row + 1).min(rows - 1) * GRID_COLUMNS + col;
            }
            KeyCode::Enter => self.open_slot(self.selected_slot),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < SLOT_COUNT {
                    self.selected_slot = index;
                    self.open_slot(index);
                }
            }
            _ => {}
        }
        self.selected_slot = self.selected_slot.min(SLOT_COUNT - 1);
        None
    }

    pub fn open_slot(&mut self, index: usize) {
        match self.controller.select_slot(index) {
            Ok(ViewState::ViewerOpen(session)) => {
                let file_data = session.document.file_data.clone();
                self.viewport.reset();
                self.selected_extraction = 0;
                self.report_page_count(&file_data);
            }
            Ok(_) => self.path_input.clear(),
            Err(e) => warn!("Cannot open slot {index}: {e}"),
        }
    }

    /// Stand-in for the renderer's load callback
    fn report_page_count(&mut self, file_data: &str) {
        match data_uri::decode(file_data) {
            Ok((_, bytes)) => match self.probe.page_count(&bytes) {
                Some(pages) => {
                    self.controller.report_page_count(pages);
                }
                None => info!("Page count not available for this document"),
            },
            Err(e) => warn!("Stored document data is unreadable: {e}"),
        }
    }

    fn handle_upload_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if let Err(e) = self.controller.cancel_upload() {
                    debug!("Cancel ignored: {e}");
                }
                self.path_input.clear();
            }
            KeyCode::Enter => {
                let path = self.path_input.trim();
                if path.is_empty() || self.controller.is_upload_pending() {
                    return;
                }
                let selection = FileSelection::from_path(path);
                if let Err(e) = self.controller.begin_upload(selection) {
                    debug!("Upload not started: {e}");
                }
            }
            KeyCode::Backspace => {
                self.path_input.pop();
            }
            KeyCode::Char(c) => self.path_input.push(c),
            _ => {}
        }
    }

    fn handle_viewer_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        let extraction_count = self
            .controller
            .session()
            .map(|s| s.extractions.len())
            .unwrap_or(0);
        let page_height = self.controller.navigator().page_height();
        match key.code {
            KeyCode::Char('q') => return Some(AppAction::Quit),
            KeyCode::Esc | KeyCode::Char('x') => {
                let _ = self.controller.close_viewer();
            }
            KeyCode::Char('j') => self.scroll_pages(1),
            KeyCode::Char('k') => self.scroll_pages(-1),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_pages(i64::from(page_height)),
            KeyCode::PageUp => self.scroll_pages(-i64::from(page_height)),
            KeyCode::Char('g') => self.viewport.scroll_to(0, ScrollBehavior::Instant),
            KeyCode::Char('G') => {
                let max = self.max_scroll_offset();
                self.viewport.scroll_to(max, ScrollBehavior::Instant);
            }
            KeyCode::Down => {
                if extraction_count > 0 {
                    self.selected_extraction = (self.selected_extraction + 1) % extraction_count;
                }
            }
            KeyCode::Up => {
                if extraction_count > 0 {
                    self.selected_extraction =
                        (self.selected_extraction + extraction_count - 1) % extraction_count;
                }
            }
            KeyCode::Enter => self.go_to_extraction(self.selected_extraction),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < extraction_count {
                    self.selected_extraction = index;
                    self.go_to_extraction(index);
                }
            }
            _ => {}
        }
        None
    }

    pub fn go_to_extraction(&mut self, index: usize) {
        if let Err(e) = self.controller.go_to_extraction(index, &mut self.viewport) {
            warn!("Cannot jump to extraction {index}: {e}");
        }
    }

    fn scroll_pages(&mut self, delta: i64) {
        let max = self.max_scroll_offset();
        self.viewport.scroll_by(delta, max);
    }

    fn max_scroll_offset(&self) -> u32 {
        let content = self.controller.navigator().content_height().unwrap_or(0);
        content.saturating_sub(u32::from(self.page_pane_height))
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    loop {
        app.tick();
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = if app.viewport.is_animating() || app.controller.is_upload_pending() {
            Duration::from_millis(16)
        } else {
            tick_rate
        };
        if !event_source.poll(timeout)? {
            continue;
        }

        let mut should_quit = false;
        let mut events_processed = 0;
        loop {
            let event = event_source.read()?;
            events_processed += 1;
            if app.handle_event(&event) == Some(AppAction::Quit) {
                should_quit = true;
                break;
            }
            if events_processed >= 50 || !event_source.poll(Duration::ZERO)? {
                break;
            }
        }
        if should_quit {
            info!("Quit requested");
            return Ok(());
        }
    }
}
