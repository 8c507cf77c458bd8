//! Drawing of the slot grid, the upload modal, the viewer and alerts

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::controller::{ViewState, ViewerSession};
use crate::main_app::{App, GRID_COLUMNS};
use crate::notification::{Notification, NotificationLevel};
use crate::slots::{SLOT_COUNT, Slot};
use crate::theme::OCEANIC_NEXT;

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(OCEANIC_NEXT.base_00)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let modal_open = app.controller.state() != &ViewState::Idle;
    draw_grid(f, app, chunks[0], !modal_open);
    draw_status_line(f, app, chunks[1]);

    let mut page_pane_height = None;
    match app.controller.state() {
        ViewState::Idle => {}
        ViewState::UploadModalOpen { slot, pending } => {
            draw_upload_modal(f, app, area, *slot, pending.is_some());
        }
        ViewState::ViewerOpen(session) => {
            page_pane_height = Some(draw_viewer(f, app, area, session));
        }
    }
    if let Some(height) = page_pane_height {
        app.page_pane_height = height;
    }

    if let Some(alert) = app.controller.notifications().pending_alert() {
        draw_alert(f, area, alert);
    }
}

fn draw_grid(f: &mut Frame, app: &App, area: Rect, is_focused: bool) {
    let rows = SLOT_COUNT.div_ceil(GRID_COLUMNS);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    for slot in app.controller.collection().iter() {
        let row = slot.index / GRID_COLUMNS;
        let col = slot.index % GRID_COLUMNS;
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(row_areas[row]);
        draw_slot_tile(f, &slot, cells[col], is_focused && slot.index == app.selected_slot);
    }
}

fn draw_slot_tile(f: &mut Frame, slot: &Slot<'_>, area: Rect, is_selected: bool) {
    let (text_color, border_color) = OCEANIC_NEXT.panel_colors(is_selected);
    let block = Block::default()
        .title(format!(" {} ", slot.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let lines = match slot.document {
        Some(doc) => vec![
            Line::from(vec![
                Span::styled("Uploaded On: ", Style::default().fg(OCEANIC_NEXT.base_03)),
                Span::styled(doc.upload_date.clone(), Style::default().fg(text_color)),
            ]),
            Line::from(vec![
                Span::styled("File Name: ", Style::default().fg(OCEANIC_NEXT.base_03)),
                Span::styled(doc.name.clone(), Style::default().fg(text_color)),
            ]),
        ],
        None => vec![Line::from(Span::styled(
            "Empty. Press Enter to upload",
            Style::default().fg(OCEANIC_NEXT.base_03),
        ))],
    };
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    let toast = app
        .controller
        .notifications()
        .current()
        .filter(|n| !n.is_alert());
    let line = match toast {
        Some(n) => Line::from(Span::styled(
            n.message.clone(),
            Style::default().fg(level_color(n.level)),
        )),
        None => {
            let help = match app.controller.state() {
                ViewState::Idle => "hjkl/arrows: move | Enter or 1-9: open slot | q: quit",
                ViewState::UploadModalOpen { .. } => "type a path | Enter: upload | Esc: cancel",
                ViewState::ViewerOpen(_) => {
                    "j/k: scroll | Up/Down: extraction | Enter or 1-4: go to page | Esc: close"
                }
            };
            Line::from(Span::styled(help, Style::default().fg(OCEANIC_NEXT.base_03)))
        }
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_upload_modal(f: &mut Frame, app: &App, area: Rect, slot: usize, reading: bool) {
    let popup = centered_rect(60, 30, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" Upload Document: Legal Document {} ", slot + 1))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(OCEANIC_NEXT.base_0c))
        .style(Style::default().bg(OCEANIC_NEXT.base_00));

    let status = if reading {
        Span::styled("Reading file...", Style::default().fg(OCEANIC_NEXT.base_0a))
    } else {
        Span::styled(
            "Only PDF files are accepted. Enter: upload | Esc: cancel",
            Style::default().fg(OCEANIC_NEXT.base_03),
        )
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Path: ", Style::default().fg(OCEANIC_NEXT.base_04)),
            Span::styled(
                format!("{}_", app.path_input),
                Style::default().fg(OCEANIC_NEXT.base_07),
            ),
        ]),
        Line::default(),
        Line::from(status),
    ];
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}

/// Returns the height of the page pane
fn draw_viewer(f: &mut Frame, app: &App, area: Rect, session: &ViewerSession) -> u16 {
    let popup = centered_rect(92, 90, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {} ", session.document.name))
        .title(Line::from(" [Esc] close ").alignment(Alignment::Right))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(OCEANIC_NEXT.base_0c))
        .style(Style::default().bg(OCEANIC_NEXT.base_00));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(inner);

    let pages_block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(OCEANIC_NEXT.base_02));
    let pages_area = pages_block.inner(columns[0]);
    f.render_widget(pages_block, columns[0]);
    draw_pages(f, app, pages_area, session.total_pages);

    draw_extractions(f, app, columns[1], session);
    pages_area.height
}

/// Placeholder pages of `page_height` rows each, the last row of a page
/// being its separator
fn draw_pages(f: &mut Frame, app: &App, area: Rect, total_pages: Option<usize>) {
    let Some(total) = total_pages else {
        f.render_widget(
            Paragraph::new("Loading document...")
                .style(Style::default().fg(OCEANIC_NEXT.base_03))
                .alignment(Alignment::Center),
            area,
        );
        return;
    };

    let page_height = app.controller.navigator().page_height().max(1);
    let offset = app.viewport.offset;
    let lines: Vec<Line> = (0..u32::from(area.height))
        .map(|row| {
            let absolute = offset.saturating_add(row);
            let page = (absolute / page_height) as usize + 1;
            let in_page = absolute % page_height;
            if page > total {
                Line::default()
            } else if in_page == 0 {
                Line::from(Span::styled(
                    format!("Page {page} of {total}"),
                    Style::default()
                        .fg(OCEANIC_NEXT.base_0d)
                        .add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center)
            } else if in_page == page_height - 1 {
                Line::from(Span::styled(
                    "─".repeat(usize::from(area.width)),
                    Style::default().fg(OCEANIC_NEXT.base_02),
                ))
            } else {
                Line::from(Span::styled("·", Style::default().fg(OCEANIC_NEXT.base_01)))
                    .alignment(Alignment::Center)
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_extractions(f: &mut Frame, app: &App, area: Rect, session: &ViewerSession) {
    let items: Vec<ListItem> = session
        .extractions
        .iter()
        .map(|e| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} - Page {}", e.label, e.page),
                    Style::default().fg(OCEANIC_NEXT.base_05),
                ),
                Span::styled("  [Go To Page]", Style::default().fg(OCEANIC_NEXT.base_0b)),
            ]))
        })
        .collect();

    let (selection_bg, selection_fg) = OCEANIC_NEXT.selection_colors();
    let list = List::new(items)
        .block(
            Block::default()
                .title(" Mock Extractions ")
                .borders(Borders::NONE),
        )
        .highlight_style(
            Style::default()
                .bg(selection_bg)
                .fg(selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !session.extractions.is_empty() {
        state.select(Some(app.selected_extraction.min(session.extractions.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_alert(f: &mut Frame, area: Rect, alert: &Notification) {
    let popup = centered_rect(50, 20, area);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Alert ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(level_color(alert.level)))
        .style(Style::default().bg(OCEANIC_NEXT.base_00));
    let lines = vec![
        Line::from(Span::styled(
            alert.message.clone(),
            Style::default().fg(OCEANIC_NEXT.base_07),
        )),
        Line::default(),
        Line::from(Span::styled("[Enter] OK", Style::default().fg(OCEANIC_NEXT.base_03))),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}

fn level_color(level: NotificationLevel) -> ratatui::style::Color {
    match level {
        NotificationLevel::Info => OCEANIC_NEXT.base_0b,
        NotificationLevel::Warning => OCEANIC_NEXT.base_0a,
        NotificationLevel::Error => OCEANIC_NEXT.base_08,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
