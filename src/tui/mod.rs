// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal browser.
//!
//! Hosts the tree panel, the detail pane, the context menu and the modal dialog
//! (ratatui + crossterm). Keys become dispatcher effects that a [`Browser`] runs in the
//! background; their outcomes come back as [`ClientEvent`]s drained between key polls.

use std::{
    error::Error,
    io,
    sync::mpsc::Receiver,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{debug, info};

use crate::client::{
    tree_param, ActionDispatcher, Browser, ClientEvent, Dispatch, DispatchContext, Effect,
    ExpansionStore, MemorySessionStorage, MenuEntry, ModalFormController, PanelLayout,
    PanelVisibilityController, TreeView, VisibleRow,
};
use crate::model::{ElementId, NodeIcon, ParentLink, TreeNode};
use crate::protocol::{HttpMethod, MessageLevel, Notice, PageSnapshot, TreeAction};
use crate::query::tree_location;

const FOCUS_COLOR: Color = Color::LightGreen;
const DETAIL_LABEL_COLOR: Color = Color::DarkGray;
const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const BANNER_COLOR: Color = Color::Yellow;
const FOOTER_BRAND: &str = "cursus";
const MAX_NOTICE_LINES: usize = 3;
const TOAST_TTL: Duration = Duration::from_secs(3);

/// Everything the terminal browser needs to talk to one management server.
pub struct BrowserSession {
    pub browser: Box<dyn Browser + Send>,
    pub events: Receiver<ClientEvent>,
    pub store: Box<dyn ExpansionStore + Send>,
    pub root_id: ElementId,
    pub management_path: String,
}

/// Runs the interactive terminal browser until the user quits.
pub fn run(session: BrowserSession) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(session);
    app.start();

    while !app.should_quit {
        app.drain_events();
        app.expire_toast();
        terminal.draw(|frame| draw(frame, &mut app))?;

        if let Some(text) = app.pending_clipboard.take() {
            match copy_to_clipboard(&text) {
                Ok(backend) => app.set_toast(format!("Copied {text} ({backend})")),
                Err(err) => app.set_toast(format!("Clipboard error: {err}")),
            }
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }
    }

    info!("terminal browser closed");
    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.size();
    let banner_height = u16::from(app.dispatcher.pending_move().is_some());
    let notice_height = app.notices.len().min(MAX_NOTICE_LINES) as u16;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(notice_height),
            Constraint::Length(1),
        ])
        .split(area);
    let (banner_area, main_area, notice_area, footer_area) = (rows[0], rows[1], rows[2], rows[3]);

    if let Some(token) = app.dispatcher.pending_move() {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled("Moving ", Style::default().fg(BANNER_COLOR)),
            Span::styled(
                token.label.clone(),
                Style::default().fg(BANNER_COLOR).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                ": open the new parent and choose Attach",
                Style::default().fg(BANNER_COLOR),
            ),
        ]));
        frame.render_widget(banner, banner_area);
    }

    let (tree_area, detail_area) = split_panels(main_area, app.panel.attributes());
    if let Some(tree_area) = tree_area {
        render_tree(frame, app, tree_area);
    }
    render_detail(frame, app, detail_area);

    if notice_height > 0 {
        let lines = app
            .notices
            .iter()
            .rev()
            .take(MAX_NOTICE_LINES)
            .rev()
            .map(notice_line)
            .collect::<Vec<_>>();
        frame.render_widget(Paragraph::new(lines), notice_area);
    }

    let footer = match app.search.as_ref() {
        Some(search) => search_footer_line(search),
        None => footer_help_line(app),
    };
    frame.render_widget(Paragraph::new(footer), footer_area);

    if let Some(menu) = app.menu.as_ref() {
        render_menu(frame, menu, main_area);
    }
    if app.modal.is_open() {
        render_modal(frame, &app.modal, main_area);
    }
}

fn render_tree(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let rows = app.tree.visible_rows();
    app.clamp_cursor(rows.len());

    let items = rows.iter().map(tree_row_item).collect::<Vec<_>>();
    let title = if app.tree.is_ready() { " Tree " } else { " Tree (loading) " };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(FOCUS_COLOR)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD));

    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(app.cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(page) = app.page.as_ref() else {
        let waiting = Paragraph::new(app.loading.as_deref().map_or_else(
            || "No page loaded".to_owned(),
            |location| format!("Loading {location} ..."),
        ))
        .block(Block::default().borders(Borders::ALL).title(" Cursus "));
        frame.render_widget(waiting, area);
        return;
    };

    let mut lines = Vec::new();
    if let Some(focus) = page.focus.as_ref() {
        lines.push(detail_line("Acronym", &focus.acronym));
        lines.push(detail_line("Title", &focus.title));
        lines.push(detail_line("Type", &focus.kind_label));
        if let Some(credits) = focus.credits {
            lines.push(detail_line("Credits", &credits.to_string()));
        }
        lines.push(detail_line("Children", &focus.child_count.to_string()));
        lines.push(detail_line("Parent link", &focus.parent_link_id));
    }
    lines.push(Line::default());
    lines.push(detail_line("Location", &page.location));

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", page.title)));
    frame.render_widget(detail, area);
}

fn render_menu(frame: &mut Frame<'_>, menu: &ContextMenu, main_area: Rect) {
    let separators = menu.entries.iter().filter(|e| e.separator_before).count();
    let height = (menu.entries.len() + separators + 2) as u16;
    let area = centered_box(28, height, main_area);

    let mut lines = Vec::new();
    for (idx, entry) in menu.entries.iter().enumerate() {
        if entry.separator_before && idx > 0 {
            lines.push(Line::styled("─".repeat(26), Style::default().fg(DETAIL_LABEL_COLOR)));
        }
        let mut style =
            if entry.enabled { Style::default() } else { Style::default().fg(Color::DarkGray) };
        if idx == menu.cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::styled(format!(" {}", entry.label), style));
    }

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", menu.label))),
        area,
    );
}

fn render_modal(frame: &mut Frame<'_>, modal: &ModalFormController, main_area: Rect) {
    let Some(fragment) = modal.fragment() else {
        return;
    };
    let state = modal.state();
    let area = centered_rect(60, 50, main_area);

    let mut lines = fragment.body.iter().map(|line| Line::raw(line.clone())).collect::<Vec<_>>();
    if !state.errors.is_empty() {
        lines.push(Line::default());
        for error in &state.errors {
            lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
        }
    }
    lines.push(Line::default());
    if state.in_flight {
        lines.push(Line::styled("Submitting ...", Style::default().fg(FOOTER_LABEL_COLOR)));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Enter", help_key_style()),
            Span::raw(format!(" {}   ", fragment.submit_label)),
            Span::styled("Esc", help_key_style()),
            Span::raw(" Cancel"),
        ]));
    }

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", fragment.title))),
        area,
    );
}

include!("chrome.rs");

struct ContextMenu {
    node_id: String,
    label: String,
    entries: Vec<MenuEntry>,
    cursor: usize,
}

#[derive(Default)]
struct SearchState {
    query: String,
    results: Vec<String>,
}

struct Toast {
    message: String,
    expires_at: Instant,
}

struct App {
    browser: Box<dyn Browser + Send>,
    events: Receiver<ClientEvent>,
    store: Box<dyn ExpansionStore + Send>,
    root_id: ElementId,
    management_path: String,
    panel: PanelVisibilityController,
    tree: TreeView,
    dispatcher: ActionDispatcher,
    modal: ModalFormController,
    /// A detach or move dialog was requested and has not arrived yet.
    modal_requested: bool,
    page: Option<PageSnapshot>,
    cursor: usize,
    menu: Option<ContextMenu>,
    search: Option<SearchState>,
    notices: Vec<Notice>,
    toast: Option<Toast>,
    loading: Option<String>,
    pending_clipboard: Option<String>,
    should_quit: bool,
}

impl App {
    fn new(session: BrowserSession) -> Self {
        let BrowserSession { browser, events, store, root_id, management_path } = session;
        let mut panel = PanelVisibilityController::new(MemorySessionStorage::default());
        panel.apply();
        Self {
            browser,
            events,
            store,
            root_id,
            management_path,
            panel,
            tree: TreeView::new(),
            dispatcher: ActionDispatcher::new(),
            modal: ModalFormController::new(),
            modal_requested: false,
            page: None,
            cursor: 0,
            menu: None,
            search: None,
            notices: Vec::new(),
            toast: None,
            loading: None,
            pending_clipboard: None,
            should_quit: false,
        }
    }

    fn start(&mut self) {
        let location = tree_location(&self.root_id, &self.root_id, &ParentLink::Root);
        self.navigate(HttpMethod::Get, self.panel.link(&location));
    }

    fn navigate(&mut self, method: HttpMethod, location: String) {
        debug!(method = %method, location = %location, "navigate");
        self.browser.navigate(method, &location);
        self.loading = Some(location);
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::PageLoaded(page) => self.show_page(page),
            ClientEvent::NavigationFailed { url, message } => {
                self.loading = None;
                if std::mem::take(&mut self.modal_requested) {
                    self.dispatcher.modal_closed();
                }
                debug!(url = %url, "navigation failed, keeping the current page");
                self.set_toast(format!("Could not load page: {message}"));
            }
            ClientEvent::FragmentLoaded(fragment) => {
                self.modal_requested = false;
                self.modal.open(fragment);
            }
            ClientEvent::FormInvalid(fragment) => self.modal.rerender(fragment),
            ClientEvent::FormCompleted { location } => {
                self.modal.complete();
                self.dispatcher.modal_closed();
                self.navigate(HttpMethod::Get, location);
            }
            ClientEvent::FormFailed { message } => self.modal.submission_failed(message),
            ClientEvent::Notice(notice) => self.notices.push(notice),
        }
    }

    fn show_page(&mut self, page: PageSnapshot) {
        self.loading = None;
        self.menu = None;
        self.search = None;
        if let Ok(root_id) = ElementId::new(page.root_id.as_str()) {
            self.root_id = root_id;
        }

        self.panel.apply_query(tree_param(&page.location));
        self.tree.load(page.tree.clone(), &page.location, &*self.store);
        let focused = focused_node_id(&page);
        if let Some(node_id) = focused.as_deref() {
            self.tree.reveal(node_id, &mut *self.store);
        }
        self.tree.mark_ready();

        let rows = self.tree.visible_rows();
        self.cursor = focused
            .and_then(|node_id| rows.iter().position(|row| row.node_id == node_id))
            .unwrap_or(0);
        self.notices = page.messages.clone();
        self.dispatcher.sync_pending_move(page.staged.as_ref());
        let modal_requested = std::mem::take(&mut self.modal_requested);
        match page.form.clone() {
            Some(fragment) => self.modal.open(fragment),
            None if modal_requested => self.dispatcher.modal_closed(),
            None => {}
        }
        self.page = Some(page);
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast =
            Some(Toast { message: message.into(), expires_at: Instant::now() + TOAST_TTL });
    }

    fn expire_toast(&mut self) {
        if self.toast.as_ref().is_some_and(|toast| toast.expires_at <= Instant::now()) {
            self.toast = None;
        }
    }

    fn clamp_cursor(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn selected_row(&self) -> Option<VisibleRow> {
        self.tree.visible_rows().into_iter().nth(self.cursor)
    }

    fn selected_node(&self) -> Option<TreeNode> {
        let row = self.selected_row()?;
        self.tree.node(&row.node_id).cloned()
    }

    fn tree_visible(&self) -> bool {
        self.panel.layout() == PanelLayout::Expanded
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.handle_key_code(key.code) {
            self.should_quit = true;
        }
    }

    /// Returns `true` when the browser should quit.
    fn handle_key_code(&mut self, code: KeyCode) -> bool {
        if self.modal.is_open() {
            self.handle_modal_key(code);
            return false;
        }
        if self.menu.is_some() {
            self.handle_menu_key(code);
            return false;
        }
        if self.search.is_some() {
            self.handle_search_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('t') => {
                self.panel.toggle();
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Esc => self.notices.clear(),
            _ if !self.tree_visible() => {}
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.cursor = self.tree.visible_rows().len().saturating_sub(1)
            }
            KeyCode::Left | KeyCode::Char('h') => self.collapse_or_parent(),
            KeyCode::Right | KeyCode::Char('l') => self.expand_or_child(),
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Enter => self.activate_selected(),
            KeyCode::Char('m') => self.open_menu(),
            KeyCode::Char('/') => self.search = Some(SearchState::default()),
            KeyCode::Char('y') => self.yank_selected_link(),
            _ => {}
        }
        false
    }

    fn handle_modal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter | KeyCode::Char('y') => {
                if let Some(submission) = self.modal.submit() {
                    self.browser.submit_form(submission);
                }
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                self.modal.cancel();
                self.dispatcher.modal_closed();
            }
            _ => {}
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        let Some(menu) = self.menu.as_mut() else {
            return;
        };
        let len = menu.entries.len();
        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('m') => self.menu = None,
            KeyCode::Down | KeyCode::Char('j') => menu.cursor = (menu.cursor + 1) % len.max(1),
            KeyCode::Up | KeyCode::Char('k') => {
                menu.cursor = (menu.cursor + len.max(1) - 1) % len.max(1)
            }
            KeyCode::Enter => self.choose_menu_entry(),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        let Some(search) = self.search.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.search = None,
            KeyCode::Enter => {
                let target = search.results.first().cloned();
                self.search = None;
                match target {
                    Some(node_id) => self.focus_node(&node_id),
                    None => self.set_toast("No match"),
                }
            }
            KeyCode::Backspace => {
                search.query.pop();
                self.refresh_search();
            }
            KeyCode::Char(ch) => {
                search.query.push(ch);
                self.refresh_search();
            }
            _ => {}
        }
    }

    fn refresh_search(&mut self) {
        let candidates = self
            .tree
            .document()
            .map(|document| {
                document
                    .root
                    .walk()
                    .map(|(_, node)| (node.id.clone(), node.text.clone()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        if let Some(search) = self.search.as_mut() {
            search.results = ranked_node_matches(&candidates, &search.query);
        }
    }

    fn focus_node(&mut self, node_id: &str) {
        self.tree.reveal(node_id, &mut *self.store);
        if let Some(idx) = self.tree.visible_rows().iter().position(|row| row.node_id == node_id) {
            self.cursor = idx;
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.tree.visible_rows().len();
        if len == 0 {
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    fn collapse_or_parent(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.expanded && row.has_children {
            self.tree.set_open(&row.node_id, false, &mut *self.store);
            return;
        }
        let rows = self.tree.visible_rows();
        let above = &rows[..self.cursor.min(rows.len())];
        if let Some(parent) = above.iter().rposition(|r| r.depth + 1 == row.depth) {
            self.cursor = parent;
        }
    }

    fn expand_or_child(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.has_children {
            return;
        }
        if row.expanded {
            self.move_cursor(1);
        } else {
            self.tree.set_open(&row.node_id, true, &mut *self.store);
        }
    }

    fn toggle_selected(&mut self) {
        if let Some(row) = self.selected_row() {
            self.tree.toggle(&row.node_id, &mut *self.store);
        }
    }

    fn activate_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        match self.tree.activate(&row.node_id, self.panel.layout()) {
            Some(location) => self.navigate(HttpMethod::Get, location),
            None => self.set_toast("The tree is still loading"),
        }
    }

    fn reload(&mut self) {
        let Some(location) = self.page.as_ref().map(|page| self.panel.link(&page.location)) else {
            self.start();
            return;
        };
        self.navigate(HttpMethod::Get, location);
    }

    fn yank_selected_link(&mut self) {
        match self.selected_node() {
            Some(node) => self.pending_clipboard = Some(self.panel.link(&node.href)),
            None => self.set_toast("No node selected"),
        }
    }

    fn open_menu(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        match self.dispatcher.menu(&node) {
            Ok(entries) => {
                let cursor = entries.iter().position(|entry| entry.enabled).unwrap_or(0);
                self.menu =
                    Some(ContextMenu { node_id: node.id, label: node.text, entries, cursor });
            }
            Err(err) => {
                debug!(error = %err, "context menu unavailable");
                self.set_toast(format!("No actions for this node: {err}"));
            }
        }
    }

    fn choose_menu_entry(&mut self) {
        let Some(menu) = self.menu.take() else {
            return;
        };
        let Some(entry) = menu.entries.get(menu.cursor) else {
            return;
        };
        if !entry.enabled {
            self.set_toast(format!("{} is not available here", entry.label));
            self.menu = Some(menu);
            return;
        }
        self.dispatch(&menu.node_id, entry.action);
    }

    fn dispatch(&mut self, node_id: &str, action: TreeAction) {
        let Some(node) = self.tree.node(node_id).cloned() else {
            return;
        };
        let Some(source) = self.page.as_ref().map(|page| self.panel.link(&page.location)) else {
            return;
        };
        let ctx = DispatchContext {
            root_id: &self.root_id,
            management_path: &self.management_path,
            source: &source,
        };

        match self.dispatcher.dispatch(&ctx, &node, action) {
            Dispatch::Effects(effects) => {
                for effect in effects {
                    match &effect {
                        Effect::Navigate { url, .. } => self.loading = Some(url.clone()),
                        Effect::OpenModal { .. } => self.modal_requested = true,
                        Effect::Stage(_) => {}
                    }
                    self.browser.run(effect);
                }
            }
            Dispatch::Disabled => self.set_toast(format!("{} is not available here", action)),
            Dispatch::Busy => self.set_toast("Finish or cancel the open dialog first"),
            Dispatch::Malformed(err) => self.set_toast(format!("Cannot act on this node: {err}")),
        }
    }
}

/// Node matching the page's focus by explicit identity attributes.
fn focused_node_id(page: &PageSnapshot) -> Option<String> {
    let focus = page.focus.as_ref()?;
    page.tree
        .root
        .walk()
        .map(|(_, node)| node)
        .find(|node| {
            node.attrs.element_id.as_deref() == Some(focus.element_id.as_str())
                && node.attrs.parent_link_id.as_deref().unwrap_or("0") == focus.parent_link_id
        })
        .map(|node| node.id.clone())
}

fn tree_row_item(row: &VisibleRow) -> ListItem<'static> {
    let marker = match (row.has_children, row.expanded) {
        (false, _) => "  ",
        (true, true) => "▾ ",
        (true, false) => "▸ ",
    };
    let icon = match row.icon {
        NodeIcon::Folder => "■ ",
        NodeIcon::Leaf => "· ",
        NodeIcon::LeafWithPrerequisites => "◆ ",
    };
    ListItem::new(Line::raw(format!("{}{marker}{icon}{}", "  ".repeat(row.depth), row.text)))
}

fn notice_line(notice: &Notice) -> Line<'static> {
    let color = match notice.level {
        MessageLevel::Info => Color::Gray,
        MessageLevel::Success => Color::Green,
        MessageLevel::Warning => Color::Yellow,
        MessageLevel::Error => Color::Red,
    };
    Line::styled(notice.message.clone(), Style::default().fg(color))
}

fn detail_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:>12}  "), Style::default().fg(DETAIL_LABEL_COLOR)),
        Span::raw(value.to_owned()),
    ])
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}

fn copy_to_clipboard(text: &str) -> Result<&'static str, String> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(osc52_sequence(text))).map_err(|err| err.to_string())?;
    Ok("osc52")
}

fn osc52_sequence(text: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}

/// Node ids whose label matches `query`, best first.
fn ranked_node_matches(candidates: &[(String, String)], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut scored = candidates
        .iter()
        .filter_map(|(node_id, label)| {
            let haystack = label.to_lowercase();
            fuzzy_score(&needle, &haystack).map(|score| (score, label, node_id))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|(score_a, label_a, _), (score_b, label_b, _)| {
        score_b.cmp(score_a).then_with(|| label_a.cmp(label_b))
    });
    scored.into_iter().map(|(_, _, node_id)| node_id.clone()).collect()
}

fn fuzzy_score(needle: &str, haystack: &str) -> Option<i64> {
    let (first, span) = subsequence_span(needle, haystack)?;
    let ratio = rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars());

    let mut score = (ratio * 1000.0).round() as i64;
    score -= span as i64;
    score -= (first as i64) / 4;
    if haystack.contains(needle) {
        score += 2000;
    }
    Some(score)
}

/// Position of the first matched char and the length of the match window, if every
/// char of `needle` occurs in `haystack` in order.
fn subsequence_span(needle: &str, haystack: &str) -> Option<(usize, usize)> {
    let mut wanted = needle.chars().peekable();
    let mut first = None;
    let mut last = 0;
    for (idx, ch) in haystack.chars().enumerate() {
        if wanted.peek() == Some(&ch) {
            wanted.next();
            first.get_or_insert(idx);
            last = idx;
        }
    }
    if wanted.peek().is_some() {
        return None;
    }
    let first = first?;
    Some((first, last + 1 - first))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::mpsc::{channel, Sender};
    use std::sync::{Arc, Mutex};

    use crossterm::event::KeyCode;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::{draw, App, BrowserSession};
    use crate::client::{
        Browser, ClientEvent, FormSubmission, FormValidationState, MemoryExpansionStore,
        PanelLayout, TreeExpansionState,
    };
    use crate::model::ElementId;
    use crate::protocol::{HttpMethod, Notice, StageRequest};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Stage(StageRequest),
        Navigate(HttpMethod, String),
        OpenFragment(String),
        Submit(FormSubmission),
    }

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl Recorder {
        fn push(&self, call: Call) {
            self.calls.lock().expect("recorder lock").push(call);
        }
    }

    impl Browser for Recorder {
        fn stage(&self, request: StageRequest) {
            self.push(Call::Stage(request));
        }

        fn navigate(&self, method: HttpMethod, location: &str) {
            self.push(Call::Navigate(method, location.to_owned()));
        }

        fn open_fragment(&self, location: &str) {
            self.push(Call::OpenFragment(location.to_owned()));
        }

        fn submit_form(&self, submission: FormSubmission) {
            self.push(Call::Submit(submission));
        }
    }

    pub(crate) struct HeadlessTui {
        app: App,
        events: Sender<ClientEvent>,
        recorder: Recorder,
    }

    impl HeadlessTui {
        pub(crate) fn new(root_id: &str) -> Self {
            let recorder = Recorder::default();
            let (events, receiver) = channel();
            let mut app = App::new(BrowserSession {
                browser: Box::new(recorder.clone()),
                events: receiver,
                store: Box::new(MemoryExpansionStore::default()),
                root_id: ElementId::new(root_id).expect("root id"),
                management_path: "/management/".to_owned(),
            });
            app.start();
            Self { app, events, recorder }
        }

        pub(crate) fn press(&mut self, code: KeyCode) -> bool {
            self.app.handle_key_code(code)
        }

        pub(crate) fn press_all(&mut self, codes: &[KeyCode]) {
            for code in codes {
                self.press(*code);
            }
        }

        pub(crate) fn deliver(&mut self, event: ClientEvent) {
            self.events.send(event).expect("event channel");
            self.app.drain_events();
        }

        pub(crate) fn take_calls(&self) -> Vec<Call> {
            std::mem::take(&mut *self.recorder.calls.lock().expect("recorder lock"))
        }

        pub(crate) fn rows(&self) -> Vec<String> {
            self.app.tree.visible_rows().into_iter().map(|row| row.text).collect()
        }

        pub(crate) fn selected_text(&self) -> Option<String> {
            self.app.selected_row().map(|row| row.text)
        }

        pub(crate) fn menu_labels(&self) -> Option<Vec<(String, bool)>> {
            let menu = self.app.menu.as_ref()?;
            Some(menu.entries.iter().map(|entry| (entry.label.to_owned(), entry.enabled)).collect())
        }

        pub(crate) fn modal_state(&self) -> Option<(String, FormValidationState)> {
            let fragment = self.app.modal.fragment()?;
            Some((fragment.title.clone(), self.app.modal.state().clone()))
        }

        pub(crate) fn pending_move_label(&self) -> Option<String> {
            self.app.dispatcher.pending_move().map(|token| token.label.clone())
        }

        pub(crate) fn is_busy(&self) -> bool {
            self.app.dispatcher.is_busy()
        }

        pub(crate) fn notices(&self) -> &[Notice] {
            &self.app.notices
        }

        pub(crate) fn toast(&self) -> Option<&str> {
            self.app.toast.as_ref().map(|toast| toast.message.as_str())
        }

        pub(crate) fn panel_layout(&self) -> PanelLayout {
            self.app.panel.layout()
        }

        pub(crate) fn expansion(&self) -> &TreeExpansionState {
            self.app.tree.expansion()
        }

        pub(crate) fn search_results(&self) -> Option<Vec<String>> {
            self.app.search.as_ref().map(|search| search.results.clone())
        }

        pub(crate) fn take_clipboard(&mut self) -> Option<String> {
            self.app.pending_clipboard.take()
        }

        pub(crate) fn render(&mut self, width: u16, height: u16) -> String {
            let mut terminal =
                Terminal::new(TestBackend::new(width, height)).expect("test terminal");
            terminal.draw(|frame| draw(frame, &mut self.app)).expect("draw");
            let buffer = terminal.backend().buffer();
            let mut out = String::new();
            for y in 0..buffer.area.height {
                for x in 0..buffer.area.width {
                    out.push_str(buffer.get(x, y).symbol());
                }
                out.push('\n');
            }
            out
        }
    }
}
