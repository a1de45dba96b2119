// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Layout, footer and popup helpers used by TUI rendering.
fn split_panels(area: Rect, attributes: crate::client::PanelAttributes) -> (Option<Rect>, Rect) {
    use crate::client::{Display as PanelDisplay, PanelAttributes};

    if attributes.display == PanelDisplay::None || attributes.panel_columns == 0 {
        return (None, area);
    }
    let grid = u32::from(PanelAttributes::GRID_COLUMNS);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(u32::from(attributes.panel_columns), grid),
            Constraint::Ratio(u32::from(attributes.data_columns), grid),
        ])
        .split(area);
    (Some(columns[0]), columns[1])
}

fn footer_help_line(app: &App) -> Line<'static> {
    let mut spans = Vec::new();
    if app.modal.is_open() {
        push_footer_entry(&mut spans, "submit", "Enter");
        push_footer_entry(&mut spans, "cancel", "Esc");
    } else if app.menu.is_some() {
        push_footer_entry(&mut spans, "choose", "Enter");
        push_footer_entry(&mut spans, "close", "Esc");
    } else {
        let tree_visible = app.tree_visible();
        push_footer_entry_maybe_disabled(&mut spans, "move", "j/k", !tree_visible);
        push_footer_entry_maybe_disabled(&mut spans, "fold", "h/l", !tree_visible);
        push_footer_entry_maybe_disabled(&mut spans, "open", "Enter", !tree_visible);
        push_footer_entry_maybe_disabled(&mut spans, "menu", "m", !tree_visible);
        push_footer_entry_maybe_disabled(&mut spans, "find", "/", !tree_visible);
        push_footer_entry(&mut spans, "tree", "t");
        push_footer_entry(&mut spans, "quit", "q");
    }

    if app.loading.is_some() {
        spans.push(Span::styled(" | loading", Style::default().fg(FOOTER_LABEL_COLOR)));
    }
    if let Some(toast) = app.toast.as_ref() {
        spans.push(Span::styled(" | ", Style::default().fg(FOOTER_LABEL_COLOR)));
        spans.push(Span::raw(toast.message.clone()));
    }
    spans.push(Span::styled(format!("  {FOOTER_BRAND}"), Style::default().fg(FOOTER_LABEL_COLOR)));
    Line::from(spans)
}

fn search_footer_line(search: &SearchState) -> Line<'static> {
    let mut spans = vec![
        Span::styled("/", help_key_style()),
        Span::raw(search.query.clone()),
        Span::styled("▏", Style::default().fg(FOOTER_KEY_COLOR)),
    ];
    if !search.query.trim().is_empty() {
        let count = search.results.len();
        let label = if count == 1 { "1 match".to_owned() } else { format!("{count} matches") };
        spans.push(Span::styled(format!("  {label}"), Style::default().fg(FOOTER_LABEL_COLOR)));
    }
    Line::from(spans)
}

fn help_key_style() -> Style {
    Style::default().fg(FOOTER_KEY_COLOR).add_modifier(Modifier::BOLD)
}

fn centered_rect(width_percent: u16, height_percent: u16, area: Rect) -> Rect {
    let vertical_margin = (100u16.saturating_sub(height_percent)) / 2;
    let horizontal_margin = (100u16.saturating_sub(width_percent)) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(vertical_margin),
            Constraint::Percentage(height_percent),
            Constraint::Percentage(vertical_margin),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(horizontal_margin),
            Constraint::Percentage(width_percent),
            Constraint::Percentage(horizontal_margin),
        ])
        .split(vertical[1])[1]
}

/// Fixed-size box centered in `area`, shrunk to fit.
fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn push_footer_entry(spans: &mut Vec<Span<'static>>, label: &str, value: &str) {
    push_footer_entry_maybe_disabled(spans, label, value, false);
}

fn push_footer_entry_maybe_disabled(
    spans: &mut Vec<Span<'static>>,
    label: &str,
    value: &str,
    disabled: bool,
) {
    if !spans.is_empty() {
        spans.push(Span::styled(" | ", Style::default().fg(FOOTER_LABEL_COLOR)));
    }
    spans.push(Span::styled(
        format!("{}:", footer_label_ucfirst(label)),
        Style::default().fg(FOOTER_LABEL_COLOR),
    ));
    let color = if disabled { Color::DarkGray } else { FOOTER_KEY_COLOR };
    spans.push(Span::styled(
        value.to_owned(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));
}

fn footer_label_ucfirst(label: &str) -> String {
    let mut chars = label.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = first.to_uppercase().collect::<String>();
    out.push_str(chars.as_str());
    out
}
