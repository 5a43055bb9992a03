use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Focus, Zone};
use crate::render::{self, Row, RowContent};
use crate::scrollbar;

const EDIT_GLYPH: &str = "✎";
const DELETE_GLYPH: &str = "✕";
const CLEAR_ALL_LABEL: &str = "[✕ clear all]";

/// Cells taken by the leading checkbox ("[ ] ") and the trailing
/// " ✎ ✕ " action buttons.
const CHECKBOX_WIDTH: u16 = 4;
const ACTIONS_WIDTH: u16 = 5;

/// Renders the whole screen from [`App`] state and records the clickable
/// zones for the next round of mouse events.
pub fn draw(frame: &mut Frame, app: &mut App) {
    app.surface.clear();
    let [input_area, body_area, summary_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_input(frame, app, input_area);
    draw_list(frame, app, body_area);
    draw_summary(frame, app, summary_area);
}

fn draw_input(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.focus == Focus::Input && app.edit.is_none();
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("New task");
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(app.input.content()).block(block), area);
    app.surface.register(area, Zone::Input);

    if focused && inner.width > 0 {
        let x = inner.x + cursor_column(app.input.content(), app.input.cursor());
        frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
    }
}

fn draw_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Tasks");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 2 || inner.height == 0 {
        return;
    }

    // The rightmost inner column is the scrollbar track.
    let list_area = Rect {
        width: inner.width - 1,
        ..inner
    };
    let track_area = Rect {
        x: inner.right() - 1,
        y: inner.y,
        width: 1,
        height: inner.height,
    };
    app.surface.list_area = list_area;
    app.surface.track_area = track_area;
    app.clamp_scroll();

    let rows = app.rows();
    let height = list_area.height as usize;
    for (offset, row) in rows.iter().skip(app.scroll).take(height).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + offset as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = app.focus == Focus::List && row.index == app.selected;
        frame.render_widget(Paragraph::new(row_line(row, selected, row_area.width)), row_area);

        app.surface.register(row_area, Zone::ListBody);
        app.surface.register(
            Rect {
                width: CHECKBOX_WIDTH.min(row_area.width),
                height: 1,
                ..row_area
            },
            Zone::Toggle(row.index),
        );
        if row_area.width > CHECKBOX_WIDTH + ACTIONS_WIDTH {
            let edit_cell = Rect {
                x: row_area.right() - 4,
                y: row_area.y,
                width: 1,
                height: 1,
            };
            let delete_cell = Rect {
                x: row_area.right() - 2,
                y: row_area.y,
                width: 1,
                height: 1,
            };
            app.surface.register(edit_cell, Zone::EditRow(row.index));
            app.surface.register(delete_cell, Zone::DeleteRow(row.index));
        }

        if let RowContent::Edit { text, cursor } = &row.content {
            let x = row_area.x + CHECKBOX_WIDTH + cursor_column(text, *cursor);
            frame.set_cursor_position((x.min(row_area.right().saturating_sub(1)), row_area.y));
        }
    }

    draw_track(frame, app, track_area, rows.len(), height);
}

fn draw_track(frame: &mut Frame, app: &mut App, track_area: Rect, total: usize, visible: usize) {
    let Some(thumb) =
        scrollbar::thumb_geometry(total as f64, visible as f64, app.scroll as f64)
    else {
        return;
    };
    let track_height = f64::from(track_area.height);
    let thumb_height = ((thumb.height_pct / 100.0) * track_height)
        .round()
        .max(1.0) as u16;
    let thumb_height = thumb_height.min(track_area.height);
    let thumb_top = (((thumb.top_pct / 100.0) * track_height).round() as u16)
        .min(track_area.height - thumb_height);

    let lines: Vec<Line> = (0..track_area.height)
        .map(|y| {
            if y >= thumb_top && y < thumb_top + thumb_height {
                Line::from(Span::styled("█", Style::default().fg(Color::Cyan)))
            } else {
                Line::from(Span::styled("│", Style::default().fg(Color::DarkGray)))
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), track_area);

    let thumb_area = Rect {
        x: track_area.x,
        y: track_area.y + thumb_top,
        width: 1,
        height: thumb_height,
    };
    app.surface.register(thumb_area, Zone::Thumb);
    app.surface.thumb_height = thumb_height;
}

fn draw_summary(frame: &mut Frame, app: &mut App, area: Rect) {
    frame.render_widget(
        Paragraph::new(app.summary()).style(Style::default().fg(Color::Gray)),
        area,
    );

    let label_width = CLEAR_ALL_LABEL.width() as u16;
    if !app.store.is_empty() && area.width > label_width {
        let label_area = Rect {
            x: area.right() - label_width,
            y: area.y,
            width: label_width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(CLEAR_ALL_LABEL).style(Style::default().fg(Color::Red)),
            label_area,
        );
        app.surface.register(label_area, Zone::DeleteAll);
    }
}

fn row_line(row: &Row, selected: bool, width: u16) -> Line<'static> {
    let checkbox = if row.completed { "[x] " } else { "[ ] " };
    let text_width = width.saturating_sub(CHECKBOX_WIDTH + ACTIONS_WIDTH) as usize;

    let (shown, text_style) = match &row.content {
        RowContent::Text { text, truncate } => {
            let shown = if *truncate {
                render::fit_text(text, text_width)
            } else {
                text.clone()
            };
            let mut style = Style::default();
            if row.completed {
                style = style
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT);
            }
            if row.leaving {
                style = style.fg(Color::DarkGray).add_modifier(Modifier::DIM);
            }
            (shown, style)
        }
        // Clipped like any other row so the action cells stay put; the
        // field itself still holds the full text.
        RowContent::Edit { text, .. } => (
            render::fit_text(text, text_width),
            Style::default().fg(Color::Yellow),
        ),
    };

    let pad = text_width.saturating_sub(shown.width());
    let mut line = Line::from(vec![
        Span::raw(checkbox.to_string()),
        Span::styled(shown, text_style),
        Span::raw(" ".repeat(pad + 1)),
        Span::styled(EDIT_GLYPH, Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::styled(DELETE_GLYPH, Style::default().fg(Color::Red)),
        Span::raw(" "),
    ]);
    if selected {
        line = line.style(Style::default().bg(Color::Rgb(40, 40, 40)));
    }
    line
}

fn cursor_column(text: &str, cursor: usize) -> u16 {
    text.chars()
        .take(cursor)
        .filter_map(UnicodeWidthChar::width)
        .sum::<usize>() as u16
}
