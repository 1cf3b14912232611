use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::state::focus::ViewName;
use crate::view::{Screen, View, ViewManager};

use super::layout::{ACCENT_BLUE, ACCENT_GREEN, ACCENT_ORANGE, BG, BORDER_INACTIVE, TEXT_MUTED};

/// Draws every view bottom to top, then places the terminal cursor.
pub fn render(frame: &mut Frame, screen: &Screen) {
    let area = frame.area();
    let current = screen.current_view();

    for view in screen.views() {
        let focused = current == Some(view.name());
        let Some(outer) = clamp(view, area) else {
            continue;
        };
        if view.name().is_popup() {
            frame.render_widget(Clear, outer);
        }

        let inner = if view.frame {
            let border_color = if focused || view.name().is_popup() { ACCENT_BLUE } else { BORDER_INACTIVE };
            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color));
            if !view.title.is_empty() {
                block = block.title(format!(" {} ", view.title));
            }
            let inner = block.inner(outer);
            frame.render_widget(block, outer);
            inner
        } else {
            outer
        };
        if inner.width == 0 || inner.height == 0 {
            continue;
        }

        let (cx, cy) = view.cursor();
        let scroll_y = cy.saturating_sub(usize::from(inner.height) - 1);
        let scroll_x = if view.wrap { 0 } else { cx.saturating_sub(usize::from(inner.width) - 1) };

        let header_end = header_end(view.lines());
        let lines: Vec<Line> = view
            .lines()
            .iter()
            .enumerate()
            .map(|(y, text)| {
                let line = if view.name() == ViewName::Request {
                    request_line(y, text, y < header_end)
                } else {
                    Line::raw(text.as_str())
                };
                if view.highlight && focused && y == cy {
                    line.style(Style::default().fg(BG).bg(ACCENT_GREEN))
                } else {
                    line
                }
            })
            .collect();

        let mut para = Paragraph::new(lines).scroll((scroll_y as u16, scroll_x as u16));
        if view.wrap {
            para = para.wrap(Wrap { trim: false });
        }
        if view.name() == ViewName::Info {
            para = para.style(Style::default().fg(TEXT_MUTED));
        }
        frame.render_widget(para, inner);

        if focused && view.editable && screen.cursor_visible() {
            let x = inner.x + (cx - scroll_x).min(usize::from(inner.width) - 1) as u16;
            let y = inner.y + (cy - scroll_y) as u16;
            frame.set_cursor_position(Position { x, y });
        }
    }
}

/// Outer rect of a framed view, or the text area of a frameless one,
/// cut to what fits on screen.
fn clamp(view: &View, area: Rect) -> Option<Rect> {
    let (x0, y0, x1, y1) = if view.frame {
        (view.x0, view.y0, view.x1, view.y1)
    } else {
        (view.x0 + 1, view.y0 + 1, view.x1 - 1, view.y1 - 1)
    };
    let left = x0.max(i32::from(area.x));
    let top = y0.max(i32::from(area.y));
    let right = x1.min(i32::from(area.right()) - 1);
    let bottom = y1.min(i32::from(area.bottom()) - 1);
    if right < left || bottom < top {
        return None;
    }
    Some(Rect {
        x: left as u16,
        y: top as u16,
        width: (right - left + 1) as u16,
        height: (bottom - top + 1) as u16,
    })
}

/// Index of the blank line that ends the header block of a request dump.
fn header_end(lines: &[String]) -> usize {
    lines
        .iter()
        .skip(1)
        .position(|l| l.is_empty())
        .map_or(lines.len(), |i| i + 1)
}

/// Colours a request dump: the request line, then `Key: value` headers up
/// to the first blank line. The body is left plain.
fn request_line(y: usize, text: &str, in_headers: bool) -> Line<'_> {
    if y == 0 {
        return match text.split_once(' ') {
            Some((method, rest)) => Line::from(vec![
                Span::styled(method, Style::default().fg(ACCENT_GREEN).add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::raw(rest),
            ]),
            None => Line::raw(text),
        };
    }

    match text.split_once(':') {
        Some((key, value)) if in_headers => Line::from(vec![
            Span::styled(key, Style::default().fg(ACCENT_ORANGE)),
            Span::styled(":", Style::default().fg(TEXT_MUTED)),
            Span::raw(value),
        ]),
        _ => Line::raw(text),
    }
}
