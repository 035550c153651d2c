use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub progress: Rect,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .split(area);

        Self {
            header: vertical[0],
            main: vertical[1],
            progress: vertical[2],
            footer: vertical[3],
        }
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

/// Popup rectangle of a fixed size, centered and shrunk to fit `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let target_w = width.min(area.width);
    let target_h = height.min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}
