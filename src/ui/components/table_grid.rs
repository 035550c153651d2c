use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use timestable::engine::grid::{self, Cell};
use timestable::session::table::{QuizState, TimesTable};

use crate::ui::theme::{Theme, ThemeColors};

const AXIS_WIDTH: u16 = 4;
const MIN_CELL_WIDTH: u16 = 4;
const MAX_CELL_WIDTH: u16 = 6;

pub struct TableGrid<'a> {
    table: &'a TimesTable,
    theme: &'a Theme,
}

impl<'a> TableGrid<'a> {
    pub fn new(table: &'a TimesTable, theme: &'a Theme) -> Self {
        Self { table, theme }
    }
}

/// How a single cell should be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellLook {
    Empty,
    Answered,
    Focused,
    Correct,
    Incorrect,
    Missed,
}

fn cell_look(cell: &Cell, focused: bool, state: QuizState) -> CellLook {
    match state {
        QuizState::Answering if focused => CellLook::Focused,
        QuizState::Answering if cell.is_answered() => CellLook::Answered,
        QuizState::Answering => CellLook::Empty,
        QuizState::Validated => match cell.is_correct {
            Some(true) => CellLook::Correct,
            Some(false) => CellLook::Incorrect,
            None => CellLook::Missed,
        },
    }
}

fn look_style(look: CellLook, colors: &ThemeColors) -> Style {
    match look {
        CellLook::Empty => Style::default().fg(colors.cell_empty()),
        CellLook::Answered => Style::default().fg(colors.cell_answer()),
        CellLook::Focused => Style::default()
            .fg(colors.cell_cursor_fg())
            .bg(colors.cell_cursor_bg())
            .add_modifier(Modifier::BOLD),
        CellLook::Correct => Style::default().fg(colors.correct()).bg(colors.correct_bg()),
        CellLook::Incorrect => Style::default()
            .fg(colors.incorrect())
            .bg(colors.incorrect_bg())
            .add_modifier(Modifier::CROSSED_OUT),
        CellLook::Missed => Style::default().fg(colors.muted()),
    }
}

fn cell_text(cell: &Cell, look: CellLook) -> String {
    match (cell.answer, look) {
        (Some(answer), _) => answer.to_string(),
        (None, CellLook::Missed) => "-".to_string(),
        (None, _) => "\u{00b7}".to_string(), // ·
    }
}

/// Range of `count` items to draw in `visible` slots so that `focus` stays
/// on screen. Scrolls only as far as needed.
fn visible_window(focus: Option<usize>, count: usize, visible: usize) -> (usize, usize) {
    let visible = visible.min(count);
    let start = match focus {
        Some(f) if f >= visible => (f + 1 - visible).min(count - visible),
        _ => 0,
    };
    (start, start + visible)
}

fn right_align(text: &str, width: u16) -> String {
    format!("{text:>width$}", width = usize::from(width))
}

impl Widget for TableGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let table = self.table;

        let block = Block::bordered()
            .title(format!(" {} \u{00d7} {} ", table.width(), table.height()))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if table.is_empty() || inner.width <= AXIS_WIDTH || inner.height < 2 {
            return;
        }

        let num_cols = table.width();
        let cell_width = ((inner.width - AXIS_WIDTH) / num_cols as u16)
            .clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH);
        let fit_cols = usize::from((inner.width - AXIS_WIDTH) / cell_width).max(1);
        let fit_rows = usize::from(inner.height - 1);

        let focus = table.focused_cell().map(|i| grid::cell_position(i, num_cols));
        let (col_start, col_end) = visible_window(focus.map(|(_, c)| c), num_cols, fit_cols);
        let (row_start, row_end) =
            visible_window(focus.map(|(r, _)| r), table.height(), fit_rows);

        let axis_style = Style::default()
            .fg(colors.factor())
            .bg(colors.factor_bg())
            .add_modifier(Modifier::BOLD);

        buf.set_string(
            inner.x,
            inner.y,
            right_align("\u{00d7} ", AXIS_WIDTH),
            axis_style,
        );
        for (slot, col_idx) in (col_start..col_end).enumerate() {
            let x = inner.x + AXIS_WIDTH + slot as u16 * cell_width;
            let label = right_align(&table.cols()[col_idx].to_string(), cell_width);
            buf.set_string(x, inner.y, label, axis_style);
        }

        for (line, row_idx) in (row_start..row_end).enumerate() {
            let y = inner.y + 1 + line as u16;
            let label = format!("{} ", right_align(&table.rows()[row_idx].to_string(), AXIS_WIDTH - 1));
            buf.set_string(inner.x, y, label, axis_style);

            for (slot, col_idx) in (col_start..col_end).enumerate() {
                let index = grid::cell_index(row_idx, col_idx, num_cols);
                let Some(cell) = table.cell(index) else {
                    continue;
                };
                let focused = table.focused_cell() == Some(index);
                let look = cell_look(cell, focused, table.state());
                let x = inner.x + AXIS_WIDTH + slot as u16 * cell_width;
                buf.set_string(
                    x,
                    y,
                    right_align(&cell_text(cell, look), cell_width),
                    look_style(look, colors),
                );
            }
        }
    }
}
