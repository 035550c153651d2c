use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use timestable::session::input::sanitize_digits;
use timestable::store::settings::{MAX_DIMENSION, MIN_DIMENSION, TableSettings};

use crate::ui::theme::Theme;

const FIELD_MAX_CHARS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsField {
    Width,
    Height,
}

/// Width/height editor. Values are kept as typed text and only clamped when
/// submitted.
pub struct SettingsForm {
    pub width: String,
    pub height: String,
    pub selected: SettingsField,
}

impl SettingsForm {
    pub fn new(current: TableSettings) -> Self {
        Self {
            width: current.width.to_string(),
            height: current.height.to_string(),
            selected: SettingsField::Width,
        }
    }

    pub fn toggle_field(&mut self) {
        self.selected = match self.selected {
            SettingsField::Width => SettingsField::Height,
            SettingsField::Height => SettingsField::Width,
        };
    }

    fn field_mut(&mut self) -> &mut String {
        match self.selected {
            SettingsField::Width => &mut self.width,
            SettingsField::Height => &mut self.height,
        }
    }

    pub fn type_text(&mut self, text: &str) {
        let digits = sanitize_digits(text);
        let field = self.field_mut();
        for ch in digits.chars() {
            if field.len() < FIELD_MAX_CHARS {
                field.push(ch);
            }
        }
    }

    pub fn backspace(&mut self) {
        self.field_mut().pop();
    }

    /// Step the selected value by `delta`, staying inside the allowed range.
    pub fn adjust(&mut self, delta: i64) {
        let field = self.field_mut();
        let current: i64 = field.parse().unwrap_or(i64::from(MIN_DIMENSION));
        let next = (current + delta).clamp(i64::from(MIN_DIMENSION), i64::from(MAX_DIMENSION));
        *field = next.to_string();
    }

    /// Raw numbers as typed. An empty field counts as zero and is clamped up
    /// by whoever applies it.
    pub fn values(&self) -> (i64, i64) {
        let parse = |s: &str| s.parse::<i64>().unwrap_or(0);
        (parse(&self.width), parse(&self.height))
    }
}

pub struct SettingsDialog<'a> {
    form: &'a SettingsForm,
    theme: &'a Theme,
}

impl<'a> SettingsDialog<'a> {
    pub fn new(form: &'a SettingsForm, theme: &'a Theme) -> Self {
        Self { form, theme }
    }
}

impl Widget for SettingsDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" Settings ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let fields = [
            (SettingsField::Width, "Width ", &self.form.width),
            (SettingsField::Height, "Height", &self.form.height),
        ];
        for (i, (field, label, value)) in fields.into_iter().enumerate() {
            let is_selected = field == self.form.selected;
            let indicator = if is_selected { ">" } else { " " };
            let value_style = if is_selected {
                Style::default()
                    .fg(colors.cell_cursor_fg())
                    .bg(colors.cell_cursor_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            let line = Line::from(vec![
                Span::styled(
                    format!(" {indicator} {label}  "),
                    Style::default().fg(if is_selected { colors.accent() } else { colors.fg() }),
                ),
                Span::styled(format!("{value:>3}"), value_style),
            ]);
            Paragraph::new(line).render(layout[i + 1], buf);
        }

        let range = format!("   Range {MIN_DIMENSION}-{MAX_DIMENSION}");
        Paragraph::new(Line::from(Span::styled(
            range,
            Style::default().fg(colors.muted()),
        )))
        .render(layout[3], buf);

        let help = Paragraph::new(vec![
            Line::from(Span::styled(
                " [Tab] Field  [+/-] Adjust",
                Style::default().fg(colors.accent()),
            )),
            Line::from(Span::styled(
                " [Enter] Save  [Esc] Cancel",
                Style::default().fg(colors.accent()),
            )),
        ]);
        help.render(layout[5], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_starts_with_current_settings() {
        let form = SettingsForm::new(TableSettings { width: 8, height: 14 });
        assert_eq!(form.values(), (8, 14));
        assert_eq!(form.selected, SettingsField::Width);
    }

    #[test]
    fn test_typing_is_digits_only_and_bounded() {
        let mut form = SettingsForm::new(TableSettings::default());
        form.backspace();
        form.backspace();
        form.type_text("2x");
        form.type_text("05");
        assert_eq!(form.width, "20");
        form.toggle_field();
        form.backspace();
        form.backspace();
        assert_eq!(form.values(), (20, 0));
    }

    #[test]
    fn test_adjust_stays_in_range() {
        let mut form = SettingsForm::new(TableSettings { width: 23, height: 6 });
        form.adjust(5);
        assert_eq!(form.width, "24");
        form.toggle_field();
        form.adjust(-1);
        assert_eq!(form.height, "6");
        form.height.clear();
        form.adjust(1);
        assert_eq!(form.height, "7");
    }
}
