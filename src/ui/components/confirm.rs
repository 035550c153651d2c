use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;

/// Yes/no prompt drawn over the current screen.
pub struct ConfirmDialog<'a> {
    message: &'a str,
    theme: &'a Theme,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(message: &'a str, theme: &'a Theme) -> Self {
        Self { message, theme }
    }
}

impl Widget for ConfirmDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" Confirm ")
            .border_style(Style::default().fg(colors.warning()))
            .style(Style::default().bg(colors.bg()));

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.message, Style::default().fg(colors.fg()))),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "[y] Yes",
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("   [n] No", Style::default().fg(colors.accent())),
            ]),
        ];

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
