use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use timestable::session::result::QuizResult;

use crate::ui::theme::Theme;

pub struct ResultsDialog<'a> {
    pub result: &'a QuizResult,
    pub theme: &'a Theme,
}

impl<'a> ResultsDialog<'a> {
    pub fn new(result: &'a QuizResult, theme: &'a Theme) -> Self {
        Self { result, theme }
    }
}

impl Widget for ResultsDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" Times Table Results ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            "Results",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let completed = format!("{} / {}", self.result.completed, self.result.total);
        Paragraph::new(Line::from(vec![
            Span::styled("  Completed: ", Style::default().fg(colors.fg())),
            Span::styled(
                completed,
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            ),
        ]))
        .render(layout[1], buf);

        let acc_color = if self.result.correct == self.result.total {
            colors.correct_bg()
        } else if self.result.incorrect() == 0 {
            colors.warning()
        } else {
            colors.incorrect_bg()
        };
        let accurate = format!("{} / {}", self.result.correct, self.result.total);
        let accuracy = format!("  ({:.0}%)", self.result.accuracy());
        Paragraph::new(Line::from(vec![
            Span::styled("  Accurate:  ", Style::default().fg(colors.fg())),
            Span::styled(
                accurate,
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(accuracy, Style::default().fg(colors.muted())),
        ]))
        .render(layout[2], buf);

        let wrong = self.result.incorrect();
        let wrong_text = wrong.to_string();
        Paragraph::new(Line::from(vec![
            Span::styled("  Wrong:     ", Style::default().fg(colors.fg())),
            Span::styled(
                wrong_text,
                Style::default().fg(if wrong == 0 {
                    colors.correct_bg()
                } else {
                    colors.incorrect_bg()
                }),
            ),
        ]))
        .render(layout[3], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  [Enter/Esc] Close  ", Style::default().fg(colors.accent())),
            Span::styled("[r] New table", Style::default().fg(colors.accent())),
        ]))
        .render(layout[5], buf);
    }
}
