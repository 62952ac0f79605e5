use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::result::SessionSummary;
use crate::ui::theme::Theme;

/// Game over summary.
pub struct Dashboard<'a> {
    pub set_name: &'a str,
    pub summary: &'a SessionSummary,
    pub best_score: Option<u32>,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        set_name: &'a str,
        summary: &'a SessionSummary,
        best_score: Option<u32>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            set_name,
            summary,
            best_score,
            theme,
        }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} complete ", self.set_name))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title = if self.summary.is_perfect() {
            "Perfect run!"
        } else {
            "Game over"
        };
        Paragraph::new(Line::from(Span::styled(
            title,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let score_color = if self.summary.is_perfect() {
            colors.success()
        } else if self.summary.accuracy() >= 50.0 {
            colors.warning()
        } else {
            colors.error()
        };
        let best = match self.best_score {
            Some(best) => format!("  (best {best})"),
            None => String::new(),
        };
        Paragraph::new(Line::from(vec![
            Span::styled("  Score:    ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{} / {}", self.summary.score, self.summary.max_score),
                Style::default()
                    .fg(score_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(best, Style::default().fg(colors.text_pending())),
        ]))
        .render(layout[1], buf);

        let rows = [
            (
                "  Cleared:  ",
                format!("{} of {} words", self.summary.cleared, self.summary.word_count),
                colors.fg(),
            ),
            (
                "  Misses:   ",
                self.summary.wrong_attempts.to_string(),
                if self.summary.wrong_attempts == 0 {
                    colors.success()
                } else {
                    colors.error()
                },
            ),
            (
                "  Timeouts: ",
                self.summary.timeouts.to_string(),
                if self.summary.timeouts == 0 {
                    colors.success()
                } else {
                    colors.error()
                },
            ),
            (
                "  Time:     ",
                format!("{:.1}s", self.summary.elapsed_secs),
                colors.fg(),
            ),
        ];
        for (i, (label, value, color)) in rows.into_iter().enumerate() {
            Paragraph::new(Line::from(vec![
                Span::styled(label, Style::default().fg(colors.fg())),
                Span::styled(value, Style::default().fg(color)),
            ]))
            .render(layout[2 + i], buf);
        }

        Paragraph::new(Line::from(vec![
            Span::styled("  [r/Enter] Restart  ", Style::default().fg(colors.accent())),
            Span::styled("[s/Esc] Sets  ", Style::default().fg(colors.accent())),
            Span::styled("[h] Home  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Quit", Style::default().fg(colors.accent())),
        ]))
        .render(layout[7], buf);
    }
}
