use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::game::{GameSession, GameStatus};
use crate::ui::theme::Theme;

/// The playfield: the current word at a height proportional to its fall
/// progress, the ground line at the bottom and feedback at the top.
pub struct FallingWord<'a> {
    pub session: &'a GameSession,
    pub theme: &'a Theme,
}

impl<'a> FallingWord<'a> {
    pub fn new(session: &'a GameSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

/// Row (relative to the top of the field) for a word at `progress` when
/// `rows` rows are available above the ground.
pub fn word_row(progress: f64, rows: u16) -> u16 {
    if rows == 0 {
        return 0;
    }
    let last = rows - 1;
    ((progress.clamp(0.0, 1.0) * last as f64).round() as u16).min(last)
}

impl Widget for FallingWord<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 || inner.width == 0 {
            return;
        }

        let ground_y = inner.y + inner.height - 1;
        let ground = "\u{2594}".repeat(inner.width as usize);
        buf.set_string(inner.x, ground_y, &ground, Style::default().fg(colors.ground()));

        let feedback = match self.session.status() {
            GameStatus::Correct => Some(Line::from(Span::styled(
                format!("Correct! +{}", self.session.rules().points_per_word),
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            ))),
            GameStatus::Wrong => self.session.current_word().map(|word| {
                Line::from(vec![
                    Span::styled("Answer: ", Style::default().fg(colors.error())),
                    Span::styled(
                        word.target.clone(),
                        Style::default()
                            .fg(colors.error())
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            }),
            _ => None,
        };
        if let Some(line) = feedback {
            let row = Rect::new(inner.x, inner.y, inner.width, 1);
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(row, buf);
        }

        let Some(word) = self.session.current_word() else {
            return;
        };

        // Rows between the feedback line and the ground.
        let field_top = inner.y + 1;
        let field_rows = ground_y.saturating_sub(field_top);
        let y = field_top + word_row(self.session.fall_progress(), field_rows);

        let style = match self.session.status() {
            GameStatus::Correct => Style::default().fg(colors.bg()).bg(colors.success()),
            GameStatus::Wrong => Style::default().fg(colors.bg()).bg(colors.error()),
            _ => Style::default().fg(colors.word_fg()).bg(colors.word_bg()),
        }
        .add_modifier(Modifier::BOLD);

        let row = Rect::new(inner.x, y, inner.width, 1);
        Paragraph::new(Line::from(Span::styled(format!(" {} ", word.native), style)))
            .alignment(Alignment::Center)
            .render(row, buf);
    }
}
