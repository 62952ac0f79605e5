use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::SetRow;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

/// Sets of one category with a completion mark and best score per row,
/// above a category-wide progress bar.
pub struct SetList<'a> {
    pub title: &'a str,
    pub rows: &'a [SetRow],
    pub selected: usize,
    pub completed: usize,
    pub theme: &'a Theme,
    pub empty_hint: &'a str,
}

impl<'a> SetList<'a> {
    pub fn new(title: &'a str, rows: &'a [SetRow], selected: usize, theme: &'a Theme) -> Self {
        Self {
            title,
            rows,
            selected,
            completed: rows.iter().filter(|r| r.completed).count(),
            theme,
            empty_hint: "No sets available.",
        }
    }

    pub fn empty_hint(mut self, hint: &'a str) -> Self {
        self.empty_hint = hint;
        self
    }
}

impl Widget for SetList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(inner);

        if self.rows.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                format!("  {}", self.empty_hint),
                Style::default().fg(colors.text_pending()),
            )))
            .render(layout[0], buf);
            return;
        }

        // Keep the selection visible when the list is taller than the area.
        let visible = layout[0].height.max(1) as usize;
        let offset = self.selected.saturating_sub(visible - 1);

        let lines: Vec<Line> = self
            .rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, row)| {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                let mark = if row.completed { "\u{2713}" } else { " " };
                let name_style = Style::default()
                    .fg(if is_selected {
                        colors.accent()
                    } else {
                        colors.fg()
                    })
                    .add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    });
                let best = if row.best_score > 0 {
                    format!("  best {}", row.best_score)
                } else {
                    String::new()
                };
                Line::from(vec![
                    Span::styled(format!(" {indicator} "), name_style),
                    Span::styled(format!("{mark} "), Style::default().fg(colors.success())),
                    Span::styled(row.name.clone(), name_style),
                    Span::styled(
                        format!("  ({} words){best}", row.word_count),
                        Style::default().fg(colors.text_pending()),
                    ),
                ])
            })
            .collect();
        Paragraph::new(lines).render(layout[0], buf);

        let ratio = self.completed as f64 / self.rows.len() as f64;
        ProgressBar::new("Completed", ratio, self.theme)
            .caption(format!("{}/{}", self.completed, self.rows.len()))
            .render(layout[1], buf);
    }
}
