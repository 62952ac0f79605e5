use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
}

/// Home screen: one entry per category plus the custom sets entry.
pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(items: Vec<MenuItem>, theme: &'a Theme) -> Self {
        Self {
            items,
            selected: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    /// Select the item bound to `key`, if any.
    pub fn select_key(&mut self, key: char) -> bool {
        let mut buf = [0u8; 4];
        let key: &str = key.encode_utf8(&mut buf);
        match self.items.iter().position(|item| item.key == key) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "wordfall",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Type the translation before the word lands",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let label_style = Style::default()
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

            let lines = vec![
                Line::from(Span::styled(
                    format!(" {indicator} [{}] {}", item.key, item.label),
                    label_style,
                )),
                Line::from(Span::styled(
                    format!("     {}", item.description),
                    Style::default().fg(colors.text_pending()),
                )),
            ];

            if i < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[i], buf);
            }
        }
    }
}
