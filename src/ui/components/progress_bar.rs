use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Single-row gauge with a centered caption, e.g. "3/9" or "42%".
pub struct ProgressBar<'a> {
    pub label: String,
    pub ratio: f64,
    pub caption: Option<String>,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: &str, ratio: f64, theme: &'a Theme) -> Self {
        Self {
            label: label.to_string(),
            ratio: if ratio.is_finite() {
                ratio.clamp(0.0, 1.0)
            } else {
                0.0
            },
            caption: None,
            theme,
        }
    }

    pub fn caption(mut self, caption: String) -> Self {
        self.caption = Some(caption);
        self
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64).round() as u16;
        let caption = self
            .caption
            .unwrap_or_else(|| format!("{:.0}%", self.ratio * 100.0));

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let caption_width = caption.chars().count() as u16;
        let caption_x = inner.x + inner.width.saturating_sub(caption_width) / 2;
        buf.set_string(caption_x, inner.y, &caption, Style::default().fg(colors.fg()));
    }
}
