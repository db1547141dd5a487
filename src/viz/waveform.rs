//! Peak scope for recent output

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Widget},
};

/// Per-column peak level of the output, drawn symmetrically around the
/// centre line
pub struct Waveform<'a> {
    samples: &'a [f32],
    style: Style,
    block: Option<Block<'a>>,
}

impl<'a> Waveform<'a> {
    pub fn new(samples: &'a [f32]) -> Self {
        Self {
            samples,
            style: Style::default(),
            block: None,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Peak magnitude for each of `columns` equal slices of the samples
    pub fn peaks(&self, columns: usize) -> Vec<f32> {
        if columns == 0 || self.samples.is_empty() {
            return vec![0.0; columns];
        }
        let len = self.samples.len();
        (0..columns)
            .map(|col| {
                let start = col * len / columns;
                let end = ((col + 1) * len / columns).max(start + 1).min(len);
                self.samples[start.min(len - 1)..end]
                    .iter()
                    .fold(0.0f32, |peak, s| peak.max(s.abs()))
                    .min(1.0)
            })
            .collect()
    }

    fn render_scope(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let centre = area.y + area.height / 2;
        let half = (area.height / 2) as f32;

        for (i, peak) in self.peaks(area.width as usize).into_iter().enumerate() {
            let x = area.x + i as u16;
            let reach = (peak * half).round() as u16;
            if reach == 0 {
                buf.set_string(x, centre, "─", Style::default());
                continue;
            }
            let top = centre.saturating_sub(reach).max(area.y);
            let bottom = (centre + reach).min(area.y + area.height - 1);
            for y in top..=bottom {
                buf.set_string(x, y, "│", self.style);
            }
        }
    }
}

impl Widget for Waveform<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        self.render_scope(inner_area, buf);
    }
}
