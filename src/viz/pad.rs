//! Motion pad widget: the indicator dot on a square of tilt space

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Widget},
};

use crate::mapping::{DisplayFrame, IndicatorColor};

const DOT: &str = "●";
const GRID: &str = "·";

pub fn indicator_color(indicator: IndicatorColor) -> Color {
    match indicator {
        IndicatorColor::Active => Color::Rgb(0xff, 0x44, 0x44),
        IndicatorColor::Idle => Color::Rgb(0x4c, 0xaf, 0x50),
    }
}

/// Places the indicator from a display offset in `[0, extent]` on both axes
pub struct MotionPad<'a> {
    frame: Option<&'a DisplayFrame>,
    extent: f64,
    block: Option<Block<'a>>,
}

impl<'a> MotionPad<'a> {
    pub fn new(frame: Option<&'a DisplayFrame>, extent: f64) -> Self {
        Self {
            frame,
            extent,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Cell for an offset; out-of-range offsets stick to the border
    pub fn cell(&self, area: Rect, dx: f64, dy: f64) -> Option<(u16, u16)> {
        if area.width == 0 || area.height == 0 || self.extent <= 0.0 {
            return None;
        }
        let place = |offset: f64, cells: u16| -> u16 {
            let fraction = (offset / self.extent).clamp(0.0, 1.0);
            let fraction = if fraction.is_nan() { 0.5 } else { fraction };
            (fraction * (cells - 1) as f64).round() as u16
        };
        Some((area.x + place(dx, area.width), area.y + place(dy, area.height)))
    }

    fn render_pad(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Centre cross marks the resting position
        let grid_style = Style::default().fg(Color::DarkGray);
        let mid_x = area.x + area.width / 2;
        let mid_y = area.y + area.height / 2;
        for x in area.x..area.x + area.width {
            buf.set_string(x, mid_y, GRID, grid_style);
        }
        for y in area.y..area.y + area.height {
            buf.set_string(mid_x, y, GRID, grid_style);
        }

        if let Some(frame) = self.frame {
            if let Some((x, y)) = self.cell(area, frame.offset.dx, frame.offset.dy) {
                let style = Style::default().fg(indicator_color(frame.indicator));
                buf.set_string(x, y, DOT, style);
            }
        }
    }
}

impl Widget for MotionPad<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        self.render_pad(inner_area, buf);
    }
}
