use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Widget},
};

use crate::levels::LevelSet;
use crate::model::candle::Candle;

/// Terminal candlestick chart with horizontal level lines.
pub struct LevelChart<'a> {
    candles: &'a [Candle],
    symbol: &'a str,
    levels: Option<&'a LevelSet>,
    show_fibonacci: bool,
    show_pivot: bool,
}

impl<'a> LevelChart<'a> {
    pub fn new(candles: &'a [Candle], symbol: &'a str) -> Self {
        Self {
            candles,
            symbol,
            levels: None,
            show_fibonacci: true,
            show_pivot: true,
        }
    }

    pub fn levels(mut self, levels: Option<&'a LevelSet>) -> Self {
        self.levels = levels;
        self
    }

    pub fn fibonacci(mut self, show: bool) -> Self {
        self.show_fibonacci = show;
        self
    }

    pub fn pivot(mut self, show: bool) -> Self {
        self.show_pivot = show;
        self
    }

    fn level_lines(&self) -> Vec<(&'static str, f64, Color)> {
        let Some(levels) = self.levels else {
            return Vec::new();
        };
        let mut lines = vec![
            ("S", levels.support, Color::Red),
            ("R", levels.resistance, Color::Green),
        ];
        if self.show_fibonacci {
            // 0.0 and 1.0 coincide with resistance and support.
            lines.push(("F.382", levels.fibonacci[1].price, Color::Blue));
            lines.push(("F.618", levels.fibonacci[2].price, Color::Blue));
        }
        if self.show_pivot {
            lines.push(("P", levels.pivot, Color::Yellow));
        }
        lines
    }
}

/// Map `price` into a row offset from the top of a `height`-row plot.
fn price_to_row(price: f64, min: f64, range: f64, height: usize) -> usize {
    let normalized = ((price - min) / range).clamp(0.0, 1.0);
    let from_bottom = (normalized * (height - 1) as f64).round() as usize;
    height - 1 - from_bottom.min(height - 1)
}

impl Widget for LevelChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.symbol))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.candles.is_empty() || inner.height < 3 || inner.width < 12 {
            return;
        }

        let label_width: u16 = 10;
        let plot_x = inner.x + label_width;
        let chart_width = (inner.width - label_width) as usize;
        let chart_height = inner.height as usize;

        let visible = if self.candles.len() > chart_width {
            &self.candles[self.candles.len() - chart_width..]
        } else {
            self.candles
        };

        let lines = self.level_lines();
        let mut min_price = visible.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let mut max_price = visible
            .iter()
            .map(|c| c.high)
            .fold(f64::NEG_INFINITY, f64::max);
        for (_, price, _) in &lines {
            min_price = min_price.min(*price);
            max_price = max_price.max(*price);
        }
        let range = max_price - min_price;
        let range = if range <= f64::EPSILON { 1.0 } else { range };

        // Level lines first so candles draw over them.
        for (label, price, color) in &lines {
            let y = inner.y + price_to_row(*price, min_price, range, chart_height) as u16;
            for x in plot_x..inner.x + inner.width {
                buf.set_string(x, y, "┄", Style::default().fg(*color));
            }
            buf.set_string(
                inner.x,
                y,
                format!("{:<3}{:>7.1}", label, price),
                Style::default().fg(*color),
            );
        }

        for (i, candle) in visible.iter().enumerate() {
            let x = plot_x + i as u16;
            let color = if candle.is_bullish() {
                Color::Green
            } else {
                Color::Red
            };
            let high_row = price_to_row(candle.high, min_price, range, chart_height);
            let low_row = price_to_row(candle.low, min_price, range, chart_height);
            let open_row = price_to_row(candle.open, min_price, range, chart_height);
            let close_row = price_to_row(candle.close, min_price, range, chart_height);
            let (body_top, body_bottom) = (open_row.min(close_row), open_row.max(close_row));

            for row in high_row..=low_row {
                let glyph = if row >= body_top && row <= body_bottom {
                    "█"
                } else {
                    "│"
                };
                buf.set_string(x, inner.y + row as u16, glyph, Style::default().fg(color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_to_row_maps_extremes_to_edges() {
        assert_eq!(price_to_row(10.0, 10.0, 5.0, 11), 10);
        assert_eq!(price_to_row(15.0, 10.0, 5.0, 11), 0);
        assert_eq!(price_to_row(12.5, 10.0, 5.0, 11), 5);
        // out-of-range prices clamp
        assert_eq!(price_to_row(99.0, 10.0, 5.0, 11), 0);
    }
}
