use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::error::AppError;
use crate::levels::LevelSet;
use crate::model::series::PriceSeries;
use crate::proximity::LevelKind;

use super::{AlertContext, ChartOverlays, ChartRenderer};

const ORANGE: RGBColor = RGBColor(255, 165, 0);

/// Candlestick PNG with level overlays, one file per `(symbol, kind)`.
pub struct PngChartRenderer {
    dir: PathBuf,
    width: u32,
    height: u32,
}

impl PngChartRenderer {
    pub fn new(dir: &Path, width: u32, height: u32) -> Self {
        Self {
            dir: dir.to_path_buf(),
            width,
            height,
        }
    }

    pub fn chart_path(&self, symbol: &str, kind: LevelKind) -> PathBuf {
        self.dir
            .join(format!("{}_{}_alert.png", symbol, kind.as_tag()))
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(
        &self,
        symbol: &str,
        kind: LevelKind,
        ctx: &AlertContext<'_>,
    ) -> Result<PathBuf, AppError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.chart_path(symbol, kind);
        draw_level_chart(
            &path,
            (self.width, self.height),
            symbol,
            ctx.series,
            ctx.levels,
            ctx.overlays,
        )?;
        Ok(path)
    }
}

/// Horizontal lines to overlay: `(label, price, color)`.
pub fn overlay_lines(levels: &LevelSet, overlays: ChartOverlays) -> Vec<(String, f64, RGBColor)> {
    let mut lines = vec![
        ("Support".to_string(), levels.support, RED),
        ("Resistance".to_string(), levels.resistance, GREEN),
    ];
    if overlays.fibonacci {
        lines.extend(levels.fibonacci.iter().map(|f| (f.label(), f.price, BLUE)));
    }
    if overlays.pivot {
        lines.push(("Pivot".to_string(), levels.pivot, ORANGE));
    }
    lines
}

fn draw_level_chart(
    path: &Path,
    size: (u32, u32),
    symbol: &str,
    series: &PriceSeries,
    levels: &LevelSet,
    overlays: ChartOverlays,
) -> Result<(), AppError> {
    let candles = series.candles();
    if candles.is_empty() {
        return Err(AppError::Chart("no candles to draw".to_string()));
    }

    let backend = BitMapBackend::new(path, size);
    let root = backend.into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| AppError::Chart(format!("failed to fill canvas: {}", e)))?;

    let lines = overlay_lines(levels, overlays);
    let (lo, hi) = lines.iter().map(|(_, p, _)| *p).fold(
        (levels.support, levels.resistance),
        |(lo, hi), p| (lo.min(p), hi.max(p)),
    );
    // A flat market still needs a visible y-range.
    let padding = ((hi - lo) * 0.05).max(hi.abs() * 1e-3).max(1e-8);
    let y_range = (lo - padding)..(hi + padding);
    let x_max = candles.len() as f64 - 0.5;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} - Support & Resistance + Fib + Pivot", symbol),
            ("sans-serif", 32.0).into_font(),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..x_max, y_range)
        .map_err(|e| AppError::Chart(format!("failed to build chart: {}", e)))?;

    let x_label = |x: &f64| {
        let idx = x.round();
        if idx < 0.0 {
            return String::new();
        }
        candles
            .get(idx as usize)
            .map(|c| c.date.format("%m-%d %H:%M").to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Price")
        .x_label_formatter(&x_label)
        .draw()
        .map_err(|e| AppError::Chart(format!("failed to draw mesh: {}", e)))?;

    let body_width = ((size.0 as f64 * 0.8) / candles.len() as f64).clamp(1.0, 12.0) as u32;
    chart
        .draw_series(candles.iter().enumerate().map(|(i, c)| {
            CandleStick::new(
                i as f64,
                c.open,
                c.high,
                c.low,
                c.close,
                GREEN.filled(),
                RED.filled(),
                body_width,
            )
        }))
        .map_err(|e| AppError::Chart(format!("failed to draw candles: {}", e)))?;

    for (label, price, color) in lines {
        chart
            .draw_series(LineSeries::new(
                vec![(-0.5, price), (x_max, price)],
                color.stroke_width(2),
            ))
            .map_err(|e| AppError::Chart(format!("failed to draw level: {}", e)))?
            .label(format!("{} {:.2}", label, price))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| AppError::Chart(format!("failed to draw legend: {}", e)))?;

    root.present()
        .map_err(|e| AppError::Chart(format!("failed to write {}: {}", path.display(), e)))?;
    Ok(())
}
