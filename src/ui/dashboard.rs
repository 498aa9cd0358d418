use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::levels::LevelSet;
use crate::proximity::LevelKind;

use super::{AlertRow, AppState, CycleStatus};

fn fmt_price(v: f64) -> String {
    format!("{:.2}", v)
}

pub struct LevelsPanel<'a> {
    levels: Option<&'a LevelSet>,
    show_fibonacci: bool,
    show_pivot: bool,
}

impl<'a> LevelsPanel<'a> {
    pub fn new(levels: Option<&'a LevelSet>, show_fibonacci: bool, show_pivot: bool) -> Self {
        Self {
            levels,
            show_fibonacci,
            show_pivot,
        }
    }
}

impl Widget for LevelsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Levels ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        let Some(levels) = self.levels else {
            Paragraph::new(Line::from(Span::styled(
                "---",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block)
            .render(area, buf);
            return;
        };

        let row = |label: &str, value: f64, color: Color| {
            Line::from(vec![
                Span::styled(format!("{:<11}", label), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    fmt_price(value),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ])
        };

        let mut lines = vec![
            row("Resistance", levels.resistance, Color::Green),
            row("Support", levels.support, Color::Red),
            row("Last close", levels.last_close, Color::White),
        ];
        if self.show_pivot {
            lines.push(row("Pivot", levels.pivot, Color::Yellow));
        }
        if self.show_fibonacci {
            lines.push(Line::from(""));
            for fib in &levels.fibonacci {
                lines.push(row(&fib.label(), fib.price, Color::Blue));
            }
        }

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct AlertPanel<'a> {
    rows: &'a [AlertRow],
}

impl<'a> AlertPanel<'a> {
    pub fn new(rows: &'a [AlertRow]) -> Self {
        Self { rows }
    }
}

impl Widget for AlertPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Alerts ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner_height = block.inner(area).height as usize;

        let lines: Vec<Line> = self
            .rows
            .iter()
            .rev()
            .take(inner_height)
            .map(|row| {
                let color = match row.kind {
                    LevelKind::Support => Color::Red,
                    LevelKind::Resistance => Color::Green,
                };
                Line::from(Span::styled(row.text.as_str(), Style::default().fg(color)))
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" System Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner_height = block.inner(area).height as usize;

        let start = self.messages.len().saturating_sub(inner_height);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::Gray
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub state: &'a AppState,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let s = self.state;
        let sep = || Span::styled(" | ", Style::default().fg(Color::DarkGray));

        let status = match &s.status {
            CycleStatus::Idle => Span::styled("IDLE", Style::default().fg(Color::DarkGray)),
            CycleStatus::Loading => Span::styled("LOADING", Style::default().fg(Color::Cyan)),
            CycleStatus::Ready => Span::styled("OK", Style::default().fg(Color::Green)),
            CycleStatus::Warning(_) => Span::styled("WARN", Style::default().fg(Color::Yellow)),
            CycleStatus::Failed(_) => Span::styled("ERROR", Style::default().fg(Color::Red)),
        };
        let email = if s.notify_enabled {
            Span::styled("email ON", Style::default().fg(Color::Green))
        } else {
            Span::styled("email OFF", Style::default().fg(Color::DarkGray))
        };
        let refreshed = s
            .last_refresh
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());

        let line = Line::from(vec![
            Span::styled(
                " level-watch ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            sep(),
            Span::styled(s.symbol.as_str(), Style::default().fg(Color::Cyan)),
            sep(),
            Span::styled(s.interval.as_api_str(), Style::default().fg(Color::White)),
            sep(),
            Span::styled(s.range.to_string(), Style::default().fg(Color::White)),
            sep(),
            status,
            sep(),
            Span::styled(
                format!("every {}s, last {}", s.refresh_secs, refreshed),
                Style::default().fg(Color::DarkGray),
            ),
            sep(),
            email,
            sep(),
            Span::styled(
                format!("alerts: {}", s.alert_count),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct SymbolSelectorPopup<'a> {
    items: &'a [String],
    selected: usize,
}

impl<'a> SymbolSelectorPopup<'a> {
    pub fn new(items: &'a [String], selected: usize) -> Self {
        Self { items, selected }
    }
}

impl Widget for SymbolSelectorPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .title(" Symbol ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let visible_rows = block.inner(area).height as usize;

        // Keep the selection on screen.
        let start = self
            .selected
            .saturating_sub(visible_rows.saturating_sub(1));
        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .skip(start)
            .take(visible_rows)
            .map(|(i, item)| {
                if i == self.selected {
                    Line::from(Span::styled(
                        format!("> {}", item),
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("  {}", item),
                        Style::default().fg(Color::White),
                    ))
                }
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
        let text = |t: &'static str| Span::styled(t, Style::default().fg(Color::DarkGray));
        let line = Line::from(vec![
            key(" [Q]"),
            text("uit  "),
            key("[S]"),
            text("ymbol  "),
            key("[I]"),
            text("nterval  "),
            key("[F]"),
            text("ib  "),
            key("[P]"),
            text("ivot  "),
            key("[E]"),
            text("mail  "),
            key("[T]"),
            text("est mail  "),
            key("[R]"),
            text("efresh rate  "),
            key("[U]"),
            text("pdate now  "),
            key("[ ]"),
            text("from  "),
            key("{ }"),
            text("to  "),
            key("[C]"),
            text("lear range"),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
