pub mod chart;
pub mod dashboard;

use chrono::NaiveDateTime;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use crate::event::AppEvent;
use crate::levels::LevelSet;
use crate::model::candle::Candle;
use crate::model::interval::Interval;
use crate::model::window::DateRange;
use crate::pipeline::{CycleOutcome, CycleReport};
use crate::proximity::LevelKind;

use chart::LevelChart;
use dashboard::{AlertPanel, KeybindBar, LevelsPanel, LogPanel, StatusBar, SymbolSelectorPopup};

const MAX_LOG_MESSAGES: usize = 200;
const MAX_ALERT_ROWS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleStatus {
    Idle,
    Loading,
    Ready,
    Warning(String),
    Failed(String),
}

/// One line of the alert panel.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRow {
    pub kind: LevelKind,
    pub text: String,
}

pub struct AppState {
    pub symbol: String,
    pub interval: Interval,
    pub refresh_secs: u64,
    pub range: DateRange,
    pub notify_enabled: bool,
    pub show_fibonacci: bool,
    pub show_pivot: bool,
    pub candles: Vec<Candle>,
    pub levels: Option<LevelSet>,
    pub status: CycleStatus,
    pub window_fallback: bool,
    pub last_refresh: Option<NaiveDateTime>,
    pub cycle_count: u64,
    pub alert_count: u64,
    pub alert_rows: Vec<AlertRow>,
    pub log_messages: Vec<String>,
    pub symbol_items: Vec<String>,
    pub symbol_selector_open: bool,
    pub symbol_selector_index: usize,
}

impl AppState {
    pub fn new(symbol: &str, interval: Interval, refresh_secs: u64) -> Self {
        Self {
            symbol: symbol.to_string(),
            interval,
            refresh_secs,
            range: DateRange::default(),
            notify_enabled: false,
            show_fibonacci: true,
            show_pivot: true,
            candles: Vec::new(),
            levels: None,
            status: CycleStatus::Idle,
            window_fallback: false,
            last_refresh: None,
            cycle_count: 0,
            alert_count: 0,
            alert_rows: Vec::new(),
            log_messages: Vec::new(),
            symbol_items: Vec::new(),
            symbol_selector_open: false,
            symbol_selector_index: 0,
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    fn push_alert_row(&mut self, row: AlertRow) {
        self.alert_rows.push(row);
        if self.alert_rows.len() > MAX_ALERT_ROWS {
            self.alert_rows.remove(0);
        }
    }

    /// Switch the analysed date range. The view is cleared until the next report.
    pub fn set_range(&mut self, range: DateRange) {
        if range == self.range {
            return;
        }
        self.range = range;
        self.candles.clear();
        self.levels = None;
        self.push_log(format!("Range -> {}", range));
    }

    pub fn open_symbol_selector(&mut self) {
        self.symbol_selector_index = self
            .symbol_items
            .iter()
            .position(|s| s == &self.symbol)
            .unwrap_or(0);
        self.symbol_selector_open = true;
    }

    pub fn move_symbol_selector(&mut self, up: bool) {
        let len = self.symbol_items.len();
        if len == 0 {
            return;
        }
        self.symbol_selector_index = if up {
            (self.symbol_selector_index + len - 1) % len
        } else {
            (self.symbol_selector_index + 1) % len
        };
    }

    /// Close the selector and return the chosen symbol if it changed.
    pub fn confirm_symbol_selection(&mut self) -> Option<String> {
        self.symbol_selector_open = false;
        let chosen = self.symbol_items.get(self.symbol_selector_index)?.clone();
        if chosen == self.symbol {
            return None;
        }
        self.symbol = chosen.clone();
        self.candles.clear();
        self.levels = None;
        Some(chosen)
    }

    fn apply_report(&mut self, report: CycleReport) {
        // Reports for a symbol/interval the operator already left are stale.
        if report.symbol != self.symbol || report.interval != self.interval {
            return;
        }
        self.cycle_count += 1;
        self.last_refresh = Some(report.completed_at);
        self.window_fallback = report.window_fallback;
        if report.window_fallback {
            self.push_log(
                "[WARN] 'From' date must be earlier than 'To' date, showing default range"
                    .to_string(),
            );
        }

        let summary = report.summary();
        match report.outcome {
            CycleOutcome::FetchFailed(_) => {
                self.candles.clear();
                self.levels = None;
                self.status = CycleStatus::Failed(summary.clone());
                self.push_log(format!("[ERR] {}", summary));
            }
            CycleOutcome::NoData(_) => {
                self.candles.clear();
                self.levels = None;
                self.status = CycleStatus::Warning(summary.clone());
                self.push_log(format!("[WARN] {}", summary));
            }
            CycleOutcome::Evaluated(analysis) => {
                let analysis = *analysis;
                for dispatch in &analysis.dispatches {
                    let ev = &dispatch.event;
                    self.alert_count += 1;
                    self.push_alert_row(AlertRow {
                        kind: ev.kind,
                        text: format!(
                            "{} {} near {} {:.2} @ {:.2}",
                            ev.timestamp.format("%H:%M:%S"),
                            ev.symbol,
                            ev.kind,
                            ev.level(),
                            ev.price
                        ),
                    });
                    for (task, msg) in dispatch.failures() {
                        self.push_log(format!("[ERR] {} {} failed: {}", ev.kind, task, msg));
                    }
                }
                self.candles = analysis.series.candles().to_vec();
                self.levels = Some(analysis.levels);
                self.status = if self.window_fallback {
                    CycleStatus::Warning("default date range in use".to_string())
                } else {
                    CycleStatus::Ready
                };
                self.push_log(summary);
            }
        }
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::CycleStarted { symbol, interval } => {
                if symbol == self.symbol && interval == self.interval {
                    self.status = CycleStatus::Loading;
                }
            }
            AppEvent::CycleCompleted(report) => self.apply_report(*report),
            AppEvent::NotificationResult { subject, result } => match result {
                Ok(()) => self.push_log(format!("Notification sent: {}", subject)),
                Err(e) => self.push_log(format!("[ERR] Notification failed: {}", e)),
            },
            AppEvent::Error(msg) => self.push_log(format!("[ERR] {}", msg)),
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // chart + levels
            Constraint::Length(6), // alerts
            Constraint::Length(6), // system log
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    frame.render_widget(StatusBar { state }, outer[0]);

    let main_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(28)])
        .split(outer[1]);

    frame.render_widget(
        LevelChart::new(&state.candles, &state.symbol)
            .levels(state.levels.as_ref())
            .fibonacci(state.show_fibonacci)
            .pivot(state.show_pivot),
        main_area[0],
    );
    frame.render_widget(
        LevelsPanel::new(state.levels.as_ref(), state.show_fibonacci, state.show_pivot),
        main_area[1],
    );
    frame.render_widget(AlertPanel::new(&state.alert_rows), outer[2]);
    frame.render_widget(LogPanel::new(&state.log_messages), outer[3]);
    frame.render_widget(KeybindBar, outer[4]);

    if state.symbol_selector_open {
        let area = centered_rect(frame.area(), 30, 16);
        frame.render_widget(
            SymbolSelectorPopup::new(&state.symbol_items, state.symbol_selector_index),
            area,
        );
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
