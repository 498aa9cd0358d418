use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use level_watch::alert::{
    AlertContext, AlertDispatcher, ChartRenderer, CsvEventLog, CsvSnapshotWriter, EventLog,
    MailCredentials, Notification, Notifier, PngChartRenderer, SmtpNotifier, SnapshotWriter,
};
use level_watch::error::{AppError, FetchError};
use level_watch::event::AppEvent;
use level_watch::model::candle::Candle;
use level_watch::model::interval::Interval;
use level_watch::model::series::PriceSeries;
use level_watch::model::window::DateRange;
use level_watch::pipeline::{run_cycle, CycleReport, CycleRequest};
use level_watch::proximity::{LevelKind, ProximityEvent, ProximityThreshold};
use level_watch::ui::{self, AppState, CycleStatus};

fn at(d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn request(symbol: &str) -> CycleRequest {
    CycleRequest {
        symbol: symbol.to_string(),
        interval: Interval::Hour1,
        range: DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1),
            NaiveDate::from_ymd_opt(2024, 6, 3),
        ),
        // Far from both levels so no side effects are attempted.
        threshold: ProximityThreshold::new(0.0),
        overlays: Default::default(),
        notify: Default::default(),
    }
}

fn idle_dispatcher() -> AlertDispatcher {
    let dir = std::env::temp_dir().join("lw-ui-unused");
    AlertDispatcher::new(
        Box::new(PngChartRenderer::new(&dir, 100, 100)),
        Box::new(CsvEventLog::new(dir.join("event_log.csv"))),
        Box::new(CsvSnapshotWriter::new(&dir, 20)),
        Box::new(SmtpNotifier::new("localhost", 465)),
    )
}

/// Side effects that succeed without touching the filesystem or network.
struct Silent;

impl ChartRenderer for Silent {
    fn render(&self, _: &str, _: LevelKind, _: &AlertContext<'_>) -> Result<PathBuf, AppError> {
        Ok(PathBuf::from("chart.png"))
    }
}

impl EventLog for Silent {
    fn append(&self, _: &ProximityEvent) -> Result<(), AppError> {
        Ok(())
    }
}

impl SnapshotWriter for Silent {
    fn write(&self, _: &str, _: &PriceSeries) -> Result<PathBuf, AppError> {
        Ok(PathBuf::from("snapshot.csv"))
    }
}

impl Notifier for Silent {
    fn send(&self, _: &Notification, _: &MailCredentials) -> Result<(), AppError> {
        Ok(())
    }
}

fn silent_dispatcher() -> AlertDispatcher {
    AlertDispatcher::new(
        Box::new(Silent),
        Box::new(Silent),
        Box::new(Silent),
        Box::new(Silent),
    )
}

fn evaluated_report(symbol: &str) -> CycleReport {
    let candles = vec![
        Candle::new(at(1, 0), 105.0, 120.0, 100.0, 110.0),
        Candle::new(at(2, 0), 110.0, 115.0, 104.0, 108.0),
    ];
    run_cycle(&request(symbol), Ok(candles), &idle_dispatcher(), at(3, 0))
}

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[test]
/// Verifies a completed cycle lands in the dashboard state:
/// candles, levels and status are refreshed and a summary is logged.
fn completed_cycle_updates_state() {
    let mut s = AppState::new("BTCUSD", Interval::Hour1, 60);
    s.apply(AppEvent::CycleStarted {
        symbol: "BTCUSD".to_string(),
        interval: Interval::Hour1,
    });
    assert_eq!(s.status, CycleStatus::Loading);

    s.apply(AppEvent::CycleCompleted(Box::new(evaluated_report("BTCUSD"))));

    assert_eq!(s.status, CycleStatus::Ready);
    assert_eq!(s.candles.len(), 2);
    assert_eq!(s.levels.as_ref().map(|l| l.support), Some(100.0));
    assert_eq!(s.cycle_count, 1);
    assert_eq!(s.last_refresh, Some(at(3, 0)));
    assert!(s.log_messages.last().unwrap().contains("support 100.00"));
}

#[test]
/// Verifies stale reports are ignored:
/// a report for a symbol the operator already left must not overwrite the view.
fn report_for_previous_symbol_is_ignored() {
    let mut s = AppState::new("ETHUSD", Interval::Hour1, 60);
    s.apply(AppEvent::CycleCompleted(Box::new(evaluated_report("BTCUSD"))));
    assert!(s.candles.is_empty());
    assert_eq!(s.cycle_count, 0);
}

#[test]
/// Verifies fetch failures are surfaced without clearing the session:
/// status flips to failed and an error line is logged.
fn failed_fetch_sets_error_status() {
    let mut s = AppState::new("BTCUSD", Interval::Hour1, 60);
    let report = run_cycle(
        &request("BTCUSD"),
        Err(FetchError::Status(500)),
        &idle_dispatcher(),
        at(3, 0),
    );
    s.apply(AppEvent::CycleCompleted(Box::new(report)));

    assert!(matches!(s.status, CycleStatus::Failed(_)));
    assert!(s.log_messages.last().unwrap().starts_with("[ERR] Failed to retrieve data"));
}

#[test]
/// Verifies the inverted-range warning reaches the operator log.
fn fallback_window_logs_warning() {
    let mut s = AppState::new("BTCUSD", Interval::Hour1, 60);
    let mut req = request("BTCUSD");
    req.range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 6, 3),
        NaiveDate::from_ymd_opt(2024, 6, 1),
    );
    let candles = vec![Candle::new(at(2, 0), 110.0, 115.0, 104.0, 108.0)];
    let report = run_cycle(&req, Ok(candles), &idle_dispatcher(), at(3, 0));
    s.apply(AppEvent::CycleCompleted(Box::new(report)));

    assert!(s.window_fallback);
    assert!(s
        .log_messages
        .iter()
        .any(|m| m.contains("'From' date must be earlier than 'To' date")));
    assert!(matches!(s.status, CycleStatus::Warning(_)));
}

#[test]
/// Verifies symbol selector navigation wraps and only reports real changes.
fn symbol_selector_wraps_and_confirms_change() {
    let mut s = AppState::new("BTCUSD", Interval::Hour1, 60);
    s.symbol_items = vec!["BTCUSD".into(), "ETHUSD".into(), "SOLUSD".into()];
    s.open_symbol_selector();
    assert!(s.symbol_selector_open);
    assert_eq!(s.symbol_selector_index, 0);

    s.move_symbol_selector(true);
    assert_eq!(s.symbol_selector_index, 2);
    assert_eq!(s.confirm_symbol_selection(), Some("SOLUSD".to_string()));
    assert_eq!(s.symbol, "SOLUSD");
    assert!(!s.symbol_selector_open);

    s.open_symbol_selector();
    assert_eq!(s.confirm_symbol_selection(), None);
}

#[test]
/// Verifies the dashboard renders levels and the selector popup:
/// the level panel shows support/resistance and the popup lists symbols.
fn render_shows_levels_and_selector() {
    let backend = TestBackend::new(120, 40);
    let mut terminal = Terminal::new(backend).expect("test terminal");
    let mut state = AppState::new("BTCUSD", Interval::Hour1, 60);
    state.apply(AppEvent::CycleCompleted(Box::new(evaluated_report("BTCUSD"))));
    state.symbol_items = vec!["BTCUSD".into(), "ETHUSD".into()];
    state.open_symbol_selector();

    terminal
        .draw(|frame| ui::render(frame, &state))
        .expect("render should succeed");

    let text = buffer_text(&terminal);
    assert!(text.contains("level-watch"));
    assert!(text.contains("Resistance"));
    assert!(text.contains("120.00"));
    assert!(text.contains("ETHUSD"), "selector should list symbols");
}

#[test]
/// Verifies a range edit clears the view and is logged, and that an edit
/// leaving `from` after `to` comes back as the fallback warning.
fn range_edit_resets_view_and_inverted_range_warns() {
    let mut s = AppState::new("BTCUSD", Interval::Hour1, 60);
    s.apply(AppEvent::CycleCompleted(Box::new(evaluated_report("BTCUSD"))));
    assert!(s.levels.is_some());

    let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    // 2024-06-01..2024-06-03 with the end pulled back three days
    let inverted = request("BTCUSD").range.shift_to(-3, today);
    assert_eq!(
        inverted,
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1),
            NaiveDate::from_ymd_opt(2024, 5, 31),
        )
    );
    s.set_range(inverted);

    assert_eq!(s.range, inverted);
    assert!(s.candles.is_empty());
    assert!(s.levels.is_none());
    assert_eq!(
        s.log_messages.last().map(String::as_str),
        Some("Range -> 2024-06-01..2024-05-31")
    );

    let mut req = request("BTCUSD");
    req.range = s.range;
    let candles = vec![Candle::new(at(2, 0), 110.0, 115.0, 104.0, 108.0)];
    let report = run_cycle(&req, Ok(candles), &idle_dispatcher(), at(3, 0));
    s.apply(AppEvent::CycleCompleted(Box::new(report)));

    assert!(s.window_fallback);
    assert!(s
        .log_messages
        .iter()
        .any(|m| m.contains("'From' date must be earlier than 'To' date")));
}

#[test]
/// Verifies alert rows carry the level kind they were raised for.
fn alert_rows_keep_level_kind() {
    let mut req = request("BTCUSD");
    req.threshold = ProximityThreshold::new(0.001);
    let candles = vec![
        Candle::new(at(1, 0), 105.0, 120.0, 100.0, 110.0),
        Candle::new(at(2, 0), 110.0, 115.0, 104.0, 108.0),
        // closes 0.05 above the 100.00 support
        Candle::new(at(2, 12), 108.0, 108.0, 100.0, 100.05),
    ];
    let report = run_cycle(&req, Ok(candles), &silent_dispatcher(), at(3, 0));

    let mut s = AppState::new("BTCUSD", Interval::Hour1, 60);
    s.apply(AppEvent::CycleCompleted(Box::new(report)));

    assert_eq!(s.alert_count, 1);
    assert_eq!(s.alert_rows.len(), 1);
    assert_eq!(s.alert_rows[0].kind, LevelKind::Support);
    assert!(s.alert_rows[0].text.contains("BTCUSD near Support 100.00 @ 100.05"));
}
