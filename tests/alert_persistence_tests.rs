use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{NaiveDate, NaiveDateTime};

use level_watch::alert::event_log::{event_row, EVENT_LOG_HEADER};
use level_watch::alert::{CsvEventLog, CsvSnapshotWriter, EventLog, Notification, SnapshotWriter};
use level_watch::model::candle::Candle;
use level_watch::model::series::PriceSeries;
use level_watch::proximity::{LevelKind, ProximityEvent};

fn temp_dir(test_name: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("lw-{}-{}", test_name, ts))
}

fn at(h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 1)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn event(kind: LevelKind) -> ProximityEvent {
    ProximityEvent {
        kind,
        price: 100.049,
        support: 100.0,
        resistance: 120.5,
        symbol: "BTCUSD".to_string(),
        timestamp: at(9),
    }
}

#[test]
/// Verifies append-only event logging:
/// the header is written once and each event adds exactly one row.
fn event_log_writes_header_once() {
    let dir = temp_dir("event-log");
    let log = CsvEventLog::new(dir.join("event_log.csv"));

    log.append(&event(LevelKind::Support)).expect("first append");
    log.append(&event(LevelKind::Resistance)).expect("second append");

    let content = std::fs::read_to_string(log.path()).expect("log readable");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], EVENT_LOG_HEADER.join(","));
    assert_eq!(lines[1], "2024-07-01 09:00:00,BTCUSD,Support,100.05,100.00,120.50");
    assert!(lines[2].contains(",Resistance,"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
/// Verifies event row formatting:
/// prices are rendered with two decimals and the kind is capitalised.
fn event_row_formats_prices() {
    let row = event_row(&event(LevelKind::Resistance));
    assert_eq!(row[2], "Resistance");
    assert_eq!(row[3], "100.05");
    assert_eq!(row[5], "120.50");
}

#[test]
/// Verifies snapshot semantics:
/// only the latest candles are kept and a second write replaces the first file.
fn snapshot_keeps_tail_and_overwrites() {
    let dir = temp_dir("snapshot");
    let writer = CsvSnapshotWriter::new(&dir, 20);
    let long = PriceSeries::from_candles(
        (0..23)
            .map(|h| Candle::new(at(h), 10.0, 11.0, 9.0, 10.0 + h as f64 * 0.01))
            .collect(),
    );

    let path = writer.write("BTCUSD", &long).expect("snapshot write");
    assert_eq!(path, dir.join("BTCUSD_snapshot.csv"));
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 21);
    assert_eq!(lines[0], "date,open,high,low,close");
    assert!(lines[1].starts_with("2024-07-01 03:00:00,"));

    let short = PriceSeries::from_candles(vec![Candle::new(at(5), 10.0, 11.0, 9.0, 10.0)]);
    writer.write("BTCUSD", &short).expect("second snapshot write");
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
/// Verifies message wording for both level kinds.
fn notification_text_names_level_and_price() {
    let msg = Notification::for_event(&event(LevelKind::Support));
    assert_eq!(msg.subject, "Support Alert");
    assert_eq!(msg.body, "BTCUSD is near support at 100.00. Current: 100.05");

    let msg = Notification::for_event(&event(LevelKind::Resistance));
    assert_eq!(msg.subject, "Resistance Alert");
    assert!(msg.body.contains("near resistance at 120.50"));
}
