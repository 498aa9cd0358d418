use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{Event, KeyEventKind};
use tokio::sync::{mpsc, watch, Notify};

use level_watch::alert::{AlertDispatcher, Notification};
use level_watch::cli::Cli;
use level_watch::config::{next_refresh_secs, Config};
use level_watch::event::AppEvent;
use level_watch::fmp::rest::FmpRestClient;
use level_watch::input::{parse_main_command, parse_popup_command, PopupCommand, UiCommand};
use level_watch::model::window::DateRange;
use level_watch::pipeline::{run_cycle, CycleRequest};
use level_watch::symbols::SymbolCatalog;
use level_watch::ui;
use level_watch::ui::AppState;

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_from_path(&cli.config)?;
    cli.apply(&mut config)?;
    Ok(config)
}

/// Fetch, analyse and publish one cycle per period until shutdown.
async fn refresh_loop(
    rest_client: Arc<FmpRestClient>,
    dispatcher: Arc<AlertDispatcher>,
    mut request_rx: watch::Receiver<CycleRequest>,
    mut refresh_secs_rx: watch::Receiver<u64>,
    refresh_now: Arc<Notify>,
    app_tx: mpsc::Sender<AppEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        let request = request_rx.borrow_and_update().clone();
        let _ = app_tx
            .send(AppEvent::CycleStarted {
                symbol: request.symbol.clone(),
                interval: request.interval,
            })
            .await;

        let fetched = rest_client
            .get_historical_chart(&request.symbol, request.interval)
            .await;

        let cycle_dispatcher = dispatcher.clone();
        let cycle_request = request.clone();
        let joined = tokio::task::spawn_blocking(move || {
            run_cycle(
                &cycle_request,
                fetched,
                &cycle_dispatcher,
                chrono::Local::now().naive_local(),
            )
        })
        .await;
        match joined {
            Ok(report) => {
                let _ = app_tx.send(AppEvent::CycleCompleted(Box::new(report))).await;
            }
            Err(e) => {
                tracing::error!(symbol = %request.symbol, error = %e, "Refresh cycle aborted");
                let _ = app_tx
                    .send(AppEvent::Error(format!("Refresh cycle aborted: {}", e)))
                    .await;
            }
        }

        // Wait for the next trigger. A new refresh period only re-arms the timer.
        loop {
            let period = Duration::from_secs(*refresh_secs_rx.borrow_and_update());
            tokio::select! {
                _ = tokio::time::sleep(period) => break,
                _ = refresh_now.notified() => break,
                res = request_rx.changed() => {
                    if res.is_err() {
                        return;
                    }
                    let refetch = {
                        let next = request_rx.borrow();
                        next.symbol != request.symbol
                            || next.interval != request.interval
                            || next.range != request.range
                    };
                    if refetch {
                        break;
                    }
                }
                res = refresh_secs_rx.changed() => {
                    if res.is_err() {
                        return;
                    }
                }
                _ = shutdown_rx.changed() => return,
            }
        }
    }
}

fn send_test_notification(
    dispatcher: &Arc<AlertDispatcher>,
    request: &CycleRequest,
    app_tx: &mpsc::Sender<AppEvent>,
) {
    let dispatcher = dispatcher.clone();
    let credentials = request.notify.credentials.clone();
    let tx = app_tx.clone();
    tokio::spawn(async move {
        let message = Notification::test();
        let subject = message.subject.clone();
        let result = tokio::task::spawn_blocking(move || {
            dispatcher
                .notifier()
                .send(&message, &credentials)
                .map_err(|e| e.to_string())
        })
        .await
        .unwrap_or_else(|e| Err(e.to_string()));
        if let Err(e) = &result {
            tracing::error!(error = %e, "Test notification failed");
        }
        let _ = tx
            .send(AppEvent::NotificationResult { subject, result })
            .await;
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure .env file exists with FMP_API_KEY");
            std::process::exit(1);
        }
    };

    // Log to file so it doesn't interfere with TUI
    let log_file = std::fs::File::create("level-watch.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.logging.level.as_str())
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    // rustls 0.23+ needs a process-wide crypto provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::warn!("rustls crypto provider was already installed");
    }

    let mut catalog = match SymbolCatalog::load_csv(&config.market.symbols_path) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!(error = %e, "Symbol list unavailable, using configured symbol only");
            SymbolCatalog::default()
        }
    };
    let mut request = CycleRequest::from_config(&config)?;
    catalog.ensure(&request.symbol);

    tracing::info!(
        symbol = %request.symbol,
        interval = %request.interval,
        range = %request.range,
        threshold_ratio = request.threshold.ratio(),
        rest_url = %config.market.rest_base_url,
        "Starting level-watch"
    );

    let rest_client = Arc::new(FmpRestClient::new(
        &config.market.rest_base_url,
        &config.market.api_key,
        Duration::from_secs(config.market.http_timeout_secs),
    )?);
    let dispatcher = Arc::new(AlertDispatcher::from_config(&config));

    // Channels
    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(256);
    let (request_tx, request_rx) = watch::channel(request.clone());
    let (refresh_secs_tx, refresh_secs_rx) = watch::channel(config.ui.refresh_secs);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresh_now = Arc::new(Notify::new());

    tokio::spawn(refresh_loop(
        rest_client.clone(),
        dispatcher.clone(),
        request_rx,
        refresh_secs_rx,
        refresh_now.clone(),
        app_tx.clone(),
        shutdown_rx.clone(),
    ));

    // Ctrl+C handler
    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    // TUI main loop
    let mut terminal = ratatui::init();
    let mut app_state = AppState::new(&request.symbol, request.interval, config.ui.refresh_secs);
    app_state.range = request.range;
    app_state.notify_enabled = request.notify.enabled;
    app_state.show_fibonacci = request.overlays.fibonacci;
    app_state.show_pivot = request.overlays.pivot;
    app_state.symbol_items = catalog.symbols().to_vec();
    app_state.push_log(format!(
        "level-watch started | {} | {} | every {}s",
        request.symbol, request.interval, config.ui.refresh_secs
    ));
    if request.notify.enabled && !request.notify.credentials.is_complete() {
        app_state.push_log(
            "[WARN] Email alerts enabled but ALERT_EMAIL_* credentials are incomplete".to_string(),
        );
    }

    loop {
        terminal.draw(|frame| ui::render(frame, &app_state))?;

        if crossterm::event::poll(Duration::from_millis(config.ui.tick_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app_state.symbol_selector_open {
                    match parse_popup_command(&key.code) {
                        Some(PopupCommand::Up) => app_state.move_symbol_selector(true),
                        Some(PopupCommand::Down) => app_state.move_symbol_selector(false),
                        Some(PopupCommand::Close) => app_state.symbol_selector_open = false,
                        Some(PopupCommand::Select) => {
                            if let Some(symbol) = app_state.confirm_symbol_selection() {
                                tracing::info!(symbol = %symbol, "Symbol changed");
                                app_state.push_log(format!("Symbol -> {}", symbol));
                                request.symbol = symbol;
                                let _ = request_tx.send(request.clone());
                            }
                        }
                        None => {}
                    }
                } else if let Some(cmd) = parse_main_command(&key.code) {
                    match cmd {
                        UiCommand::Quit => {
                            tracing::info!("User quit");
                            let _ = shutdown_tx.send(true);
                            break;
                        }
                        UiCommand::OpenSymbolSelector => app_state.open_symbol_selector(),
                        UiCommand::NextInterval => {
                            request.interval = request.interval.next();
                            app_state.interval = request.interval;
                            app_state.candles.clear();
                            app_state.levels = None;
                            app_state.push_log(format!("Interval -> {}", request.interval));
                            let _ = request_tx.send(request.clone());
                        }
                        UiCommand::ToggleFibonacci => {
                            app_state.show_fibonacci = !app_state.show_fibonacci;
                            request.overlays.fibonacci = app_state.show_fibonacci;
                            let _ = request_tx.send(request.clone());
                        }
                        UiCommand::TogglePivot => {
                            app_state.show_pivot = !app_state.show_pivot;
                            request.overlays.pivot = app_state.show_pivot;
                            let _ = request_tx.send(request.clone());
                        }
                        UiCommand::ToggleNotifications => {
                            app_state.notify_enabled = !app_state.notify_enabled;
                            request.notify.enabled = app_state.notify_enabled;
                            let _ = request_tx.send(request.clone());
                            let state = if app_state.notify_enabled { "ON" } else { "OFF" };
                            app_state.push_log(format!("Email alerts {}", state));
                            if app_state.notify_enabled && !request.notify.credentials.is_complete()
                            {
                                app_state.push_log(
                                    "[WARN] ALERT_EMAIL_TO, ALERT_EMAIL_FROM and ALERT_EMAIL_PASSWORD are required"
                                        .to_string(),
                                );
                            }
                        }
                        UiCommand::SendTestNotification => {
                            app_state.push_log("Sending test notification...".to_string());
                            send_test_notification(&dispatcher, &request, &app_tx);
                        }
                        UiCommand::NextRefreshInterval => {
                            app_state.refresh_secs = next_refresh_secs(app_state.refresh_secs);
                            let _ = refresh_secs_tx.send(app_state.refresh_secs);
                            app_state
                                .push_log(format!("Refresh every {}s", app_state.refresh_secs));
                        }
                        UiCommand::RefreshNow => refresh_now.notify_one(),
                        UiCommand::ShiftFrom(_)
                        | UiCommand::ShiftTo(_)
                        | UiCommand::ResetRange => {
                            let today = chrono::Local::now().date_naive();
                            let range = match cmd {
                                UiCommand::ShiftFrom(days) => request.range.shift_from(days, today),
                                UiCommand::ShiftTo(days) => request.range.shift_to(days, today),
                                _ => DateRange::default(),
                            };
                            tracing::info!(range = %range, "Date range changed");
                            app_state.set_range(range);
                            request.range = range;
                            let _ = request_tx.send(request.clone());
                        }
                    }
                }
            }
        }

        // Drain events from channel
        while let Ok(evt) = app_rx.try_recv() {
            app_state.apply(evt);
        }

        if *shutdown_rx.borrow() {
            break;
        }
    }

    ratatui::restore();
    tracing::info!("Shutdown complete");
    println!("Goodbye! Check level-watch.log for details.");
    Ok(())
}
