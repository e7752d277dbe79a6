//! Registrar console entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use registrar_grid::FetchDispatcher;
use registrar_tui::api_client;
use registrar_tui::config::TuiConfig;
use registrar_tui::error::TuiError;
use registrar_tui::events::TuiEvent;
use registrar_tui::persistence;
use registrar_tui::state::App;
use registrar_tui::telemetry;
use registrar_tui::views::render_view;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    telemetry::init(&config.log_path)?;

    let source = api_client::data_source(&config)?;
    let (dispatcher, mut outcome_rx) = FetchDispatcher::channel(source);
    let mut app = App::new(config)?;
    match persistence::load(&app.config.persistence_path) {
        Ok(Some(state)) => app.restore(&state),
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "could not read saved console state"),
    }
    tracing::info!(view = app.active_view.key(), "console started");

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx);

    let mut ticker = tokio::time::interval(Duration::from_millis(app.config.refresh_interval_ms));

    loop {
        app.pump(&dispatcher);
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => app.on_tick(chrono::Utc::now()),
            Some(outcome) = outcome_rx.recv() => app.complete(outcome),
            Some(event) = event_rx.recv() => {
                match event {
                    TuiEvent::Input(key) => {
                        if app.handle_key(key) {
                            break;
                        }
                    }
                    TuiEvent::Resize { .. } => {}
                }
            }
        }
    }

    if let Err(err) = persistence::save(&app.config.persistence_path, &app.persisted()) {
        tracing::warn!(error = %err, "could not save console state");
    }
    tracing::info!("console stopped");

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            let forwarded = match event::read() {
                Ok(CrosstermEvent::Key(key)) => sender.blocking_send(TuiEvent::Input(key)),
                Ok(CrosstermEvent::Resize(width, height)) => {
                    sender.blocking_send(TuiEvent::Resize { width, height })
                }
                _ => Ok(()),
            };
            if forwarded.is_err() {
                break;
            }
        }
    });
}
