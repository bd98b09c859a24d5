use std::io;
use std::sync::Arc;
use std::time::Duration;

use api::Config;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod app;
mod chat;
mod docs;
mod route;
mod ui;

use app::{App, Response};
use route::Route;

/// File logging, enabled by pointing PDFCHAT_LOG at a path. Writing to the
/// terminal would corrupt the alternate screen.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let path = std::env::var("PDFCHAT_LOG").ok()?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let _log_guard = init_tracing();
    let cfg = Arc::new(Config::from_env());
    let initial = std::env::args()
        .nth(1)
        .map(|p| Route::parse(&p))
        .unwrap_or(Route::Docs);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(cfg, tx, initial);
    let res = run_app(&mut terminal, &mut app, rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut rx: mpsc::UnboundedReceiver<Response>,
) -> io::Result<()> {
    let mut events = EventStream::new();
    let mut spinner_tick = tokio::time::interval(Duration::from_millis(100));
    spinner_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut poll_tick = tokio::time::interval(app.cfg.poll_interval);
    poll_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    draw_ui(terminal, app)?;

    loop {
        tokio::select! {
            _ = spinner_tick.tick() => {
                if app.is_busy() {
                    app.spinner_idx = (app.spinner_idx + 1) % 4;
                    draw_ui(terminal, app)?;
                }
            }
            _ = poll_tick.tick(), if app.docs.poll.is_some() => {
                app.docs.poll_tick(&app.cfg, &app.tx);
                draw_ui(terminal, app)?;
            }
            maybe_resp = rx.recv() => {
                if let Some(resp) = maybe_resp {
                    let was_polling = app.docs.poll.is_some();
                    app.handle_response(resp);
                    if !was_polling && app.docs.poll.is_some() {
                        // First status check lands one full period after upload.
                        poll_tick.reset();
                    }
                    draw_ui(terminal, app)?;
                }
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if app.on_key(key) {
                            return Ok(());
                        }
                        draw_ui(terminal, app)?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) => {}
                    None => return Ok(()),
                }
            }
        }
    }
}

fn draw_ui(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    terminal.draw(|frame| {
        let spinner_idx = app.spinner_idx;
        match &app.route {
            Route::Docs => app.docs.draw(frame, spinner_idx),
            Route::Chat { .. } => {
                if let Some(chat) = app.chat.as_mut() {
                    chat.draw(frame, spinner_idx);
                }
            }
        }
    })?;
    Ok(())
}
