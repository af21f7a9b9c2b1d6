//! menuboard - A TUI client for a QR restaurant menu backend.

mod api;
mod app;
mod config;
mod error;
mod keys;
mod paging;
mod session;
mod text;
mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use api::{Gateway, ResourceKind, TokenStore};
use app::{App, AppEvent, Command, Dispatcher};
use config::{Overrides, Settings};
use session::{FileSessionStore, SessionTracker, current_session_id};

/// How long to wait for input before running periodic work.
const TICK: Duration = Duration::from_millis(50);

/// A TUI client for a QR restaurant menu backend.
#[derive(Parser, Debug)]
#[command(name = "menuboard", version, about)]
struct Args {
    /// API base URL (overrides MENUBOARD_BASE_URL and config files).
    #[arg(long)]
    base_url: Option<String>,

    /// File holding the bearer token, re-read before each request.
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// Number of entities fetched per page.
    #[arg(short = 'n', long)]
    page_size: Option<u32>,

    /// Resource tab shown at startup.
    #[arg(short, long, default_value = "campaigns", value_parser = parse_resource)]
    resource: ResourceKind,

    /// URL the app was opened from; a `source=qr` marker records one scan
    /// per session and is then stripped.
    #[arg(long)]
    landing_url: Option<String>,

    /// Log file (default: <cache_dir>/menuboard/menuboard.log).
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Config file replacing the platform and ./.menuboard.toml cascade.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_resource(value: &str) -> Result<ResourceKind, String> {
    ResourceKind::from_path(value).ok_or_else(|| {
        format!("unknown resource '{value}' (expected campaigns, menus, categories or items)")
    })
}

fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_logging(args.log_file.clone()).context("failed to set up logging")?;

    let file_config = config::load_config(args.config.as_deref())?;
    let settings = Settings::resolve(
        Overrides {
            base_url: args.base_url.clone(),
            token_file: args.token_file.clone(),
            page_size: args.page_size,
        },
        |key| std::env::var(key).ok(),
        file_config,
    )?;
    tracing::info!(
        base_url = %settings.base_url,
        page_size = settings.page_size,
        "starting"
    );

    let mut tokens = TokenStore::new();
    if let Some(token) = &settings.token {
        tokens = tokens.with_token(token.as_str());
    }
    if let Some(path) = &settings.token_file {
        tokens = tokens.with_file(path);
    }
    let gateway = Gateway::new(&settings.base_url, tokens, settings.timeout)
        .with_context(|| format!("invalid API base URL: {}", settings.base_url))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(gateway, tx, runtime.handle().clone());

    let mut app = App::new(
        settings.base_url.clone(),
        settings.page_size,
        settings.trigger,
        args.resource,
    );

    if let Some(raw_url) = &args.landing_url {
        let store = FileSessionStore::new(&settings.session_dir, &current_session_id());
        let mut tracker = SessionTracker::new(store);
        let landing = tracker
            .process(raw_url, || {
                dispatcher.dispatch(Command::TrackQr);
                Ok(())
            })
            .context("invalid landing URL")?;
        tracing::info!(url = %landing.url, tracked = landing.fired, "landing URL processed");
        app.landing_url = Some(landing.url);
    }

    let result = run_tui(app, &dispatcher, rx);

    // Don't wait on requests still in flight
    runtime.shutdown_timeout(Duration::from_millis(500));
    result
}

/// Log to a file through a background writer; stdout belongs to the TUI.
fn init_logging(path: Option<PathBuf>) -> Result<WorkerGuard> {
    let path = path.unwrap_or_else(config::default_log_path);
    let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .context("log file path has no file name")?
        .to_owned();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("menuboard=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

/// Run the TUI application.
fn run_tui(
    mut app: App,
    dispatcher: &Dispatcher,
    mut events: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut terminal = ratatui::init();

    let result = run_event_loop(&mut terminal, &mut app, dispatcher, &mut events);

    ratatui::restore();

    // Late results are dropped from here on
    app.quit();
    events.close();

    result
}

/// Main event loop.
fn run_event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    dispatcher: &Dispatcher,
    events: &mut UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        // Draw first: rendering records the viewport the trigger reads
        terminal.draw(|frame| {
            ui::render(frame, app);
        })?;

        while let Ok(event) = events.try_recv() {
            app.handle_event(event, Instant::now());
        }
        app.tick(Instant::now());
        for command in app.take_commands() {
            dispatcher.dispatch(command);
        }

        if app.should_quit {
            break;
        }

        // Handle input, waking up regularly for results and timers
        if !event::poll(TICK)? {
            continue;
        }
        let event = event::read()?;
        if let Event::Key(key) = &event
            && key.kind == KeyEventKind::Press
            && keys::dispatch_key_event(app, *key, &event)
        {
            continue;
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
