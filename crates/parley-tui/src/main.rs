use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use parley_core::{Config, SimulatedResponder};

mod app;
mod clipboard;
mod files;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use clipboard::SystemClipboard;
use files::PathFilePicker;
use tui::{EventHandler, Tui, TICK_RATE};

#[derive(Parser)]
#[command(name = "parley")]
#[command(version, about = "Terminal chat client with a simulated assistant")]
struct Cli {
    /// Model selected at startup (GPT-4, GPT-3.5, Claude, Gemini)
    #[arg(short, long)]
    model: Option<String>,
    /// Read configuration from this file instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Log filter, e.g. "debug" or "parley_core=trace"
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    }
    .with_env_overrides();
    if let Some(model) = cli.model {
        config.default_model = Some(model);
    }
    if let Some(filter) = cli.log {
        config.log_filter = Some(filter);
    }

    let (_log_guard, log_path) = logging::init(config.log_filter.as_deref())?;
    tracing::info!(
        model = config.model(),
        log = %log_path.display(),
        "starting parley"
    );

    let responder = Arc::new(SimulatedResponder::from_config(&config));
    let mut app = App::new(
        &config,
        responder,
        Box::new(SystemClipboard),
        Box::new(PathFilePicker),
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    app.shutdown();
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}
