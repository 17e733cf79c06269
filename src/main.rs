use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use grid::{GridSyncEngine, GridView, HttpGridApi, SyncConfig, SyncError, SyncObserver};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

const GLYPHS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("timed out after {0:?} waiting for the grid")]
    Timeout(Duration),
    #[error("cell ({x_index}, {y_index}) did not take color {color_index}; server shows {actual:?}")]
    NotApplied { x_index: usize, y_index: usize, color_index: usize, actual: Option<usize> },
    #[error("signal handler failed: {0}")]
    Signal(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "pixelboard", about = "Shared pixel board sync client")]
struct Cli {
    #[arg(long, env = "PIXELBOARD_BASE_URL", default_value = grid::config::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "PIXELBOARD_POLL_TIMEOUT_SECS", default_value_t = grid::config::DEFAULT_POLL_TIMEOUT_SECS)]
    poll_timeout_secs: u64,

    #[arg(long, env = "PIXELBOARD_RETRY_DELAY_MS", default_value_t = grid::config::DEFAULT_RETRY_DELAY_MS)]
    retry_delay_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the board and log every new version until interrupted.
    Watch,
    /// Paint one cell and wait until the server reflects it.
    Paint { x_index: usize, y_index: usize, color_index: usize },
    /// Print the board once as one glyph per color index.
    Show,
}

/// Logs engine notifications.
struct LogObserver;

impl SyncObserver for LogObserver {
    fn on_loaded(&mut self, view: &GridView) {
        info!(size = view.size, colors = view.colors.len(), "board loaded");
    }

    fn on_changed(&mut self, view: &GridView) {
        if let Some(version) = &view.version_id {
            info!(version = %version, pending = view.pending_edits, "board changed");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SyncConfig {
        poll_timeout: Duration::from_secs(cli.poll_timeout_secs),
        retry_delay: Duration::from_millis(cli.retry_delay_ms),
        ..SyncConfig::from_env()
    }
    .with_base_url(&cli.base_url);

    let api = Arc::new(HttpGridApi::new(&config)?);
    let engine = GridSyncEngine::spawn(api, &config, LogObserver);
    let load_limit = config.poll_timeout + config.connect_timeout;

    match cli.command {
        Command::Watch => run_watch(&engine).await,
        Command::Paint { x_index, y_index, color_index } => {
            let write_limit = config.write_timeout + config.poll_timeout + config.retry_delay;
            run_paint(&engine, load_limit, write_limit, x_index, y_index, color_index).await
        }
        Command::Show => run_show(&engine, load_limit).await,
    }
}

async fn run_watch(engine: &GridSyncEngine) -> Result<(), CliError> {
    let mut rx = engine.subscribe();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return Err(SyncError::EngineStopped.into());
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("interrupted");
                return Ok(());
            }
        }
    }
}

async fn run_paint(
    engine: &GridSyncEngine,
    load_limit: Duration,
    write_limit: Duration,
    x_index: usize,
    y_index: usize,
    color_index: usize,
) -> Result<(), CliError> {
    let mut rx = engine.subscribe();
    wait_for(&mut rx, load_limit, GridView::is_loaded).await?;

    let edit = engine.set_cell_color(x_index, y_index, color_index).await?;
    info!(edit = edit.0, x_index, y_index, color_index, "paint issued");

    let view = wait_for(&mut rx, write_limit, |view| view.pending_edits == 0).await?;
    let actual = view.color_index_at(x_index, y_index);
    if actual != Some(color_index) {
        return Err(CliError::NotApplied { x_index, y_index, color_index, actual });
    }
    println!("painted ({x_index}, {y_index}) at version {}", version_label(&view));
    Ok(())
}

async fn run_show(engine: &GridSyncEngine, load_limit: Duration) -> Result<(), CliError> {
    let mut rx = engine.subscribe();
    let view = wait_for(&mut rx, load_limit, GridView::is_loaded).await?;
    println!("version {} ({}x{})", version_label(&view), view.size, view.size);
    for row in render_rows(&view) {
        println!("{row}");
    }
    Ok(())
}

async fn wait_for(
    rx: &mut watch::Receiver<Arc<GridView>>,
    limit: Duration,
    mut predicate: impl FnMut(&GridView) -> bool,
) -> Result<Arc<GridView>, CliError> {
    match tokio::time::timeout(limit, rx.wait_for(|view| predicate(&**view))).await {
        Ok(Ok(view)) => Ok(Arc::clone(&view)),
        Ok(Err(_)) => Err(SyncError::EngineStopped.into()),
        Err(_) => Err(CliError::Timeout(limit)),
    }
}

fn version_label(view: &GridView) -> String {
    view.version_id.as_ref().map_or_else(|| "-".to_string(), ToString::to_string)
}

/// One line per row; color indexes past the glyph table print as `?`.
fn render_rows(view: &GridView) -> Vec<String> {
    if view.size == 0 {
        return Vec::new();
    }
    view.cell_color_indexes
        .chunks(view.size)
        .map(|row| row.iter().map(|&i| GLYPHS.get(i).map_or('?', |&b| char::from(b))).collect())
        .collect()
}
