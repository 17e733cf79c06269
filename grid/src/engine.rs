//! Grid sync engine: one task owns the grid state.
//!
//! DESIGN
//! ======
//! Every mutation of [`GridState`] happens inside the engine task, one message at a
//! time. Network calls run on spawned tasks and report back as events, so
//! a long-poll in flight never delays a paint and responses may land in any
//! order; the reconciler decides precedence by version.
//!
//! Readers never touch the state. After each change the loop publishes an
//! immutable [`GridView`] on a `watch` channel.
//!
//! REFRESH LOOP
//! ============
//! At most one poll is in flight. The first carries no version; each later
//! one waits `retry_delay` after the previous outcome, success or failure,
//! and carries the held version. A poll that outlives `poll_timeout` is
//! dropped, which aborts its request. The loop never gives up.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::GridApi;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::pending::EditId;
use crate::state::{Confirmation, GridState, GridView};
use crate::wire::{CellResponse, MapResponse, VersionId};

const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Notifications raised from the engine task.
///
/// Called synchronously inside the loop; keep them short.
pub trait SyncObserver: Send + 'static {
    /// The first snapshot arrived. Raised exactly once.
    fn on_loaded(&mut self, _view: &GridView) {}

    /// The rendered grid changed: a newer snapshot, a local paint, or a
    /// retracted paint.
    fn on_changed(&mut self, _view: &GridView) {}
}

impl SyncObserver for () {}

enum Command {
    SetCell { x_index: usize, y_index: usize, color_index: usize, reply: oneshot::Sender<Result<EditId, SyncError>> },
}

enum Event {
    Polled(Result<MapResponse, SyncError>),
    Written { id: EditId, result: Result<CellResponse, SyncError> },
}

/// Handle to the engine task. Cheap to clone; the task stops once every
/// handle is dropped.
#[derive(Clone)]
pub struct GridSyncEngine {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<Arc<GridView>>,
}

impl GridSyncEngine {
    /// Start the engine on the current tokio runtime. The first poll is
    /// issued at once.
    #[must_use]
    pub fn spawn(api: Arc<dyn GridApi>, config: &SyncConfig, observer: impl SyncObserver) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (view_tx, view_rx) = watch::channel(Arc::new(GridView::default()));

        info!(
            base_url = %config.base_url,
            poll_timeout_ms = duration_ms(config.poll_timeout),
            retry_delay_ms = duration_ms(config.retry_delay),
            "grid sync engine starting"
        );

        let timing = Timing { poll_timeout: config.poll_timeout, retry_delay: config.retry_delay };
        tokio::spawn(run(api, timing, observer, commands_rx, view_tx));

        Self { commands: commands_tx, view: view_rx }
    }

    /// Paint one cell.
    ///
    /// Returns once the edit is overlaid and published; the server write
    /// continues in the background.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidColorIndex`] if the color is not available.
    /// - [`SyncError::CellOutOfRange`] if the cell is outside the grid.
    /// - [`SyncError::EngineStopped`] if the engine task is gone.
    pub async fn set_cell_color(&self, x_index: usize, y_index: usize, color_index: usize) -> Result<EditId, SyncError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::SetCell { x_index, y_index, color_index, reply })
            .await
            .map_err(|_| SyncError::EngineStopped)?;
        response.await.map_err(|_| SyncError::EngineStopped)?
    }

    /// The latest published grid.
    #[must_use]
    pub fn view(&self) -> Arc<GridView> {
        self.view.borrow().clone()
    }

    /// A receiver that wakes on every publish.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<GridView>> {
        self.view.clone()
    }
}

#[derive(Debug, Clone, Copy)]
struct Timing {
    poll_timeout: Duration,
    retry_delay: Duration,
}

async fn run(
    api: Arc<dyn GridApi>,
    timing: Timing,
    mut observer: impl SyncObserver,
    mut commands: mpsc::Receiver<Command>,
    view: watch::Sender<Arc<GridView>>,
) {
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let mut state = GridState::new();
    let mut poll = spawn_poll(api.clone(), None, Duration::ZERO, timing.poll_timeout, events_tx.clone());

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                handle_command(command, &mut state, &api, &events_tx, &view, &mut observer);
            }
            Some(event) = events.recv() => match event {
                Event::Polled(result) => {
                    handle_poll(result, &mut state, &view, &mut observer);
                    let last = state.version_id().cloned();
                    poll = spawn_poll(api.clone(), last, timing.retry_delay, timing.poll_timeout, events_tx.clone());
                }
                Event::Written { id, result } => handle_written(id, result, &mut state, &view, &mut observer),
            },
        }
    }

    poll.abort();
    info!("grid sync engine stopped");
}

fn handle_command(
    command: Command,
    state: &mut GridState,
    api: &Arc<dyn GridApi>,
    events: &mpsc::UnboundedSender<Event>,
    view: &watch::Sender<Arc<GridView>>,
    observer: &mut impl SyncObserver,
) {
    match command {
        Command::SetCell { x_index, y_index, color_index, reply } => {
            let result = state.begin_edit(x_index, y_index, color_index);
            if let Ok(id) = result {
                debug!(edit = id.0, x_index, y_index, color_index, "edit overlaid");
                let published = publish(state, view);
                observer.on_changed(&published);
                spawn_write(api.clone(), id, x_index, y_index, color_index, events.clone());
            }
            if reply.send(result).is_err() {
                debug!(x_index, y_index, "caller went away before the edit reply");
            }
        }
    }
}

fn handle_poll(
    result: Result<MapResponse, SyncError>,
    state: &mut GridState,
    view: &watch::Sender<Arc<GridView>>,
    observer: &mut impl SyncObserver,
) {
    let snapshot = match result {
        Ok(snapshot) => snapshot,
        Err(SyncError::Timeout(after)) => {
            debug!(after_ms = duration_ms(after), "long-poll timed out; polling again");
            return;
        }
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "grid refresh failed; retrying");
            return;
        }
    };

    let version = snapshot.version_id.clone();
    match state.apply_snapshot(snapshot) {
        Ok(outcome) if outcome.stale => {}
        Ok(outcome) => {
            if outcome.dropped_edits > 0 {
                debug!(version = %version, dropped = outcome.dropped_edits, "pending edits caught up");
            }
            if outcome.rebased {
                warn!(version = %version, "grid re-baselined on a lower server version");
            }
            let published = publish(state, view);
            if outcome.first_load {
                info!(version = %version, size = published.size, "grid loaded");
                observer.on_loaded(&published);
            }
            if outcome.changed {
                debug!(version = %version, "grid changed");
                observer.on_changed(&published);
            }
        }
        Err(e) => warn!(version = %version, error = %e, "discarding malformed snapshot"),
    }
}

fn handle_written(
    id: EditId,
    result: Result<CellResponse, SyncError>,
    state: &mut GridState,
    view: &watch::Sender<Arc<GridView>>,
    observer: &mut impl SyncObserver,
) {
    match result {
        Ok(response) => {
            let version = response.version_id;
            match state.confirm_edit(id, version.clone()) {
                Confirmation::Awaiting => debug!(edit = id.0, version = %version, "edit acknowledged"),
                Confirmation::Dropped { changed } => {
                    debug!(edit = id.0, version = %version, changed, "edit acknowledged and already reflected");
                    let published = publish(state, view);
                    if changed {
                        observer.on_changed(&published);
                    }
                }
                Confirmation::Unknown => debug!(edit = id.0, "acknowledgement for unknown edit"),
            }
        }
        Err(e) => {
            warn!(edit = id.0, error = %e, code = e.error_code(), "cell write failed; retracting edit");
            if state.fail_edit(id) {
                let published = publish(state, view);
                observer.on_changed(&published);
            }
        }
    }
}

fn publish(state: &GridState, view: &watch::Sender<Arc<GridView>>) -> Arc<GridView> {
    let published = Arc::new(state.view());
    view.send_replace(published.clone());
    published
}

fn spawn_poll(
    api: Arc<dyn GridApi>,
    last: Option<VersionId>,
    delay: Duration,
    poll_timeout: Duration,
    events: mpsc::UnboundedSender<Event>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if events.is_closed() {
            return;
        }
        let result = match tokio::time::timeout(poll_timeout, api.fetch_map(last.as_ref())).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(poll_timeout)),
        };
        if events.send(Event::Polled(result)).is_err() {
            debug!("engine stopped before poll result was delivered");
        }
    })
}

fn spawn_write(
    api: Arc<dyn GridApi>,
    id: EditId,
    x_index: usize,
    y_index: usize,
    color_index: usize,
    events: mpsc::UnboundedSender<Event>,
) {
    tokio::spawn(async move {
        let result = api.set_cell(x_index, y_index, color_index).await;
        if events.send(Event::Written { id, result }).is_err() {
            debug!(edit = id.0, "engine stopped before write result was delivered");
        }
    });
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
