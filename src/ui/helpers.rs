//! Helper functions for UI operations.
//!
//! Background refresh spawning, link opening, and panic capture for
//! spawned tasks.

use crate::app::{App, AppEvent};
use crate::scheduler::RefreshTicket;
use crate::util::validate_url_for_open;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Task name reported in `AppEvent::TaskPanicked` for aggregation passes.
pub(super) const REFRESH_TASK: &str = "refresh";

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing (caught by Tokio's runtime but not
/// handled), panics are converted to `Err(String)` containing the panic message.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(e) = panic.downcast_ref::<Box<dyn std::error::Error + Send>>() {
                e.to_string()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawns one aggregation pass over every configured source.
///
/// The result comes back as `AppEvent::FeedsLoaded` tagged with the ticket's
/// generation. A panic inside the pass is reported as `TaskPanicked` so the
/// loop can release the scheduler.
pub(super) fn spawn_refresh(app: &App, ticket: RefreshTicket, event_tx: &mpsc::Sender<AppEvent>) {
    let aggregator = app.aggregator.clone();
    let sources = Arc::clone(&app.sources);
    let tx = event_tx.clone();
    let generation = ticket.generation;

    tracing::debug!(generation, sources = sources.len(), "Spawning refresh task");

    tokio::spawn(async move {
        let event = match catch_task_panic(aggregator.read(&sources)).await {
            Ok(result) => AppEvent::FeedsLoaded { generation, result },
            Err(panic_msg) => {
                tracing::error!(error = %panic_msg, generation, "Refresh task panicked");
                AppEvent::TaskPanicked {
                    task: REFRESH_TASK,
                    error: panic_msg,
                }
            }
        };

        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, event = "FeedsLoaded", "Channel send failed (receiver dropped)");
        }
    });
}

/// Opens the selected item's link in the system browser.
///
/// Does nothing until the user has interacted since the last refresh.
pub(super) fn open_selected(app: &mut App) {
    let Some(url) = app.open_target().map(str::to_owned) else {
        return;
    };

    // Feed links are untrusted; only hand http(s) to the opener
    if let Err(e) = validate_url_for_open(&url) {
        tracing::warn!(url = %url, error = %e, "Refusing to open link");
        app.set_status(format!("Cannot open link: {}", e));
    } else if let Err(e) = open::that(&url) {
        app.set_status(format!("Failed to open browser: {}", e));
    } else {
        tracing::debug!(url = %url, "Opened link");
    }
}
