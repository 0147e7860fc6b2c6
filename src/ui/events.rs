//! Background task event processing.

use crate::app::{App, AppEvent};
use tokio::time::Instant;

use super::helpers::REFRESH_TASK;

/// Applies one event from a background task to the app state.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    let now = Instant::now();
    match event {
        AppEvent::FeedsLoaded { generation, result } => {
            if !app.apply_feeds(generation, result, now) {
                tracing::debug!(generation, "Dropped stale refresh result");
            }
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_status(format!("Internal error in {}: {}", task, error));
            if task == REFRESH_TASK {
                app.abandon_refresh(now);
            }
        }
    }
}
