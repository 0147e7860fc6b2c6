//! Frame layout: the item list on top, one line of help / filter / status
//! at the bottom.

use crate::app::App;
use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};
use tokio::time::Instant;

use super::{items, status};

/// Main render function.
///
/// Also keeps the list viewport in step with the terminal height, so scroll
/// math always matches what's drawn.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    app.set_viewport_rows(area.height);

    let [list_area, bottom_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    items::render(f, app, list_area);
    status::render(f, app, bottom_area, Instant::now());
}
