use crate::app::App;
use crate::keybindings::Action as KbAction;
use crate::list::ListMode;
use ratatui::{layout::Rect, text::Line, widgets::Paragraph, Frame};
use std::borrow::Cow;
use tokio::time::Instant;

/// Render the bottom line: filter input, status message, or help.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect, now: Instant) {
    // Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }
    f.render_widget(Paragraph::new(bottom_line(app, now)), area);
}

/// Picks what the bottom line shows. The filter being typed always wins, then
/// a pending status message, then the active filter, then help.
pub(super) fn bottom_line(app: &App, now: Instant) -> Line<'_> {
    let palette = &app.palette;

    if app.list.mode() == ListMode::FilterEditing {
        return Line::styled(
            format!("Filter: {}\u{2588}", app.list.filter()),
            palette.filter_editing,
        );
    }

    if let Some((msg, _)) = &app.status_message {
        return Line::styled(msg.as_ref(), palette.status_message);
    }

    if app.list.mode() == ListMode::FilterActive {
        return Line::styled(
            format!("Filter: {} (esc to clear)", app.list.filter()),
            palette.filter_active,
        );
    }

    if app.config.show_help {
        return Line::styled(help_text(app, now), palette.help);
    }

    Line::default()
}

/// Whole seconds left before the next automatic refresh, rounded up.
/// `Some(0)` while a refresh is due or running.
pub(super) fn countdown_secs(app: &App, now: Instant) -> Option<u64> {
    app.scheduler
        .time_until_refresh(now)
        .map(|left| left.as_secs() + u64::from(left.subsec_nanos() > 0))
}

fn help_text(app: &App, now: Instant) -> String {
    let key = |action: KbAction| -> Cow<'static, str> {
        match app.keybindings.key_label(action) {
            Some(label) => Cow::Owned(label),
            None => Cow::Borrowed("-"),
        }
    };

    let mut text = format!(
        "{} - exit | {}/{} - select | {} - open | {} - clear | {} - filter | {} - refresh",
        key(KbAction::Quit),
        key(KbAction::NavDown),
        key(KbAction::NavUp),
        key(KbAction::Open),
        key(KbAction::Back),
        key(KbAction::EnterFilter),
        key(KbAction::Refresh),
    );

    match countdown_secs(app, now) {
        Some(0) => text.push_str(" | updating now"),
        Some(secs) => text.push_str(&format!(" | updating in {}s", secs)),
        None => {}
    }
    text
}
