//! Keyboard and mouse input handling.

use crate::app::{App, AppEvent, MAX_FILTER_LENGTH};
use crate::keybindings::{Action as KbAction, Context};
use crossterm::event::{KeyCode, KeyModifiers, MouseEventKind};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::helpers::{open_selected, spawn_refresh};
use super::loop_runner::Action;

/// Main input dispatch function.
///
/// While the filter line is being edited every key goes to it; otherwise
/// keys are looked up in the Global context.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if app.is_editing_filter() {
        return handle_filter_input(app, code, modifiers);
    }

    let now = Instant::now();
    match app.keybindings.action_for_key(code, modifiers, Context::Global) {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::Back) => {
            app.clear();
            return Action::Continue;
        }
        Some(KbAction::EnterFilter) => {
            app.begin_filter();
            return Action::Continue;
        }
        Some(KbAction::NavDown) => app.navigate(1, false),
        Some(KbAction::NavUp) => app.navigate(-1, false),
        Some(KbAction::PageDown) => app.navigate(app.page_size(), false),
        Some(KbAction::PageUp) => app.navigate(-app.page_size(), false),
        Some(KbAction::JumpStart) => app.jump_to_start(),
        Some(KbAction::JumpEnd) => app.jump_to_end(),
        // Checked before the interaction below, so the first Enter after a
        // refresh only brings the highlight back
        Some(KbAction::Open) => open_selected(app),
        Some(KbAction::Refresh) => {
            if let Some(ticket) = app.request_refresh(now) {
                spawn_refresh(app, ticket, event_tx);
            }
        }
        Some(KbAction::CommitFilter) | Some(KbAction::CancelFilter) | None => {}
    }

    app.note_interaction(now);
    Action::Continue
}

/// Input while the filter line is open: Enter commits, Esc cancels,
/// Backspace deletes, printable characters are appended. Every key counts as
/// activity, so typing holds off the automatic refresh.
fn handle_filter_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let now = Instant::now();
    match app.keybindings.action_for_key(code, modifiers, Context::Filter) {
        Some(KbAction::CommitFilter) => {
            app.commit_filter();
            app.note_interaction(now);
        }
        Some(KbAction::CancelFilter) => {
            app.cancel_filter();
            app.note_interaction(now);
        }
        _ => {
            match code {
                KeyCode::Backspace => app.pop_filter_char(),
                KeyCode::Char(c)
                    if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    if !app.push_filter_char(c) {
                        app.set_status(format!(
                            "Filter too long (max {} chars)",
                            MAX_FILTER_LENGTH
                        ));
                    }
                }
                _ => {}
            }
            app.scheduler.note_activity(now);
        }
    }
    Action::Continue
}

/// Mouse wheel scrolls the list. Until the user has pressed a key the first
/// scroll jumps a whole page so the viewport visibly moves.
pub(super) fn handle_mouse(app: &mut App, kind: MouseEventKind) {
    if app.is_editing_filter() {
        return;
    }
    let delta = match kind {
        MouseEventKind::ScrollDown => 1,
        MouseEventKind::ScrollUp => -1,
        _ => return,
    };
    let force = !app.interacting;
    app.navigate(delta, force);
    app.scheduler.note_activity(Instant::now());
}
