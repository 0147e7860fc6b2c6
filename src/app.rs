use crate::config::Config;
use crate::feed::{AggregationError, Aggregator, Item, Source};
use crate::keybindings::KeybindingRegistry;
use crate::list::{ListController, ListMode};
use crate::scheduler::{RefreshOutcome, RefreshScheduler, RefreshTicket};
use crate::theme::{ColorPalette, ThemeVariant};
use crate::util::display_width;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Longest filter the input line accepts.
pub const MAX_FILTER_LENGTH: usize = 256;

/// How long a status message stays on the bottom line.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// Events
// ============================================================================

/// Everything background tasks can report back to the event loop.
///
/// Tasks never touch `App` directly; they send one of these and the loop
/// applies it between input events.
#[derive(Debug)]
pub enum AppEvent {
    /// An aggregation pass finished.
    ///
    /// Fields:
    /// - `generation`: the scheduler ticket the pass was started with
    /// - `result`: the merged items, or every source that failed
    FeedsLoaded {
        generation: u64,
        result: Result<Vec<Item>, AggregationError>,
    },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "refresh")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// App State
// ============================================================================

/// Interactive application state, owned by the event loop.
pub struct App {
    pub config: Config,
    /// Expanded sources (configured plus subreddits), shared with refresh tasks.
    pub sources: Arc<Vec<Source>>,
    pub aggregator: Aggregator,
    pub list: ListController,
    pub scheduler: RefreshScheduler,
    pub keybindings: KeybindingRegistry,
    pub palette: ColorPalette,
    /// The user has pressed a key since the last refresh. Until then no row
    /// is highlighted and Open does nothing, so a refresh landing under the
    /// cursor can't open the wrong story.
    pub interacting: bool,
    /// Column width reserved for source badges.
    pub badge_width: usize,
    /// Status message with timestamp (auto-expires after 3 seconds)
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    /// Set whenever state changes; the loop only draws when it's true.
    pub needs_redraw: bool,
}

impl App {
    pub fn new(config: Config, aggregator: Aggregator) -> Self {
        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!(warning = %warning, "Keybinding override ignored");
        }

        let variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        });

        let sources = Arc::new(config.sources());
        let mut app = Self {
            scheduler: RefreshScheduler::new(config.poll_interval()),
            aggregator,
            sources,
            list: ListController::new(),
            keybindings,
            palette: variant.palette(),
            interacting: false,
            badge_width: 0,
            status_message: None,
            needs_redraw: true,
            config,
        };
        app.recompute_badge_width();
        app
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Terminal rows per item: title line, optional description, spacer.
    pub fn item_height(&self) -> u16 {
        if self.config.show_descriptions {
            3
        } else {
            2
        }
    }

    /// Resizes the viewport to the terminal height. The bottom row belongs to
    /// the help/filter line.
    pub fn set_viewport_rows(&mut self, rows: u16) {
        let usable = rows.saturating_sub(1);
        self.list
            .set_visible_count(usize::from(usable / self.item_height()));
    }

    fn recompute_badge_width(&mut self) {
        let widest = self
            .sources
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.list.items().iter().map(|i| i.source.name.as_str()))
            .map(display_width)
            .max()
            .unwrap_or(0);

        self.badge_width = match self.config.max_badge_width {
            0 => widest,
            cap => widest.min(cap),
        };
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// A key was handled: show the highlight and push back the next refresh.
    pub fn note_interaction(&mut self, now: Instant) {
        self.interacting = true;
        self.scheduler.note_activity(now);
        self.needs_redraw = true;
    }

    pub fn navigate(&mut self, delta: isize, force: bool) {
        self.list.move_selection(delta, force);
        self.needs_redraw = true;
    }

    pub fn page_size(&self) -> isize {
        self.list.visible_count() as isize
    }

    pub fn jump_to_start(&mut self) {
        self.navigate(-(self.list.filtered_len() as isize), false);
    }

    pub fn jump_to_end(&mut self) {
        self.navigate(self.list.filtered_len() as isize, false);
    }

    /// URL to open for the selected item. `None` unless the user is
    /// interacting and something is selected.
    pub fn open_target(&self) -> Option<&str> {
        if !self.interacting {
            return None;
        }
        self.list.selected_item().map(|item| item.url.as_str())
    }

    // ========================================================================
    // Filter editing
    // ========================================================================

    pub fn is_editing_filter(&self) -> bool {
        self.list.mode() == ListMode::FilterEditing
    }

    /// Starts a fresh filter; any previous filter text is discarded.
    pub fn begin_filter(&mut self) {
        self.list.set_filter("", true);
        self.interacting = false;
        self.needs_redraw = true;
    }

    /// Returns `false` when the filter is already at its maximum length.
    pub fn push_filter_char(&mut self, c: char) -> bool {
        if self.list.filter().chars().count() >= MAX_FILTER_LENGTH {
            return false;
        }
        let mut text = self.list.filter().to_string();
        text.push(c);
        self.list.set_filter(&text, true);
        self.needs_redraw = true;
        true
    }

    pub fn pop_filter_char(&mut self) {
        let mut text = self.list.filter().to_string();
        if text.pop().is_some() {
            self.list.set_filter(&text, true);
            self.needs_redraw = true;
        }
    }

    /// Leaves editing mode. An empty filter returns to plain browsing.
    pub fn commit_filter(&mut self) {
        let text = self.list.filter().to_string();
        self.list.set_filter(&text, false);
        self.needs_redraw = true;
    }

    pub fn cancel_filter(&mut self) {
        self.list.set_filter("", false);
        self.needs_redraw = true;
    }

    /// Esc while browsing: drop the filter and the highlight.
    pub fn clear(&mut self) {
        self.cancel_filter();
        self.interacting = false;
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Manual refresh. Also jumps back to the newest item.
    pub fn request_refresh(&mut self, now: Instant) -> Option<RefreshTicket> {
        let ticket = self.scheduler.request_manual(now);
        if ticket.is_none() {
            self.set_status("Refresh already in progress");
        }
        self.jump_to_start();
        ticket
    }

    /// Housekeeping check; returns a ticket when an automatic refresh is due.
    pub fn poll_refresh(&mut self, now: Instant) -> Option<RefreshTicket> {
        self.scheduler.tick(now)
    }

    /// Applies a finished aggregation pass.
    ///
    /// Results for a stale generation are dropped. A failed pass leaves the
    /// current items on screen and shows a status message instead.
    pub fn apply_feeds(
        &mut self,
        generation: u64,
        result: Result<Vec<Item>, AggregationError>,
        now: Instant,
    ) -> bool {
        let outcome = match &result {
            Ok(_) => RefreshOutcome::Succeeded,
            Err(_) => RefreshOutcome::Failed,
        };
        if !self
            .scheduler
            .complete(RefreshTicket { generation }, now, outcome)
        {
            return false;
        }

        match result {
            Ok(items) => {
                tracing::debug!(generation, items = items.len(), "Ingesting refreshed items");
                self.list.ingest(items);
                self.recompute_badge_width();
                self.interacting = false;
            }
            Err(e) => {
                tracing::warn!(
                    generation,
                    failed_sources = e.failures.len(),
                    error = %e,
                    "Refresh failed, keeping previous items"
                );
                self.set_status(format!("Refresh failed: {}", e));
            }
        }
        self.needs_redraw = true;
        true
    }

    /// The refresh task died without reporting; treat it as a failed pass so
    /// the scheduler doesn't stay in Fetching forever.
    pub fn abandon_refresh(&mut self, now: Instant) {
        let ticket = RefreshTicket {
            generation: self.scheduler.generation(),
        };
        self.scheduler.complete(ticket, now, RefreshOutcome::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FetchError, ItemId, SourceClient, SourceFeed, SourceFetchError};
    use crate::scheduler::RefreshState;
    use async_trait::async_trait;
    use tokio::time;

    struct EmptyClient;

    #[async_trait]
    impl SourceClient for EmptyClient {
        async fn fetch(&self, _source: &Source) -> Result<SourceFeed, FetchError> {
            Ok(SourceFeed::default())
        }
    }

    fn test_app() -> App {
        let config = Config {
            subreddits: Vec::new(),
            sources: vec![
                Source::new("Alpha", "https://alpha.example/rss"),
                Source::new("Beta", "https://beta.example/rss"),
            ],
            ..Config::default()
        };
        App::new(config, Aggregator::new(Arc::new(EmptyClient)))
    }

    fn item(source: &str, n: usize) -> Item {
        let url = format!("https://{}.example/{}", source.to_lowercase(), n);
        Item {
            id: ItemId::from_url(&url),
            source: Source::new(source, format!("https://{}.example/rss", source)),
            title: format!("{} story {}", source, n),
            description: url.clone(),
            url,
            image_url: None,
            published: None,
        }
    }

    fn loaded(app: &mut App, items: Vec<Item>) {
        let ticket = app.poll_refresh(Instant::now()).expect("refresh due");
        assert!(app.apply_feeds(ticket.generation, Ok(items), Instant::now()));
    }

    fn failure() -> AggregationError {
        AggregationError {
            failures: vec![SourceFetchError {
                name: "Alpha".to_string(),
                url: "https://alpha.example/rss".to_string(),
                error: FetchError::HttpStatus(500),
            }],
        }
    }

    #[test]
    fn test_new_app_uses_config() {
        let app = test_app();
        assert_eq!(app.sources.len(), 2);
        assert_eq!(app.badge_width, 5);
        assert_eq!(app.item_height(), 3);
        assert!(!app.interacting);
        assert_eq!(app.scheduler.state(), RefreshState::Idle);
    }

    #[test]
    fn test_badge_width_capped() {
        let config = Config {
            max_badge_width: 4,
            ..Config::default()
        };
        let app = App::new(config, Aggregator::new(Arc::new(EmptyClient)));
        assert_eq!(app.badge_width, 4);
    }

    #[test]
    fn test_badge_width_includes_resolved_names() {
        let mut app = test_app();
        loaded(&mut app, vec![item("Resolved Title", 1)]);
        assert_eq!(app.badge_width, "Resolved Title".len());
    }

    #[test]
    fn test_viewport_rows() {
        let mut app = test_app();
        app.set_viewport_rows(31);
        assert_eq!(app.list.visible_count(), 10);

        app.config.show_descriptions = false;
        app.set_viewport_rows(31);
        assert_eq!(app.list.visible_count(), 15);

        app.set_viewport_rows(0);
        assert_eq!(app.list.visible_count(), 1);
    }

    #[test]
    fn test_successful_refresh_ingests_and_resets_interaction() {
        let mut app = test_app();
        app.interacting = true;
        loaded(&mut app, vec![item("Alpha", 1), item("Beta", 2)]);

        assert_eq!(app.list.filtered_len(), 2);
        assert!(!app.interacting);
        assert_eq!(app.scheduler.state(), RefreshState::Cooldown);
    }

    #[test]
    fn test_failed_refresh_keeps_items() {
        let mut app = test_app();
        loaded(&mut app, vec![item("Alpha", 1)]);

        let ticket = app.request_refresh(Instant::now()).unwrap();
        assert!(app.apply_feeds(ticket.generation, Err(failure()), Instant::now()));

        assert_eq!(app.list.filtered_len(), 1);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("Refresh failed"));
        assert!(msg.contains("Alpha"));
        assert_eq!(app.scheduler.state(), RefreshState::Cooldown);
    }

    #[test]
    fn test_stale_result_dropped() {
        let mut app = test_app();
        loaded(&mut app, vec![item("Alpha", 1)]);
        let _current = app.request_refresh(Instant::now()).unwrap();

        assert!(!app.apply_feeds(1, Ok(Vec::new()), Instant::now()));
        assert_eq!(app.list.filtered_len(), 1);
        assert!(app.scheduler.is_fetching());
    }

    #[test]
    fn test_manual_refresh_while_fetching() {
        let mut app = test_app();
        app.poll_refresh(Instant::now()).unwrap();
        assert!(app.request_refresh(Instant::now()).is_none());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_manual_refresh_jumps_to_newest() {
        let mut app = test_app();
        app.set_viewport_rows(100);
        loaded(&mut app, (0..5).map(|n| item("Alpha", n)).collect());
        app.navigate(3, false);

        app.request_refresh(Instant::now());
        assert_eq!(app.list.selection_index(), Some(0));
    }

    #[test]
    fn test_abandon_refresh_unsticks_scheduler() {
        let mut app = test_app();
        app.poll_refresh(Instant::now()).unwrap();
        app.abandon_refresh(Instant::now());
        assert_eq!(app.scheduler.state(), RefreshState::Cooldown);
        assert!(app.request_refresh(Instant::now()).is_some());
    }

    #[test]
    fn test_open_requires_interaction() {
        let mut app = test_app();
        loaded(&mut app, vec![item("Alpha", 1)]);
        assert_eq!(app.open_target(), None);

        app.note_interaction(Instant::now());
        assert_eq!(app.open_target(), Some("https://alpha.example/1"));
    }

    #[test]
    fn test_filter_editing_flow() {
        let mut app = test_app();
        loaded(
            &mut app,
            vec![item("Alpha", 1), item("Beta", 2), item("Alpha", 3)],
        );

        app.begin_filter();
        assert!(app.is_editing_filter());
        for c in "beta".chars() {
            assert!(app.push_filter_char(c));
        }
        assert_eq!(app.list.filtered_len(), 1);

        app.pop_filter_char();
        assert_eq!(app.list.filter(), "bet");

        app.commit_filter();
        assert_eq!(app.list.mode(), ListMode::FilterActive);
        assert_eq!(app.list.filtered_len(), 1);

        app.clear();
        assert_eq!(app.list.mode(), ListMode::Browsing);
        assert_eq!(app.list.filtered_len(), 3);
        assert!(!app.interacting);
    }

    #[test]
    fn test_commit_empty_filter_returns_to_browsing() {
        let mut app = test_app();
        app.begin_filter();
        app.commit_filter();
        assert_eq!(app.list.mode(), ListMode::Browsing);
    }

    #[test]
    fn test_filter_length_limit() {
        let mut app = test_app();
        app.begin_filter();
        for _ in 0..MAX_FILTER_LENGTH {
            assert!(app.push_filter_char('x'));
        }
        assert!(!app.push_filter_char('x'));
        assert_eq!(app.list.filter().len(), MAX_FILTER_LENGTH);
    }

    #[test]
    fn test_filter_survives_refresh() {
        let mut app = test_app();
        loaded(&mut app, vec![item("Alpha", 1), item("Beta", 2)]);
        app.begin_filter();
        app.push_filter_char('b');
        app.commit_filter();

        let ticket = app.request_refresh(Instant::now()).unwrap();
        app.apply_feeds(
            ticket.generation,
            Ok(vec![item("Beta", 5), item("Alpha", 1), item("Beta", 2)]),
            Instant::now(),
        );
        assert_eq!(app.list.mode(), ListMode::FilterActive);
        assert_eq!(app.list.filtered_len(), 2);
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        time::pause();
        let mut app = test_app();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interaction_defers_automatic_refresh() {
        let mut app = test_app();
        loaded(&mut app, Vec::new());

        time::advance(Duration::from_secs(50)).await;
        app.note_interaction(Instant::now());
        time::advance(Duration::from_secs(20)).await;
        assert!(app.poll_refresh(Instant::now()).is_none());

        time::advance(Duration::from_secs(40)).await;
        assert!(app.poll_refresh(Instant::now()).is_some());
    }
}
