//! feedmux: many RSS/Atom feeds merged into one live, newest-first list in
//! the terminal.
//!
//! - [`feed`] fetches and normalizes sources into [`feed::Item`]s
//! - [`scheduler`] decides when the next refresh runs
//! - [`list`] owns the filtered view, selection and scroll position
//! - [`ui`] drives it all from one event loop

pub mod app;
pub mod config;
pub mod feed;
pub mod keybindings;
pub mod list;
pub mod scheduler;
pub mod theme;
pub mod ui;
pub mod util;
