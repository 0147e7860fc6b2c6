//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard and mouse input handling
//! - `events` - Background task event processing
//! - `render` - Frame layout
//! - `items` - Item list widget
//! - `status` - Help / filter / status line
//! - `helpers` - Refresh spawning, link opening, panic capture

mod events;
mod helpers;
mod input;
mod items;
mod loop_runner;
mod render;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
