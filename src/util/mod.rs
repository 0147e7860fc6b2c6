//! Small helpers shared by the loader and the renderer.
//!
//! - **URL validation**: sanity checks for configured sources and opened links
//! - **Text**: terminal column widths, truncation, and control-character stripping
//!
//! ```
//! use feedmux::util::{display_width, truncate_to_width, validate_url};
//!
//! assert!(validate_url("https://lobste.rs/rss").is_ok());
//! assert_eq!(display_width("r/rust"), 6);
//! assert_eq!(truncate_to_width("Hacker News", 6), "Hacker");
//! ```

mod text;
mod url_validator;

pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url, validate_url_for_open, UrlValidationError};
