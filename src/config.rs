//! Configuration file parser for ~/.config/feedmux/config.toml.
//!
//! Every key is optional and falls back to the built-in default. When no file
//! exists yet, [`Config::load_or_create`] writes the defaults out so the user
//! has something to edit. Unknown keys are accepted but logged as warnings
//! since they are usually typos.
use crate::feed::Source;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("HOME environment variable not set")]
    NoHomeDir,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Badge colors for sources generated from `subreddits`.
const SUBREDDIT_FG: &str = "#e4e6e9";
const SUBREDDIT_BG: &str = "#ff581a";
const SUBREDDIT_MAX_AGE_MINUTES: u64 = 24 * 60;

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Show a one-line summary under each title.
    pub show_descriptions: bool,

    /// Upper bound on the badge column width. 0 = as wide as the longest name.
    pub max_badge_width: usize,

    /// Show the key help and refresh countdown on the bottom line.
    pub show_help: bool,

    /// Seconds of inactivity before an automatic refresh. 0 = manual refresh only.
    pub poll_interval_seconds: u64,

    /// Per-source fetch timeout in seconds.
    pub fetch_timeout_seconds: u64,

    /// Subreddit names; each becomes an `r/<name>` source.
    pub subreddits: Vec<String>,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,

    pub sources: Vec<Source>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            show_descriptions: true,
            max_badge_width: 16,
            show_help: true,
            poll_interval_seconds: 60,
            fetch_timeout_seconds: 30,
            subreddits: vec!["programming".to_string(), "linux".to_string()],
            keybindings: HashMap::new(),
            sources: vec![
                Source::new("BBC", "http://feeds.bbci.co.uk/news/world/rss.xml")
                    .with_colors("#e4e6e9", "#930000")
                    .with_max_age_minutes(4 * 60),
                Source::new("Hacker News", "https://hnrss.org/newest?points=20")
                    .with_colors("#e4e6e9", "#cc5200"),
                Source::new("lobste.rs", "https://lobste.rs/rss").with_colors("#ffffff", "#5e0000"),
                Source::new(
                    "Register",
                    "https://www.theregister.com/security/headlines.atom",
                )
                .with_colors("#ffffff", "#ff581a"),
            ],
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: &'static [&'static str] = &[
        "theme",
        "show_descriptions",
        "max_badge_width",
        "show_help",
        "poll_interval_seconds",
        "fetch_timeout_seconds",
        "subreddits",
        "keybindings",
        "sources",
    ];

    /// `~/.config/feedmux/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var_os("HOME").ok_or(ConfigError::NoHomeDir)?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("feedmux")
            .join("config.toml"))
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match Self::read(path)? {
            Some(config) => Ok(config),
            None => Ok(Self::default()),
        }
    }

    /// Like [`Config::load`], but writes the defaults to `path` when the file
    /// doesn't exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if let Some(config) = Self::read(path)? {
            return Ok(config);
        }

        let config = Self::default();
        if !path.exists() {
            config.write_to(path)?;
            tracing::info!(path = %path.display(), "Wrote default configuration");
        }
        Ok(config)
    }

    /// Writes this configuration as TOML, creating the parent directory.
    ///
    /// On Unix the directory is made user-only (0700) and the file 0600.
    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))
                {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
        }

        let content = toml::to_string(self)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        std::io::Write::write_all(&mut file, content.as_bytes())?;
        Ok(())
    }

    /// Configured sources followed by one source per subreddit.
    pub fn sources(&self) -> Vec<Source> {
        self.sources
            .iter()
            .cloned()
            .chain(self.subreddits.iter().map(|name| {
                Source::new(
                    format!("r/{}", name),
                    format!("https://www.reddit.com/r/{}/.rss", name),
                )
                .with_colors(SUBREDDIT_FG, SUBREDDIT_BG)
                .with_max_age_minutes(SUBREDDIT_MAX_AGE_MINUTES)
            }))
            .collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Never zero; a zero timeout would fail every fetch.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds.max(1))
    }

    /// `None` when the file is missing or blank.
    fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        // Check file size before reading to avoid loading a huge or corrupted file.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(None);
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(None);
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(None);
        }

        // Parse as a raw table first to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.warn_on_suspicious_sources();
        tracing::info!(
            path = %path.display(),
            theme = %config.theme,
            sources = config.sources.len() + config.subreddits.len(),
            "Loaded configuration"
        );
        Ok(Some(config))
    }

    fn warn_on_suspicious_sources(&self) {
        for source in &self.sources {
            if let Err(e) = crate::util::validate_url(&source.url) {
                tracing::warn!(
                    name = %source.name,
                    url = %source.url,
                    error = %e,
                    "Source URL failed validation; fetching it will likely fail"
                );
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
