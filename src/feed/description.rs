//! Short plain-text summaries from feed HTML.
//!
//! Feeds put anything from a tidy sentence to a full article body in their
//! summary/content fields. The list only has one line per item for a
//! description, so we keep the first line of text and reject anything that
//! would render badly or says nothing.

use regex::Regex;
use std::sync::OnceLock;

/// Minimum length (in characters) of a usable summary, measured after cleanup.
pub const MIN_DESCRIPTION_CHARS: usize = 40;

/// Placeholder tokens some aggregators (Reddit, HN mirrors) append to summaries.
const PLACEHOLDERS: &[&str] = &["[link]", "[comments]"];

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<.*?>").expect("tag pattern is a valid regex"))
}

/// Returns the first candidate that cleans up into a usable summary.
///
/// Candidates are tried in order (typically the summary field, then the full
/// content). Empty candidates are skipped. `None` means no candidate
/// qualified and the caller should fall back to the entry URL.
pub fn extract<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|c| !c.is_empty())
        .find_map(harvest)
}

/// Cleans one raw text blob.
///
/// Steps run in a fixed order: entity decoding, tag stripping, first line,
/// Latin-1 check, placeholder removal, space collapsing, then the length
/// check. The length check must come last so placeholders don't count.
pub fn harvest(raw: &str) -> Option<String> {
    let decoded = html_escape::decode_html_entities(raw);
    let stripped = tag_pattern().replace_all(&decoded, "");

    let mut line = stripped.trim();
    for sep in ['\n', '\r', '\t'] {
        line = line.split(sep).next().unwrap_or_default().trim();
    }

    // Scripts outside Latin-1 don't render with most terminal fonts the
    // badges are designed for.
    if line.chars().any(|c| u32::from(c) > 0xFF) {
        return None;
    }

    let mut text = line.to_string();
    for placeholder in PLACEHOLDERS {
        text = text.replace(placeholder, " ");
    }

    let collapsed = collapse_spaces(&text);
    let collapsed = collapsed.trim();

    if collapsed.chars().count() < MIN_DESCRIPTION_CHARS {
        return None;
    }
    Some(collapsed.to_string())
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !prev_space {
                out.push(c);
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    out
}
