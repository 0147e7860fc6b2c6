use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns.
///
/// ```
/// use feedmux::util::display_width;
///
/// assert_eq!(display_width("Hello"), 5);
/// assert_eq!(display_width("你好"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cuts `s` so it occupies at most `max_width` columns. No ellipsis: badges
/// are short labels and a trailing "..." would eat most of them.
///
/// A wide character that would straddle the limit is dropped entirely.
///
/// ```
/// use feedmux::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Hacker News", 6), "Hacker");
/// assert_eq!(truncate_to_width("BBC", 16), "BBC");
/// assert_eq!(truncate_to_width("你好世界", 5), "你好");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    let mut width = 0;
    for (idx, c) in s.char_indices() {
        width += UnicodeWidthChar::width(c).unwrap_or(0);
        if width > max_width {
            return Cow::Owned(s[..idx].to_string());
        }
    }
    Cow::Borrowed(s)
}

/// Makes feed-supplied text safe to print on one terminal line.
///
/// Drops ANSI escape sequences (CSI `ESC [ ... final`, OSC `ESC ] ... BEL|ST`)
/// and C0/DEL control characters. Tabs, newlines and carriage returns become
/// single spaces so a multi-line title can't break the row layout.
///
/// Returns `Cow::Borrowed` when nothing needed changing.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| c.is_control()) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\t' | '\n' | '\r' => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            '\x1b' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    // Parameter and intermediate bytes up to the final byte
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
