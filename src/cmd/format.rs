/*!
format.rs

Formatting primitives for human output (boxed headers, key/value tables,
status coloring). Machine output (`--json`) never goes through here.

Style decisions:
  - color on unless NO_COLOR is set
  - emoji on unless NO_EMOJI is set
  - width from COLUMNS (clamped 40..=220), default 100

API:
  - StyleOptions::detect() / StyleOptions::plain()
  - color(role, text, &style)
  - emoji(tag, &style)
  - status_role(status)
  - box_header(title, subtitle, &style)
  - kv_table(rows, &style)
  - truncate_ellipsis(s, max_chars)
*/

use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width: width,
        }
    }

    /// No color, no emoji.
    #[cfg(test)]
    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width: 100,
        }
    }
}

/* ---- Color / Emoji ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Warning,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Success => "38;5;82",
        Role::Warning => "38;5;214",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "warn" => "⚠",
        "info" => "ℹ",
        _ => "",
    }
}

/// 2xx green, 404 orange, everything else red.
pub fn status_role(status: u16) -> Role {
    match status {
        200..=299 => Role::Success,
        404 => Role::Warning,
        _ => Role::Error,
    }
}

/* ---- Box Header ---- */

pub fn box_header(
    title: impl AsRef<str>,
    subtitle: Option<impl AsRef<str>>,
    style: &StyleOptions,
) -> String {
    let title = color(Role::Primary, title.as_ref(), style);
    let inner = match subtitle {
        Some(s) => format!("{title}  {}", color(Role::Secondary, s.as_ref(), style)),
        None => title,
    };

    let max_inner = style.term_width.clamp(20, 200) - 4;
    let plain_len = display_width(&inner);
    // Over-long headers are cut on their plain text so escape codes are never split.
    let (content, width) = if plain_len > max_inner {
        let cut = truncate_ellipsis(&strip_ansi(&inner), max_inner);
        let w = display_width(&cut);
        (cut, w)
    } else {
        (inner, plain_len)
    };

    let bar = "─".repeat(width + 2);
    format!("┌{bar}┐\n│ {content} │\n└{bar}┘")
}

/* ---- Key / Value Table ---- */

/// Two aligned columns; values longer than the terminal allows are truncated.
pub fn kv_table(rows: &[(String, String)], style: &StyleOptions) -> String {
    let key_width = rows
        .iter()
        .map(|(k, _)| display_width(k))
        .max()
        .unwrap_or(0);
    let value_room = style.term_width.saturating_sub(key_width + 2).max(8);

    rows.iter()
        .map(|(k, v)| {
            let pad = " ".repeat(key_width - display_width(k));
            format!(
                "{}{pad}  {}",
                color(Role::Accent, k, style),
                truncate_ellipsis(v, value_room)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/* ---- Text Helpers ---- */

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Drop CSI escape sequences (`ESC [ ... letter`).
fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}
