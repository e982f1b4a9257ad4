//! Rendering of generated text.
//!
//! Generated text is untrusted. The stored result stays byte-exact, but every
//! display path goes through `sanitize_generated` first: terminal escape
//! sequences could otherwise rewrite the screen, retitle the window or
//! smuggle hyperlinks, and bidi overrides can make text read differently
//! from what it is.

use std::sync::LazyLock;

use regex::Regex;
use termimad::MadSkin;

/// CSI, OSC and two-byte ESC sequences.
static TERMINAL_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b(?:\[[0-?]*[ -/]*[@-~]|\][^\x07\x1b]*(?:\x07|\x1b\\)?|[@-_])")
        .expect("terminal escape pattern is valid")
});

fn is_bidi_override(c: char) -> bool {
    matches!(c, '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}')
}

/// Strips escape sequences, control characters (except newline and tab) and
/// bidi overrides. Markdown syntax is left alone.
pub fn sanitize_generated(text: &str) -> String {
    TERMINAL_ESCAPE
        .replace_all(text, "")
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || !(c.is_control() || is_bidi_override(c)))
        .collect()
}

/// Renders sanitized Markdown for the terminal.
pub fn to_terminal(markdown: &str) -> String {
    let skin = MadSkin::default();
    format!("{}", skin.term_text(&sanitize_generated(markdown)))
}
