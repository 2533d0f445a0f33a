// Wed Jan 15 2026 - Alex

use crate::pattern::{ByteToken, Notation, Pattern};
use std::fmt::Write;

pub const DEFAULT_WILDCARD: &str = "?";

/// Appended to signatures built without instruction metadata.
pub const RAW_MARKER: &str = "[RAW BYTES - NO WILDCARDS]";

pub fn render(pattern: &Pattern, notation: Notation, wildcard: &str) -> String {
    match notation {
        Notation::Norm => render_norm(pattern, wildcard),
        Notation::Code => render_code(pattern),
    }
}

/// `48 89 ? 9A` with `wildcard` standing in for every wildcard byte.
pub fn render_norm(pattern: &Pattern, wildcard: &str) -> String {
    pattern
        .tokens()
        .iter()
        .map(|token| match token {
            ByteToken::Exact(b) => format!("{:02X}", b),
            ByteToken::Wildcard => wildcard.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"\x48\x89\x00\x9A", "xx?x"`; wildcard bytes are written as `\x00`.
pub fn render_code(pattern: &Pattern) -> String {
    let mut bytes = String::with_capacity(pattern.len() * 4);
    let mut mask = String::with_capacity(pattern.len());

    for token in pattern.tokens() {
        let _ = write!(bytes, "\\x{:02X}", token.to_byte().unwrap_or(0));
        mask.push(if token.is_wildcard() { '?' } else { 'x' });
    }

    format!("\"{}\", \"{}\"", bytes, mask)
}
