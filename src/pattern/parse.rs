// Wed Jan 15 2026 - Alex

use crate::pattern::format::RAW_MARKER;
use crate::pattern::{ByteToken, Notation, Pattern, PatternError};
use std::borrow::Cow;

pub fn parse(text: &str, notation: Notation, wildcard_alias: Option<&str>) -> Result<Pattern, PatternError> {
    match notation {
        Notation::Norm => parse_norm(text, wildcard_alias),
        Notation::Code => parse_code(text),
    }
}

/// Parses `48 89 5C ? ?? 9A`. Quotes, commas and other punctuation separate
/// tokens, so pasted strings such as `"48 89 ?'` or `0x48, 0x89` are accepted.
/// When `wildcard_alias` is set (and is not `?`) every occurrence of it is read
/// as a wildcard.
pub fn parse_norm(text: &str, wildcard_alias: Option<&str>) -> Result<Pattern, PatternError> {
    let text = strip_raw_marker(text);
    if text.trim().is_empty() {
        return Err(PatternError::EmptyInput);
    }

    let text = match wildcard_alias {
        Some(alias) if !alias.is_empty() && alias != "?" => Cow::Owned(text.replace(alias, "?")),
        _ => Cow::Borrowed(text),
    };

    let tokens = text
        .split(is_norm_separator)
        .filter(|word| !word.is_empty())
        .map(parse_norm_word)
        .collect::<Result<Vec<_>, _>>()?;

    Pattern::new(tokens)
}

fn is_norm_separator(c: char) -> bool {
    !c.is_alphanumeric() && c != '?'
}

fn parse_norm_word(word: &str) -> Result<ByteToken, PatternError> {
    let digits = word
        .strip_prefix("0x")
        .or_else(|| word.strip_prefix("0X"))
        .unwrap_or(word);

    if digits.is_empty() {
        return Err(PatternError::syntax(format!("dangling hex prefix '{}'", word)));
    }
    if digits.chars().count() > 2 {
        return Err(PatternError::syntax(format!("token '{}' is longer than one byte", word)));
    }
    if digits.chars().all(|c| c == '?') {
        return Ok(ByteToken::Wildcard);
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(PatternError::syntax(format!("unexpected character '{}' in token '{}'", bad, word)));
    }

    u8::from_str_radix(digits, 16)
        .map(ByteToken::Exact)
        .map_err(|e| PatternError::syntax(format!("token '{}': {}", word, e)))
}

fn strip_raw_marker(text: &str) -> &str {
    let trimmed = text.trim_end();
    trimmed.strip_suffix(RAW_MARKER).unwrap_or(text)
}

/// Parses `"\x48\x89\x00", "xx?"`. The mask must have exactly one `x`/`?` per
/// escaped byte.
pub fn parse_code(text: &str) -> Result<Pattern, PatternError> {
    if text.trim().is_empty() {
        return Err(PatternError::EmptyInput);
    }

    let raw = text.as_bytes();
    let mut pos = text
        .find("\\x")
        .ok_or_else(|| PatternError::syntax("no \\x escapes found"))?;

    let mut bytes = Vec::new();
    while raw[pos..].starts_with(b"\\x") {
        let byte = raw
            .get(pos + 2..pos + 4)
            .and_then(|pair| Some(hex_value(pair[0])? << 4 | hex_value(pair[1])?))
            .ok_or_else(|| PatternError::syntax(format!("unterminated escape at offset {}", pos)))?;
        bytes.push(byte);
        pos += 4;
    }

    pos = skip_filler(text, pos);
    if raw.get(pos) != Some(&b',') {
        return Err(PatternError::syntax("expected ',' followed by a mask after the byte string"));
    }
    pos = skip_filler(text, pos + 1);

    let mask: Vec<u8> = raw[pos..]
        .iter()
        .copied()
        .take_while(|&c| c == b'x' || c == b'?')
        .collect();

    if mask.is_empty() {
        return Err(PatternError::syntax("missing mask"));
    }
    if mask.len() != bytes.len() {
        return Err(PatternError::syntax(format!(
            "mask has {} character(s) for {} byte(s)",
            mask.len(),
            bytes.len()
        )));
    }

    let tokens = bytes
        .into_iter()
        .zip(mask)
        .map(|(byte, m)| if m == b'?' { ByteToken::Wildcard } else { ByteToken::Exact(byte) })
        .collect();

    Pattern::new(tokens)
}

fn skip_filler(text: &str, pos: usize) -> usize {
    text[pos..]
        .find(|c: char| !(c.is_whitespace() || is_quote(c)))
        .map_or(text.len(), |offset| pos + offset)
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}')
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
