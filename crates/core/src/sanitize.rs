//! Strips active content from operator-supplied popup markup.
//!
//! Formatting tags, images and links survive; scripts, embedded frames,
//! inline event handlers and script URLs do not.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// URL schemes that execute in the page when followed.
const SCRIPT_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:text/html"];

lazy_static! {
    static ref BLOCK_ELEMENTS: Regex = Regex::new(
        r"(?is)<(script|style|iframe|object|embed)\b[^>]*>.*?</(script|style|iframe|object|embed)\s*>"
    )
    .expect("block element pattern");
    static ref STRAY_TAGS: Regex =
        Regex::new(r"(?i)</?(script|style|iframe|object|embed)\b[^>]*>").expect("stray tag pattern");
    // Browsers also accept `/` and a closing quote as attribute separators.
    static ref EVENT_HANDLERS: Regex =
        Regex::new(r#"(?i)(\s+|[/"'])on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#)
            .expect("handler pattern");
    static ref URL_ATTRIBUTES: Regex = Regex::new(
        r#"(?i)\b((?:xlink:)?href|src|action|formaction)\s*=\s*("[^"]*"|'[^']*'|[^\s>"']+)"#
    )
    .expect("url attribute pattern");
    static ref CHAR_REFERENCES: Regex =
        Regex::new(r"(?i)&#(?:x([0-9a-f]+)|([0-9]+));?|&(colon|tab|newline);")
            .expect("character reference pattern");
}

/// Sanitise popup content. Running it twice gives the same result as once.
pub fn sanitize_content(raw: &str) -> String {
    let without_blocks = BLOCK_ELEMENTS.replace_all(raw, "");
    let without_stray = STRAY_TAGS.replace_all(&without_blocks, "");
    let without_handlers = strip_event_handlers(&without_stray);
    neutralise_script_urls(&without_handlers)
}

/// Removing one handler can splice together another, so repeat until stable.
fn strip_event_handlers(html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let next = EVENT_HANDLERS
            .replace_all(&current, |caps: &Captures| {
                let separator = &caps[1];
                if separator.trim().is_empty() {
                    String::new()
                } else {
                    separator.to_string()
                }
            })
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

fn neutralise_script_urls(html: &str) -> String {
    URL_ATTRIBUTES
        .replace_all(html, |caps: &Captures| {
            let raw = &caps[2];
            let (quote, value) = match raw.chars().next() {
                Some(q @ ('"' | '\'')) => (q.to_string(), &raw[1..raw.len() - 1]),
                _ => (String::new(), raw),
            };
            if is_script_url(value) {
                format!("{}={quote}#{quote}", &caps[1])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Scheme check on the value as the browser will see it: character
/// references decoded, whitespace and control characters dropped.
fn is_script_url(value: &str) -> bool {
    let compact: String = decode_char_references(value)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    SCRIPT_SCHEMES.iter().any(|scheme| compact.starts_with(scheme))
}

fn decode_char_references(value: &str) -> String {
    CHAR_REFERENCES
        .replace_all(value, |caps: &Captures| {
            let code = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse::<u32>().ok()
            } else {
                let named = match caps[3].to_ascii_lowercase().as_str() {
                    "colon" => ":",
                    "tab" => "\t",
                    _ => "\n",
                };
                return named.to_string();
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned()
}
