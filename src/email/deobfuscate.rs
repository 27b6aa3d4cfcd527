//! Email deobfuscation ladder.
//!
//! Attribute payloads hide addresses behind several encodings. Each rung
//! decodes one scheme and re-validates the result; the first rung that
//! yields a plausible, non-noise address wins.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::patterns;

/// Try every known encoding of `raw` and return the first address that
/// validates. Returns `None` for empty input and for noise phrases.
#[must_use]
pub fn deobfuscate(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(email) = validate(raw) {
        return Some(email);
    }
    if let Some(email) = decode_base64(raw) {
        return Some(email);
    }
    if let Some(email) = decode_percent(raw) {
        return Some(email);
    }
    if let Some(email) = decode_spelled_out(raw) {
        return Some(email);
    }
    decode_spaced(raw)
}

/// Accept `candidate` when it contains the shape of an address whose
/// matched portion is not affordance text. Returns the matched address.
/// Demo-domain rejection belongs to the DOM cascade, not the decoder.
#[must_use]
pub fn validate(candidate: &str) -> Option<String> {
    let matched = patterns::EMAIL.find(candidate)?.as_str();
    if patterns::ADDRESS_NOISE.is_match(matched) {
        return None;
    }
    Some(matched.to_string())
}

fn decode_base64(raw: &str) -> Option<String> {
    // Addresses are at least a@b.cd; shorter inputs cannot decode to one.
    if raw.len() < 8 || !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=') {
        return None;
    }
    let decoded = BASE64.decode(raw).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    validate(&text)
}

fn decode_percent(raw: &str) -> Option<String> {
    if !raw.contains('%') {
        return None;
    }
    let decoded = urlencoding::decode(raw).ok()?;
    validate(&decoded)
}

/// `jane [at] acme [dot] org` and variants with parentheses.
fn decode_spelled_out(raw: &str) -> Option<String> {
    let lower = raw.to_lowercase();
    if !lower.contains("at") {
        return None;
    }
    let rewritten = lower
        .replace("[at]", "@")
        .replace("(at)", "@")
        .replace(" at ", "@")
        .replace("[dot]", ".")
        .replace("(dot)", ".")
        .replace(" dot ", ".")
        .replace(' ', "");
    validate(&rewritten)
}

/// Addresses broken apart by whitespace: `jane @ acme.org`.
fn decode_spaced(raw: &str) -> Option<String> {
    if !raw.contains('@') {
        return None;
    }
    let collapsed: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    validate(&collapsed)
}
