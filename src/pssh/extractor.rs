// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! PSSH payload scanning

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Scan patterns in fixed evaluation order: namespaced element,
    /// unqualified element, attribute form, JSON-string form. Attributes
    /// on the element forms are ignored.
    static ref PSSH_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)<cenc:pssh[^>]*>([^<]+)</cenc:pssh>").unwrap(),
        Regex::new(r"(?i)<pssh[^>]*>([^<]+)</pssh>").unwrap(),
        Regex::new(r#"(?i)pssh="([^"]+)""#).unwrap(),
        Regex::new(r#"(?i)"pssh":"([^"]+)""#).unwrap(),
    ];
}

/// Extract the ordered set of unique PSSH payloads embedded in `text`.
///
/// Patterns are applied in their fixed order; within a pattern, matches
/// come in document order. Captured payloads are trimmed, empty captures
/// dropped, and duplicates (exact string equality) suppressed so that the
/// first sighting wins. Never fails: malformed input simply yields fewer
/// matches.
pub fn extract_pssh(text: &str) -> Vec<String> {
    let mut payloads: Vec<String> = Vec::new();

    for pattern in PSSH_PATTERNS.iter() {
        for captures in pattern.captures_iter(text) {
            if let Some(capture) = captures.get(1) {
                let payload = capture.as_str().trim();
                if !payload.is_empty() && !payloads.iter().any(|p| p == payload) {
                    payloads.push(payload.to_string());
                }
            }
        }
    }

    payloads
}

/// Join extracted payloads with a blank line, the form stored in the
/// capture bundle. Empty input yields an empty string.
pub fn join_pssh(payloads: &[String]) -> String {
    payloads.join("\n\n")
}
