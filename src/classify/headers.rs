// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Header-list normalization

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single header record as supplied by the host observer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRecord {
    /// Header name, casing as received
    pub name: String,
    /// Header value
    pub value: String,
}

impl HeaderRecord {
    /// Create a new header record
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Normalize a host-supplied header list into a name→value mapping.
///
/// The last occurrence wins on duplicate names. Names are NOT folded by
/// case: `Content-Type` and `content-type` produce two distinct keys.
/// Multi-header value joining is deliberately not performed.
pub fn extract_headers(records: &[HeaderRecord]) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for record in records {
        headers.insert(record.name.clone(), record.value.clone());
    }
    headers
}

/// Render a header mapping as `Name: value` lines, sorted by name for
/// stable output.
pub fn format_headers(headers: &HashMap<String, String>) -> String {
    let mut entries: Vec<_> = headers.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_headers_empty() {
        assert!(extract_headers(&[]).is_empty());
    }

    #[test]
    fn test_extract_headers_last_wins_on_exact_duplicate() {
        let records = vec![
            HeaderRecord::new("Accept", "text/html"),
            HeaderRecord::new("Accept", "application/dash+xml"),
        ];

        let headers = extract_headers(&records);
        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.get("Accept").map(String::as_str),
            Some("application/dash+xml")
        );
    }

    #[test]
    fn test_extract_headers_keeps_case_distinct_keys() {
        let records = vec![
            HeaderRecord::new("Content-Type", "a"),
            HeaderRecord::new("content-type", "b"),
        ];

        let headers = extract_headers(&records);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Content-Type").map(String::as_str), Some("a"));
        assert_eq!(headers.get("content-type").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_format_headers() {
        let headers = extract_headers(&[
            HeaderRecord::new("User-Agent", "mustekala"),
            HeaderRecord::new("Accept", "*/*"),
        ]);

        let formatted = format_headers(&headers);
        assert_eq!(formatted, "Accept: */*\nUser-Agent: mustekala");
    }

    #[test]
    fn test_format_headers_empty() {
        assert_eq!(format_headers(&HashMap::new()), "");
    }
}
