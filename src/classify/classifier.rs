// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Exchange classifiers
//!
//! Two independently-evolved classifier variants exist and are kept
//! separate on purpose: the background observer's full predicate
//! (URL + body + headers) and the devtools panel's URL-only variant with
//! its wider keyword set. Unifying them would change observable labels
//! for URLs containing `lic` without any of the core keywords.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::exchange::ObservedExchange;

/// Keywords that mark license traffic in the background observer
const LICENSE_KEYWORDS: [&str; 5] = ["license", "widevine", "playready", "fairplay", "cenc"];

/// Minimum URL length for the octet-stream license heuristic
const OCTET_STREAM_MIN_URL_LEN: usize = 50;

/// URL keywords the devtools panel labels as license traffic
const PANEL_LICENSE_KEYWORDS: [&str; 4] = ["license", "widevine", "playready", "lic"];

/// URL keywords that make an exchange relevant to the devtools panel
const PANEL_RELEVANT_KEYWORDS: [&str; 10] = [
    ".mpd",
    "manifest",
    "license",
    "widevine",
    "playready",
    "fairplay",
    "cenc",
    "drm",
    ".m3u8",
    "lic",
];

/// Classification label for one observed exchange.
///
/// Serialized forms match the persisted capture record (`MPD`, `LICENSE`,
/// `HLS`, `OTHER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Streaming manifest traffic (DASH MPD or anything manifest-like)
    #[serde(rename = "MPD")]
    Manifest,
    /// DRM license-server traffic
    #[serde(rename = "LICENSE")]
    License,
    /// HLS playlist traffic
    #[serde(rename = "HLS")]
    Hls,
    /// Everything else
    #[serde(rename = "OTHER")]
    Other,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Label::Manifest => "MPD",
            Label::License => "LICENSE",
            Label::Hls => "HLS",
            Label::Other => "OTHER",
        };
        write!(f, "{}", s)
    }
}

/// Classifier over one observed exchange. Pure and total: always returns
/// a label, never fails, regardless of which fields are present.
pub trait ExchangeClassifier {
    /// Classify one exchange
    fn classify(&self, exchange: &ObservedExchange) -> Label;
}

/// Check whether a URL names streaming-manifest traffic. Substring
/// containment on the lower-cased URL, shared by both classifier variants.
pub fn is_manifest_url(url: &str) -> bool {
    let url_lower = url.to_lowercase();
    url_lower.contains(".mpd") || url_lower.contains("manifest")
}

/// The background observer's classifier.
///
/// Keyword matching is pure substring containment with no word-boundary
/// logic, so `license` matches `prelicensed`. That imprecision tracks
/// real-world URL variance and must not be tightened.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundExchangeClassifier;

impl BackgroundExchangeClassifier {
    /// Create a new background classifier
    pub fn new() -> Self {
        Self
    }

    /// License predicate over the full exchange. Any clause matching is
    /// enough:
    /// - a license keyword in the URL, on a GET or POST
    /// - a license keyword in the request body text, on a POST
    /// - an `application/octet-stream` content type on a POST whose URL
    ///   is longer than 50 characters
    pub fn is_license_request(&self, exchange: &ObservedExchange) -> bool {
        let url_lower = exchange.url.to_lowercase();
        let url_has_keyword = LICENSE_KEYWORDS.iter().any(|k| url_lower.contains(k));

        let is_post = exchange.method == "POST";
        let is_get = exchange.method == "GET";

        let body_has_keyword = exchange
            .body_text()
            .map(|text| {
                let body_lower = text.to_lowercase();
                LICENSE_KEYWORDS.iter().any(|k| body_lower.contains(k))
            })
            .unwrap_or(false);

        let octet_stream = exchange
            .request_header("content-type")
            .map(|v| v.contains("application/octet-stream"))
            .unwrap_or(false);

        (url_has_keyword && (is_post || is_get))
            || (body_has_keyword && is_post)
            || (octet_stream && is_post && exchange.url.len() > OCTET_STREAM_MIN_URL_LEN)
    }
}

impl ExchangeClassifier for BackgroundExchangeClassifier {
    fn classify(&self, exchange: &ObservedExchange) -> Label {
        if is_manifest_url(&exchange.url) {
            return Label::Manifest;
        }
        if self.is_license_request(exchange) {
            return Label::License;
        }
        if exchange.url.to_lowercase().contains(".m3u8") {
            return Label::Hls;
        }
        Label::Other
    }
}

/// The devtools panel's classifier: URL-only, with `lic` in its license
/// keyword set and none of the background variant's method/body/header
/// clauses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevtoolsExchangeClassifier;

impl DevtoolsExchangeClassifier {
    /// Create a new devtools classifier
    pub fn new() -> Self {
        Self
    }

    /// Whether a URL is worth showing in the panel at all
    pub fn is_relevant(&self, url: &str) -> bool {
        let url_lower = url.to_lowercase();
        PANEL_RELEVANT_KEYWORDS.iter().any(|k| url_lower.contains(k))
    }
}

impl ExchangeClassifier for DevtoolsExchangeClassifier {
    fn classify(&self, exchange: &ObservedExchange) -> Label {
        let url_lower = exchange.url.to_lowercase();
        if url_lower.contains(".mpd") || url_lower.contains("manifest") {
            return Label::Manifest;
        }
        if PANEL_LICENSE_KEYWORDS.iter().any(|k| url_lower.contains(k)) {
            return Label::License;
        }
        if url_lower.contains(".m3u8") {
            return Label::Hls;
        }
        Label::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_bg(exchange: &ObservedExchange) -> Label {
        BackgroundExchangeClassifier::new().classify(exchange)
    }

    #[test]
    fn test_manifest_url_wins_regardless_of_method() {
        for method in ["GET", "POST", "HEAD", "OPTIONS"] {
            let ex = ObservedExchange::new("https://cdn.example.com/stream/manifest.mpd", method);
            assert_eq!(classify_bg(&ex), Label::Manifest);
        }
    }

    #[test]
    fn test_manifest_keyword_anywhere_in_url() {
        let ex = ObservedExchange::new("https://cdn.example.com/Manifest?id=42", "GET");
        assert_eq!(classify_bg(&ex), Label::Manifest);

        let ex = ObservedExchange::new("https://cdn.example.com/path/STREAM.MPD", "GET");
        assert_eq!(classify_bg(&ex), Label::Manifest);
    }

    #[test]
    fn test_manifest_beats_license_keywords() {
        // precedence: manifest rule is evaluated before the license predicate
        let ex = ObservedExchange::new("https://lic.example.com/widevine/manifest", "POST");
        assert_eq!(classify_bg(&ex), Label::Manifest);
    }

    #[test]
    fn test_license_url_keyword_get_and_post() {
        for method in ["GET", "POST"] {
            let ex = ObservedExchange::new("https://lic.example.com/getlicense", method);
            assert_eq!(classify_bg(&ex), Label::License);
        }

        // other methods do not satisfy the URL clause
        let ex = ObservedExchange::new("https://lic.example.com/getlicense", "HEAD");
        assert_eq!(classify_bg(&ex), Label::Other);
    }

    #[test]
    fn test_license_substring_semantics() {
        // no word boundaries: "license" matches "prelicensed"
        let ex = ObservedExchange::new("https://example.com/prelicensed/data", "GET");
        assert_eq!(classify_bg(&ex), Label::License);
    }

    #[test]
    fn test_license_body_keyword_post_only() {
        let ex = ObservedExchange::new("https://api.example.com/keys", "POST")
            .with_body("widevine-request".as_bytes().to_vec());
        assert_eq!(classify_bg(&ex), Label::License);

        // the body clause requires POST
        let ex = ObservedExchange::new("https://api.example.com/keys", "GET")
            .with_body("widevine-request".as_bytes().to_vec());
        assert_eq!(classify_bg(&ex), Label::Other);
    }

    #[test]
    fn test_license_body_keyword_case_insensitive() {
        let ex = ObservedExchange::new("https://api.example.com/keys", "POST")
            .with_body("WIDEVINE challenge".as_bytes().to_vec());
        assert_eq!(classify_bg(&ex), Label::License);
    }

    #[test]
    fn test_license_octet_stream_needs_long_url() {
        let long_url = format!("https://api.example.com/{}", "k".repeat(60));
        let ex = ObservedExchange::new(long_url, "POST")
            .with_header("Content-Type", "application/octet-stream");
        assert_eq!(classify_bg(&ex), Label::License);

        // short URL fails the clause
        let ex = ObservedExchange::new("https://a.io/k", "POST")
            .with_header("Content-Type", "application/octet-stream");
        assert_eq!(classify_bg(&ex), Label::Other);

        // GET fails the clause
        let long_url = format!("https://api.example.com/{}", "k".repeat(60));
        let ex = ObservedExchange::new(long_url, "GET")
            .with_header("Content-Type", "application/octet-stream");
        assert_eq!(classify_bg(&ex), Label::Other);
    }

    #[test]
    fn test_hls() {
        let ex = ObservedExchange::new("https://cdn.example.com/video/playlist.m3u8", "GET");
        assert_eq!(classify_bg(&ex), Label::Hls);
    }

    #[test]
    fn test_degenerate_inputs_never_panic() {
        let labels = [
            classify_bg(&ObservedExchange::new("", "")),
            classify_bg(&ObservedExchange::new("not a url at all", "WEIRD")),
            classify_bg(&ObservedExchange::new("https://x", "POST").with_body(Vec::<u8>::new())),
        ];
        for label in labels {
            assert!(matches!(
                label,
                Label::Manifest | Label::License | Label::Hls | Label::Other
            ));
        }
    }

    #[test]
    fn test_devtools_lic_divergence() {
        // "lic" alone satisfies only the devtools variant
        let ex = ObservedExchange::new("https://cdn.example.com/lic/acquire", "GET");
        assert_eq!(DevtoolsExchangeClassifier::new().classify(&ex), Label::License);
        assert_eq!(classify_bg(&ex), Label::Other);
    }

    #[test]
    fn test_devtools_ignores_method_and_body() {
        // URL-only: a POST body keyword means nothing to the panel variant
        let ex = ObservedExchange::new("https://api.example.com/keys", "POST")
            .with_body("widevine".as_bytes().to_vec());
        assert_eq!(DevtoolsExchangeClassifier::new().classify(&ex), Label::Other);

        let ex = ObservedExchange::new("https://lic.example.com/widevine", "HEAD");
        assert_eq!(DevtoolsExchangeClassifier::new().classify(&ex), Label::License);
    }

    #[test]
    fn test_devtools_relevance_filter() {
        let devtools = DevtoolsExchangeClassifier::new();
        assert!(devtools.is_relevant("https://cdn.example.com/stream.mpd"));
        assert!(devtools.is_relevant("https://example.com/drm/init"));
        assert!(devtools.is_relevant("https://example.com/public/lic"));
        assert!(!devtools.is_relevant("https://example.com/index.html"));
    }

    #[test]
    fn test_label_display_and_serde() {
        assert_eq!(Label::Manifest.to_string(), "MPD");
        assert_eq!(
            serde_json::to_string(&Label::License).unwrap(),
            "\"LICENSE\""
        );
        assert_eq!(
            serde_json::from_str::<Label>("\"HLS\"").unwrap(),
            Label::Hls
        );
    }
}
