// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture session state
//!
//! All bundle mutation goes through this type; nothing else in the crate
//! writes bundle fields directly.

use std::collections::HashMap;

use super::bundle::{CapturedBundle, RequestLogEntry};
use super::cookies::CookieRecord;

/// One capture session's accumulation state, from the moment observation
/// is enabled until it is stopped or cleared.
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    bundle: CapturedBundle,
}

impl CaptureSession {
    /// Create a fresh session
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session continuing from a previously stored bundle
    pub fn from_bundle(bundle: CapturedBundle) -> Self {
        Self { bundle }
    }

    /// Read access to the accumulated bundle
    pub fn bundle(&self) -> &CapturedBundle {
        &self.bundle
    }

    /// Record the manifest URL. First seen wins: returns `true` only when
    /// the URL was actually set, `false` when one is already present.
    pub fn record_manifest_url(&mut self, url: &str) -> bool {
        if self.bundle.mpd_url.is_empty() {
            self.bundle.mpd_url = url.to_string();
            true
        } else {
            false
        }
    }

    /// Record the license URL. First seen wins.
    pub fn record_license_url(&mut self, url: &str) -> bool {
        if self.bundle.license_url.is_empty() {
            self.bundle.license_url = url.to_string();
            true
        } else {
            false
        }
    }

    /// Overwrite the manifest request headers (last seen wins)
    pub fn set_manifest_headers(&mut self, headers: HashMap<String, String>) {
        self.bundle.mpd_headers = headers;
    }

    /// Overwrite the license request headers (last seen wins)
    pub fn set_license_headers(&mut self, headers: HashMap<String, String>) {
        self.bundle.license_headers = headers;
    }

    /// Append captured cookies for a hostname. Appends without
    /// deduplication; an empty capture is a no-op.
    pub fn append_cookies(&mut self, host: &str, records: Vec<CookieRecord>) {
        if records.is_empty() {
            return;
        }
        self.bundle
            .cookies
            .entry(host.to_string())
            .or_default()
            .extend(records);
    }

    /// Store the joined PSSH payload text
    pub fn set_pssh(&mut self, joined: String) {
        self.bundle.pssh_data = joined;
    }

    /// Append a request log entry and bump the counter
    pub fn log_request(&mut self, entry: RequestLogEntry) {
        self.bundle.all_requests.push(entry);
        self.bundle.request_count += 1;
    }

    /// Continue from a previously persisted bundle
    pub fn absorb_stored(&mut self, stored: CapturedBundle) {
        self.bundle = stored;
    }

    /// Clear everything back to a fresh session
    pub fn reset(&mut self) {
        self.bundle = CapturedBundle::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Label;
    use chrono::Utc;

    fn entry(url: &str) -> RequestLogEntry {
        RequestLogEntry {
            url: url.to_string(),
            method: "GET".to_string(),
            timestamp: Utc::now(),
            label: Label::Other,
        }
    }

    #[test]
    fn test_manifest_url_first_wins() {
        let mut session = CaptureSession::new();

        assert!(session.record_manifest_url("https://a.example.com/stream.mpd"));
        assert!(!session.record_manifest_url("https://b.example.com/other.mpd"));
        assert_eq!(session.bundle().mpd_url, "https://a.example.com/stream.mpd");
    }

    #[test]
    fn test_license_url_survives_until_reset() {
        let mut session = CaptureSession::new();
        assert!(session.record_license_url("https://lic.example.com/acquire"));
        assert!(!session.record_license_url("https://lic2.example.com/acquire"));

        session.reset();
        assert!(session.bundle().license_url.is_empty());
        assert!(session.record_license_url("https://lic2.example.com/acquire"));
    }

    #[test]
    fn test_headers_last_wins() {
        let mut session = CaptureSession::new();

        let mut first = HashMap::new();
        first.insert("User-Agent".to_string(), "old".to_string());
        session.set_manifest_headers(first);

        let mut second = HashMap::new();
        second.insert("User-Agent".to_string(), "new".to_string());
        session.set_manifest_headers(second);

        assert_eq!(
            session.bundle().mpd_headers.get("User-Agent").map(String::as_str),
            Some("new")
        );
    }

    #[test]
    fn test_cookies_append_without_dedup() {
        let mut session = CaptureSession::new();
        let cookie = CookieRecord::new("id", "42").domain("example.com");

        session.append_cookies("example.com", vec![cookie.clone()]);
        session.append_cookies("example.com", vec![cookie]);

        assert_eq!(session.bundle().cookies["example.com"].len(), 2);
    }

    #[test]
    fn test_empty_cookie_capture_is_noop() {
        let mut session = CaptureSession::new();
        session.append_cookies("example.com", Vec::new());
        assert!(session.bundle().cookies.is_empty());
    }

    #[test]
    fn test_log_request_counts() {
        let mut session = CaptureSession::new();
        session.log_request(entry("https://a"));
        session.log_request(entry("https://b"));

        assert_eq!(session.bundle().request_count, 2);
        assert_eq!(session.bundle().all_requests.len(), 2);
        assert_eq!(session.bundle().all_requests[0].url, "https://a");
    }

    #[test]
    fn test_absorb_stored() {
        let mut stored = CapturedBundle::default();
        stored.mpd_url = "https://x/stream.mpd".to_string();
        stored.request_count = 7;

        let mut session = CaptureSession::new();
        session.absorb_stored(stored);

        assert_eq!(session.bundle().mpd_url, "https://x/stream.mpd");
        assert!(!session.record_manifest_url("https://y/other.mpd"));
    }
}
