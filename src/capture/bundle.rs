// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The accumulated capture record

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cookies::CookieRecord;
use crate::classify::Label;

/// One entry in the append-only request log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Capture instant, persisted as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Classification at capture time
    #[serde(rename = "type")]
    pub label: Label,
}

/// Everything accumulated over one capture session.
///
/// Field names follow the persisted storage record, so a bundle written
/// by an earlier capture loads unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapturedBundle {
    /// First manifest URL seen (empty until captured)
    pub mpd_url: String,
    /// First license URL seen (empty until captured)
    pub license_url: String,
    /// Headers of the most recent manifest request
    pub mpd_headers: HashMap<String, String>,
    /// Headers of the most recent license request
    pub license_headers: HashMap<String, String>,
    /// Captured cookies grouped by hostname
    pub cookies: HashMap<String, Vec<CookieRecord>>,
    /// Extracted PSSH payloads, blank-line separated
    pub pssh_data: String,
    /// Append-only log of observed requests
    pub all_requests: Vec<RequestLogEntry>,
    /// Total observed request count
    pub request_count: u64,
}

impl CapturedBundle {
    /// Whether anything has been captured yet
    pub fn is_empty(&self) -> bool {
        self.mpd_url.is_empty()
            && self.license_url.is_empty()
            && self.mpd_headers.is_empty()
            && self.license_headers.is_empty()
            && self.cookies.is_empty()
            && self.pssh_data.is_empty()
            && self.all_requests.is_empty()
            && self.request_count == 0
    }

    /// Export the bundle for copy/paste or download. The request log is
    /// left out, matching the presentation export of the capture UI.
    pub fn export_json(&self) -> serde_json::Result<String> {
        let export = serde_json::json!({
            "mpdUrl": self.mpd_url,
            "licenseUrl": self.license_url,
            "mpdHeaders": self.mpd_headers,
            "licenseHeaders": self.license_headers,
            "cookies": self.cookies,
            "psshData": self.pssh_data,
            "requestCount": self.request_count,
            "capturedAt": Utc::now().to_rfc3339(),
        });
        serde_json::to_string_pretty(&export)
    }
}
