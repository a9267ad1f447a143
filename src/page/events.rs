// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page-context event types

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// URL keywords the page-context interceptor treats as DRM-related.
/// A third independently-evolved keyword set (no `lic`, unlike the
/// devtools panel); kept separate on purpose.
const PAGE_KEYWORDS: [&str; 9] = [
    ".mpd",
    "manifest",
    "license",
    "widevine",
    "playready",
    "fairplay",
    "cenc",
    "drm",
    ".m3u8",
];

/// Check whether a URL looks DRM-related from page context
pub fn is_drm_related_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    let url_lower = url.to_lowercase();
    PAGE_KEYWORDS.iter().any(|k| url_lower.contains(k))
}

/// Encode media init data for text transport
pub fn encode_init_data(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// How a page-level request was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageRequestKind {
    /// Via the Fetch API
    Fetch,
    /// Via XMLHttpRequest
    Xhr,
}

/// One event observed in page context.
///
/// Loosely-typed host messages validate into these variants through
/// [`PageEvent::from_message`]; anything unrecognized or incomplete is
/// an error value, never a crash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data")]
pub enum PageEvent {
    /// A media element fired an encrypted-media event
    #[serde(rename = "encryptedEvent", rename_all = "camelCase")]
    EncryptedMedia {
        init_data_type: String,
        init_data: Vec<u8>,
        #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
    /// A key session generated a license request
    #[serde(rename = "keySessionRequest", rename_all = "camelCase")]
    KeySessionRequest {
        init_data_type: String,
        init_data: Vec<u8>,
        #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
    /// The page asked for access to a key system
    #[serde(rename = "drmSystemRequest", rename_all = "camelCase")]
    DrmSystemRequest {
        key_system: String,
        #[serde(default)]
        configs: serde_json::Value,
        #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
    /// A media element started loading a DRM-related source
    #[serde(rename = "mediaSourceDetected", rename_all = "camelCase")]
    MediaSource {
        src: String,
        #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
    /// The page issued a DRM-related fetch/XHR
    #[serde(rename = "drmRequestDetected", rename_all = "camelCase")]
    DrmRequest {
        kind: PageRequestKind,
        url: String,
        #[serde(default)]
        method: Option<String>,
        #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
    /// A DRM-related response body carried PSSH markers
    #[serde(rename = "psshDetected", rename_all = "camelCase")]
    PsshSighting {
        url: String,
        content: String,
        #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
}

impl PageEvent {
    /// Validate a loosely-typed page message into an event
    pub fn from_message(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| Error::message(format!("malformed page event: {}", e)))
    }

    /// The event's action name as it appears on the wire
    pub fn action(&self) -> &'static str {
        match self {
            PageEvent::EncryptedMedia { .. } => "encryptedEvent",
            PageEvent::KeySessionRequest { .. } => "keySessionRequest",
            PageEvent::DrmSystemRequest { .. } => "drmSystemRequest",
            PageEvent::MediaSource { .. } => "mediaSourceDetected",
            PageEvent::DrmRequest { .. } => "drmRequestDetected",
            PageEvent::PsshSighting { .. } => "psshDetected",
        }
    }

    /// Base64 view of the init data, for events that carry one
    pub fn init_data_base64(&self) -> Option<String> {
        match self {
            PageEvent::EncryptedMedia { init_data, .. }
            | PageEvent::KeySessionRequest { init_data, .. } => {
                Some(encode_init_data(init_data))
            }
            _ => None,
        }
    }
}
