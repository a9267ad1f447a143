// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Observed exchange and request lifecycle events

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::headers::{HeaderRecord, extract_headers};
use crate::error::{Error, Result};

/// One network transaction as seen at a point in time.
///
/// Constructed fresh at each observation callback and never mutated
/// afterward. Depending on the lifecycle point, headers, body and status
/// may be absent.
#[derive(Debug, Clone)]
pub struct ObservedExchange {
    /// Request URL
    pub url: String,
    /// HTTP method (upper-case verb)
    pub method: String,
    /// Request headers, name casing preserved as received
    pub request_headers: HashMap<String, String>,
    /// Response headers, absent until the response phase
    pub response_headers: Option<HashMap<String, String>>,
    /// Raw request body, present only when the host captured it
    pub body: Option<Bytes>,
    /// Status code, present only after completion
    pub status: Option<u16>,
    /// Capture instant
    pub timestamp: DateTime<Utc>,
}

impl ObservedExchange {
    /// Create a new exchange
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into().to_ascii_uppercase(),
            request_headers: HashMap::new(),
            response_headers: None,
            body: None,
            status: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_headers.insert(name.into(), value.into());
        self
    }

    /// Set all request headers
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.request_headers = headers;
        self
    }

    /// Set response headers
    pub fn with_response_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.response_headers = Some(headers);
        self
    }

    /// Set the request body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the capture instant
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Look up a request header by case-insensitive name
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Best-effort text decode of the body. Undecodable byte sequences
    /// are replaced rather than raised.
    pub fn body_text(&self) -> Option<Cow<'_, str>> {
        self.body.as_ref().map(|b| String::from_utf8_lossy(b))
    }
}

/// A request lifecycle event as delivered by the host observer.
///
/// Each variant carries exactly the fields its lifecycle point supplies;
/// loosely-typed host payloads are validated into these variants at the
/// boundary via [`LifecycleEvent::from_message`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum LifecycleEvent {
    /// Request is about to be sent; the body may have been captured
    #[serde(rename_all = "camelCase")]
    RequestInitiated {
        url: String,
        method: String,
        #[serde(default)]
        body: Option<Vec<u8>>,
        #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
    /// Request headers are about to go on the wire
    #[serde(rename_all = "camelCase")]
    HeadersSent {
        url: String,
        method: String,
        #[serde(default)]
        headers: Vec<HeaderRecord>,
        #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
    /// Exchange completed with a status code
    #[serde(rename_all = "camelCase")]
    Completed {
        url: String,
        method: String,
        status_code: u16,
        #[serde(default)]
        response_headers: Vec<HeaderRecord>,
        #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
}

impl LifecycleEvent {
    /// Create a request-initiated event stamped now
    pub fn request_initiated(
        url: impl Into<String>,
        method: impl Into<String>,
        body: Option<Vec<u8>>,
    ) -> Self {
        Self::RequestInitiated {
            url: url.into(),
            method: method.into(),
            body,
            timestamp: Utc::now(),
        }
    }

    /// Create a headers-sent event stamped now
    pub fn headers_sent(
        url: impl Into<String>,
        method: impl Into<String>,
        headers: Vec<HeaderRecord>,
    ) -> Self {
        Self::HeadersSent {
            url: url.into(),
            method: method.into(),
            headers,
            timestamp: Utc::now(),
        }
    }

    /// Create a completed event stamped now
    pub fn completed(
        url: impl Into<String>,
        method: impl Into<String>,
        status_code: u16,
        response_headers: Vec<HeaderRecord>,
    ) -> Self {
        Self::Completed {
            url: url.into(),
            method: method.into(),
            status_code,
            response_headers,
            timestamp: Utc::now(),
        }
    }

    /// Validate a loosely-typed host payload into a lifecycle event
    pub fn from_message(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| Error::message(format!("malformed lifecycle event: {}", e)))
    }

    /// Request URL
    pub fn url(&self) -> &str {
        match self {
            Self::RequestInitiated { url, .. }
            | Self::HeadersSent { url, .. }
            | Self::Completed { url, .. } => url,
        }
    }

    /// HTTP method
    pub fn method(&self) -> &str {
        match self {
            Self::RequestInitiated { method, .. }
            | Self::HeadersSent { method, .. }
            | Self::Completed { method, .. } => method,
        }
    }

    /// Build the exchange view this event supports
    pub fn to_exchange(&self) -> ObservedExchange {
        match self {
            Self::RequestInitiated {
                url,
                method,
                body,
                timestamp,
            } => {
                let mut ex = ObservedExchange::new(url.clone(), method.clone())
                    .with_timestamp(*timestamp);
                if let Some(bytes) = body {
                    ex = ex.with_body(Bytes::from(bytes.clone()));
                }
                ex
            }
            Self::HeadersSent {
                url,
                method,
                headers,
                timestamp,
            } => ObservedExchange::new(url.clone(), method.clone())
                .with_headers(extract_headers(headers))
                .with_timestamp(*timestamp),
            Self::Completed {
                url,
                method,
                status_code,
                response_headers,
                timestamp,
            } => ObservedExchange::new(url.clone(), method.clone())
                .with_response_headers(extract_headers(response_headers))
                .with_status(*status_code)
                .with_timestamp(*timestamp),
        }
    }
}
