// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network panel buffer and export

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::classify::{DevtoolsExchangeClassifier, ExchangeClassifier, Label, ObservedExchange};
use crate::watch::DEFAULT_USER_AGENT;

/// Panel configuration
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Maximum entries kept (oldest dropped beyond this)
    pub max_entries: usize,
    /// User agent string recorded in exports
    pub user_agent: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// One panel row built from a finished exchange
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelEntry {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Response status
    pub status: u16,
    /// Canonical reason phrase for the status
    pub status_text: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Response headers
    pub response_headers: HashMap<String, String>,
    /// Capture instant, epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Panel classification
    #[serde(rename = "type")]
    pub label: Label,
}

/// Panel entry subscriber callback
pub type PanelSubscriber = Arc<dyn Fn(&PanelEntry) + Send + Sync>;

/// Bounded newest-first panel over finished exchanges.
///
/// Only exchanges whose URL passes the devtools relevance filter are
/// admitted; each admitted entry is classified with the panel's own
/// classifier variant and published to entry subscribers.
pub struct NetworkPanel {
    classifier: DevtoolsExchangeClassifier,
    config: PanelConfig,
    entries: RwLock<VecDeque<PanelEntry>>,
    subscribers: RwLock<Vec<PanelSubscriber>>,
}

impl Default for NetworkPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkPanel {
    /// Create a panel with default configuration
    pub fn new() -> Self {
        Self::with_config(PanelConfig::default())
    }

    /// Create a panel with custom configuration
    pub fn with_config(config: PanelConfig) -> Self {
        Self {
            classifier: DevtoolsExchangeClassifier::new(),
            config,
            entries: RwLock::new(VecDeque::new()),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register an entry subscriber
    pub fn subscribe(&self, subscriber: PanelSubscriber) {
        self.subscribers.write().push(subscriber);
    }

    /// Feed one finished exchange. Returns the admitted entry, or `None`
    /// when the URL is not relevant to the panel.
    pub fn on_request_finished(&self, exchange: &ObservedExchange) -> Option<PanelEntry> {
        if !self.classifier.is_relevant(&exchange.url) {
            return None;
        }

        let status = exchange.status.unwrap_or(0);
        let entry = PanelEntry {
            url: exchange.url.clone(),
            method: exchange.method.clone(),
            status,
            status_text: status_text(status),
            headers: exchange.request_headers.clone(),
            response_headers: exchange.response_headers.clone().unwrap_or_default(),
            timestamp: exchange.timestamp,
            label: self.classifier.classify(exchange),
        };

        {
            let mut entries = self.entries.write();
            entries.push_front(entry.clone());
            entries.truncate(self.config.max_entries);
        }

        for subscriber in self.subscribers.read().iter() {
            subscriber(&entry);
        }

        Some(entry)
    }

    /// Snapshot of the current entries, newest first
    pub fn entries(&self) -> Vec<PanelEntry> {
        self.entries.read().iter().cloned().collect()
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the panel is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Export the panel contents as a JSON document
    pub fn export(&self) -> serde_json::Result<String> {
        let export = serde_json::json!({
            "requests": self.entries(),
            "exportedAt": Utc::now().to_rfc3339(),
            "userAgent": self.config.user_agent,
        });
        serde_json::to_string_pretty(&export)
    }
}

/// Canonical reason phrase for a status code, empty when unknown
fn status_text(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string()
}
