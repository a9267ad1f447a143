// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Forwarding page events into the watcher

use std::sync::Arc;

use super::events::PageEvent;
use crate::error::Result;
use crate::watch::TrafficWatcher;

/// Explicit channel from page-context observation into the watcher.
///
/// PSSH sightings feed the extractor directly (the document text is
/// already in hand, no re-fetch needed); the remaining events surface as
/// structured diagnostics.
pub struct PageEventRelay {
    watcher: Arc<TrafficWatcher>,
}

impl PageEventRelay {
    /// Create a relay into the given watcher
    pub fn new(watcher: Arc<TrafficWatcher>) -> Self {
        Self { watcher }
    }

    /// Forward one page event
    pub fn relay(&self, event: &PageEvent) {
        match event {
            PageEvent::PsshSighting { url, content, .. } => {
                tracing::info!(url = %url, "PSSH sighting from page context");
                self.watcher.ingest_manifest_text(content);
            }
            PageEvent::MediaSource { src, .. } => {
                tracing::info!(src = %src, "media source detected");
            }
            PageEvent::DrmRequest { kind, url, .. } => {
                tracing::info!(?kind, url = %url, "DRM-related request from page");
            }
            PageEvent::EncryptedMedia {
                init_data_type,
                init_data,
                ..
            } => {
                tracing::info!(
                    init_data_type = %init_data_type,
                    init_data_len = init_data.len(),
                    "encrypted media event"
                );
            }
            PageEvent::KeySessionRequest {
                init_data_type,
                init_data,
                ..
            } => {
                tracing::info!(
                    init_data_type = %init_data_type,
                    init_data_len = init_data.len(),
                    "key session license request generated"
                );
            }
            PageEvent::DrmSystemRequest { key_system, .. } => {
                tracing::info!(key_system = %key_system, "key system access requested");
            }
        }
    }

    /// Validate and forward a loosely-typed page message
    pub fn relay_message(&self, message: &serde_json::Value) -> Result<()> {
        let event = PageEvent::from_message(message)?;
        self.relay(&event);
        Ok(())
    }
}
