// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Mustekala - Passive Streaming-DRM Traffic Watcher
//!
//! Classifies observed HTTP exchanges from media playback sessions and
//! accumulates manifest URLs, license-server URLs, headers, cookies and
//! embedded content-protection identifiers (PSSH) for diagnostics.
//!
//! ## Features
//!
//! - Exchange classification: manifest / license / HLS / other
//! - Two preserved classifier variants (background observer + devtools panel)
//! - PSSH extraction: four scan patterns over manifest-like text
//! - Capture sessions: first-wins URLs, last-wins headers, cookie capture
//! - Pluggable persistence with change notification
//! - Bounded devtools-style network panel with JSON export
//! - Typed page-context media events (EME, key sessions, PSSH sightings)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mustekala::{
//!     CaptureStore, DomainCookieJar, HttpManifestFetcher, LifecycleEvent, TrafficWatcher,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let watcher = TrafficWatcher::new(
//!         Arc::new(CaptureStore::in_memory()),
//!         Arc::new(DomainCookieJar::new()),
//!         Arc::new(HttpManifestFetcher::new()?),
//!     );
//!     watcher.start_capture();
//!
//!     let event = LifecycleEvent::request_initiated(
//!         "https://cdn.example.com/stream/manifest.mpd",
//!         "GET",
//!         None,
//!     );
//!     watcher.handle_event(&event).await;
//!
//!     println!("{}", watcher.store().bundle().export_json()?);
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod classify;
pub mod devtools;
pub mod error;
pub mod page;
pub mod pssh;
pub mod watch;

// Re-exports for convenience

// Classification
pub use classify::{
    BackgroundExchangeClassifier, DevtoolsExchangeClassifier, ExchangeClassifier, HeaderRecord,
    Label, LifecycleEvent, ObservedExchange, extract_headers, format_headers, is_manifest_url,
};

// PSSH extraction
pub use pssh::{extract_pssh, join_pssh};

// Capture
pub use capture::{
    BundleStore, BundleSubscriber, CaptureSession, CaptureStore, CapturedBundle, CookieRecord,
    CookieSource, DomainCookieJar, JsonFileStore, MemoryStore, RequestLogEntry, format_cookies,
};

// Watcher
pub use watch::{
    Command, CommandResponse, FetchedDocument, FetcherConfig, HttpManifestFetcher,
    ManifestFetcher, TrafficWatcher,
};

// Devtools panel
pub use devtools::{NetworkPanel, PanelConfig, PanelEntry, PanelSubscriber};

// Page events
pub use page::{PageEvent, PageEventRelay, PageRequestKind, is_drm_related_url};

// Errors
pub use error::{Error, Result};

/// Mustekala version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
