// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Background traffic watcher
//!
//! Consumes request lifecycle events from a host observer, classifies
//! them and accumulates manifest/license artifacts into the capture
//! store.

mod command;
mod fetch;
mod watcher;

pub use command::{Command, CommandResponse};
pub use fetch::{
    DEFAULT_USER_AGENT, FetchedDocument, FetcherConfig, HttpManifestFetcher, ManifestFetcher,
};
pub use watcher::TrafficWatcher;
