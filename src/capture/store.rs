// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bundle persistence and change notification
//!
//! Storage failures are logged and swallowed here: a broken backend must
//! never propagate an error out of an observation callback.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use super::bundle::{CapturedBundle, RequestLogEntry};
use super::cookies::CookieRecord;
use super::session::CaptureSession;
use crate::error::{Error, Result};

/// Persistent key-value storage contract for the capture bundle
pub trait BundleStore: Send + Sync {
    /// Load the previously saved bundle, if any
    fn load(&self) -> Result<Option<CapturedBundle>>;

    /// Save the bundle, replacing any previous record
    fn save(&self, bundle: &CapturedBundle) -> Result<()>;
}

/// Bundle storage as a single JSON document on disk
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage path
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl BundleStore for JsonFileStore {
    fn load(&self) -> Result<Option<CapturedBundle>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let bundle = serde_json::from_str(&raw)
            .map_err(|e| Error::storage(format!("corrupt bundle at {:?}: {}", self.path, e)))?;
        Ok(Some(bundle))
    }

    fn save(&self, bundle: &CapturedBundle) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(bundle)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// In-memory bundle storage for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Option<CapturedBundle>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl BundleStore for MemoryStore {
    fn load(&self) -> Result<Option<CapturedBundle>> {
        Ok(self.inner.read().clone())
    }

    fn save(&self, bundle: &CapturedBundle) -> Result<()> {
        *self.inner.write() = Some(bundle.clone());
        Ok(())
    }
}

/// Bundle update subscriber callback
pub type BundleSubscriber = Arc<dyn Fn(&CapturedBundle) + Send + Sync>;

/// Owns the capture session, persists it through a [`BundleStore`] and
/// publishes updates to subscribers. Having no subscribers is a normal
/// condition, not an error.
pub struct CaptureStore {
    session: RwLock<CaptureSession>,
    backend: Box<dyn BundleStore>,
    subscribers: RwLock<Vec<BundleSubscriber>>,
}

impl CaptureStore {
    /// Create a store over the given backend
    pub fn new(backend: impl BundleStore + 'static) -> Self {
        Self {
            session: RwLock::new(CaptureSession::new()),
            backend: Box::new(backend),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Create a store with no persistence beyond the process
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Continue from the previously persisted bundle, if one loads.
    /// A failed load is logged and the session stays fresh.
    pub fn load(&self) {
        match self.backend.load() {
            Ok(Some(bundle)) => self.session.write().absorb_stored(bundle),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "failed to load stored bundle"),
        }
    }

    /// Snapshot of the accumulated bundle
    pub fn bundle(&self) -> CapturedBundle {
        self.session.read().bundle().clone()
    }

    /// Register a bundle update subscriber
    pub fn subscribe(&self, subscriber: BundleSubscriber) {
        self.subscribers.write().push(subscriber);
    }

    /// Persist the current bundle; failures are logged and dropped
    pub fn save(&self) {
        let bundle = self.bundle();
        if let Err(e) = self.backend.save(&bundle) {
            tracing::warn!(error = %e, "failed to save bundle");
        }
    }

    /// Publish the current bundle to all subscribers
    pub fn notify(&self) {
        let bundle = self.bundle();
        for subscriber in self.subscribers.read().iter() {
            subscriber(&bundle);
        }
    }

    /// Persist and publish in one step
    pub fn save_and_notify(&self) {
        self.save();
        self.notify();
    }

    /// Record the manifest URL (first seen wins); see
    /// [`CaptureSession::record_manifest_url`]
    pub fn record_manifest_url(&self, url: &str) -> bool {
        self.session.write().record_manifest_url(url)
    }

    /// Record the license URL (first seen wins)
    pub fn record_license_url(&self, url: &str) -> bool {
        self.session.write().record_license_url(url)
    }

    /// Overwrite the manifest request headers
    pub fn set_manifest_headers(&self, headers: HashMap<String, String>) {
        self.session.write().set_manifest_headers(headers);
    }

    /// Overwrite the license request headers
    pub fn set_license_headers(&self, headers: HashMap<String, String>) {
        self.session.write().set_license_headers(headers);
    }

    /// Append captured cookies for a hostname
    pub fn append_cookies(&self, host: &str, records: Vec<CookieRecord>) {
        self.session.write().append_cookies(host, records);
    }

    /// Store the joined PSSH payload text
    pub fn set_pssh(&self, joined: String) {
        self.session.write().set_pssh(joined);
    }

    /// Append a request log entry
    pub fn log_request(&self, entry: RequestLogEntry) {
        self.session.write().log_request(entry);
    }

    /// Clear the session, persist the empty bundle and notify
    pub fn reset(&self) {
        self.session.write().reset();
        self.save_and_notify();
    }
}
