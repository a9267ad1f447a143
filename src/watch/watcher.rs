// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The background traffic watcher

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::command::{Command, CommandResponse};
use super::fetch::ManifestFetcher;
use crate::capture::{BundleSubscriber, CaptureStore, CookieSource, RequestLogEntry};
use crate::classify::{
    BackgroundExchangeClassifier, ExchangeClassifier, LifecycleEvent, ObservedExchange,
    is_manifest_url,
};
use crate::pssh::{extract_pssh, join_pssh};

/// Passive traffic watcher.
///
/// Receives request lifecycle events from a host observer, classifies
/// each exchange with the background classifier, and funnels captured
/// artifacts into the [`CaptureStore`]. Every entry point tolerates
/// partial input and swallows collaborator failures; nothing here may
/// take down a host callback.
pub struct TrafficWatcher {
    capturing: AtomicBool,
    classifier: BackgroundExchangeClassifier,
    store: Arc<CaptureStore>,
    cookies: Arc<dyn CookieSource>,
    fetcher: Arc<dyn ManifestFetcher>,
}

impl TrafficWatcher {
    /// Create a watcher over the given collaborators. Capture starts
    /// disabled.
    pub fn new(
        store: Arc<CaptureStore>,
        cookies: Arc<dyn CookieSource>,
        fetcher: Arc<dyn ManifestFetcher>,
    ) -> Self {
        Self {
            capturing: AtomicBool::new(false),
            classifier: BackgroundExchangeClassifier::new(),
            store,
            cookies,
            fetcher,
        }
    }

    /// The capture store backing this watcher
    pub fn store(&self) -> &Arc<CaptureStore> {
        &self.store
    }

    /// Register a bundle update subscriber
    pub fn subscribe(&self, subscriber: BundleSubscriber) {
        self.store.subscribe(subscriber);
    }

    /// Enable observation
    pub fn start_capture(&self) {
        self.capturing.store(true, Ordering::SeqCst);
        tracing::info!("started capturing");
    }

    /// Disable observation
    pub fn stop_capture(&self) {
        self.capturing.store(false, Ordering::SeqCst);
        tracing::info!("stopped capturing");
    }

    /// Whether observation is enabled
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    /// Feed one lifecycle event. Events are ignored entirely while
    /// capture is off.
    pub async fn handle_event(&self, event: &LifecycleEvent) {
        if !self.is_capturing() {
            return;
        }

        let exchange = event.to_exchange();
        match event {
            LifecycleEvent::RequestInitiated { .. } => self.on_request_initiated(&exchange),
            LifecycleEvent::HeadersSent { .. } => self.on_headers_sent(&exchange),
            LifecycleEvent::Completed { .. } => self.on_completed(&exchange).await,
        }
    }

    /// Request-initiated phase: first-wins URL capture and request
    /// logging
    fn on_request_initiated(&self, exchange: &ObservedExchange) {
        if is_manifest_url(&exchange.url) && self.store.record_manifest_url(&exchange.url) {
            tracing::info!(url = %exchange.url, "manifest URL captured");
            self.store.save_and_notify();
        }

        if self.classifier.is_license_request(exchange)
            && self.store.record_license_url(&exchange.url)
        {
            tracing::info!(url = %exchange.url, "license URL captured");
            self.store.save_and_notify();
        }

        // the log label is computed from URL and method alone, even when
        // a body was captured
        let stripped = ObservedExchange::new(exchange.url.clone(), exchange.method.clone());
        self.store.log_request(RequestLogEntry {
            url: exchange.url.clone(),
            method: exchange.method.clone(),
            timestamp: exchange.timestamp,
            label: self.classifier.classify(&stripped),
        });
        self.store.save();
    }

    /// Headers-sent phase: last-wins header capture plus cookie capture
    /// for matching exchanges
    fn on_headers_sent(&self, exchange: &ObservedExchange) {
        if is_manifest_url(&exchange.url) {
            self.store
                .set_manifest_headers(exchange.request_headers.clone());
            self.capture_cookies(&exchange.url);
        }

        if self.classifier.is_license_request(exchange) {
            self.store
                .set_license_headers(exchange.request_headers.clone());
            self.capture_cookies(&exchange.url);
        }

        self.store.save_and_notify();
    }

    /// Completed phase: a successfully fetched manifest triggers PSSH
    /// extraction from a re-fetch of its body
    async fn on_completed(&self, exchange: &ObservedExchange) {
        if is_manifest_url(&exchange.url) && exchange.status == Some(200) {
            self.extract_pssh_from(&exchange.url).await;
        }
    }

    /// Query the cookie source for the URL's host and append the result
    fn capture_cookies(&self, url: &str) {
        let host = match url::Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => host.to_string(),
                None => return,
            },
            Err(e) => {
                tracing::debug!(url, error = %e, "cannot capture cookies for unparseable URL");
                return;
            }
        };

        let records = self.cookies.cookies_for_host(&host);
        if records.is_empty() {
            return;
        }

        tracing::debug!(host = %host, count = records.len(), "cookies captured");
        self.store.append_cookies(&host, records);
        self.store.save_and_notify();
    }

    /// Re-fetch a manifest URL and extract PSSH payloads from its body.
    /// Fetch failures are logged and dropped: no retry, no propagated
    /// error.
    pub async fn extract_pssh_from(&self, url: &str) {
        match self.fetcher.fetch_text(url).await {
            Ok(text) => self.ingest_manifest_text(&text),
            Err(e) => tracing::warn!(url, error = %e, "manifest fetch failed"),
        }
    }

    /// Scan already-available manifest text for PSSH payloads and store
    /// them when any are found
    pub fn ingest_manifest_text(&self, text: &str) {
        let payloads = extract_pssh(text);
        if payloads.is_empty() {
            return;
        }

        tracing::info!(count = payloads.len(), "PSSH extracted");
        self.store.set_pssh(join_pssh(&payloads));
        self.store.save_and_notify();
    }

    /// Execute a typed control command
    pub async fn handle_command(&self, command: Command) -> CommandResponse {
        match command {
            Command::StartCapture => {
                self.start_capture();
                CommandResponse::ok()
            }
            Command::StopCapture => {
                self.stop_capture();
                CommandResponse::ok()
            }
            Command::GetData => CommandResponse::Data {
                data: self.store.bundle(),
                is_capturing: self.is_capturing(),
            },
            Command::ClearData => {
                self.store.reset();
                tracing::info!("cleared captured data");
                CommandResponse::ok()
            }
            Command::ExtractPssh => {
                let manifest_url = self.store.bundle().mpd_url;
                if !manifest_url.is_empty() {
                    self.extract_pssh_from(&manifest_url).await;
                }
                CommandResponse::ok()
            }
        }
    }

    /// Dispatch a loosely-typed control message. An unrecognized action
    /// yields an explicit error response rather than a failure.
    pub async fn handle_message(&self, message: &serde_json::Value) -> CommandResponse {
        match serde_json::from_value::<Command>(message.clone()) {
            Ok(command) => self.handle_command(command).await,
            Err(_) => CommandResponse::error("Unknown action"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::fetch::HttpManifestFetcher;
    use crate::capture::{CookieRecord, DomainCookieJar};
    use crate::classify::{HeaderRecord, Label};
    use crate::error::Result;
    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Fetcher that serves a canned document without a network
    struct FixedFetcher(String);

    #[async_trait]
    impl ManifestFetcher for FixedFetcher {
        async fn fetch_text(&self, _url: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    /// Fetcher that always fails
    struct BrokenFetcher;

    #[async_trait]
    impl ManifestFetcher for BrokenFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            Err(crate::error::Error::fetch(url, "connection refused"))
        }
    }

    fn watcher_with(fetcher: impl ManifestFetcher + 'static) -> TrafficWatcher {
        TrafficWatcher::new(
            Arc::new(CaptureStore::in_memory()),
            Arc::new(DomainCookieJar::new()),
            Arc::new(fetcher),
        )
    }

    #[tokio::test]
    async fn test_events_ignored_while_capture_off() {
        let watcher = watcher_with(FixedFetcher(String::new()));

        let event = LifecycleEvent::request_initiated(
            "https://cdn.example.com/stream/manifest.mpd",
            "GET",
            None,
        );
        watcher.handle_event(&event).await;

        assert!(watcher.store().bundle().is_empty());
    }

    #[tokio::test]
    async fn test_manifest_url_first_wins() {
        let watcher = watcher_with(FixedFetcher(String::new()));
        watcher.start_capture();

        for url in [
            "https://a.example.com/stream/manifest.mpd",
            "https://b.example.com/other.mpd",
        ] {
            watcher
                .handle_event(&LifecycleEvent::request_initiated(url, "GET", None))
                .await;
        }

        let bundle = watcher.store().bundle();
        assert_eq!(bundle.mpd_url, "https://a.example.com/stream/manifest.mpd");
        assert_eq!(bundle.request_count, 2);
        assert_eq!(bundle.all_requests[0].label, Label::Manifest);
    }

    #[tokio::test]
    async fn test_license_capture_uses_body() {
        let watcher = watcher_with(FixedFetcher(String::new()));
        watcher.start_capture();

        let event = LifecycleEvent::request_initiated(
            "https://keys.example.com/acquire",
            "POST",
            Some(b"widevine-challenge".to_vec()),
        );
        watcher.handle_event(&event).await;

        let bundle = watcher.store().bundle();
        assert_eq!(bundle.license_url, "https://keys.example.com/acquire");
        // the log label ignores the body, so this request logs as OTHER
        assert_eq!(bundle.all_requests[0].label, Label::Other);
    }

    #[tokio::test]
    async fn test_headers_and_cookies_captured() {
        let jar = Arc::new(DomainCookieJar::new());
        jar.add(CookieRecord::new("cdn_session", "tok").domain("cdn.example.com"));

        let watcher = TrafficWatcher::new(
            Arc::new(CaptureStore::in_memory()),
            jar,
            Arc::new(FixedFetcher(String::new())),
        );
        watcher.start_capture();

        let event = LifecycleEvent::headers_sent(
            "https://cdn.example.com/stream/manifest.mpd",
            "GET",
            vec![
                HeaderRecord::new("User-Agent", "player/1.0"),
                HeaderRecord::new("Referer", "https://watch.example.com/"),
            ],
        );
        watcher.handle_event(&event).await;

        let bundle = watcher.store().bundle();
        assert_eq!(
            bundle.mpd_headers.get("User-Agent").map(String::as_str),
            Some("player/1.0")
        );
        assert_eq!(bundle.cookies["cdn.example.com"].len(), 1);
        assert!(bundle.license_headers.is_empty());
    }

    #[tokio::test]
    async fn test_completed_manifest_triggers_extraction() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream/manifest.mpd"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<MPD><cenc:pssh>AAAAW3Bzc2g=</cenc:pssh></MPD>"#,
            ))
            .mount(&server)
            .await;

        let watcher = watcher_with(HttpManifestFetcher::new().unwrap());
        watcher.start_capture();

        let url = format!("{}/stream/manifest.mpd", server.uri());
        watcher
            .handle_event(&LifecycleEvent::completed(url, "GET", 200, Vec::new()))
            .await;

        assert_eq!(watcher.store().bundle().pssh_data, "AAAAW3Bzc2g=");
    }

    #[tokio::test]
    async fn test_completed_non_200_does_not_fetch() {
        let watcher = watcher_with(FixedFetcher(
            "<cenc:pssh>SHOULD_NOT_APPEAR</cenc:pssh>".to_string(),
        ));
        watcher.start_capture();

        watcher
            .handle_event(&LifecycleEvent::completed(
                "https://cdn.example.com/stream.mpd",
                "GET",
                403,
                Vec::new(),
            ))
            .await;

        assert!(watcher.store().bundle().pssh_data.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_silent() {
        let watcher = watcher_with(BrokenFetcher);
        watcher.start_capture();

        watcher
            .handle_event(&LifecycleEvent::completed(
                "https://cdn.example.com/stream.mpd",
                "GET",
                200,
                Vec::new(),
            ))
            .await;

        assert!(watcher.store().bundle().pssh_data.is_empty());
    }

    #[tokio::test]
    async fn test_command_roundtrip() {
        let watcher = watcher_with(FixedFetcher(String::new()));

        assert!(!watcher.is_capturing());
        watcher.handle_command(Command::StartCapture).await;
        assert!(watcher.is_capturing());

        watcher
            .handle_event(&LifecycleEvent::request_initiated(
                "https://cdn.example.com/stream.mpd",
                "GET",
                None,
            ))
            .await;

        match watcher.handle_command(Command::GetData).await {
            CommandResponse::Data { data, is_capturing } => {
                assert!(is_capturing);
                assert_eq!(data.mpd_url, "https://cdn.example.com/stream.mpd");
            }
            other => panic!("expected data response, got {:?}", other),
        }

        watcher.handle_command(Command::ClearData).await;
        assert!(watcher.store().bundle().is_empty());

        watcher.handle_command(Command::StopCapture).await;
        assert!(!watcher.is_capturing());
    }

    #[tokio::test]
    async fn test_extract_pssh_command_uses_captured_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream.mpd"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"pssh="QUJDRA==""#),
            )
            .mount(&server)
            .await;

        let watcher = watcher_with(HttpManifestFetcher::new().unwrap());
        watcher.start_capture();
        watcher
            .store()
            .record_manifest_url(&format!("{}/stream.mpd", server.uri()));

        watcher.handle_command(Command::ExtractPssh).await;
        assert_eq!(watcher.store().bundle().pssh_data, "QUJDRA==");
    }

    #[tokio::test]
    async fn test_unknown_message_gets_error_response() {
        let watcher = watcher_with(FixedFetcher(String::new()));

        let response = watcher
            .handle_message(&json!({ "action": "launchMissiles" }))
            .await;

        assert!(response.is_error());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "error": "Unknown action" })
        );
    }

    #[tokio::test]
    async fn test_ingest_manifest_text_without_matches_keeps_existing() {
        let watcher = watcher_with(FixedFetcher(String::new()));
        watcher.store().set_pssh("EXISTING".to_string());

        watcher.ingest_manifest_text("no protection markers here");
        assert_eq!(watcher.store().bundle().pssh_data, "EXISTING");
    }
}
