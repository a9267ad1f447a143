// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Manifest fetching
//!
//! The watcher re-fetches a captured manifest URL to scan its body for
//! PSSH payloads. The fetch seam is a trait so tests and embedders can
//! supply their own transport.

use std::time::Duration;

use async_trait::async_trait;

use crate::classify::HeaderRecord;
use crate::error::{Error, Result};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Text-retrieval contract: URL in, document text out. Implementations
/// are expected to fail with an error, never panic; the watcher logs and
/// drops fetch failures.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// Fetch the document at `url` as text
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Fetcher configuration
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
    /// Accept invalid TLS certificates (dangerous!)
    pub accept_invalid_certs: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

/// A fetched document with its response metadata
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Final URL
    pub url: String,
    /// Response status
    pub status: u16,
    /// Response headers as received
    pub headers: Vec<HeaderRecord>,
    /// Body text (lossy-decoded)
    pub body: String,
}

/// HTTP-backed manifest fetcher
#[derive(Clone)]
pub struct HttpManifestFetcher {
    client: reqwest::Client,
}

impl HttpManifestFetcher {
    /// Create a fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    /// Create a fetcher with custom configuration
    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch a document with its status and headers, for callers that
    /// need the full exchange rather than just text
    pub async fn fetch_document(&self, url: &str) -> Result<FetchedDocument> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                HeaderRecord::new(name.as_str(), value.to_str().unwrap_or_default())
            })
            .collect();
        let body = response.text().await?;

        Ok(FetchedDocument {
            url: final_url,
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl ManifestFetcher for HttpManifestFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        // status is deliberately not checked; an error body still gets scanned
        let response = self.client.get(url).send().await?;
        Ok(response.text().await?)
    }
}
