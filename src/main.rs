// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Mustekala CLI - Passive Streaming-DRM Traffic Watcher
//!
//! Example usage and demonstration of the mustekala library.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use mustekala::watch::DEFAULT_USER_AGENT;
use mustekala::{
    BackgroundExchangeClassifier, CaptureStore, Command, CommandResponse,
    DevtoolsExchangeClassifier, DomainCookieJar, ExchangeClassifier, HeaderRecord,
    HttpManifestFetcher, LifecycleEvent, ObservedExchange, TrafficWatcher, extract_pssh,
    format_cookies, format_headers,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mustekala=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "classify" => {
            if args.len() < 3 {
                eprintln!("Usage: mustekala classify <url> [method]");
                return ExitCode::from(1);
            }
            let method = args.get(3).map(String::as_str).unwrap_or("GET");
            classify_url(&args[2], method)
        }
        "pssh" => {
            if args.len() < 3 {
                eprintln!("Usage: mustekala pssh <url>");
                return ExitCode::from(1);
            }
            extract_from_url(&args[2]).await
        }
        "probe" => {
            if args.len() < 3 {
                eprintln!("Usage: mustekala probe <url>");
                return ExitCode::from(1);
            }
            probe_url(&args[2]).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("mustekala {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Mustekala - Passive Streaming-DRM Traffic Watcher

USAGE:
    mustekala <COMMAND> [OPTIONS]

COMMANDS:
    classify <url> [method]   Classify a URL with both classifier variants
    pssh <url>                Fetch a manifest and extract PSSH payloads
    probe <url>               Run one exchange through the full capture flow
    help                      Show this help message
    version                   Show version information

EXAMPLES:
    mustekala classify https://cdn.example.com/stream/manifest.mpd
    mustekala classify https://keys.example.com/acquire POST
    mustekala pssh https://cdn.example.com/stream/manifest.mpd
    mustekala probe https://cdn.example.com/stream/manifest.mpd

For more information, see: https://github.com/bountyyfi/mustekala
"#
    );
}

fn classify_url(url: &str, method: &str) -> ExitCode {
    let exchange = ObservedExchange::new(url, method);

    let background = BackgroundExchangeClassifier::new().classify(&exchange);
    let devtools = DevtoolsExchangeClassifier::new().classify(&exchange);

    println!("URL:        {}", url);
    println!("Method:     {}", exchange.method);
    println!("Background: {}", background);
    println!("Devtools:   {}", devtools);

    ExitCode::SUCCESS
}

async fn extract_from_url(url: &str) -> ExitCode {
    match fetch_and_extract(url).await {
        Ok(payloads) => {
            if payloads.is_empty() {
                println!("No PSSH payloads found in {}", url);
            } else {
                println!("=== PSSH ({}) ===", payloads.len());
                for payload in &payloads {
                    println!("{}\n", payload);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to extract PSSH: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn fetch_and_extract(url: &str) -> anyhow::Result<Vec<String>> {
    let fetcher = HttpManifestFetcher::new().context("failed to build fetcher")?;
    let doc = fetcher
        .fetch_document(url)
        .await
        .with_context(|| format!("failed to fetch {}", url))?;

    println!("Fetched {} ({} bytes, status {})", doc.url, doc.body.len(), doc.status);
    Ok(extract_pssh(&doc.body))
}

async fn probe_url(url: &str) -> ExitCode {
    match run_probe(url).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Probe failed: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Drive one real exchange through the full lifecycle against a fresh
/// in-memory store, then print what the watcher captured.
async fn run_probe(url: &str) -> anyhow::Result<()> {
    let fetcher = HttpManifestFetcher::new().context("failed to build fetcher")?;

    let watcher = TrafficWatcher::new(
        Arc::new(CaptureStore::in_memory()),
        Arc::new(DomainCookieJar::new()),
        Arc::new(fetcher.clone()),
    );
    watcher.start_capture();

    println!("Probing: {}", url);
    let doc = fetcher
        .fetch_document(url)
        .await
        .with_context(|| format!("failed to fetch {}", url))?;

    let request_headers = vec![HeaderRecord::new("User-Agent", DEFAULT_USER_AGENT)];
    watcher
        .handle_event(&LifecycleEvent::request_initiated(url, "GET", None))
        .await;
    watcher
        .handle_event(&LifecycleEvent::headers_sent(url, "GET", request_headers))
        .await;
    watcher
        .handle_event(&LifecycleEvent::completed(
            url,
            "GET",
            doc.status,
            doc.headers.clone(),
        ))
        .await;

    let response = watcher.handle_command(Command::GetData).await;
    let bundle = match response {
        CommandResponse::Data { data, .. } => data,
        other => anyhow::bail!("unexpected watcher response: {:?}", other),
    };

    println!("\n=== Capture ===");
    println!("Requests seen:  {}", bundle.request_count);
    println!("Manifest URL:   {}", display_or_dash(&bundle.mpd_url));
    println!("License URL:    {}", display_or_dash(&bundle.license_url));

    if !bundle.mpd_headers.is_empty() {
        println!("\n=== Manifest headers ===");
        println!("{}", format_headers(&bundle.mpd_headers));
    }

    if !bundle.cookies.is_empty() {
        println!("\n=== Cookies ===");
        println!("{}", format_cookies(&bundle.cookies));
    }

    if !bundle.pssh_data.is_empty() {
        println!("\n=== PSSH ===");
        println!("{}", bundle.pssh_data);
    }

    println!("\n=== Export ===");
    println!("{}", bundle.export_json()?);

    Ok(())
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
