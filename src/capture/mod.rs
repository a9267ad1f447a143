// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture session accumulation, persistence and change notification

mod bundle;
mod cookies;
mod session;
mod store;

pub use bundle::{CapturedBundle, RequestLogEntry};
pub use cookies::{CookieRecord, CookieSource, DomainCookieJar, format_cookies};
pub use session::CaptureSession;
pub use store::{BundleStore, BundleSubscriber, CaptureStore, JsonFileStore, MemoryStore};
