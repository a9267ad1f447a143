// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Traffic classification core
//!
//! Pure, stateless classification of observed HTTP exchanges into
//! manifest/license/HLS/other traffic, plus header-list normalization.

mod classifier;
mod exchange;
mod headers;

pub use classifier::{
    BackgroundExchangeClassifier, DevtoolsExchangeClassifier, ExchangeClassifier, Label,
    is_manifest_url,
};
pub use exchange::{LifecycleEvent, ObservedExchange};
pub use headers::{HeaderRecord, extract_headers, format_headers};
