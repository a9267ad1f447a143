// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page-context media events
//!
//! Typed views of what a page-level interceptor observes: encrypted
//! media events, key-session requests, media source sightings and
//! already-fetched document text carrying PSSH markers.

mod events;
mod relay;

pub use events::{PageEvent, PageRequestKind, encode_init_data, is_drm_related_url};
pub use relay::PageEventRelay;
