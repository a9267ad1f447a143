// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Devtools-style network panel
//!
//! A bounded, newest-first view over finished exchanges relevant to
//! streaming/DRM analysis, with its own classifier variant.

mod panel;

pub use panel::{NetworkPanel, PanelConfig, PanelEntry, PanelSubscriber};
