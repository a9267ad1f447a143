// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Content-protection identifier (PSSH) extraction
//!
//! Scans manifest-like text for embedded PSSH payloads without parsing
//! the document structure.

mod extractor;

pub use extractor::{extract_pssh, join_pssh};
