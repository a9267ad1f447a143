// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Watcher control commands

use serde::{Deserialize, Serialize};

use crate::capture::CapturedBundle;

/// A control command for the traffic watcher. The serialized form uses
/// an `action` tag (`startCapture`, `stopCapture`, `getData`,
/// `clearData`, `extractPssh`), the names control messages carry on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    /// Enable observation
    StartCapture,
    /// Disable observation
    StopCapture,
    /// Return the accumulated bundle and the capturing flag
    GetData,
    /// Clear the accumulated bundle
    ClearData,
    /// Re-fetch the captured manifest URL and extract PSSH payloads
    ExtractPssh,
}

/// Response to a control command
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandResponse {
    /// Simple acknowledgement
    Ack { success: bool },
    /// Bundle snapshot for `GetData`
    #[serde(rename_all = "camelCase")]
    Data {
        data: CapturedBundle,
        is_capturing: bool,
    },
    /// Explicit error, e.g. for an unrecognized action
    Error { error: String },
}

impl CommandResponse {
    /// Successful acknowledgement
    pub fn ok() -> Self {
        CommandResponse::Ack { success: true }
    }

    /// Error response with a message
    pub fn error(message: impl Into<String>) -> Self {
        CommandResponse::Error {
            error: message.into(),
        }
    }

    /// Whether this response reports an error
    pub fn is_error(&self) -> bool {
        matches!(self, CommandResponse::Error { .. })
    }
}
