/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpSessionState {
    Disconnected,
    Authenticating,
    NegotiatingCapabilities,
    SettingTransferMode,
    Connected,
    Disconnecting,
}

impl FtpSessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FtpSessionState::Disconnected => "disconnected",
            FtpSessionState::Authenticating => "authenticating",
            FtpSessionState::NegotiatingCapabilities => "negotiating capabilities",
            FtpSessionState::SettingTransferMode => "setting transfer mode",
            FtpSessionState::Connected => "connected",
            FtpSessionState::Disconnecting => "disconnecting",
        }
    }
}

impl fmt::Display for FtpSessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
