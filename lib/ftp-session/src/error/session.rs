/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::{BoxError, FtpCommandError, FtpDataChannelError, FtpPassiveParseError};
use crate::control::FtpCommand;
use crate::session::FtpSessionState;

#[derive(Debug, Error)]
pub enum FtpSessionError {
    #[error("operation not allowed in session state {0}")]
    InvalidState(FtpSessionState),
    #[error("connect failed: {0}")]
    ConnectionFailed(BoxError),
    #[error("timed out to connect")]
    ConnectTimedOut,
    #[error("greeting failed: {0}")]
    GreetingFailed(FtpCommandError),
    #[error("authentication rejected ({0} -> {1})")]
    AuthenticationRejected(FtpCommand, u16),
    #[error("command error: {0}")]
    Command(#[from] FtpCommandError),
    #[error("invalid passive reply: {0}")]
    PassiveModeParse(#[from] FtpPassiveParseError),
    #[error("data channel failed: {0}")]
    DataChannelFailed(#[from] FtpDataChannelError),
    #[error("transfer timed out")]
    TransferTimedOut,
    #[error("operation cancelled")]
    Cancelled,
}

impl FtpSessionError {
    /// The reply code the server answered with, if this error carries one.
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            FtpSessionError::AuthenticationRejected(_, code) => Some(*code),
            FtpSessionError::Command(e) | FtpSessionError::GreetingFailed(e) => e.reply_code(),
            _ => None,
        }
    }

    pub(crate) fn from_auth(e: FtpCommandError) -> Self {
        match e {
            FtpCommandError::UnexpectedReplyCode(cmd, code) => {
                FtpSessionError::AuthenticationRejected(cmd, code)
            }
            _ => FtpSessionError::Command(e),
        }
    }

    /// Errors after which the control connection can not be used any more.
    pub(crate) fn is_fatal(&self) -> bool {
        match self {
            FtpSessionError::InvalidState(_)
            | FtpSessionError::PassiveModeParse(_)
            | FtpSessionError::DataChannelFailed(_) => false,
            FtpSessionError::Command(e) => e.is_service_closing(),
            _ => true,
        }
    }
}
