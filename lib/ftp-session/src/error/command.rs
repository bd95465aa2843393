/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::FtpRawResponseError;
use crate::control::FtpCommand;

#[derive(Debug, Error)]
pub enum FtpCommandError {
    #[error("unable to send command: {0:?}")]
    SendFailed(io::Error),
    #[error("unable to recv reply: {0}")]
    RecvFailed(#[from] FtpRawResponseError),
    #[error("control channel closed")]
    ChannelClosed,
    #[error("invalid argument for command {0}")]
    InvalidArgument(FtpCommand),
    #[error("unexpected reply code ({0} -> {1})")]
    UnexpectedReplyCode(FtpCommand, u16),
    #[error("timed out waiting reply to command {0}")]
    ReplyTimedOut(FtpCommand),
    #[error("invalid reply {1} syntax to command {0}")]
    InvalidReplySyntax(FtpCommand, u16),
}

impl FtpCommandError {
    /// The reply code carried by this error, if the server sent one.
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            FtpCommandError::UnexpectedReplyCode(_, code)
            | FtpCommandError::InvalidReplySyntax(_, code) => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn is_service_closing(&self) -> bool {
        matches!(self, FtpCommandError::UnexpectedReplyCode(_, 421))
    }
}
