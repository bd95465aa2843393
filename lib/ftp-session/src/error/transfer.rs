/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::BoxError;

#[derive(Debug, Error)]
pub enum FtpDataChannelError {
    #[error("data connection failed: {0}")]
    ConnectFailed(BoxError),
    #[error("timed out to connect data channel")]
    ConnectTimedOut,
    #[error("data read failed: {0:?}")]
    ReadFailed(io::Error),
    #[error("data write failed: {0:?}")]
    WriteFailed(io::Error),
    #[error("received payload exceeds {0} bytes")]
    PayloadTooLarge(usize),
}
