/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod response;
pub use response::FtpRawResponseError;

mod command;
pub use command::FtpCommandError;

mod parse;
pub use parse::{FtpListingParseError, FtpPassiveParseError, FtpReplyParseError};

mod transfer;
pub use transfer::FtpDataChannelError;

mod session;
pub use session::FtpSessionError;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
