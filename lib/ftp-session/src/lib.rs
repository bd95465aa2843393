/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod debug;
pub use debug::{FTP_DEBUG_LOG_LEVEL, FTP_DEBUG_LOG_TARGET};

mod config;
pub use config::{FtpControlConfig, FtpSessionConfig, FtpTransferConfig};

mod error;
pub use error::{
    FtpCommandError, FtpDataChannelError, FtpListingParseError, FtpPassiveParseError,
    FtpRawResponseError, FtpReplyParseError, FtpSessionError,
};

mod connection;
pub use connection::{
    FtpConnectionProvider, FtpServerAddr, FtpServerAddrParseError, TcpConnectionProvider,
};

pub mod reply;
pub use reply::{FtpCapabilities, FtpPassiveEndpoint};

pub mod listing;
pub use listing::{FtpDirectoryEntry, FtpListingFormat, FtpPermissions};

mod control;
pub use control::{FtpCommand, FtpControlCommand, FtpControlResponse};

mod transfer;
pub use transfer::{FtpPayload, FtpTransferMode};

mod session;
pub use session::{FtpCredentials, FtpSession, FtpSessionState};
