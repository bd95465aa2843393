/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_MAX_LINE_LEN: usize = 2048;
const DEFAULT_MAX_MULTI_LINES: usize = 128;
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(500);

const DEFAULT_DATA_IDLE_TIMEOUT: Duration = Duration::from_millis(500);
const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_MAX_RECEIVE_SIZE: usize = 256 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct FtpControlConfig {
    pub(crate) max_line_len: usize,
    pub(crate) max_multi_lines: usize,
    pub(crate) command_timeout: Duration,
    pub(crate) keepalive_interval: Duration,
}

impl Default for FtpControlConfig {
    fn default() -> Self {
        FtpControlConfig {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_multi_lines: DEFAULT_MAX_MULTI_LINES,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
        }
    }
}

impl FtpControlConfig {
    pub fn set_max_line_len(&mut self, len: usize) {
        self.max_line_len = len;
    }

    pub fn set_max_multi_lines(&mut self, count: usize) {
        self.max_multi_lines = count;
    }

    pub fn set_command_timeout(&mut self, timeout: Duration) {
        self.command_timeout = timeout;
    }

    /// The interval between two NOOP commands sent while the session is idle.
    pub fn set_keepalive_interval(&mut self, interval: Duration) {
        self.keepalive_interval = interval;
    }
}

#[derive(Debug, Clone)]
pub struct FtpTransferConfig {
    pub(crate) data_idle_timeout: Duration,
    pub(crate) transfer_timeout: Duration,
    pub(crate) max_receive_size: usize,
}

impl Default for FtpTransferConfig {
    fn default() -> Self {
        FtpTransferConfig {
            data_idle_timeout: DEFAULT_DATA_IDLE_TIMEOUT,
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
            max_receive_size: DEFAULT_MAX_RECEIVE_SIZE,
        }
    }
}

impl FtpTransferConfig {
    /// A receiving data channel with no new data for this long is considered complete
    /// even if the server has not closed it yet.
    pub fn set_data_idle_timeout(&mut self, timeout: Duration) {
        self.data_idle_timeout = timeout;
    }

    pub fn set_transfer_timeout(&mut self, timeout: Duration) {
        self.transfer_timeout = timeout;
    }

    pub fn set_max_receive_size(&mut self, size: usize) {
        self.max_receive_size = size;
    }
}

#[derive(Debug, Clone)]
pub struct FtpSessionConfig {
    pub(crate) control: FtpControlConfig,
    pub(crate) transfer: FtpTransferConfig,
    pub(crate) connect_timeout: Duration,
    pub(crate) greeting_timeout: Duration,
    pub(crate) passive_use_control_host: bool,
}

impl Default for FtpSessionConfig {
    fn default() -> Self {
        FtpSessionConfig {
            control: FtpControlConfig::default(),
            transfer: FtpTransferConfig::default(),
            connect_timeout: Duration::from_secs(30),
            greeting_timeout: Duration::from_secs(10),
            passive_use_control_host: true,
        }
    }
}

impl FtpSessionConfig {
    #[inline]
    pub fn control(&self) -> &FtpControlConfig {
        &self.control
    }

    #[inline]
    pub fn control_mut(&mut self) -> &mut FtpControlConfig {
        &mut self.control
    }

    #[inline]
    pub fn transfer(&self) -> &FtpTransferConfig {
        &self.transfer
    }

    #[inline]
    pub fn transfer_mut(&mut self) -> &mut FtpTransferConfig {
        &mut self.transfer
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    pub fn set_greeting_timeout(&mut self, timeout: Duration) {
        self.greeting_timeout = timeout;
    }

    /// Always dial the control connection's peer address for data connections,
    /// keeping only the port from the PASV reply. Enabled by default, disable it
    /// to dial the address advertised by the server.
    pub fn set_passive_use_control_host(&mut self, enable: bool) {
        self.passive_use_control_host = enable;
    }

    #[inline]
    pub fn passive_use_control_host(&self) -> bool {
        self.passive_use_control_host
    }
}
