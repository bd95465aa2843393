/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{FtpCommand, FtpControlChannel, FtpControlCommand};

/// Background task sending NOOP on an idle control channel.
pub(crate) struct FtpKeepalive {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl FtpKeepalive {
    /// Start the task, or return `None` if `interval` is zero.
    pub(crate) fn spawn<T>(
        channel: Arc<Mutex<FtpControlChannel<T>>>,
        interval: Duration,
    ) -> Option<Self>
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        if interval.is_zero() {
            return None;
        }

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let noop = FtpControlCommand::new(FtpCommand::NOOP);
            loop {
                tokio::select! {
                    biased;

                    _ = task_cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let mut ch = tokio::select! {
                    biased;

                    _ = task_cancel.cancelled() => break,
                    ch = channel.lock() => ch,
                };
                if !ch.is_usable() {
                    break;
                }
                let r = tokio::select! {
                    biased;

                    _ = task_cancel.cancelled() => break,
                    r = ch.execute(&noop) => r,
                };
                if let Err(e) = r {
                    warn!("ftp keepalive failed: {e}");
                    break;
                }
            }
        });

        Some(FtpKeepalive {
            cancel,
            handle: Some(handle),
        })
    }

    /// Cancel the task and wait for it to finish.
    ///
    /// Must not be called while holding the control channel lock.
    pub(crate) async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for FtpKeepalive {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FtpControlConfig;
    use tokio_test::io::Builder;

    #[tokio::test(start_paused = true)]
    async fn send_noop_each_interval() {
        let mock = Builder::new()
            .write(b"NOOP\r\n")
            .read(b"200 ok\r\n")
            .write(b"NOOP\r\n")
            .read(b"200 ok\r\n")
            .build();
        let channel = Arc::new(Mutex::new(FtpControlChannel::new(
            mock,
            FtpControlConfig::default(),
        )));
        let mut keepalive =
            FtpKeepalive::spawn(channel.clone(), Duration::from_secs(500)).unwrap();

        tokio::time::sleep(Duration::from_secs(1001)).await;
        keepalive.stop().await;
        assert!(channel.lock().await.is_usable());
    }

    #[tokio::test(start_paused = true)]
    async fn exit_on_failure() {
        let mock = Builder::new()
            .write(b"NOOP\r\n")
            .read(b"421 closing\r\n")
            .build();
        let channel = Arc::new(Mutex::new(FtpControlChannel::new(
            mock,
            FtpControlConfig::default(),
        )));
        let mut keepalive = FtpKeepalive::spawn(channel, Duration::from_secs(60)).unwrap();

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(keepalive.handle.as_ref().unwrap().is_finished());
        keepalive.stop().await;
    }

    #[tokio::test]
    async fn disabled() {
        let channel = Arc::new(Mutex::new(FtpControlChannel::new(
            Builder::new().build(),
            FtpControlConfig::default(),
        )));
        assert!(FtpKeepalive::spawn(channel, Duration::ZERO).is_none());
    }
}
