/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::time::Instant;

use crate::FtpControlConfig;
use crate::error::FtpCommandError;

mod command;
pub use command::{FtpCommand, FtpControlCommand};

mod response;
pub use response::FtpControlResponse;

mod keepalive;
pub(crate) use keepalive::FtpKeepalive;

pub(crate) struct FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite,
{
    config: FtpControlConfig,
    stream: Option<BufStream<T>>,
    broken: bool,
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: T, config: FtpControlConfig) -> Self {
        FtpControlChannel {
            config,
            stream: Some(BufStream::new(stream)),
            broken: false,
        }
    }

    /// Whether further commands may be sent.
    ///
    /// A channel that has been closed, or that lost track of the reply stream
    /// after an I/O error or an expired deadline, is never usable again.
    pub(crate) fn is_usable(&self) -> bool {
        self.stream.is_some() && !self.broken
    }

    /// Stop trusting the reply stream, e.g. after a reply wait was abandoned.
    pub(crate) fn mark_broken(&mut self) {
        self.broken = true;
    }

    fn usable_stream(&mut self) -> Result<&mut BufStream<T>, FtpCommandError> {
        if self.broken {
            return Err(FtpCommandError::ChannelClosed);
        }
        self.stream.as_mut().ok_or(FtpCommandError::ChannelClosed)
    }

    pub(crate) async fn wait_greetings(&mut self, timeout: Duration) -> Result<(), FtpCommandError> {
        let deadline = Instant::now() + timeout;
        let max_line_len = self.config.max_line_len;
        let max_multi_lines = self.config.max_multi_lines;
        loop {
            let stream = self.usable_stream()?;
            let r = tokio::time::timeout_at(
                deadline,
                response::read_reply(stream, max_line_len, max_multi_lines),
            )
            .await;
            match r {
                Ok(Ok(rsp)) => match rsp.code() {
                    120 => continue,
                    220 => return Ok(()),
                    n => {
                        return Err(FtpCommandError::UnexpectedReplyCode(
                            FtpCommand::GREETING,
                            n,
                        ));
                    }
                },
                Ok(Err(e)) => {
                    self.broken = true;
                    return Err(FtpCommandError::RecvFailed(e));
                }
                Err(_) => {
                    self.broken = true;
                    return Err(FtpCommandError::ReplyTimedOut(FtpCommand::GREETING));
                }
            }
        }
    }

    /// Send the command and wait for its completion reply within the command timeout.
    pub(crate) async fn execute(
        &mut self,
        cmd: &FtpControlCommand,
    ) -> Result<FtpControlResponse, FtpCommandError> {
        self.execute_with_timeout(cmd, self.config.command_timeout)
            .await
    }

    pub(crate) async fn execute_with_timeout(
        &mut self,
        cmd: &FtpControlCommand,
        timeout: Duration,
    ) -> Result<FtpControlResponse, FtpCommandError> {
        let line = cmd.encode()?;
        let stream = self.usable_stream()?;
        if let Err(e) = send_all(stream, &line).await {
            self.broken = true;
            return Err(FtpCommandError::SendFailed(e));
        }
        self.wait_reply(cmd, timeout).await
    }

    /// Wait for the completion reply of a command that has already been sent.
    ///
    /// A reply with the expected (or alternative) code completes the command. Other positive
    /// replies are skipped, while a negative one fails it at once. If the
    /// deadline expires, the last skipped code is reported when there is one.
    pub(crate) async fn wait_reply(
        &mut self,
        cmd: &FtpControlCommand,
        timeout: Duration,
    ) -> Result<FtpControlResponse, FtpCommandError> {
        let deadline = Instant::now() + timeout;
        let max_line_len = self.config.max_line_len;
        let max_multi_lines = self.config.max_multi_lines;
        let expected = cmd.expected_code();
        let mut last_code: Option<u16> = None;
        loop {
            let stream = self.usable_stream()?;
            let r = tokio::time::timeout_at(
                deadline,
                response::read_reply(stream, max_line_len, max_multi_lines),
            )
            .await;
            match r {
                Ok(Ok(rsp)) => {
                    let code = rsp.code();
                    if cmd.is_completed_by(code) {
                        return Ok(rsp);
                    }
                    if code >= 400 {
                        return Err(FtpCommandError::UnexpectedReplyCode(cmd.command(), code));
                    }
                    crate::log_msg!(
                        "skipped reply {} to command {} while waiting for {}",
                        code,
                        cmd.command(),
                        expected
                    );
                    last_code = Some(code);
                }
                Ok(Err(e)) => {
                    self.broken = true;
                    return Err(FtpCommandError::RecvFailed(e));
                }
                Err(_) => {
                    self.broken = true;
                    return match last_code {
                        Some(code) => Err(FtpCommandError::UnexpectedReplyCode(cmd.command(), code)),
                        None => Err(FtpCommandError::ReplyTimedOut(cmd.command())),
                    };
                }
            }
        }
    }

    pub(crate) async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
    }
}

async fn send_all<T>(stream: &mut BufStream<T>, buf: &[u8]) -> io::Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    #[cfg(feature = "log-raw-io")]
    crate::debug::log_cmd(String::from_utf8_lossy(buf).trim_end());

    stream.write_all(buf).await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn channel(mock: tokio_test::io::Mock) -> FtpControlChannel<tokio_test::io::Mock> {
        FtpControlChannel::new(mock, FtpControlConfig::default())
    }

    #[tokio::test]
    async fn greeting() {
        let mock = Builder::new()
            .read(b"120 wait a moment\r\n")
            .read(b"220-Welcome\r\n220 ready\r\n")
            .build();
        let mut ch = channel(mock);
        ch.wait_greetings(Duration::from_secs(10)).await.unwrap();
        assert!(ch.is_usable());
    }

    #[tokio::test]
    async fn greeting_refused() {
        let mock = Builder::new().read(b"421 too many users\r\n").build();
        let mut ch = channel(mock);
        let e = ch
            .wait_greetings(Duration::from_secs(10))
            .await
            .unwrap_err();
        assert!(e.is_service_closing());
    }

    #[tokio::test]
    async fn execute_exact_bytes() {
        let mock = Builder::new()
            .write(b"USER bob\r\n")
            .read(b"331 need password\r\n")
            .write(b"PASS s3cret\r\n")
            .read(b"230 logged in\r\n")
            .build();
        let mut ch = channel(mock);
        let rsp = ch
            .execute(&FtpControlCommand::with_arg(FtpCommand::USER, "bob"))
            .await
            .unwrap();
        assert_eq!(rsp.code(), 331);
        let rsp = ch
            .execute(&FtpControlCommand::with_arg(FtpCommand::PASS, "s3cret"))
            .await
            .unwrap();
        assert_eq!(rsp.code(), 230);
    }

    #[tokio::test]
    async fn skip_informational() {
        let mock = Builder::new()
            .write(b"RETR a\r\n")
            .read(b"150 opening data connection\r\n")
            .read(b"226 transfer complete\r\n")
            .build();
        let mut ch = channel(mock);
        let rsp = ch
            .execute(&FtpControlCommand::with_arg(FtpCommand::RETR, "a"))
            .await
            .unwrap();
        assert_eq!(rsp.code(), 226);
        assert_eq!(rsp.message(), "transfer complete");
    }

    #[tokio::test]
    async fn fail_fast_on_negative_reply() {
        let mock = Builder::new()
            .write(b"CWD /nope\r\n")
            .read(b"550 no such directory\r\n")
            .write(b"NOOP\r\n")
            .read(b"200 ok\r\n")
            .build();
        let mut ch = channel(mock);
        let e = ch
            .execute(&FtpControlCommand::with_arg(FtpCommand::CWD, "/nope"))
            .await
            .unwrap_err();
        assert!(matches!(
            e,
            FtpCommandError::UnexpectedReplyCode(FtpCommand::CWD, 550)
        ));
        assert!(ch.is_usable());
        ch.execute(&FtpControlCommand::new(FtpCommand::NOOP))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_after_mismatch() {
        let mock = Builder::new()
            .write(b"MKD d\r\n")
            .read(b"200 something else\r\n")
            .wait(Duration::from_secs(3600))
            .build();
        let mut ch = channel(mock);
        let e = ch
            .execute(&FtpControlCommand::with_arg(FtpCommand::MKD, "d"))
            .await
            .unwrap_err();
        assert!(matches!(
            e,
            FtpCommandError::UnexpectedReplyCode(FtpCommand::MKD, 200)
        ));
        assert!(!ch.is_usable());
        let e = ch
            .execute(&FtpControlCommand::new(FtpCommand::NOOP))
            .await
            .unwrap_err();
        assert!(matches!(e, FtpCommandError::ChannelClosed));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_without_reply() {
        let mock = Builder::new()
            .write(b"NOOP\r\n")
            .wait(Duration::from_secs(3600))
            .build();
        let mut ch = channel(mock);
        let e = ch
            .execute_with_timeout(
                &FtpControlCommand::new(FtpCommand::NOOP),
                Duration::from_secs(5),
            )
            .await
            .unwrap_err();
        assert!(matches!(e, FtpCommandError::ReplyTimedOut(FtpCommand::NOOP)));
    }

    #[tokio::test]
    async fn closed_channel() {
        let mock = Builder::new().build();
        let mut ch = channel(mock);
        ch.close().await;
        assert!(!ch.is_usable());
        let e = ch
            .execute(&FtpControlCommand::new(FtpCommand::QUIT))
            .await
            .unwrap_err();
        assert!(matches!(e, FtpCommandError::ChannelClosed));
    }

    #[tokio::test]
    async fn peer_closed() {
        let mock = Builder::new().write(b"PWD\r\n").build();
        let mut ch = channel(mock);
        let e = ch
            .execute(&FtpControlCommand::new(FtpCommand::PWD))
            .await
            .unwrap_err();
        assert!(matches!(e, FtpCommandError::RecvFailed(_)));
        assert!(!ch.is_usable());
    }

    #[tokio::test]
    async fn invalid_argument_keeps_channel() {
        let mock = Builder::new().build();
        let mut ch = channel(mock);
        let e = ch
            .execute(&FtpControlCommand::with_arg(FtpCommand::DELE, "a\nb"))
            .await
            .unwrap_err();
        assert!(matches!(e, FtpCommandError::InvalidArgument(_)));
        assert!(ch.is_usable());
    }
}
