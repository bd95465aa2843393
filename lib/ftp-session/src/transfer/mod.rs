/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use log::warn;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::FtpTransferConfig;
use crate::error::FtpDataChannelError;

mod payload;
pub use payload::FtpPayload;

/// How the bytes of a data connection are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpTransferMode {
    /// bytes are kept exactly as received
    Binary,
    /// bytes are decoded as UTF-8 once the transfer completes
    Text,
}

pub(crate) struct FtpDataChannel<S> {
    stream: S,
    mode: FtpTransferMode,
    idle_timeout: Duration,
    max_receive_size: usize,
}

impl<S> FtpDataChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: S, mode: FtpTransferMode, config: &FtpTransferConfig) -> Self {
        FtpDataChannel {
            stream,
            mode,
            idle_timeout: config.data_idle_timeout,
            max_receive_size: config.max_receive_size,
        }
    }

    /// Receive until the server closes the connection.
    ///
    /// Once some data has arrived, a connection that stays silent for the idle
    /// timeout is also considered complete. Waiting for the first byte is only
    /// bounded by the caller.
    pub(crate) async fn receive(mut self) -> Result<FtpPayload, FtpDataChannelError> {
        let mut buf = BytesMut::with_capacity(16 * 1024);
        loop {
            let r = if buf.is_empty() {
                self.stream.read_buf(&mut buf).await
            } else {
                match tokio::time::timeout(self.idle_timeout, self.stream.read_buf(&mut buf)).await
                {
                    Ok(r) => r,
                    Err(_) => {
                        crate::log_msg!(
                            "data channel idle for {:?} after {} bytes, assume complete",
                            self.idle_timeout,
                            buf.len()
                        );
                        break;
                    }
                }
            };
            match r {
                Ok(0) => break,
                Ok(_) => {
                    if buf.len() > self.max_receive_size {
                        return Err(FtpDataChannelError::PayloadTooLarge(self.max_receive_size));
                    }
                }
                Err(e) => return Err(FtpDataChannelError::ReadFailed(e)),
            }
        }
        let _ = self.stream.shutdown().await;

        let data = buf.freeze();
        match self.mode {
            FtpTransferMode::Binary => Ok(FtpPayload::Binary(data)),
            FtpTransferMode::Text => Ok(FtpPayload::Text(decode_text(data))),
        }
    }

    /// Write the whole payload then close the write side, which marks the end of file.
    pub(crate) async fn send(mut self, payload: &FtpPayload) -> Result<(), FtpDataChannelError> {
        if payload.mode() != self.mode {
            crate::log_msg!(
                "sending {:?} payload on a {:?} data channel",
                payload.mode(),
                self.mode
            );
        }
        self.stream
            .write_all(payload.as_bytes())
            .await
            .map_err(FtpDataChannelError::WriteFailed)?;
        self.stream
            .flush()
            .await
            .map_err(FtpDataChannelError::WriteFailed)?;
        self.stream
            .shutdown()
            .await
            .map_err(FtpDataChannelError::WriteFailed)
    }
}

fn decode_text(data: Bytes) -> String {
    match String::from_utf8(data.to_vec()) {
        Ok(s) => s,
        Err(e) => {
            warn!("ftp data is not valid utf-8, decoding lossy");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    fn config() -> FtpTransferConfig {
        FtpTransferConfig::default()
    }

    #[tokio::test(start_paused = true)]
    async fn binary_idle_completion() {
        let (client, mut server) = duplex(1024);
        let channel = FtpDataChannel::new(client, FtpTransferMode::Binary, &config());
        let task = tokio::spawn(channel.receive());

        server.write_all(&[0x00, 0xff, 0x10]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        server.write_all(b"\r\nB").await.unwrap();
        // keep the server side open, completion comes from the idle timer

        let payload = task.await.unwrap().unwrap();
        assert_eq!(
            payload,
            FtpPayload::Binary(Bytes::from_static(b"\x00\xff\x10\r\nB"))
        );
        drop(server);
    }

    #[tokio::test]
    async fn text_until_eof() {
        let (client, mut server) = duplex(4);
        let channel = FtpDataChannel::new(client, FtpTransferMode::Text, &config());
        let task = tokio::spawn(channel.receive());

        // a multi byte char split over two writes
        let text = "name: caf\u{e9}\r\n";
        let bytes = text.as_bytes();
        server.write_all(&bytes[..9]).await.unwrap();
        server.write_all(&bytes[9..]).await.unwrap();
        drop(server);

        let payload = task.await.unwrap().unwrap();
        assert_eq!(payload, FtpPayload::Text(text.to_string()));
    }

    #[tokio::test]
    async fn lossy_text() {
        let (client, mut server) = duplex(64);
        server.write_all(b"ok \xff\n").await.unwrap();
        drop(server);
        let payload = FtpDataChannel::new(client, FtpTransferMode::Text, &config())
            .receive()
            .await
            .unwrap();
        assert_eq!(payload, FtpPayload::Text("ok \u{fffd}\n".to_string()));
    }

    #[tokio::test]
    async fn empty_transfer() {
        let (client, server) = duplex(64);
        drop(server);
        let payload = FtpDataChannel::new(client, FtpTransferMode::Binary, &config())
            .receive()
            .await
            .unwrap();
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn size_limit() {
        let mut config = config();
        config.set_max_receive_size(8);
        let (client, mut server) = duplex(64);
        server.write_all(b"0123456789").await.unwrap();
        drop(server);
        let r = FtpDataChannel::new(client, FtpTransferMode::Binary, &config)
            .receive()
            .await;
        assert!(matches!(r, Err(FtpDataChannelError::PayloadTooLarge(8))));
    }

    #[tokio::test]
    async fn send_then_eof() {
        let (client, mut server) = duplex(16);
        let channel = FtpDataChannel::new(client, FtpTransferMode::Text, &config());
        let payload = FtpPayload::from("line 1\nline 2\n");
        let reader = tokio::spawn(async move {
            let mut received = Vec::new();
            server.read_to_end(&mut received).await.unwrap();
            received
        });
        channel.send(&payload).await.unwrap();
        assert_eq!(reader.await.unwrap(), b"line 1\nline 2\n");
    }
}
