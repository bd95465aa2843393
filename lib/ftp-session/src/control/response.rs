/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, BufStream};

use crate::error::{FtpRawResponseError, FtpReplyParseError};
use crate::reply;

/// A complete reply, continuation lines included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpControlResponse {
    code: u16,
    raw: String,
}

impl FtpControlResponse {
    pub fn parse(raw: String) -> Result<Self, FtpReplyParseError> {
        let code = reply::status_code(&raw)?;
        Ok(FtpControlResponse { code, raw })
    }

    #[inline]
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The reply text exactly as received, line terminators included.
    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The text following the status code on the final line.
    pub fn message(&self) -> &str {
        self.raw
            .lines()
            .rfind(|line| !line.trim().is_empty())
            .and_then(|line| line.get(4..))
            .unwrap_or_default()
            .trim_end()
    }
}

async fn read_line<T>(
    stream: &mut BufStream<T>,
    max_line_len: usize,
    buf: &mut Vec<u8>,
) -> Result<String, FtpRawResponseError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    buf.clear();
    let mut limited = (&mut *stream).take(max_line_len as u64);
    let len = limited
        .read_until(b'\n', buf)
        .await
        .map_err(FtpRawResponseError::ReadFailed)?;
    if len == 0 {
        return Err(FtpRawResponseError::ConnectionClosed);
    }

    #[cfg(feature = "log-raw-io")]
    crate::debug::log_rsp(String::from_utf8_lossy(buf).trim_end());

    if buf.last() != Some(&b'\n') {
        return if len >= max_line_len {
            Err(FtpRawResponseError::LineTooLong)
        } else {
            Err(FtpRawResponseError::ConnectionClosed)
        };
    }
    String::from_utf8(std::mem::take(buf)).map_err(|_| FtpRawResponseError::LineIsNotUtf8)
}

/// Read one reply block.
///
/// A first line of the form `ddd-text` opens a multi-line reply that lasts
/// until a line starting with `ddd `, the lines in between may hold anything.
pub(super) async fn read_reply<T>(
    stream: &mut BufStream<T>,
    max_line_len: usize,
    max_multi_lines: usize,
) -> Result<FtpControlResponse, FtpRawResponseError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(256);
    let first = read_line(stream, max_line_len, &mut buf).await?;
    let code = reply::status_code(&first)?;
    if !(100..600).contains(&code) {
        return Err(FtpRawResponseError::ReplyCodeOutOfRange(code));
    }

    match first.as_bytes().get(3) {
        None | Some(b' ') | Some(b'\r') | Some(b'\n') => {
            return Ok(FtpControlResponse { code, raw: first });
        }
        Some(b'-') => {}
        Some(_) => return Err(FtpRawResponseError::InvalidLineFormat),
    }

    let end_prefix = format!("{code} ");
    let mut raw = first;
    for _ in 0..max_multi_lines {
        let line = read_line(stream, max_line_len, &mut buf).await?;
        let end = line.starts_with(&end_prefix) || line.trim_end() == &end_prefix[..3];
        raw.push_str(&line);
        if end {
            return Ok(FtpControlResponse { code, raw });
        }
    }
    Err(FtpRawResponseError::TooManyLines)
}
