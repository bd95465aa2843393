/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use bytes::Bytes;

use super::FtpTransferMode;

/// Content carried by a data connection.
///
/// For an upload the variant also selects the transfer mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FtpPayload {
    Binary(Bytes),
    Text(String),
}

impl FtpPayload {
    pub fn mode(&self) -> FtpTransferMode {
        match self {
            FtpPayload::Binary(_) => FtpTransferMode::Binary,
            FtpPayload::Text(_) => FtpTransferMode::Text,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FtpPayload::Binary(b) => b.as_ref(),
            FtpPayload::Text(s) => s.as_bytes(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            FtpPayload::Binary(b) => b,
            FtpPayload::Text(s) => Bytes::from(s),
        }
    }

    /// Get the text, decoding binary content lossy.
    pub fn into_text(self) -> String {
        match self {
            FtpPayload::Binary(b) => String::from_utf8_lossy(&b).into_owned(),
            FtpPayload::Text(s) => s,
        }
    }
}

impl From<Bytes> for FtpPayload {
    fn from(value: Bytes) -> Self {
        FtpPayload::Binary(value)
    }
}

impl From<Vec<u8>> for FtpPayload {
    fn from(value: Vec<u8>) -> Self {
        FtpPayload::Binary(Bytes::from(value))
    }
}

impl From<&[u8]> for FtpPayload {
    fn from(value: &[u8]) -> Self {
        FtpPayload::Binary(Bytes::copy_from_slice(value))
    }
}

impl From<String> for FtpPayload {
    fn from(value: String) -> Self {
        FtpPayload::Text(value)
    }
}

impl From<&str> for FtpPayload {
    fn from(value: &str) -> Self {
        FtpPayload::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        let p = FtpPayload::from(vec![1u8, 2, 3]);
        assert_eq!(p.mode(), FtpTransferMode::Binary);
        assert_eq!(p.len(), 3);

        let p = FtpPayload::from("héllo");
        assert_eq!(p.mode(), FtpTransferMode::Text);
        assert_eq!(p.as_bytes(), "héllo".as_bytes());
        assert_eq!(p.clone().into_bytes(), Bytes::from("héllo"));
        assert_eq!(p.into_text(), "héllo");

        let p = FtpPayload::from(&b"\xffx"[..]);
        assert_eq!(p.into_text(), "\u{fffd}x");
    }
}
