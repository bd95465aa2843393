/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

//! Decoding of control channel reply text.
//!
//! All functions here are stateless and work on the raw reply text as
//! collected by the control channel, continuation lines included.

use crate::error::FtpReplyParseError;

mod feature;
pub use feature::{FtpCapabilities, parse_feat};

mod passive;
pub use passive::{FtpPassiveEndpoint, parse_passive_endpoint};

/// Get the status code of a reply.
///
/// The code is always taken from the last non-empty line, so any number of
/// continuation lines above it does not change the result.
pub fn status_code(raw: &str) -> Result<u16, FtpReplyParseError> {
    let line = raw
        .lines()
        .map(str::trim_end)
        .rfind(|line| !line.is_empty())
        .ok_or(FtpReplyParseError::Empty)?;

    let Some(code) = line.get(..3) else {
        return if line.len() < 3 {
            Err(FtpReplyParseError::TooShort)
        } else {
            Err(FtpReplyParseError::NotNumeric(line.to_string()))
        };
    };
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FtpReplyParseError::NotNumeric(code.to_string()));
    }

    let b = code.as_bytes();
    Ok((b[0] - b'0') as u16 * 100 + (b[1] - b'0') as u16 * 10 + (b[2] - b'0') as u16)
}

/// Extract the quoted path from a PWD or MKD reply.
///
/// Doubled quotes inside the path stand for a single quote character.
pub fn parse_quoted_path(raw: &str) -> Option<String> {
    let start = memchr::memchr(b'"', raw.as_bytes())?;
    let mut path = String::new();
    let mut chars = raw[start + 1..].chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                path.push('"');
            } else {
                return Some(path);
            }
        } else {
            path.push(c);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_single_line() {
        assert_eq!(status_code("200 Command okay.\r\n").unwrap(), 200);
        assert_eq!(status_code("221").unwrap(), 221);
    }

    #[test]
    fn status_ignores_continuation() {
        let last = "211 End\r\n";
        let expected = status_code(last).unwrap();
        let multi = "211-Features:\r\n MLST size*;modify*;\r\n UTF8\r\n211 End\r\n";
        assert_eq!(status_code(multi).unwrap(), expected);
        let padded = "some text\n\n   \n211 End\n\n";
        assert_eq!(status_code(padded).unwrap(), expected);
    }

    #[test]
    fn status_errors() {
        assert_eq!(status_code(""), Err(FtpReplyParseError::Empty));
        assert_eq!(status_code("\r\n  \r\n"), Err(FtpReplyParseError::Empty));
        assert_eq!(status_code("20"), Err(FtpReplyParseError::TooShort));
        assert!(matches!(
            status_code("2x0 oops"),
            Err(FtpReplyParseError::NotNumeric(_))
        ));
        // multi byte char across the code boundary must not panic
        assert!(matches!(
            status_code("2é0"),
            Err(FtpReplyParseError::NotNumeric(_))
        ));
    }

    #[test]
    fn quoted_path() {
        assert_eq!(
            parse_quoted_path("257 \"/home/bob\" is current directory").as_deref(),
            Some("/home/bob")
        );
        assert_eq!(
            parse_quoted_path("257 \"/a \"\"quoted\"\" dir\" created").as_deref(),
            Some("/a \"quoted\" dir")
        );
        assert!(parse_quoted_path("257 no quotes").is_none());
        assert!(parse_quoted_path("257 \"unterminated").is_none());
    }
}
