/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use crate::error::FtpPassiveParseError;

/// The address a server listens on for the next data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpPassiveEndpoint {
    host: Ipv4Addr,
    port: u16,
}

impl FtpPassiveEndpoint {
    pub fn new(host: Ipv4Addr, port: u16) -> Self {
        FtpPassiveEndpoint { host, port }
    }

    #[inline]
    pub fn host(&self) -> Ipv4Addr {
        self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.host, self.port))
    }
}

impl fmt::Display for FtpPassiveEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Decode the `h1,h2,h3,h4,p1,p2` tuple of a 227 reply.
///
/// The numbers inside the parentheses are used when present, otherwise the
/// text after the status code. The port is `p1 * 256 + p2`.
pub fn parse_passive_endpoint(raw: &str) -> Result<FtpPassiveEndpoint, FtpPassiveParseError> {
    let text = raw.trim();
    let region = match memchr::memchr(b'(', text.as_bytes()) {
        Some(p_start) => match memchr::memchr(b')', &text.as_bytes()[p_start..]) {
            Some(p_end) => &text[p_start + 1..p_start + p_end],
            None => &text[p_start + 1..],
        },
        None => text.get(3..).unwrap_or_default(),
    };

    let numbers: Vec<&str> = region
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .take(6)
        .collect();
    if numbers.len() < 6 {
        return Err(FtpPassiveParseError::NotEnoughNumbers(numbers.len()));
    }

    let mut v = [0u8; 6];
    for (i, s) in numbers.iter().enumerate() {
        v[i] = u8::from_str(s).map_err(|_| FtpPassiveParseError::InvalidNumber(s.to_string()))?;
    }

    let host = Ipv4Addr::new(v[0], v[1], v[2], v[3]);
    let port = ((v[4] as u16) << 8) + (v[5] as u16);
    Ok(FtpPassiveEndpoint { host, port })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_reply() {
        let ep = parse_passive_endpoint("227 Entering Passive Mode (192,168,1,20,19,137).").unwrap();
        assert_eq!(ep.host(), Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(ep.port(), 19 * 256 + 137);
        assert_eq!(ep.to_string(), "192.168.1.20:5001");
    }

    #[test]
    fn without_parentheses() {
        let ep = parse_passive_endpoint("227 =10,0,0,1,4,1").unwrap();
        assert_eq!(ep.host(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(ep.port(), 1025);
    }

    #[test]
    fn port_encoding_is_exact() {
        for p1 in 0u16..=255 {
            for p2 in 0u16..=255 {
                let raw = format!("227 Entering Passive Mode (127,0,0,1,{p1},{p2})");
                let ep = parse_passive_endpoint(&raw).unwrap();
                assert_eq!(ep.port(), p1 * 256 + p2);
            }
        }
    }

    #[test]
    fn malformed() {
        assert_eq!(
            parse_passive_endpoint("227 Entering Passive Mode (127,0,0,1,4)"),
            Err(FtpPassiveParseError::NotEnoughNumbers(5))
        );
        assert_eq!(
            parse_passive_endpoint("227 Entering Passive Mode"),
            Err(FtpPassiveParseError::NotEnoughNumbers(0))
        );
        assert_eq!(
            parse_passive_endpoint("227 (127,0,0,1,256,1)"),
            Err(FtpPassiveParseError::InvalidNumber("256".to_string()))
        );
    }
}
