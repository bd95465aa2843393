/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpSocket, TcpStream};

use crate::reply::FtpPassiveEndpoint;

const DEFAULT_FTP_PORT: u16 = 21;

/// Hands out connected streams for the control and data channels.
///
/// A passive endpoint with an unspecified address stands for the peer of the
/// control connection.
#[async_trait]
pub trait FtpConnectionProvider<S: AsyncRead + AsyncWrite, E: std::error::Error> {
    async fn new_control_connection(&mut self, server: &FtpServerAddr) -> Result<S, E>;
    async fn new_data_connection(
        &mut self,
        server: &FtpServerAddr,
        endpoint: &FtpPassiveEndpoint,
    ) -> Result<S, E>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpServerAddr {
    host: String,
    port: u16,
}

impl FtpServerAddr {
    pub fn new<H: Into<String>>(host: H, port: u16) -> Self {
        FtpServerAddr {
            host: host.into(),
            port,
        }
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }
}

#[derive(Debug, Error)]
#[error("invalid ftp server address: {0}")]
pub struct FtpServerAddrParseError(String);

impl FromStr for FtpServerAddr {
    type Err = FtpServerAddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FtpServerAddrParseError(s.to_string());
        let s = s.trim();
        if s.is_empty() {
            return Err(invalid());
        }

        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
            let ip = IpAddr::from_str(host).map_err(|_| invalid())?;
            let port = match tail {
                "" => DEFAULT_FTP_PORT,
                _ => {
                    let port = tail.strip_prefix(':').ok_or_else(invalid)?;
                    u16::from_str(port).map_err(|_| invalid())?
                }
            };
            return Ok(FtpServerAddr::new(ip.to_string(), port));
        }

        // a bare ipv6 address
        if let Ok(ip) = IpAddr::from_str(s) {
            return Ok(FtpServerAddr::new(ip.to_string(), DEFAULT_FTP_PORT));
        }

        match s.rsplit_once(':') {
            Some((host, port)) => {
                if host.is_empty() {
                    return Err(invalid());
                }
                let port = u16::from_str(port).map_err(|_| invalid())?;
                Ok(FtpServerAddr::new(host, port))
            }
            None => Ok(FtpServerAddr::new(s, DEFAULT_FTP_PORT)),
        }
    }
}

impl fmt::Display for FtpServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Plain TCP connections, optionally bound to a local address.
#[derive(Debug, Default)]
pub struct TcpConnectionProvider {
    bind_ip: Option<IpAddr>,
    remote_addr: Option<SocketAddr>,
}

impl TcpConnectionProvider {
    pub fn set_bind_ip(&mut self, ip: IpAddr) {
        self.bind_ip = Some(ip);
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        if let Some(ip) = self.bind_ip {
            socket.bind(SocketAddr::new(ip, 0))?;
        }
        socket.connect(addr).await
    }

    fn data_addr(&self, endpoint: &FtpPassiveEndpoint) -> io::Result<SocketAddr> {
        if endpoint.host().is_unspecified() {
            match self.remote_addr {
                Some(addr) => Ok(SocketAddr::new(addr.ip(), endpoint.port())),
                None => Err(io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "no resolved server addr found",
                )),
            }
        } else {
            Ok(endpoint.socket_addr())
        }
    }
}

#[async_trait]
impl FtpConnectionProvider<TcpStream, io::Error> for TcpConnectionProvider {
    async fn new_control_connection(&mut self, server: &FtpServerAddr) -> io::Result<TcpStream> {
        let mut err = io::Error::new(io::ErrorKind::AddrNotAvailable, "no addr resolved");
        for addr in tokio::net::lookup_host((server.host(), server.port())).await? {
            match self.connect(addr).await {
                Ok(stream) => {
                    self.remote_addr = Some(addr);
                    return Ok(stream);
                }
                Err(e) => err = e,
            }
        }

        Err(err)
    }

    async fn new_data_connection(
        &mut self,
        _server: &FtpServerAddr,
        endpoint: &FtpPassiveEndpoint,
    ) -> io::Result<TcpStream> {
        let addr = self.data_addr(endpoint)?;
        self.connect(addr).await
    }
}
