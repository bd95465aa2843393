/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::error::Error;
use std::fmt;
use std::marker::PhantomData;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDateTime;
use log::{info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::FtpSessionConfig;
use crate::connection::{FtpConnectionProvider, FtpServerAddr};
use crate::control::{
    FtpCommand, FtpControlChannel, FtpControlCommand, FtpControlResponse, FtpKeepalive,
};
use crate::error::{FtpCommandError, FtpDataChannelError, FtpSessionError};
use crate::listing::{FtpDirectoryEntry, FtpListingFormat, time_val};
use crate::reply::{self, FtpCapabilities, FtpPassiveEndpoint};
use crate::transfer::{FtpDataChannel, FtpPayload, FtpTransferMode};

mod state;
pub use state::FtpSessionState;


const DEFAULT_LIST_PATH: &str = ".";

#[derive(Clone)]
pub struct FtpCredentials {
    username: String,
    password: String,
}

impl FtpCredentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        FtpCredentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Default for FtpCredentials {
    fn default() -> Self {
        FtpCredentials::new("anonymous", "xxx")
    }
}

impl fmt::Debug for FtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpCredentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

type SharedControl<S> = Arc<Mutex<FtpControlChannel<S>>>;

/// A logged in FTP session.
///
/// Operations must be awaited one after another, the control connection
/// carries a single command at a time.
pub struct FtpSession<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite,
    E: Error,
{
    server: FtpServerAddr,
    credentials: FtpCredentials,
    config: Arc<FtpSessionConfig>,
    provider: CP,
    state: FtpSessionState,
    capabilities: FtpCapabilities,
    control: Option<SharedControl<S>>,
    keepalive: Option<FtpKeepalive>,
    cancel: CancellationToken,
    _phantom: PhantomData<fn() -> E>,
}

impl<CP, S, E> FtpSession<CP, S, E>
where
    CP: FtpConnectionProvider<S, E> + Send,
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    E: Error + Send + Sync + 'static,
{
    pub fn new(
        server: FtpServerAddr,
        credentials: FtpCredentials,
        provider: CP,
        config: Arc<FtpSessionConfig>,
    ) -> Self {
        FtpSession {
            server,
            credentials,
            config,
            provider,
            state: FtpSessionState::Disconnected,
            capabilities: FtpCapabilities::default(),
            control: None,
            keepalive: None,
            cancel: CancellationToken::new(),
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub fn server(&self) -> &FtpServerAddr {
        &self.server
    }

    #[inline]
    pub fn state(&self) -> FtpSessionState {
        self.state
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state == FtpSessionState::Connected
    }

    /// Capabilities announced by the server, empty before connect.
    #[inline]
    pub fn capabilities(&self) -> &FtpCapabilities {
        &self.capabilities
    }

    /// The token that cancels the pending operation and tears the session down.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replace the cancellation token, required to reconnect after a cancellation.
    pub fn set_cancellation_token(&mut self, token: CancellationToken) {
        self.cancel = token;
    }

    pub async fn connect(&mut self) -> Result<(), FtpSessionError> {
        if self.state != FtpSessionState::Disconnected {
            return Err(FtpSessionError::InvalidState(self.state));
        }

        let cancel = self.cancel.clone();
        let r = tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(FtpSessionError::Cancelled),
            r = self.login() => r,
        };
        match r {
            Ok(control) => {
                self.state = FtpSessionState::Connected;
                self.keepalive =
                    FtpKeepalive::spawn(control, self.config.control.keepalive_interval);
                info!(
                    "ftp session to {} logged in as {}",
                    self.server, self.credentials.username
                );
                Ok(())
            }
            Err(e) => {
                warn!("ftp session to {} failed to connect: {e}", self.server);
                self.teardown().await;
                Err(e)
            }
        }
    }

    async fn login(&mut self) -> Result<SharedControl<S>, FtpSessionError> {
        let stream = match tokio::time::timeout(
            self.config.connect_timeout,
            self.provider.new_control_connection(&self.server),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(FtpSessionError::ConnectionFailed(Box::new(e))),
            Err(_) => return Err(FtpSessionError::ConnectTimedOut),
        };
        let control = Arc::new(Mutex::new(FtpControlChannel::new(
            stream,
            self.config.control.clone(),
        )));
        self.control = Some(control.clone());

        let mut ch = control.lock().await;
        ch.wait_greetings(self.config.greeting_timeout)
            .await
            .map_err(FtpSessionError::GreetingFailed)?;

        self.state = FtpSessionState::Authenticating;
        let user = FtpControlCommand::with_arg(FtpCommand::USER, self.credentials.username());
        ch.execute(&user).await.map_err(FtpSessionError::from_auth)?;
        let pass = FtpControlCommand::with_arg(FtpCommand::PASS, self.credentials.password());
        ch.execute(&pass).await.map_err(FtpSessionError::from_auth)?;

        self.state = FtpSessionState::NegotiatingCapabilities;
        let rsp = ch.execute(&FtpControlCommand::new(FtpCommand::FEAT)).await?;
        self.capabilities = reply::parse_feat(rsp.raw());
        crate::log_msg!(
            "server {} features: mlst={} utf8={}",
            self.server,
            self.capabilities.mlst(),
            self.capabilities.utf8()
        );

        self.state = FtpSessionState::SettingTransferMode;
        ch.execute(&FtpControlCommand::new(FtpCommand::TYPE_I))
            .await?;
        drop(ch);

        Ok(control)
    }

    pub async fn disconnect(&mut self) -> Result<(), FtpSessionError> {
        if self.state != FtpSessionState::Connected {
            return Err(FtpSessionError::InvalidState(self.state));
        }
        self.state = FtpSessionState::Disconnecting;
        if let Some(mut keepalive) = self.keepalive.take() {
            keepalive.stop().await;
        }

        let r = match self.control.clone() {
            Some(control) => {
                let cancel = self.cancel.clone();
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => Err(FtpSessionError::Cancelled),
                    r = async {
                        let mut ch = control.lock().await;
                        ch.execute(&FtpControlCommand::new(FtpCommand::QUIT)).await
                    } => r.map(|_| ()).map_err(FtpSessionError::from),
                }
            }
            None => Ok(()),
        };
        self.teardown().await;
        info!("ftp session to {} closed", self.server);
        r
    }

    /// Stop the keepalive, close the control connection and forget it.
    async fn teardown(&mut self) {
        if let Some(mut keepalive) = self.keepalive.take() {
            keepalive.stop().await;
        }
        if let Some(control) = self.control.take() {
            control.lock().await.close().await;
        }
        self.state = FtpSessionState::Disconnected;
    }

    fn connected_control(&self) -> Result<SharedControl<S>, FtpSessionError> {
        match &self.control {
            Some(control) if self.state == FtpSessionState::Connected => Ok(control.clone()),
            _ => Err(FtpSessionError::InvalidState(self.state)),
        }
    }

    /// Tear the session down if the error left the control connection unusable.
    async fn check_result<T>(
        &mut self,
        r: Result<T, FtpSessionError>,
        control: &SharedControl<S>,
    ) -> Result<T, FtpSessionError> {
        if let Err(e) = &r {
            let usable = control.lock().await.is_usable();
            if e.is_fatal() || !usable {
                warn!("ftp session to {} is lost: {e}", self.server);
                self.teardown().await;
            }
        }
        r
    }

    async fn run_commands(
        &mut self,
        commands: &[FtpControlCommand],
    ) -> Result<FtpControlResponse, FtpSessionError> {
        let control = self.connected_control()?;
        let cancel = self.cancel.clone();
        let r = tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(FtpSessionError::Cancelled),
            r = execute_all(&control, commands) => r,
        };
        self.check_result(r, &control).await
    }

    async fn run_command(
        &mut self,
        cmd: FtpControlCommand,
    ) -> Result<FtpControlResponse, FtpSessionError> {
        self.run_commands(std::slice::from_ref(&cmd)).await
    }

    async fn receive_transfer(
        &mut self,
        cmd: FtpControlCommand,
        mode: FtpTransferMode,
    ) -> Result<FtpPayload, FtpSessionError> {
        let control = self.connected_control()?;
        let cancel = self.cancel.clone();
        let r = tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(FtpSessionError::Cancelled),
            r = receive_data::<CP, S, E>(
                &mut self.provider,
                &self.server,
                &self.config,
                &control,
                &cmd,
                mode,
            ) => r,
        };
        self.check_result(r, &control).await
    }

    pub async fn noop(&mut self) -> Result<(), FtpSessionError> {
        self.run_command(FtpControlCommand::new(FtpCommand::NOOP))
            .await
            .map(|_| ())
    }

    /// List a directory, the current one if `path` is `None`.
    ///
    /// MLSD is used when the server announced MLST, LIST otherwise.
    pub async fn list(
        &mut self,
        path: Option<&str>,
    ) -> Result<Vec<FtpDirectoryEntry>, FtpSessionError> {
        let path = path.unwrap_or(DEFAULT_LIST_PATH);
        let (command, format) = if self.capabilities.mlst() {
            (FtpCommand::MLSD, FtpListingFormat::Machine)
        } else {
            (FtpCommand::LIST, FtpListingFormat::Unix)
        };
        let payload = self
            .receive_transfer(
                FtpControlCommand::with_arg(command, path),
                FtpTransferMode::Text,
            )
            .await?;
        let entries = format.parse(&payload.into_text());
        crate::log_msg!("listed {} entries in {} ({})", entries.len(), path, format);
        Ok(entries)
    }

    pub async fn download(&mut self, path: &str) -> Result<Bytes, FtpSessionError> {
        let payload = self
            .receive_transfer(
                FtpControlCommand::with_arg(FtpCommand::RETR, path),
                FtpTransferMode::Binary,
            )
            .await?;
        Ok(payload.into_bytes())
    }

    /// Store `payload` at `path`, in text mode for text payloads.
    pub async fn upload<P: Into<FtpPayload>>(
        &mut self,
        path: &str,
        payload: P,
    ) -> Result<(), FtpSessionError> {
        let payload = payload.into();
        let control = self.connected_control()?;
        let cancel = self.cancel.clone();
        let cmd = FtpControlCommand::with_arg(FtpCommand::STOR, path).with_alternative_code(125);
        let r = tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(FtpSessionError::Cancelled),
            r = send_data::<CP, S, E>(
                &mut self.provider,
                &self.server,
                &self.config,
                &control,
                &cmd,
                &payload,
            ) => r,
        };
        self.check_result(r, &control).await
    }

    pub async fn rename(&mut self, from: &str, to: &str) -> Result<(), FtpSessionError> {
        let commands = [
            FtpControlCommand::with_arg(FtpCommand::RNFR, from),
            FtpControlCommand::with_arg(FtpCommand::RNTO, to),
        ];
        self.run_commands(&commands).await.map(|_| ())
    }

    /// Get the current working directory.
    pub async fn pwd(&mut self) -> Result<String, FtpSessionError> {
        let rsp = self
            .run_command(FtpControlCommand::new(FtpCommand::PWD))
            .await?;
        reply::parse_quoted_path(rsp.raw()).ok_or_else(|| {
            FtpCommandError::InvalidReplySyntax(FtpCommand::PWD, rsp.code()).into()
        })
    }

    pub async fn cwd(&mut self, path: &str) -> Result<(), FtpSessionError> {
        self.run_command(FtpControlCommand::with_arg(FtpCommand::CWD, path))
            .await
            .map(|_| ())
    }

    /// Create a directory, returning the path reported by the server if any.
    pub async fn mkd(&mut self, path: &str) -> Result<Option<String>, FtpSessionError> {
        let rsp = self
            .run_command(FtpControlCommand::with_arg(FtpCommand::MKD, path))
            .await?;
        Ok(reply::parse_quoted_path(rsp.raw()))
    }

    pub async fn rmd(&mut self, path: &str) -> Result<(), FtpSessionError> {
        self.run_command(FtpControlCommand::with_arg(FtpCommand::RMD, path))
            .await
            .map(|_| ())
    }

    pub async fn dele(&mut self, path: &str) -> Result<(), FtpSessionError> {
        self.run_command(FtpControlCommand::with_arg(FtpCommand::DELE, path))
            .await
            .map(|_| ())
    }

    /// Get the server status, or the status of `path`, as raw reply text.
    pub async fn stat(&mut self, path: Option<&str>) -> Result<String, FtpSessionError> {
        let cmd = match path {
            Some(path) => FtpControlCommand::with_arg(FtpCommand::STAT, path),
            None => FtpControlCommand::new(FtpCommand::STAT),
        };
        let rsp = self.run_command(cmd).await?;
        Ok(rsp.raw().to_string())
    }

    pub async fn size(&mut self, path: &str) -> Result<u64, FtpSessionError> {
        let rsp = self
            .run_command(FtpControlCommand::with_arg(FtpCommand::SIZE, path))
            .await?;
        u64::from_str(rsp.message().trim())
            .map_err(|_| FtpCommandError::InvalidReplySyntax(FtpCommand::SIZE, rsp.code()).into())
    }

    /// Get the modification time of a file, in UTC.
    pub async fn mtime(&mut self, path: &str) -> Result<NaiveDateTime, FtpSessionError> {
        let rsp = self
            .run_command(FtpControlCommand::with_arg(FtpCommand::MDTM, path))
            .await?;
        time_val::parse_from_str(rsp.message().trim()).ok_or_else(|| {
            FtpCommandError::InvalidReplySyntax(FtpCommand::MDTM, rsp.code()).into()
        })
    }
}

async fn execute_all<S>(
    control: &Mutex<FtpControlChannel<S>>,
    commands: &[FtpControlCommand],
) -> Result<FtpControlResponse, FtpSessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut ch = control.lock().await;
    let mut last = None;
    for cmd in commands {
        last = Some(ch.execute(cmd).await?);
    }
    last.ok_or(FtpSessionError::Command(FtpCommandError::ChannelClosed))
}

/// Negotiate a passive endpoint and connect to it.
async fn open_data_channel<CP, S, E>(
    provider: &mut CP,
    server: &FtpServerAddr,
    config: &FtpSessionConfig,
    ch: &mut FtpControlChannel<S>,
    mode: FtpTransferMode,
) -> Result<FtpDataChannel<S>, FtpSessionError>
where
    CP: FtpConnectionProvider<S, E> + Send,
    S: AsyncRead + AsyncWrite + Unpin,
    E: Error + Send + Sync + 'static,
{
    let rsp = ch.execute(&FtpControlCommand::new(FtpCommand::PASV)).await?;
    let mut endpoint = reply::parse_passive_endpoint(rsp.raw())?;
    if config.passive_use_control_host {
        endpoint = FtpPassiveEndpoint::new(Ipv4Addr::UNSPECIFIED, endpoint.port());
    }
    crate::log_msg!("open data connection to {} for {}", endpoint, server);

    let stream = match tokio::time::timeout(
        config.connect_timeout,
        provider.new_data_connection(server, &endpoint),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(FtpDataChannelError::ConnectFailed(Box::new(e)).into()),
        Err(_) => return Err(FtpDataChannelError::ConnectTimedOut.into()),
    };
    Ok(FtpDataChannel::new(stream, mode, &config.transfer))
}

async fn receive_data<CP, S, E>(
    provider: &mut CP,
    server: &FtpServerAddr,
    config: &FtpSessionConfig,
    control: &Mutex<FtpControlChannel<S>>,
    cmd: &FtpControlCommand,
    mode: FtpTransferMode,
) -> Result<FtpPayload, FtpSessionError>
where
    CP: FtpConnectionProvider<S, E> + Send,
    S: AsyncRead + AsyncWrite + Unpin,
    E: Error + Send + Sync + 'static,
{
    let mut ch = control.lock().await;
    let data = open_data_channel::<CP, S, E>(provider, server, config, &mut ch, mode).await?;

    let transfer_timeout = config.transfer.transfer_timeout;
    let r = tokio::time::timeout(transfer_timeout, async {
        let reply = async {
            ch.execute_with_timeout(cmd, transfer_timeout)
                .await
                .map_err(FtpSessionError::from)
        };
        let payload = async { data.receive().await.map_err(FtpSessionError::from) };
        tokio::try_join!(reply, payload).map(|(_, payload)| payload)
    })
    .await;
    match r {
        Ok(Ok(payload)) => Ok(payload),
        Ok(Err(e)) => {
            if matches!(e, FtpSessionError::DataChannelFailed(_)) {
                // the final reply of the transfer command is still on its way
                ch.mark_broken();
            }
            Err(e)
        }
        Err(_) => Err(FtpSessionError::TransferTimedOut),
    }
}

async fn send_data<CP, S, E>(
    provider: &mut CP,
    server: &FtpServerAddr,
    config: &FtpSessionConfig,
    control: &Mutex<FtpControlChannel<S>>,
    cmd: &FtpControlCommand,
    payload: &FtpPayload,
) -> Result<(), FtpSessionError>
where
    CP: FtpConnectionProvider<S, E> + Send,
    S: AsyncRead + AsyncWrite + Unpin,
    E: Error + Send + Sync + 'static,
{
    let mut ch = control.lock().await;
    let data =
        open_data_channel::<CP, S, E>(provider, server, config, &mut ch, payload.mode()).await?;
    ch.execute(cmd).await?;

    let transfer_timeout = config.transfer.transfer_timeout;
    let complete = cmd.clone().with_expected_code(226);
    let r = tokio::time::timeout(transfer_timeout, async {
        if let Err(e) = data.send(payload).await {
            ch.mark_broken();
            return Err(FtpSessionError::from(e));
        }
        ch.wait_reply(&complete, transfer_timeout)
            .await
            .map_err(FtpSessionError::from)
    })
    .await;
    match r {
        Ok(Ok(_)) => {
            crate::log_msg!(
                "stored {} bytes to {}",
                payload.len(),
                cmd.argument().unwrap_or_default()
            );
            Ok(())
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(FtpSessionError::TransferTimedOut),
    }
}
