/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, Command, value_parser};
use clap_complete::Shell;
use tokio::net::TcpStream;
use yaml_rust::YamlLoader;

use ftp_session::{
    FtpCredentials, FtpServerAddr, FtpSession, FtpSessionConfig, FtpSessionError,
    TcpConnectionProvider,
};

mod logger;

mod cmd_del;
mod cmd_get;
mod cmd_list;
mod cmd_mkdir;
mod cmd_put;
mod cmd_pwd;
mod cmd_rename;
mod cmd_rmdir;
mod cmd_size;
mod cmd_stat;

type Session = FtpSession<TcpConnectionProvider, TcpStream, io::Error>;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_SERVER: &str = "server";
const GLOBAL_ARG_USERNAME: &str = "username";
const GLOBAL_ARG_PASSWORD: &str = "password";
const GLOBAL_ARG_SOURCE_IP: &str = "source-ip";
const GLOBAL_ARG_CONFIG: &str = "config";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

fn build_cli_args() -> Command {
    Command::new("ftp-session")
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SERVER)
                .help("FTP server address")
                .num_args(1)
                .value_name("SERVER ADDRESS")
                .required_unless_present(GLOBAL_ARG_COMPLETION),
        )
        .arg(
            Arg::new(GLOBAL_ARG_USERNAME)
                .help("FTP username")
                .num_args(1)
                .value_name("USERNAME")
                .short('u')
                .long("username")
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PASSWORD)
                .help("FTP password")
                .num_args(1)
                .value_name("PASSWORD")
                .short('p')
                .long("password")
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SOURCE_IP)
                .help("source ip address")
                .num_args(1)
                .value_name("IP ADDRESS")
                .value_parser(value_parser!(IpAddr))
                .long("source")
                .short('s')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CONFIG)
                .help("session config file in yaml format")
                .num_args(1)
                .value_name("CONFIG FILE")
                .value_parser(value_parser!(PathBuf))
                .long("config")
                .short('c')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .global(true),
        )
        .subcommand(cmd_list::command())
        .subcommand(cmd_get::command())
        .subcommand(cmd_put::command())
        .subcommand(cmd_del::command())
        .subcommand(cmd_mkdir::command())
        .subcommand(cmd_rmdir::command())
        .subcommand(cmd_rename::command())
        .subcommand(cmd_pwd::command())
        .subcommand(cmd_stat::command())
        .subcommand(cmd_size::command())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<FtpSessionConfig> {
    let Some(path) = path else {
        return Ok(FtpSessionConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .context(format!("failed to read config file {}", path.display()))?;
    let docs = YamlLoader::load_from_str(&content)
        .map_err(|e| anyhow!("invalid yaml file {}: {e}", path.display()))?;
    match docs.first() {
        Some(doc) => FtpSessionConfig::parse_yaml(doc)
            .context(format!("invalid session config in {}", path.display())),
        None => Ok(FtpSessionConfig::default()),
    }
}

/// The subcommand error wins, a disconnect failure after it is only logged.
fn merge_disconnect_result(
    ret: anyhow::Result<()>,
    disconnect: Result<(), FtpSessionError>,
) -> anyhow::Result<()> {
    match (ret, disconnect) {
        (Ok(()), Err(e)) => Err(anyhow!("failed to disconnect: {e}")),
        (Err(e), Err(de)) => {
            log::warn!("failed to disconnect: {de}");
            Err(e)
        }
        (ret, Ok(())) => ret,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    logger::SyncLogger::new(verbose_level)
        .into_global_logger()
        .map_err(|e| anyhow!("failed to setup logger: {e}"))?;

    let server = args
        .get_one::<String>(GLOBAL_ARG_SERVER)
        .ok_or_else(|| anyhow!("no server address set"))?;
    let server = FtpServerAddr::from_str(server)?;

    let credentials = match args.get_one::<String>(GLOBAL_ARG_USERNAME) {
        Some(username) => {
            let password = args
                .get_one::<String>(GLOBAL_ARG_PASSWORD)
                .map(|s| s.as_str())
                .unwrap_or_default();
            FtpCredentials::new(username.as_str(), password)
        }
        None => FtpCredentials::default(),
    };

    let config = load_config(args.get_one::<PathBuf>(GLOBAL_ARG_CONFIG))?;

    let mut conn_provider = TcpConnectionProvider::default();
    if let Some(ip) = args.get_one::<IpAddr>(GLOBAL_ARG_SOURCE_IP) {
        conn_provider.set_bind_ip(*ip);
    }

    let Some((subcommand, args)) = args.subcommand() else {
        return Err(anyhow!("no subcommand found"));
    };

    let mut session: Session =
        FtpSession::new(server, credentials, conn_provider, Arc::new(config));
    session.connect().await?;

    let ret = match subcommand {
        cmd_list::COMMAND => cmd_list::run(&mut session, args).await,
        cmd_get::COMMAND => cmd_get::run(&mut session, args).await,
        cmd_put::COMMAND => cmd_put::run(&mut session, args).await,
        cmd_del::COMMAND => cmd_del::run(&mut session, args).await,
        cmd_mkdir::COMMAND => cmd_mkdir::run(&mut session, args).await,
        cmd_rmdir::COMMAND => cmd_rmdir::run(&mut session, args).await,
        cmd_rename::COMMAND => cmd_rename::run(&mut session, args).await,
        cmd_pwd::COMMAND => cmd_pwd::run(&mut session, args).await,
        cmd_stat::COMMAND => cmd_stat::run(&mut session, args).await,
        cmd_size::COMMAND => cmd_size::run(&mut session, args).await,
        cmd => Err(anyhow!("invalid subcommand {cmd}")),
    };

    if session.is_connected() {
        let r = session.disconnect().await;
        return merge_disconnect_result(ret, r);
    }

    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_kept_on_disconnect_failure() {
        let r = merge_disconnect_result(
            Err(anyhow!("no such file")),
            Err(FtpSessionError::TransferTimedOut),
        );
        assert_eq!(r.unwrap_err().to_string(), "no such file");
    }

    #[test]
    fn disconnect_failure_reported() {
        let r = merge_disconnect_result(Ok(()), Err(FtpSessionError::Cancelled));
        assert!(r.unwrap_err().to_string().contains("failed to disconnect"));

        let r = merge_disconnect_result(Err(anyhow!("denied")), Ok(()));
        assert_eq!(r.unwrap_err().to_string(), "denied");
        assert!(merge_disconnect_result(Ok(()), Ok(())).is_ok());
    }

    #[test]
    fn cli_args() {
        build_cli_args().debug_assert();
    }
}
