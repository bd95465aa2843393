/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use ftp_session::FtpPayload;

use super::Session;

pub(super) const COMMAND: &str = "put";

const COMMAND_ARG_LOCAL: &str = "local";
const COMMAND_ARG_REMOTE: &str = "remote";
const COMMAND_ARG_TEXT: &str = "text";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Upload file")
        .arg(
            Arg::new(COMMAND_ARG_LOCAL)
                .value_name("LOCAL FILE")
                .value_parser(value_parser!(PathBuf))
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_REMOTE)
                .value_name("REMOTE PATH")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_TEXT)
                .help("upload as utf-8 text")
                .action(ArgAction::SetTrue)
                .short('t')
                .long("text"),
        )
}

pub(super) async fn run(session: &mut Session, args: &ArgMatches) -> anyhow::Result<()> {
    let (Some(local), Some(remote)) = (
        args.get_one::<PathBuf>(COMMAND_ARG_LOCAL),
        args.get_one::<String>(COMMAND_ARG_REMOTE),
    ) else {
        unreachable!()
    };

    let content = tokio::fs::read(local)
        .await
        .context(format!("failed to read {}", local.display()))?;
    let payload = if args.get_flag(COMMAND_ARG_TEXT) {
        let text = String::from_utf8(content)
            .map_err(|_| anyhow!("{} is not a valid utf-8 file", local.display()))?;
        FtpPayload::from(text)
    } else {
        FtpPayload::from(content)
    };

    let len = payload.len();
    session.upload(remote, payload).await?;
    println!("{len} bytes uploaded");
    Ok(())
}
