/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::Context;
use clap::{Arg, ArgMatches, Command, value_parser};
use tokio::io::AsyncWriteExt;

use super::Session;

pub(super) const COMMAND: &str = "get";

const COMMAND_ARG_PATH: &str = "path";
const COMMAND_ARG_OUTPUT: &str = "output";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Download file")
        .arg(
            Arg::new(COMMAND_ARG_PATH)
                .value_name("FILE PATH")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_OUTPUT)
                .help("write to this local file instead of stdout")
                .value_name("LOCAL FILE")
                .value_parser(value_parser!(PathBuf))
                .num_args(1)
                .short('o')
                .long("output"),
        )
}

pub(super) async fn run(session: &mut Session, args: &ArgMatches) -> anyhow::Result<()> {
    let Some(path) = args.get_one::<String>(COMMAND_ARG_PATH) else {
        unreachable!()
    };

    let data = session.download(path).await?;
    match args.get_one::<PathBuf>(COMMAND_ARG_OUTPUT) {
        Some(file) => tokio::fs::write(file, &data)
            .await
            .context(format!("failed to write to {}", file.display()))?,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&data).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
