/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgMatches, Command};

use super::Session;

pub(super) const COMMAND: &str = "stat";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Show server or path status")
        .arg(
            Arg::new(COMMAND_ARG_PATH)
                .value_name("FILE PATH")
                .num_args(1),
        )
}

pub(super) async fn run(session: &mut Session, args: &ArgMatches) -> anyhow::Result<()> {
    let path = args.get_one::<String>(COMMAND_ARG_PATH).map(|s| s.as_str());

    let status = session.stat(path).await?;
    println!("{status}");
    if let Some(path) = path {
        // not every server supports MDTM
        match session.mtime(path).await {
            Ok(dt) => println!("mtime: {dt}"),
            Err(e) => log::info!("no mtime for {path}: {e}"),
        }
    }
    Ok(())
}
