/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgMatches, Command};

use super::Session;

pub(super) const COMMAND: &str = "rmdir";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("Remove directory").arg(
        Arg::new(COMMAND_ARG_PATH)
            .value_name("DIR PATH")
            .num_args(1)
            .required(true),
    )
}

pub(super) async fn run(session: &mut Session, args: &ArgMatches) -> anyhow::Result<()> {
    let Some(path) = args.get_one::<String>(COMMAND_ARG_PATH) else {
        unreachable!()
    };

    session.rmd(path).await?;
    Ok(())
}
