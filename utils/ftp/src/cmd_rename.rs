/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgMatches, Command};

use super::Session;

pub(super) const COMMAND: &str = "rename";

const COMMAND_ARG_FROM: &str = "from";
const COMMAND_ARG_TO: &str = "to";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Rename file or directory")
        .arg(
            Arg::new(COMMAND_ARG_FROM)
                .value_name("OLD PATH")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_TO)
                .value_name("NEW PATH")
                .num_args(1)
                .required(true),
        )
}

pub(super) async fn run(session: &mut Session, args: &ArgMatches) -> anyhow::Result<()> {
    let (Some(from), Some(to)) = (
        args.get_one::<String>(COMMAND_ARG_FROM),
        args.get_one::<String>(COMMAND_ARG_TO),
    ) else {
        unreachable!()
    };

    session.rename(from, to).await?;
    Ok(())
}
