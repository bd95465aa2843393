/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgAction, ArgMatches, Command};

use super::Session;

pub(super) const COMMAND: &str = "mkdir";

const COMMAND_ARG_PATH: &str = "path";
const COMMAND_ARG_CWD: &str = "cwd";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Create directory")
        .arg(
            Arg::new(COMMAND_ARG_PATH)
                .value_name("DIR PATH")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_CWD)
                .help("change into the new directory and print it")
                .action(ArgAction::SetTrue)
                .long("cwd"),
        )
}

pub(super) async fn run(session: &mut Session, args: &ArgMatches) -> anyhow::Result<()> {
    let Some(path) = args.get_one::<String>(COMMAND_ARG_PATH) else {
        unreachable!()
    };

    match session.mkd(path).await? {
        Some(created) => println!("created {created}"),
        None => println!("created {path}"),
    }
    if args.get_flag(COMMAND_ARG_CWD) {
        session.cwd(path).await?;
        let cwd = session.pwd().await?;
        println!("{cwd}");
    }
    Ok(())
}
