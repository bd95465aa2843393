/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{ArgMatches, Command};

use super::Session;

pub(super) const COMMAND: &str = "pwd";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("Print working directory")
}

pub(super) async fn run(session: &mut Session, _args: &ArgMatches) -> anyhow::Result<()> {
    let path = session.pwd().await?;
    println!("{path}");
    Ok(())
}
