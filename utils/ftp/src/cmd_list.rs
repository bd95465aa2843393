/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgMatches, Command};
use tokio::io::AsyncWriteExt;

use ftp_session::FtpDirectoryEntry;

use super::Session;

pub(super) const COMMAND: &str = "list";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("List path").arg(
        Arg::new(COMMAND_ARG_PATH)
            .value_name("FILE PATH")
            .num_args(1),
    )
}

fn format_entry(entry: &FtpDirectoryEntry) -> String {
    let kind = if entry.is_directory() { 'd' } else { '-' };
    let perm = entry.permissions().map(|p| p.octal()).unwrap_or("---");
    let size = entry
        .size()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mtime = entry
        .modified_at()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{kind}{perm} {:>8} {:>8} {size:>12} {mtime:>16} {}\n",
        entry.owner().unwrap_or("-"),
        entry.group().unwrap_or("-"),
        entry.name()
    )
}

pub(super) async fn run(session: &mut Session, args: &ArgMatches) -> anyhow::Result<()> {
    let path = args.get_one::<String>(COMMAND_ARG_PATH).map(|s| s.as_str());

    let entries = session.list(path).await?;
    let mut stdout = tokio::io::stdout();
    for entry in &entries {
        stdout.write_all(format_entry(entry).as_bytes()).await?;
    }
    stdout.flush().await?;
    Ok(())
}
