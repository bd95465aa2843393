/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::str::FromStr;

use super::{FtpDirectoryEntry, FtpPermissions, time_val};
use crate::error::FtpListingParseError;

/// Parse MLSD output.
///
/// Each line is a list of `fact=value;` pairs followed by the entry name.
/// Fact keys are stored in lower case, values untouched, so facts this
/// parser knows nothing about are still available on the entry.
pub fn parse_machine_listing(raw: &str) -> Vec<FtpDirectoryEntry> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_line(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                crate::log_msg!("skipped MLSD line '{}': {}", line.trim_end(), e);
                None
            }
        })
        .collect()
}

type FactMap = BTreeMap<String, String>;

fn parse_facts(facts: &str, lenient: bool) -> Result<FactMap, FtpListingParseError> {
    let mut map = BTreeMap::new();
    for fact in facts.split(';') {
        if fact.is_empty() {
            continue;
        }
        let Some((key, value)) = fact.split_once('=') else {
            if lenient {
                crate::log_msg!("skipped fact '{}' without delimiter", fact);
                continue;
            }
            return Err(FtpListingParseError::NoDelimiterInFact(fact.to_string()));
        };
        map.insert(key.trim().to_lowercase(), value.to_string());
    }
    Ok(map)
}

/// Use the segment after the last ';' as the name.
fn split_last(line: &str) -> Result<(FactMap, &str), FtpListingParseError> {
    let (facts, name) = line.rsplit_once(';').ok_or(FtpListingParseError::NoFacts)?;
    Ok((parse_facts(facts, true)?, name))
}

fn parse_line(line: &str) -> Result<FtpDirectoryEntry, FtpListingParseError> {
    let line = line.trim_start();
    // RFC 3659 puts a single space between the facts and the name, so a name
    // containing ';' is still found
    let (map, name) = match memchr::memmem::find(line.as_bytes(), b"; ") {
        Some(p) => match parse_facts(&line[..p], false) {
            Ok(map) => (map, &line[p + 2..]),
            Err(e) => {
                crate::log_msg!("no RFC 3659 name in '{}': {}", line.trim_end(), e);
                split_last(line)?
            }
        },
        None => split_last(line)?,
    };
    if map.is_empty() {
        return Err(FtpListingParseError::NoFacts);
    }

    let mut entry = FtpDirectoryEntry {
        name: name.trim().to_string(),
        ..Default::default()
    };
    entry.is_directory = map.get("type").is_some_and(|t| t.to_lowercase().contains("dir"));
    entry.size = map
        .get("size")
        .or_else(|| map.get("sizd"))
        .and_then(|v| u64::from_str(v).ok());
    if let Some(v) = map.get("modify") {
        entry.modified_at = time_val::parse_from_str(v);
        if entry.modified_at.is_none() {
            crate::log_msg!("invalid modify fact '{}' for {}", v, entry.name);
        }
    }
    entry.permissions = map
        .get("unix.mode")
        .and_then(|v| FtpPermissions::from_numeric(v));
    entry.owner = map
        .get("unix.owner")
        .or_else(|| map.get("unix.uid"))
        .cloned();
    entry.group = map
        .get("unix.group")
        .or_else(|| map.get("unix.gid"))
        .cloned();
    entry.facts = map;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn rfc_line() {
        let entries = parse_machine_listing(
            "Type=file;Size=1830;Modify=20210525083610;Perm=r;UNIX.mode=0644;UNIX.owner=bob; notes; draft.txt\r\n",
        );
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.name(), "notes; draft.txt");
        assert!(!e.is_directory());
        assert_eq!(e.size(), Some(1830));
        assert_eq!(e.permissions().unwrap().octal(), "644");
        assert_eq!(e.owner(), Some("bob"));
        assert_eq!(e.fact("perm"), Some("r"));
        assert_eq!(e.fact("UNIX.mode"), Some("0644"));
        assert_eq!(
            e.modified_at(),
            Some(
                &NaiveDateTime::parse_from_str("2021-05-25 08:36:10", "%Y-%m-%d %H:%M:%S").unwrap()
            )
        );
    }

    #[test]
    fn trailing_segment_is_name() {
        let entries = parse_machine_listing("fact1=v1;Fact2=v2;name");
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.name(), "name");
        let keys: Vec<&str> = e.facts().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["fact1", "fact2"]);
        assert_eq!(e.fact("fact2"), Some("v2"));
    }

    #[test]
    fn directory_types() {
        let raw = "type=cdir;sizd=4096; .\ntype=pdir;sizd=4096; ..\ntype=dir;modify=202001021304; src\ntype=OS.unix=slink:/x; link\n";
        let entries = parse_machine_listing(raw);
        assert_eq!(entries.len(), 4);
        assert!(entries[0].is_directory());
        assert_eq!(entries[0].size(), Some(4096));
        assert!(entries[1].is_directory());
        assert!(entries[2].is_directory());
        assert!(entries[2].modified_at().is_some());
        assert!(!entries[3].is_directory());
        assert_eq!(entries[3].fact("type"), Some("OS.unix=slink:/x"));
    }

    #[test]
    fn media_type_fact() {
        let entries = parse_machine_listing("type=file;media-type=text/plain; a.txt");
        assert_eq!(entries[0].media_type(), Some(mime::TEXT_PLAIN));
    }

    #[test]
    fn invalid_lines_skipped() {
        let raw = "\r\ntype=file;size=1; ok\nnot a fact line\nbroken; bad\n;orphan\n";
        let entries = parse_machine_listing(raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name(), "ok");
    }

    #[test]
    fn stray_segment_before_name() {
        let entries = parse_machine_listing("type=file;size=1;a; b\r\n");
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.name(), "b");
        assert_eq!(e.size(), Some(1));
        let keys: Vec<&str> = e.facts().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["size", "type"]);
    }

    #[test]
    fn invalid_modify_kept() {
        let entries = parse_machine_listing("type=file;modify=yesterday; a");
        assert_eq!(entries.len(), 1);
        assert!(entries[0].modified_at().is_none());
        assert_eq!(entries[0].fact("modify"), Some("yesterday"));
    }
}
