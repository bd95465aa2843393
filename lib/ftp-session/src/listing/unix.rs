/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::{FtpDirectoryEntry, FtpPermissions};
use crate::error::FtpListingParseError;

const MIN_FIELDS: usize = 8;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse `ls -l` style LIST output.
///
/// Each line is laid out as
/// `permissions links owner group size month day year-or-time name...`.
/// Lines with fewer than 8 fields, like `total 12` headers, are skipped.
/// A `HH:MM` in place of the year means the current year.
pub fn parse_unix_listing(raw: &str) -> Vec<FtpDirectoryEntry> {
    parse_unix_listing_in_year(raw, Utc::now().year())
}

pub(super) fn parse_unix_listing_in_year(raw: &str, current_year: i32) -> Vec<FtpDirectoryEntry> {
    raw.lines()
        .filter_map(|line| match parse_line(line, current_year) {
            Ok(entry) => Some(entry),
            Err(e) => {
                if !line.trim().is_empty() {
                    crate::log_msg!("skipped LIST line '{}': {}", line.trim_end(), e);
                }
                None
            }
        })
        .collect()
}

fn parse_line(line: &str, current_year: i32) -> Result<FtpDirectoryEntry, FtpListingParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return Err(FtpListingParseError::TooFewFields(fields.len()));
    }

    let perm = fields[0];
    Ok(FtpDirectoryEntry {
        name: fields[MIN_FIELDS..].join(" "),
        size: u64::from_str(fields[4]).ok(),
        is_directory: perm.starts_with('d'),
        permissions: Some(FtpPermissions::from_symbolic(perm)),
        link_count: u64::from_str(fields[1]).ok(),
        owner: Some(fields[2].to_string()),
        group: Some(fields[3].to_string()),
        modified_at: parse_date(fields[5], fields[6], fields[7], current_year),
        facts: Default::default(),
    })
}

fn parse_date(month: &str, day: &str, year_or_time: &str, current_year: i32) -> Option<NaiveDateTime> {
    let month = month.get(..3)?.to_lowercase();
    let month = MONTHS.iter().position(|m| *m == month)? as u32 + 1;
    let day = u32::from_str(day).ok()?;

    let (year, time) = match year_or_time.split_once(':') {
        Some((h, m)) => {
            let time = NaiveTime::from_hms_opt(u32::from_str(h).ok()?, u32::from_str(m).ok()?, 0)?;
            (current_year, time)
        }
        None => (
            i32::from_str(year_or_time).ok()?,
            NaiveTime::from_hms_opt(0, 0, 0)?,
        ),
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(NaiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn single_file() {
        let entries =
            parse_unix_listing_in_year("-rw-r--r-- 1 bob staff 1024 Jan 5 10:00 report.txt\n", 2024);
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.name(), "report.txt");
        assert_eq!(e.size(), Some(1024));
        assert!(!e.is_directory());
        assert_eq!(e.permissions().unwrap().octal(), "644");
        assert_eq!(e.permissions().unwrap().raw(), "-rw-r--r--");
        assert_eq!(e.link_count(), Some(1));
        assert_eq!(e.owner(), Some("bob"));
        assert_eq!(e.group(), Some("staff"));
        assert_eq!(e.modified_at(), Some(&dt("2024-01-05 10:00")));
    }

    #[test]
    fn explicit_year_and_directory() {
        let entries = parse_unix_listing_in_year(
            "drwxr-xr-- 3 root wheel 4096 Mar 17 2019 backups\r\n",
            2024,
        );
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert!(e.is_directory());
        assert_eq!(e.permissions().unwrap().octal(), "754");
        assert_eq!(e.modified_at(), Some(&dt("2019-03-17 00:00")));
    }

    #[test]
    fn name_with_spaces() {
        let entries = parse_unix_listing_in_year(
            "-rw-rw-r--   1 ftp  ftp   12 DEC 24 2020 my   holiday  photo.jpg",
            2024,
        );
        assert_eq!(entries[0].name(), "my holiday photo.jpg");
        assert_eq!(entries[0].permissions().unwrap().octal(), "664");
        assert_eq!(entries[0].modified_at(), Some(&dt("2020-12-24 00:00")));
    }

    #[test]
    fn short_lines_skipped() {
        let raw = "total 24\n\n-rw-r--r-- 1 a b 1 Jan 1 2020 one\nlrwxrwxrwx 1 a b\n-rw-r--r-- 1 a b 2 Feb 2 2021 two\n";
        let entries = parse_unix_listing_in_year(raw, 2024);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name(), "one");
        assert_eq!(entries[1].name(), "two");
    }

    #[test]
    fn eight_fields_is_an_entry() {
        let entries = parse_unix_listing_in_year("-rw-r--r-- 1 a b 1 Jan 1 2020", 2024);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name(), "");
    }

    #[test]
    fn bad_values_kept_as_unknown() {
        let entries = parse_unix_listing_in_year("-rw-r--r-- x a b huge Foo 99 25:99 odd", 2024);
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.name(), "odd");
        assert!(e.size().is_none());
        assert!(e.link_count().is_none());
        assert!(e.modified_at().is_none());
    }
}
