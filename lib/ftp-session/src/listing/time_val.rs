/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a RFC 3659 time value: `YYYYMMDDHHMM` with optional seconds and
/// an optional `.fraction`.
pub(crate) fn parse_from_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let (digits, fraction) = match s.split_once('.') {
        Some((d, f)) => (d, Some(f)),
        None => (s, None),
    };
    if !(digits.len() == 12 || digits.len() == 14) || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let num = |r: std::ops::Range<usize>| u32::from_str(&digits[r]).ok();
    let year = i32::from_str(&digits[0..4]).ok()?;
    let date = NaiveDate::from_ymd_opt(year, num(4..6)?, num(6..8)?)?;
    let second = if digits.len() == 14 { num(12..14)? } else { 0 };

    let nano = match fraction {
        Some(f) if !f.is_empty() && f.len() <= 9 && f.bytes().all(|b| b.is_ascii_digit()) => {
            u32::from_str(&format!("{f:0<9}")).ok()?
        }
        Some(_) => return None,
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(num(8..10)?, num(10..12)?, second, nano)?;
    Some(NaiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn parse_minutes() {
        assert_eq!(
            parse_from_str("202112011020").unwrap(),
            dt("2021-12-01 10:20:00")
        );
    }

    #[test]
    fn parse_no_dot() {
        assert_eq!(
            parse_from_str("20211201102030").unwrap(),
            dt("2021-12-01 10:20:30")
        );
    }

    #[test]
    fn parse_dot() {
        assert_eq!(
            parse_from_str("20211201102030.1").unwrap(),
            dt("2021-12-01 10:20:30.1")
        );
        assert_eq!(
            parse_from_str("20211201102030.123").unwrap(),
            dt("2021-12-01 10:20:30.123")
        );
    }

    #[test]
    fn parse_invalid() {
        assert!(parse_from_str("2021120110").is_none());
        assert!(parse_from_str("20211301102030").is_none());
        assert!(parse_from_str("2021120110203x").is_none());
        assert!(parse_from_str("20211201102030.").is_none());
    }
}
