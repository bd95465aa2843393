/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

//! Decoding of directory listings received on a data channel.
//!
//! Lines that can not be decoded are skipped, they never fail the whole listing.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use mime::Mime;

mod machine;
pub(crate) mod time_val;
mod unix;

pub use machine::parse_machine_listing;
pub use unix::parse_unix_listing;

/// The listing command and matching parser used for a `list` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpListingFormat {
    /// `LIST` with `ls -l` style output
    Unix,
    /// `MLSD` with RFC 3659 fact lines
    Machine,
}

impl FtpListingFormat {
    pub fn parse(&self, raw: &str) -> Vec<FtpDirectoryEntry> {
        match self {
            FtpListingFormat::Unix => parse_unix_listing(raw),
            FtpListingFormat::Machine => parse_machine_listing(raw),
        }
    }
}

impl fmt::Display for FtpListingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpListingFormat::Unix => f.write_str("unix"),
            FtpListingFormat::Machine => f.write_str("machine"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpPermissions {
    raw: String,
    octal: String,
}

impl FtpPermissions {
    /// Build from a `drwxr-xr-x` style string.
    pub fn from_symbolic(raw: &str) -> Self {
        FtpPermissions {
            raw: raw.to_string(),
            octal: symbolic_to_octal(raw),
        }
    }

    /// Build from a numeric mode like `0755`, keeping the last three digits.
    pub(crate) fn from_numeric(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return None;
        }
        let octal = if raw.len() >= 3 {
            raw[raw.len() - 3..].to_string()
        } else {
            format!("{raw:0>3}")
        };
        Some(FtpPermissions {
            raw: raw.to_string(),
            octal,
        })
    }

    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The owner/group/other triple, e.g. `754`.
    #[inline]
    pub fn octal(&self) -> &str {
        &self.octal
    }
}

fn symbolic_to_octal(perm: &str) -> String {
    let b = perm.as_bytes();
    let bit = |i: usize, letters: &[u8], value: u8| -> u8 {
        match b.get(i) {
            Some(c) if letters.contains(c) => value,
            _ => 0,
        }
    };

    let mut octal = String::with_capacity(3);
    for triad in 0..3 {
        let base = 1 + triad * 3;
        let exec_letters: &[u8] = if triad == 2 { b"xt" } else { b"xs" };
        let v = bit(base, b"r", 4) + bit(base + 1, b"w", 2) + bit(base + 2, exec_letters, 1);
        octal.push((b'0' + v) as char);
    }
    octal
}

/// One entry of a directory listing.
#[derive(Debug, Clone, Default)]
pub struct FtpDirectoryEntry {
    name: String,
    size: Option<u64>,
    is_directory: bool,
    permissions: Option<FtpPermissions>,
    link_count: Option<u64>,
    owner: Option<String>,
    group: Option<String>,
    modified_at: Option<NaiveDateTime>,
    facts: BTreeMap<String, String>,
}

impl FtpDirectoryEntry {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    #[inline]
    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    #[inline]
    pub fn permissions(&self) -> Option<&FtpPermissions> {
        self.permissions.as_ref()
    }

    #[inline]
    pub fn link_count(&self) -> Option<u64> {
        self.link_count
    }

    #[inline]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    #[inline]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Modification time as reported by the server.
    ///
    /// MLSD times are UTC, LIST times are in whatever zone the server uses.
    #[inline]
    pub fn modified_at(&self) -> Option<&NaiveDateTime> {
        self.modified_at.as_ref()
    }

    /// All facts of a machine listing line, keyed in lower case.
    #[inline]
    pub fn facts(&self) -> &BTreeMap<String, String> {
        &self.facts
    }

    pub fn fact(&self, key: &str) -> Option<&str> {
        self.facts.get(&key.to_lowercase()).map(|s| s.as_str())
    }

    pub fn media_type(&self) -> Option<Mime> {
        self.fact("media-type").and_then(|v| v.parse().ok())
    }
}
