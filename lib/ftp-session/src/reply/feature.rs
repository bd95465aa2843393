/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

/// Server features learned from the FEAT reply at connect time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FtpCapabilities {
    mlst: bool,
    utf8: bool,
    size: bool,
    mdtm: bool,
    lines: Vec<String>,
}

impl FtpCapabilities {
    #[inline]
    pub fn mlst(&self) -> bool {
        self.mlst
    }

    #[inline]
    pub fn utf8(&self) -> bool {
        self.utf8
    }

    #[inline]
    pub fn size(&self) -> bool {
        self.size
    }

    #[inline]
    pub fn mdtm(&self) -> bool {
        self.mdtm
    }

    /// The raw FEAT reply lines, trimmed.
    pub fn feature_lines(&self) -> &[String] {
        &self.lines
    }

    fn parse_and_set(&mut self, line: &str) {
        // a single line may announce more than one feature
        if line.contains("MLST") {
            self.mlst = true;
        }
        if line.contains("UTF8") {
            self.utf8 = true;
        }
        if line.contains("SIZE") {
            self.size = true;
        }
        if line.contains("MDTM") {
            self.mdtm = true;
        }
    }
}

/// Scan every line of a FEAT reply for known feature names.
///
/// Unknown features are kept in the raw lines but otherwise ignored.
pub fn parse_feat(raw: &str) -> FtpCapabilities {
    let mut caps = FtpCapabilities::default();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        caps.parse_and_set(line);
        caps.lines.push(line.to_string());
    }
    caps
}
