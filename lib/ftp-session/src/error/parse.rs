/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FtpReplyParseError {
    #[error("empty reply")]
    Empty,
    #[error("status line too short")]
    TooShort,
    #[error("status code is not numeric: {0}")]
    NotNumeric(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FtpPassiveParseError {
    #[error("only {0} numbers found in passive reply")]
    NotEnoughNumbers(usize),
    #[error("invalid number {0} in passive reply")]
    InvalidNumber(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FtpListingParseError {
    #[error("only {0} fields found")]
    TooFewFields(usize),
    #[error("no delimiter in fact ({0})")]
    NoDelimiterInFact(String),
    #[error("no fact found")]
    NoFacts,
}
