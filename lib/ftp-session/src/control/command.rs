/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use crate::error::FtpCommandError;

/// A control command verb together with the reply code that completes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpCommand {
    verb: &'static str,
    expected: u16,
}

impl FtpCommand {
    #[inline]
    pub fn verb(&self) -> &'static str {
        self.verb
    }

    #[inline]
    pub fn expected_code(&self) -> u16 {
        self.expected
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb)
    }
}

macro_rules! ftp_commands {
    (
        $(
            $(#[$docs:meta])*
            ($konst:ident, $phrase:expr, $code:expr);
        )+
    ) => {
        impl FtpCommand {
        $(
            $(#[$docs])*
            pub const $konst: FtpCommand = FtpCommand {
                verb: $phrase,
                expected: $code,
            };
        )+
        }
    };
}

ftp_commands! {
    /// a fake command for greeting
    (GREETING, "-", 220);
    (USER, "USER", 331);
    (PASS, "PASS", 230);
    (FEAT, "FEAT", 211);
    (TYPE_I, "TYPE I", 200);
    (NOOP, "NOOP", 200);
    (QUIT, "QUIT", 221);
    (PASV, "PASV", 227);
    (LIST, "LIST", 226);
    (MLSD, "MLSD", 226);
    (RETR, "RETR", 226);
    /// completes on transfer start (`125` is accepted too), the final 226 is
    /// waited for separately
    (STOR, "STOR", 150);
    (RNFR, "RNFR", 350);
    (RNTO, "RNTO", 250);
    (PWD, "PWD", 257);
    (CWD, "CWD", 250);
    (MKD, "MKD", 257);
    (RMD, "RMD", 250);
    (DELE, "DELE", 250);
    (STAT, "STAT", 211);
    (SIZE, "SIZE", 213);
    (MDTM, "MDTM", 213);
}

/// One request/response exchange on the control channel.
#[derive(Clone)]
pub struct FtpControlCommand {
    command: FtpCommand,
    argument: Option<String>,
    expected: u16,
    alternative: Option<u16>,
}

impl FtpControlCommand {
    pub fn new(command: FtpCommand) -> Self {
        FtpControlCommand {
            command,
            argument: None,
            expected: command.expected,
            alternative: None,
        }
    }

    pub fn with_arg<A: Into<String>>(command: FtpCommand, argument: A) -> Self {
        FtpControlCommand {
            command,
            argument: Some(argument.into()),
            expected: command.expected,
            alternative: None,
        }
    }

    /// Wait for `code` instead of the default code of the command.
    ///
    /// Any alternative code set before is cleared.
    pub fn with_expected_code(mut self, code: u16) -> Self {
        self.expected = code;
        self.alternative = None;
        self
    }

    /// Also complete the command on `code`, e.g. `125` for a transfer start.
    pub fn with_alternative_code(mut self, code: u16) -> Self {
        self.alternative = Some(code);
        self
    }

    #[inline]
    pub fn command(&self) -> FtpCommand {
        self.command
    }

    #[inline]
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    #[inline]
    pub fn expected_code(&self) -> u16 {
        self.expected
    }

    #[inline]
    pub fn alternative_code(&self) -> Option<u16> {
        self.alternative
    }

    pub(crate) fn is_completed_by(&self, code: u16) -> bool {
        code == self.expected || self.alternative == Some(code)
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, FtpCommandError> {
        let verb = self.command.verb.as_bytes();
        match &self.argument {
            Some(arg) => {
                if memchr::memchr2(b'\r', b'\n', arg.as_bytes()).is_some() {
                    return Err(FtpCommandError::InvalidArgument(self.command));
                }
                let mut buf = Vec::with_capacity(verb.len() + 1 + arg.len() + 2);
                buf.extend_from_slice(verb);
                buf.push(b' ');
                buf.extend_from_slice(arg.as_bytes());
                buf.extend_from_slice(b"\r\n");
                Ok(buf)
            }
            None => {
                let mut buf = Vec::with_capacity(verb.len() + 2);
                buf.extend_from_slice(verb);
                buf.extend_from_slice(b"\r\n");
                Ok(buf)
            }
        }
    }
}

impl fmt::Debug for FtpControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let argument = if self.command == FtpCommand::PASS {
            self.argument.as_ref().map(|_| "****")
        } else {
            self.argument.as_deref()
        };
        f.debug_struct("FtpControlCommand")
            .field("command", &self.command.verb)
            .field("argument", &argument)
            .field("expected", &self.expected)
            .field("alternative", &self.alternative)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode() {
        let cmd = FtpControlCommand::new(FtpCommand::PWD);
        assert_eq!(cmd.encode().unwrap(), b"PWD\r\n");
        assert_eq!(cmd.expected_code(), 257);

        let cmd = FtpControlCommand::with_arg(FtpCommand::RETR, "/pub/a file.txt");
        assert_eq!(cmd.encode().unwrap(), b"RETR /pub/a file.txt\r\n");

        let cmd = FtpControlCommand::new(FtpCommand::TYPE_I);
        assert_eq!(cmd.encode().unwrap(), b"TYPE I\r\n");
    }

    #[test]
    fn reject_line_break() {
        let cmd = FtpControlCommand::with_arg(FtpCommand::CWD, "a\r\nDELE b");
        assert!(matches!(
            cmd.encode(),
            Err(FtpCommandError::InvalidArgument(FtpCommand::CWD))
        ));
        let cmd = FtpControlCommand::with_arg(FtpCommand::CWD, "a\nb");
        assert!(cmd.encode().is_err());
    }

    #[test]
    fn override_expected() {
        let cmd = FtpControlCommand::with_arg(FtpCommand::STOR, "x").with_expected_code(226);
        assert_eq!(cmd.command().expected_code(), 150);
        assert_eq!(cmd.expected_code(), 226);
        assert!(cmd.is_completed_by(226));
        assert!(!cmd.is_completed_by(150));
    }

    #[test]
    fn alternative_code() {
        let start = FtpControlCommand::with_arg(FtpCommand::STOR, "x").with_alternative_code(125);
        assert!(start.is_completed_by(150));
        assert!(start.is_completed_by(125));
        assert!(!start.is_completed_by(226));

        let complete = start.clone().with_expected_code(226);
        assert_eq!(complete.alternative_code(), None);
        assert!(!complete.is_completed_by(125));
        assert!(complete.is_completed_by(226));
    }

    #[test]
    fn password_masked() {
        let cmd = FtpControlCommand::with_arg(FtpCommand::PASS, "secret");
        let s = format!("{cmd:?}");
        assert!(!s.contains("secret"));
        assert!(s.contains("PASS"));
    }
}
