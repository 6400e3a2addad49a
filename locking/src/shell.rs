// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Shell commands for inspecting locks.
//!
//! The `locking` command has the subcommands `show` and `get`, and, with
//! `CONFIG_LOCKING_SHELL_MANIPULATION`, `take`, `give` and `reset`.  A lock can be named by its ID
//! or, when names are kept, by its name.  IDs are read as C does: `0x` for hex, a leading `0` for
//! octal, otherwise decimal.
//!
//! This module does not read input itself.  The host splits a line into words and passes the
//! words after `locking` to [`execute`], along with something implementing [`Shell`] for the
//! output.

use core::fmt;

use crate::error::{Error, Result};
use crate::table::{LockId, LockTable};

/// Name of the top level command.
pub const COMMAND: &str = "locking";

/// How long `take` waits when no timeout is given.
pub const DEFAULT_WAIT_TIME_SECONDS: u32 = 3;

/// Somewhere to send command output.
pub trait Shell {
    /// Print a line of normal output.
    fn print(&mut self, line: &str);
    /// Print a line describing a failure.
    fn error(&mut self, line: &str);
}

/// A lock, as given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockRef {
    /// A numeric ID.
    Id(LockId),
    /// A name, to be looked up in the table.
    Name(String),
}

impl LockRef {
    /// Words can contain digits, but a name is unlikely to start with one.
    fn parse(token: &str) -> core::result::Result<LockRef, ParseError> {
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            parse_number(token)
                .and_then(|n| LockId::try_from(n).ok())
                .map(LockRef::Id)
                .ok_or_else(|| ParseError::InvalidNumber(token.to_string()))
        } else {
            Ok(LockRef::Name(token.to_string()))
        }
    }

    /// The ID this refers to.  Unknown names give [`INVALID_ID`](crate::INVALID_ID).
    pub fn resolve(&self, table: &LockTable<'_>) -> LockId {
        match self {
            LockRef::Id(id) => *id,
            LockRef::Name(name) => table.get_id(name),
        }
    }
}

/// Why a command line could not be understood.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing after `locking`.
    MissingSubcommand,
    /// A subcommand that does not exist, or is not enabled.
    UnknownSubcommand(String),
    /// Too many or too few arguments.
    UnexpectedParameters,
    /// A word that starts like a number but is not one.
    InvalidNumber(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingSubcommand => write!(f, "Missing subcommand"),
            ParseError::UnknownSubcommand(name) => write!(f, "Unknown subcommand: {}", name),
            ParseError::UnexpectedParameters => write!(f, "Unexpected parameters"),
            ParseError::InvalidNumber(token) => write!(f, "Invalid number: {}", token),
        }
    }
}

/// A parsed `locking` subcommand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// List the subcommands.
    Help,
    /// Display details on all locks.
    Show,
    /// Get details of a lock.
    Get(LockRef),
    /// Take a lock, waiting up to `seconds`.
    #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
    Take {
        /// The lock to take.
        lock: LockRef,
        /// How long to wait for it.
        seconds: u32,
    },
    /// Give a lock.
    #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
    Give(LockRef),
    /// Reset all semaphores.
    #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
    Reset,
}

impl Command {
    /// Parse the words following `locking`.  `args[0]` is the subcommand.
    pub fn parse(args: &[&str]) -> core::result::Result<Command, ParseError> {
        let (name, rest) = args.split_first().ok_or(ParseError::MissingSubcommand)?;

        match (*name, rest) {
            ("help", _) => Ok(Command::Help),
            ("show", _) => Ok(Command::Show),
            ("get", [lock]) => Ok(Command::Get(LockRef::parse(lock)?)),
            ("get", _) => Err(ParseError::UnexpectedParameters),
            #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
            ("take", [lock]) => Ok(Command::Take {
                lock: LockRef::parse(lock)?,
                seconds: DEFAULT_WAIT_TIME_SECONDS,
            }),
            #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
            ("take", [lock, seconds]) => Ok(Command::Take {
                lock: LockRef::parse(lock)?,
                seconds: parse_number(seconds)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| ParseError::InvalidNumber(seconds.to_string()))?,
            }),
            #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
            ("take", _) => Err(ParseError::UnexpectedParameters),
            #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
            ("give", [lock]) => Ok(Command::Give(LockRef::parse(lock)?)),
            #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
            ("give", _) => Err(ParseError::UnexpectedParameters),
            #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
            ("reset", _) => Ok(Command::Reset),
            (other, _) => Err(ParseError::UnknownSubcommand(other.to_string())),
        }
    }

    /// Run the command against a table.
    ///
    /// A `take` or `give` that fails is reported, but the command itself still succeeds.
    pub fn run<S>(self, table: &LockTable<'_>, shell: &mut S) -> Result<()>
        where S: Shell + ?Sized,
    {
        match self {
            Command::Help => {
                help(shell);
                Ok(())
            }
            Command::Show => {
                for status in table.statuses() {
                    shell.print(&status.to_string());
                }
                Ok(())
            }
            Command::Get(lock) => match table.show(lock.resolve(table)) {
                Ok(status) => {
                    shell.print(&status.to_string());
                    Ok(())
                }
                Err(err) => {
                    shell.error(&format!("Error getting lock details: {}", err.errno()));
                    Err(err)
                }
            },
            #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
            Command::Take { lock, seconds } => {
                let id = lock.resolve(table);
                let timeout = crate::time::Duration::secs(seconds as crate::time::Tick);
                match table.take(id, timeout) {
                    Ok(()) => shell.print(&format!("Lock {} ({}) taken", id, table.get_name(id))),
                    Err(err) => shell.error(&format!(
                        "Lock {} ({}) take failed: {}",
                        id,
                        table.get_name(id),
                        err.errno()
                    )),
                }
                Ok(())
            }
            #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
            Command::Give(lock) => {
                let id = lock.resolve(table);
                match table.give(id) {
                    Ok(()) => shell.print(&format!("Lock {} ({}) given", id, table.get_name(id))),
                    Err(err) => shell.error(&format!(
                        "Lock {} ({}) give failed: {}",
                        id,
                        table.get_name(id),
                        err.errno()
                    )),
                }
                Ok(())
            }
            #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
            Command::Reset => {
                table.reset();
                shell.print("Lock reset complete");
                Ok(())
            }
        }
    }
}

/// Parse and run one `locking` command line.
///
/// `args` holds the words after `locking`.  Lines that cannot be parsed are reported to the shell
/// and give [`Error::InvalidArgument`].
pub fn execute<S>(table: &LockTable<'_>, shell: &mut S, args: &[&str]) -> Result<()>
    where S: Shell + ?Sized,
{
    match Command::parse(args) {
        Ok(command) => command.run(table, shell),
        Err(err) => {
            shell.error(&err.to_string());
            if matches!(err, ParseError::MissingSubcommand | ParseError::UnknownSubcommand(_)) {
                help(shell);
            }
            Err(Error::InvalidArgument)
        }
    }
}

/// Print the subcommands that are available in this build.
pub fn help<S>(shell: &mut S)
    where S: Shell + ?Sized,
{
    shell.print(&format!("{} - Locking Utilities", COMMAND));
    shell.print("Subcommands:");
    shell.print("  show   :Display details on all locks");
    shell.print("  get    :Get details of a lock");
    #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
    {
        shell.print("  give   :Give mutex/semaphore lock");
        shell.print("  take   :Take mutex/semaphore lock");
        shell.print("  reset  :Reset all locks");
    }
}

/// Read an unsigned number with a C style base prefix.
fn parse_number(token: &str) -> Option<u64> {
    let hex = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X"));
    let (digits, radix) = if let Some(hex) = hex {
        (hex, 16)
    } else if token.len() > 1 && token.starts_with('0') {
        (&token[1..], 8)
    } else {
        (token, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Capture {
        out: Vec<String>,
        err: Vec<String>,
    }

    impl Shell for Capture {
        fn print(&mut self, line: &str) {
            self.out.push(line.to_string());
        }

        fn error(&mut self, line: &str) {
            self.err.push(line.to_string());
        }
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_number("0"), Some(0));
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("0x1f"), Some(31));
        assert_eq!(parse_number("010"), Some(8));
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("09"), None);
        assert_eq!(parse_number("4a"), None);
        assert_eq!(parse_number("0x+5"), None);
    }

    #[test]
    fn lock_refs() {
        assert_eq!(LockRef::parse("3"), Ok(LockRef::Id(3)));
        assert_eq!(LockRef::parse("0x10"), Ok(LockRef::Id(16)));
        assert_eq!(LockRef::parse("adc"), Ok(LockRef::Name("adc".into())));
        assert_eq!(LockRef::parse("uart2"), Ok(LockRef::Name("uart2".into())));
        assert_eq!(LockRef::parse("2uart"), Err(ParseError::InvalidNumber("2uart".into())));
        assert_eq!(LockRef::parse("70000"), Err(ParseError::InvalidNumber("70000".into())));
    }

    #[test]
    fn parse_arity() {
        assert_eq!(Command::parse(&[]), Err(ParseError::MissingSubcommand));
        assert_eq!(Command::parse(&["show"]), Ok(Command::Show));
        assert_eq!(Command::parse(&["get"]), Err(ParseError::UnexpectedParameters));
        assert_eq!(Command::parse(&["get", "1", "2"]), Err(ParseError::UnexpectedParameters));
        assert_eq!(Command::parse(&["get", "0"]), Ok(Command::Get(LockRef::Id(0))));
        assert_eq!(
            Command::parse(&["frob"]),
            Err(ParseError::UnknownSubcommand("frob".into()))
        );
    }

    #[test]
    fn show_and_get() {
        crate::lock_table! {
            static LOCKS;
            adc = 0 => Mutex;
            modem = 2 => Semaphore { count: 1, limit: 1 };
        }

        let mut shell = Capture::default();
        execute(&LOCKS, &mut shell, &["show"]).unwrap();
        assert_eq!(shell.out.len(), 2);
        assert!(shell.out[0].starts_with("[000] "));
        assert!(shell.out[0].ends_with(": mutex (0 locks held)"));
        assert!(shell.out[1].ends_with(": semaphore (1 of 1 lock free)"));

        let mut shell = Capture::default();
        execute(&LOCKS, &mut shell, &["get", "2"]).unwrap();
        assert_eq!(shell.out.len(), 1);
        assert!(shell.out[0].starts_with("[002] "));

        let mut shell = Capture::default();
        assert_eq!(execute(&LOCKS, &mut shell, &["get", "1"]), Err(Error::InvalidId));
        assert_eq!(shell.err, ["Error getting lock details: -22"]);

        let mut shell = Capture::default();
        assert_eq!(execute(&LOCKS, &mut shell, &["get"]), Err(Error::InvalidArgument));
        assert_eq!(shell.err, ["Unexpected parameters"]);
    }

    #[cfg(CONFIG_LOCKING_STRING_NAME)]
    #[test]
    fn get_by_name() {
        crate::lock_table! {
            static LOCKS;
            adc = 0 => Mutex;
        }

        let mut shell = Capture::default();
        execute(&LOCKS, &mut shell, &["get", "adc"]).unwrap();
        assert!(shell.out[0].starts_with("[000] adc "));
    }

    #[test]
    fn bad_lines_print_help() {
        crate::lock_table! {
            static LOCKS;
            adc = 0 => Mutex;
        }

        let mut shell = Capture::default();
        assert_eq!(execute(&LOCKS, &mut shell, &[]), Err(Error::InvalidArgument));
        assert_eq!(shell.err, ["Missing subcommand"]);
        assert_eq!(shell.out[0], "locking - Locking Utilities");

        let mut shell = Capture::default();
        assert_eq!(execute(&LOCKS, &mut shell, &["get", "0x"]), Err(Error::InvalidArgument));
        assert_eq!(shell.err, ["Invalid number: 0x"]);
        assert!(shell.out.is_empty());
    }

    #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
    #[test]
    fn take_and_give() {
        crate::lock_table! {
            static LOCKS;
            adc = 0 => Mutex;
            modem = 2 => Semaphore { count: 0, limit: 1 };
        }

        let mut shell = Capture::default();
        execute(&LOCKS, &mut shell, &["take", "0"]).unwrap();
        execute(&LOCKS, &mut shell, &["give", "0"]).unwrap();
        execute(&LOCKS, &mut shell, &["give", "0"]).unwrap();
        assert_eq!(shell.out.len(), 2);
        assert!(shell.out[0].starts_with("Lock 0 (") && shell.out[0].ends_with(") taken"));
        assert!(shell.out[1].ends_with(") given"));
        assert!(shell.err[0].ends_with(") give failed: -22"));

        // Nothing to take, and no wait.
        let mut shell = Capture::default();
        execute(&LOCKS, &mut shell, &["take", "2", "0"]).unwrap();
        assert!(shell.err[0].ends_with(") take failed: -16"));

        let mut shell = Capture::default();
        execute(&LOCKS, &mut shell, &["take", "5"]).unwrap();
        assert_eq!(shell.err, ["Lock 5 () take failed: -22"]);

        let mut shell = Capture::default();
        assert_eq!(
            execute(&LOCKS, &mut shell, &["take", "0", "1", "2"]),
            Err(Error::InvalidArgument)
        );
        assert_eq!(shell.err, ["Unexpected parameters"]);
    }

    #[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
    #[test]
    fn reset_empties_semaphores() {
        crate::lock_table! {
            static LOCKS;
            pool = 0 => Semaphore { count: 3, limit: 3 };
        }

        let mut shell = Capture::default();
        execute(&LOCKS, &mut shell, &["reset"]).unwrap();
        assert_eq!(shell.out, ["Lock reset complete"]);

        execute(&LOCKS, &mut shell, &["get", "0"]).unwrap();
        assert!(shell.out[1].ends_with(": semaphore (0 of 3 locks free)"));
    }
}
