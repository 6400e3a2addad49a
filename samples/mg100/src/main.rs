// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! MG100 locks
//!
//! Declares the MG100 lock table, and runs a console on stdin that accepts `locking` shell
//! commands.  A background thread takes the ADC lock now and then, so `locking show` has
//! something to report.

#![allow(unexpected_cfgs)]

use std::io;
use std::thread;

use log::{info, warn};

use locking::printkln;
use locking::time::Duration;

locking::lock_table! {
    /// Locks shared across the MG100 application.
    static LOCKING;
    adc = 0 => Mutex;
    modem_tx = 2 => Semaphore { count: 1, limit: 1 };
}

fn main() -> io::Result<()> {
    if unsafe { locking::set_logger() }.is_err() {
        printkln!("logger already installed");
    }

    LOCKING.initialise().map_err(io::Error::other)?;
    info!("{} locks, highest id {:?}", LOCKING.len(), LOCKING.max_id());

    thread::Builder::new()
        .name("adc_sampler".into())
        .spawn(sample_adc)?;

    console::run()
}

/// Hold the ADC for a moment, once a second.
fn sample_adc() {
    loop {
        match LOCKING.take(LOCKING_ID_ADC, Duration::secs(1)) {
            Ok(()) => {
                thread::sleep(core::time::Duration::from_millis(200));
                if let Err(err) = LOCKING.give(LOCKING_ID_ADC) {
                    warn!("adc give failed: {}", err);
                }
            }
            Err(err) => warn!("adc take failed: {}", err),
        }
        thread::sleep(core::time::Duration::from_secs(1));
    }
}

#[cfg(CONFIG_LOCKING_SHELL)]
mod console {
    use std::io::{self, BufRead, Write};

    use locking::printkln;
    use locking::shell::{self, Shell};

    use super::LOCKING;

    const PROMPT: &str = "uart:~$ ";

    struct Console;

    impl Shell for Console {
        fn print(&mut self, line: &str) {
            println!("{}", line);
        }

        fn error(&mut self, line: &str) {
            printkln!("{}", line);
        }
    }

    fn prompt() -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(PROMPT.as_bytes())?;
        out.flush()
    }

    pub fn run() -> io::Result<()> {
        let mut console = Console;

        prompt()?;
        for line in io::stdin().lock().lines() {
            let line = line?;
            let words: Vec<&str> = line.split_whitespace().collect();

            match words.split_first() {
                None => (),
                Some((&"exit", _)) => break,
                Some((&"help", _)) => shell::help(&mut console),
                Some((&name, rest)) if name == shell::COMMAND => {
                    // Failures have already been reported to the console.
                    let _ = shell::execute(&LOCKING, &mut console, rest);
                }
                Some((other, _)) => printkln!("{}: command not found", other),
            }
            prompt()?;
        }
        Ok(())
    }
}

#[cfg(not(CONFIG_LOCKING_SHELL))]
mod console {
    use std::io;

    use super::LOCKING;

    /// Without the shell there is nothing to read; report the table once.
    pub fn run() -> io::Result<()> {
        for status in LOCKING.statuses() {
            println!("{}", status);
        }
        Ok(())
    }
}
