// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

#![allow(unexpected_cfgs)]
#![cfg(CONFIG_LOCKING_SHELL)]

use std::sync::Once;

use locking::shell::{self, Shell};

locking::lock_table! {
    static LOCKING;
    adc = 0 => Mutex;
    modem_tx = 2 => Semaphore { count: 1, limit: 1 };
}

#[derive(Default)]
struct Console {
    lines: Vec<String>,
}

impl Shell for Console {
    fn print(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn error(&mut self, line: &str) {
        self.lines.push(format!("error: {}", line));
    }
}

fn run(console: &mut Console, line: &str) -> locking::Result<()> {
    static INIT: Once = Once::new();
    INIT.call_once(|| LOCKING.initialise().unwrap());

    let words: Vec<&str> = line.split_whitespace().collect();
    assert_eq!(words[0], shell::COMMAND);
    shell::execute(&LOCKING, console, &words[1..])
}

#[test]
fn show_lists_every_lock() {
    let mut console = Console::default();
    run(&mut console, "locking show").unwrap();
    assert_eq!(console.lines.len(), LOCKING.len());
    assert!(console.lines[0].starts_with("[000] "));
    assert!(console.lines[1].starts_with("[002] "));
}

#[cfg(CONFIG_LOCKING_SHELL_MANIPULATION)]
#[test]
fn take_show_give() {
    let mut console = Console::default();
    run(&mut console, "locking take 0x0 1").unwrap();
    run(&mut console, "locking get 0").unwrap();
    run(&mut console, "locking give 0").unwrap();
    run(&mut console, "locking get 0").unwrap();

    assert!(console.lines[0].ends_with(") taken"));
    assert!(console.lines[1].contains(": mutex (1 lock held by "));
    assert!(console.lines[2].ends_with(") given"));
    assert!(console.lines[3].ends_with(": mutex (0 locks held)"));
}

#[test]
fn unknown_lock() {
    let mut console = Console::default();
    assert_eq!(run(&mut console, "locking get 9"), Err(locking::Error::InvalidId));
    assert_eq!(console.lines, ["error: Error getting lock details: -22"]);
}
