//! # CLI - configuration store shell
//!
//! A REPL over a file-backed configuration store. Reads commands from stdin,
//! runs them against the store and prints results to stdout; logs go to
//! stderr through `env_logger` (`RUST_LOG`, default `info`). Works both
//! interactively and scripted (pipe commands via stdin).
//!
//! ## Commands
//!
//! ```text
//! STATUS                        Print the status line
//! SHOW <segment>                Print every field of a segment
//! SET <segment>.<field> value   Edit one field in RAM
//! CHECK                         Verify every segment checksum
//! ACCEPT <segment>              Recompute a segment checksum as-is
//! COMMIT                        Write the image to the medium
//! CLEAR                         Erase the medium (factory reset on reboot)
//! REBOOT                        Reopen the store from the medium
//! EXIT / QUIT                   Leave without committing
//! ```
//!
//! ## Configuration
//!
//! ```text
//! NVM_PATH          medium file                 (default: "nvm.bin")
//! NVM_CAPACITY      medium size in bytes        (default: 512)
//! NVM_BASE_ADDRESS  image offset on the medium  (default: 0)
//! NVM_SYNC          fsync after every write     (default: "true")
//! NVM_IO_RETRIES    extra attempts per I/O      (default: 1)
//! NVM_VERIFY        read back after commit      (default: "true")
//! ```
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p cli
//! store opened (path=nvm.bin, bytes=283, segments=6, errorCounter=1)
//! > SET alarm.home_address 4 Privet Drive
//! OK
//! > COMMIT
//! OK
//! > EXIT
//! bye
//! ```

mod fields;

use anyhow::{Context, Result};
use config::StoreConfig;
use layout::SegmentId;
use medium::FileMedium;
use std::io::{self, BufRead, Write};
use store::{LoadOutcome, Store, StoreStatus};

fn open_store(config: &StoreConfig) -> Result<Store<FileMedium>> {
    let medium = FileMedium::open(&config.path, config.capacity, config.sync)
        .with_context(|| format!("cannot open medium {}", config.path.display()))?;
    let store = Store::open(medium, config).context("cannot open configuration store")?;
    print_boot(config, &store);
    Ok(store)
}

fn print_boot(config: &StoreConfig, store: &Store<FileMedium>) {
    let boot = store.boot_report();
    if let LoadOutcome::FellBackToDefaults { error } = &boot.load {
        println!("WARN medium unreadable, running on defaults: {}", error);
    }
    let recovery = &boot.recovery;
    if !recovery.restored.is_empty() {
        println!("restored: {}", join_ids(&recovery.restored));
    }
    let kept: Vec<SegmentId> = recovery
        .corrupt
        .iter()
        .copied()
        .filter(|id| !recovery.restored.contains(id))
        .collect();
    if !kept.is_empty() {
        println!("corrupt (kept): {}", join_ids(&kept));
    }
    if let Some(e) = &recovery.commit_error {
        println!("WARN recovery not persisted: {}", e);
    }
    println!(
        "store opened (path={}, bytes={}, segments={}, errorCounter={})",
        config.path.display(),
        store.mirror_len(),
        store.descriptors().len(),
        recovery.error_counter
    );
}

fn join_ids(ids: &[SegmentId]) -> String {
    ids.iter()
        .map(|id| id.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StoreConfig::from_env()?;
    let mut store = open_store(&config)?;

    println!("Commands: STATUS | SHOW seg | SET seg.field value | CHECK | ACCEPT seg");
    println!("          COMMIT | CLEAR | REBOOT | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "STATUS" => {
                    store.transmit_status(&mut |s: &StoreStatus| println!("{}", s));
                }
                "SHOW" => match parts.next().map(str::parse::<SegmentId>) {
                    Some(Ok(id)) => {
                        let d = id.descriptor();
                        let state = if store.mirror().is_consistent(id) {
                            "ok"
                        } else {
                            "CORRUPT"
                        };
                        println!("[{}] offset={} size={} {}", id, d.offset, d.size(), state);
                        for (name, value) in fields::describe(&store, id) {
                            println!("{}.{} = {}", id, name, value);
                        }
                    }
                    Some(Err(e)) => println!("ERR {}", e),
                    None => println!("ERR usage: SHOW segment"),
                },
                "SET" => {
                    if let Some(path) = parts.next() {
                        let value = parts.collect::<Vec<&str>>().join(" ");
                        if value.is_empty() {
                            println!("ERR usage: SET segment.field value");
                        } else {
                            match fields::set_field(&mut store, path, &value) {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR {:#}", e),
                            }
                        }
                    } else {
                        println!("ERR usage: SET segment.field value");
                    }
                }
                "CHECK" => {
                    let health = store.check();
                    for h in &health {
                        if h.is_healthy() {
                            println!("{:<10} ok      0x{:08X}", h.id.name(), h.stored);
                        } else {
                            println!(
                                "{:<10} CORRUPT expected 0x{:08X} stored 0x{:08X}",
                                h.id.name(),
                                h.expected,
                                h.stored
                            );
                        }
                    }
                    let bad = health.iter().filter(|h| !h.is_healthy()).count();
                    println!("({} of {} segments corrupt)", bad, health.len());
                }
                "ACCEPT" => match parts.next().map(str::parse::<SegmentId>) {
                    Some(Ok(id)) => {
                        store.mark_dirty(id);
                        println!("OK");
                    }
                    Some(Err(e)) => println!("ERR {}", e),
                    None => println!("ERR usage: ACCEPT segment"),
                },
                "COMMIT" => match store.commit() {
                    Ok(()) => println!("OK"),
                    Err(e) => println!("ERR commit failed: {}", e),
                },
                "CLEAR" => match store.clear() {
                    Ok(()) => println!("OK (defaults apply after REBOOT)"),
                    Err(e) => println!("ERR clear failed: {}", e),
                },
                "REBOOT" => match open_store(&config) {
                    Ok(reopened) => store = reopened,
                    Err(e) => println!("ERR reboot failed: {:#}", e),
                },
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
