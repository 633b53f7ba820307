//! Basic osapi example
//!
//! Installs the default backend, spawns threads through the table, times
//! the work and logs through every sink.
//!
//! # Environment Variables
//!
//! - `OSAPI_LOG_LEVEL=debug` - Set log level (off, error, warn, info, debug)
//! - `OSAPI_FLUSH_LOG=1` - Flush log output immediately
//! - `OSAPI_LOG_TIME=1` - Prefix log lines with elapsed time
//! - `OSAPI_ETC_ROOT=assets` - Root for module resource directories

use osapi::{api, lap, memdup, os_dbg, os_err, os_log, os_warn, sleepf};
use osapi::{alloc_counters, OsConfig};

// OSAPI_LOG_LEVEL=debug cargo run -p osapi-basic
fn sum_to(n: usize) -> usize {
    (1..=n).sum()
}

fn main() {
    println!("=== osapi Basic Example ===\n");

    let config = OsConfig::from_env();
    config.print();
    if let Err(e) = osapi::install_defaults_with(&config) {
        eprintln!("invalid configuration: {}", e);
        std::process::exit(1);
    }

    let mut t = api::get_time();

    // fn pointer threads
    let handles: Vec<_> = (1..=4)
        .filter_map(|i| api::thread_new(sum_to, i * 1000))
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        os_dbg!("thread {} returned {}", i, api::thread_join(h));
    }
    os_log!("fn pointer threads done in {:.6}s", lap(&mut t));

    // closure thread
    let words = vec!["table", "slot", "backend"];
    match api::thread_spawn(move || words.iter().map(|w| w.len()).sum()) {
        Ok(h) => os_log!("closure thread counted {} chars", api::thread_join(h)),
        Err(e) => os_err!("closure thread: {}", e),
    }

    // memory
    match memdup(b"hello from the table") {
        Some(buf) => os_dbg!("memdup {} bytes at {:p}", buf.len(), buf.as_ptr()),
        None => os_err!("memdup failed"),
    }

    sleepf(0.05);
    os_log!("slept {:.3}s", lap(&mut t));

    // modules
    let module = "flecs.components.transform";
    os_log!(
        "module '{}': lib={:?} etc={:?}",
        module,
        api::module_to_dl(module),
        api::module_to_etc(module)
    );
    if let Err(e) = api::open_module(module) {
        os_warn!("module not loaded: {}", e);
    }

    let c = alloc_counters();
    os_log!(
        "allocations: malloc={} calloc={} realloc={} free={}",
        c.malloc, c.calloc, c.realloc, c.free
    );

    println!("\n=== Example Complete ===");
}
