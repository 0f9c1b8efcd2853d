//! Process-wide one-time initialization.
//!
//! [`init`] builds the game tables, installs a stderr `tracing` subscriber and
//! a panic hook that captures panic messages raised inside the C entry points.
//! Every entry point calls it, so explicit initialization is optional.

use std::cell::{Cell, RefCell};
use std::panic::{self, PanicHookInfo};
use std::sync::OnceLock;

use tracing::error;

use crate::config;
use crate::tables::GameTables;

static TABLES: OnceLock<Box<GameTables>> = OnceLock::new();
static INIT: OnceLock<()> = OnceLock::new();

thread_local! {
    static BOUNDARY_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_PANIC: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// The static game tables, built on first use.
pub fn tables() -> &'static GameTables {
    TABLES.get_or_init(GameTables::build)
}

/// Idempotent and safe to race: later and concurrent callers block until
/// the first one finishes.
pub fn init() {
    INIT.get_or_init(|| {
        install_logging();
        install_panic_hook();
        tables();
    });
}

fn install_logging() {
    // A host that already installed a global subscriber keeps it.
    let _ = tracing_subscriber::fmt()
        .with_max_level(config::log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if BOUNDARY_DEPTH.with(Cell::get) == 0 {
            previous(info);
            return;
        }
        let message = describe_panic(info);
        error!(%message, "panic inside a C entry point");
        LAST_PANIC.with(|p| *p.borrow_mut() = Some(message));
    }));
}

fn describe_panic(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let text = if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "?"
    };
    match info.location() {
        Some(loc) => format!("At {}:{}: {}", loc.file(), loc.line(), text),
        None => text.to_owned(),
    }
}

/// Marks the current thread as running inside a C entry point for as long as
/// the guard lives; panics raised meanwhile are recorded instead of printed.
pub(crate) struct BoundaryGuard(());

impl BoundaryGuard {
    pub(crate) fn enter() -> Self {
        BOUNDARY_DEPTH.with(|d| d.set(d.get() + 1));
        LAST_PANIC.with(|p| p.borrow_mut().take());
        BoundaryGuard(())
    }
}

impl Drop for BoundaryGuard {
    fn drop(&mut self) {
        BOUNDARY_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Message of the last panic recorded on this thread, if any.
pub(crate) fn take_panic_message() -> Option<String> {
    LAST_PANIC.with(|p| p.borrow_mut().take())
}
