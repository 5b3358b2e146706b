//! Process-wide shutdown state.
//!
//! Ctrl+C sets the `SHUTDOWN` flag and notifies the watch runtime through a
//! crossbeam channel. Batch builds have nothing to wind down and exit
//! immediately.

use std::sync::{LazyLock, OnceLock};
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{Receiver, Sender};
use parking_lot::Mutex;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Set once the watch runtime has taken the receiver.
static WATCHING: AtomicBool = AtomicBool::new(false);

static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();
static SHUTDOWN_RX: LazyLock<Mutex<Option<Receiver<()>>>> = LazyLock::new(|| Mutex::new(None));

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `take_shutdown_receiver()`: exit immediately
/// - After: graceful shutdown (notify the watch coordinator)
/// - Second Ctrl+C during a graceful shutdown: exit immediately
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    let (tx, rx) = crossbeam::channel::bounded(1);
    let _ = SHUTDOWN_TX.set(tx);
    *SHUTDOWN_RX.lock() = Some(rx);

    ctrlc::set_handler(|| {
        let repeated = SHUTDOWN.swap(true, Ordering::SeqCst);

        if WATCHING.load(Ordering::SeqCst) && !repeated {
            crate::log!("watch"; "shutting down...");
            if let Some(tx) = SHUTDOWN_TX.get() {
                let _ = tx.try_send(());
            }
        } else {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Hand the shutdown signal to the watch runtime.
///
/// Returns `None` if the handler was never installed (tests) or the
/// receiver was already taken.
pub fn take_shutdown_receiver() -> Option<Receiver<()>> {
    let rx = SHUTDOWN_RX.lock().take()?;
    WATCHING.store(true, Ordering::SeqCst);
    Some(rx)
}
