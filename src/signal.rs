//! Ctrl-C handling for a synchronous sweep.

use crate::report::EXIT_INTERRUPTED;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::warn;

/// Install a Ctrl-C listener on a background thread and return the flag it raises.
///
/// The first interrupt only raises the flag so the sweep can stop after the
/// deletion in progress. A second interrupt exits immediately.
pub fn install_interrupt_handler() -> Arc<AtomicBool> {
    let abort_requested = Arc::new(AtomicBool::new(false));
    let abort_flag = Arc::clone(&abort_requested);

    let spawned = thread::Builder::new()
        .name("cachesweep-signal".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    warn!("Could not start signal listener: {}", err);
                    return;
                }
            };

            runtime.block_on(async move {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                abort_flag.store(true, Ordering::SeqCst);
                eprintln!("Interrupt received, finishing current deletion (Ctrl-C again to force quit)");

                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(i32::from(EXIT_INTERRUPTED));
                }
            });
        });

    if let Err(err) = spawned {
        warn!("Could not spawn signal listener thread: {}", err);
    }

    abort_requested
}
