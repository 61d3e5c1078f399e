//! Ctrl-C handling.
//!
//! While a cancellable job runs (loading saved cards, either import), the
//! first Ctrl-C sets the binder's [`CancelFlag`]: the job finishes the card in
//! hand and keeps what it already has. Outside such a job, or on a second
//! press, the process exits as usual.

use cardbinder::cancel::CancelFlag;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Clone)]
pub(super) struct Interrupt {
    cancel: CancelFlag,
    armed: Arc<AtomicBool>,
}

impl Interrupt {
    /// Starts watching for Ctrl-C on a background thread.
    pub fn install(cancel: CancelFlag) -> Self {
        let interrupt = Self {
            cancel,
            armed: Arc::new(AtomicBool::new(false)),
        };
        let watcher = interrupt.clone();
        if let Err(e) = std::thread::Builder::new()
            .name("ctrl-c".into())
            .spawn(move || watcher.watch())
        {
            warn!("Ctrl-C will not cancel imports: {}", e);
        }
        interrupt
    }

    /// Runs `job` with Ctrl-C routed to the cancel flag.
    pub fn guard<T>(&self, job: impl FnOnce() -> T) -> T {
        self.armed.store(true, Ordering::SeqCst);
        let output = job();
        self.armed.store(false, Ordering::SeqCst);
        output
    }

    fn on_signal(&self) -> bool {
        if !self.armed.load(Ordering::SeqCst) || self.cancel.is_cancelled() {
            return false;
        }
        debug!("interrupt received, cancelling after the current card");
        self.cancel.cancel();
        true
    }

    fn watch(self) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Ctrl-C will not cancel imports: {}", e);
                return;
            }
        };
        runtime.block_on(async {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !self.on_signal() {
                    eprintln!();
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        });
    }
}
