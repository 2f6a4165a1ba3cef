use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crossbeam_channel::{Receiver, Sender, TryRecvError, select};

use super::{AsyncDoer, StopReason};

/// Never sent; the stop channel only ever signals by disconnecting
pub(super) enum Closed {}

/// Final state of one generation, written once by its moderator
#[derive(Debug, Default)]
pub(super) struct StopState {
    closed: AtomicBool,
    reason: OnceLock<StopReason>,
}

impl StopState {
    pub(super) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(super) fn reason(&self) -> Option<StopReason> {
        self.reason.get().cloned()
    }

    pub(super) fn close(&self, reason: Option<StopReason>) {
        if let Some(reason) = reason {
            let _ = self.reason.set(reason);
        }
        self.closed.store(true, Ordering::Release);
    }
}

#[inline]
pub(super) fn is_stopped(stop: &Receiver<Closed>) -> bool {
    matches!(stop.try_recv(), Err(TryRecvError::Disconnected))
}

/// Body of one worker thread
pub(super) fn work<W: AsyncDoer>(
    index: usize,
    worker: &Mutex<W>,
    results: &Sender<W::Output>,
    stop: &Receiver<Closed>,
    reasons: &Sender<StopReason>,
) {
    if is_stopped(stop) {
        tracing::trace!(index, "job already stopped, skipping worker");
        return;
    }

    let (output, signal) = {
        let mut worker = worker.lock().unwrap_or_else(PoisonError::into_inner);
        worker.prepare(index);
        let output = worker.execute();
        (output, worker.stop_signal())
    };

    if let Some(reason) = signal.filter(|reason| !reason.is_empty()) {
        tracing::debug!(index, %reason, "worker requested stop");
        // first reason wins; later ones are dropped
        let _ = reasons.try_send(StopReason::Worker(reason));
        return;
    }

    select! {
        send(results, output) -> sent => {
            if sent.is_err() {
                tracing::trace!(index, "result channel gone, output discarded");
            }
        }
        recv(stop) -> _ => tracing::trace!(index, "job stopped, output discarded"),
    }
}

/// Body of the moderator thread: waits for the first stop reason, records
/// it, then closes the stop channel by dropping its only sender.
pub(super) fn moderate(reasons: &Receiver<StopReason>, stop: Sender<Closed>, state: &StopState) {
    match reasons.recv() {
        Ok(reason) => {
            tracing::debug!(%reason, "async job stopping");
            state.close(Some(reason));
        }
        Err(_) => tracing::trace!("async job generation retired without stopping"),
    }
    drop(stop);
}

/// Shared handle to a worker
pub(super) type SharedWorker<W> = Arc<Mutex<W>>;
