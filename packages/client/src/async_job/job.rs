use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded, select};

use super::worker::{Closed, SharedWorker, StopState, is_stopped, moderate, work};
use super::{AsyncDoer, StopReason};

/// Channels and final state of one run of a job.
///
/// A generation is created with the job and replaced wholesale by
/// [`AsyncJob::restart`], so a moderator left over from an earlier run can
/// never touch the state of a later one.
struct Generation<T> {
    results_tx: Option<Sender<T>>,
    results_rx: Receiver<T>,
    stop_rx: Receiver<Closed>,
    reason_tx: Sender<StopReason>,
    state: Arc<StopState>,
}

impl<T> Generation<T> {
    fn start(capacity: usize) -> Self {
        let (results_tx, results_rx) = bounded(capacity);
        let (stop_tx, stop_rx) = bounded::<Closed>(0);
        let (reason_tx, reason_rx) = bounded(1);
        let state = Arc::new(StopState::default());

        let moderator_state = Arc::clone(&state);
        let spawned = thread::Builder::new()
            .name("meteor-moderator".into())
            .spawn(move || moderate(&reason_rx, stop_tx, &moderator_state));
        if let Err(e) = spawned {
            // the closure, and the stop sender with it, is already dropped
            tracing::error!("failed to spawn async job moderator: {e}");
            state.close(None);
        }

        Self {
            results_tx: Some(results_tx),
            results_rx,
            stop_rx,
            reason_tx,
            state,
        }
    }
}

/// A best-effort concurrent fan-out over a fixed set of workers.
///
/// The job starts idle with its moderator already waiting. [`run`](Self::run)
/// launches one thread per worker and collects outputs until the target count
/// is reached, a worker raises a stop signal, or every worker has finished.
/// After that the job is stopped; [`restart`](Self::restart) re-arms it.
///
/// # Examples
///
/// ```
/// use meteor_client::async_job::{AsyncDoer, AsyncJob, StopReason};
///
/// struct Square(usize);
///
/// impl AsyncDoer for Square {
///     type Output = usize;
///     fn prepare(&mut self, index: usize) {
///         self.0 = index;
///     }
///     fn execute(&mut self) -> usize {
///         self.0 * self.0
///     }
///     fn stop_signal(&self) -> Option<String> {
///         None
///     }
/// }
///
/// let job = AsyncJob::new((0..4).map(|_| Square(0)));
/// let mut squares = job.run();
/// squares.sort_unstable();
/// assert_eq!(squares, vec![0, 1, 4, 9]);
/// assert_eq!(job.stopped_by(), Some(StopReason::AutoStopped));
/// ```
pub struct AsyncJob<W: AsyncDoer> {
    workers: Vec<SharedWorker<W>>,
    target: usize,
    responses: Arc<RwLock<Vec<W::Output>>>,
    generation: Mutex<Generation<W::Output>>,
}

impl<W: AsyncDoer> AsyncJob<W> {
    /// Job whose target count is the number of workers
    #[must_use]
    pub fn new(workers: impl IntoIterator<Item = W>) -> Self {
        Self::with_target(workers, 0)
    }

    /// Job that stops after `target` results; 0 means "all workers"
    #[must_use]
    pub fn with_target(workers: impl IntoIterator<Item = W>, target: usize) -> Self {
        let workers: Vec<_> = workers
            .into_iter()
            .map(|worker| Arc::new(Mutex::new(worker)))
            .collect();
        let target = if target == 0 { workers.len() } else { target };
        tracing::debug!(workers = workers.len(), limit = target, "async job created");

        Self {
            workers,
            target,
            responses: Arc::new(RwLock::new(Vec::with_capacity(target))),
            generation: Mutex::new(Generation::start(target)),
        }
    }

    /// Number of results that ends collection
    #[inline]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Launch every worker and collect results until the job stops.
    ///
    /// Returns the outputs in arrival order. Workers still executing when the
    /// job stops are not waited for; their outputs are discarded. Calling `run`
    /// again without [`restart`](Self::restart) launches nothing and returns
    /// what was collected.
    pub fn run(&self) -> Vec<W::Output> {
        let (results, stop, reasons) = {
            let mut generation = self.lock_generation();
            let Some(results_tx) = generation.results_tx.take() else {
                tracing::warn!("async job already ran; restart it to run again");
                return self.responses();
            };
            for (index, worker) in self.workers.iter().enumerate() {
                self.launch(index, worker, &results_tx, &generation);
            }
            // workers hold the only senders now, so the channel disconnects
            // once all of them are done
            drop(results_tx);
            (
                generation.results_rx.clone(),
                generation.stop_rx.clone(),
                generation.reason_tx.clone(),
            )
        };

        let mut collected = 0;
        loop {
            if is_stopped(&stop) {
                break;
            }
            if collected >= self.target {
                Self::finish(&reasons, &stop, StopReason::AutoStopped);
                break;
            }
            select! {
                recv(stop) -> _ => break,
                recv(results) -> output => match output {
                    Ok(output) => {
                        self.responses
                            .write()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(output);
                        collected += 1;
                        tracing::trace!(collected, limit = self.target, "async result collected");
                    }
                    Err(_) => {
                        Self::finish(&reasons, &stop, StopReason::Exhausted);
                        break;
                    }
                },
            }
        }

        self.responses()
    }

    fn launch(
        &self,
        index: usize,
        worker: &SharedWorker<W>,
        results_tx: &Sender<W::Output>,
        generation: &Generation<W::Output>,
    ) {
        let worker = Arc::clone(worker);
        let results = results_tx.clone();
        let stop = generation.stop_rx.clone();
        let reasons = generation.reason_tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("meteor-async-{index}"))
            .spawn(move || work(index, &worker, &results, &stop, &reasons));
        if let Err(e) = spawned {
            tracing::error!(index, "failed to spawn async worker: {e}");
        }
    }

    /// Offer `reason` to the moderator and wait for its broadcast
    fn finish(reasons: &Sender<StopReason>, stop: &Receiver<Closed>, reason: StopReason) {
        // a worker's reason may already be queued; that one wins
        let _ = reasons.try_send(reason);
        let _ = stop.recv();
    }

    /// Snapshot of the results collected so far; safe during [`run`](Self::run)
    pub fn responses(&self) -> Vec<W::Output> {
        self.responses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the moderator has fired for the current generation
    pub fn is_closed(&self) -> bool {
        self.lock_generation().state.is_closed()
    }

    /// Why the current generation stopped, once it has
    pub fn stopped_by(&self) -> Option<StopReason> {
        self.lock_generation().state.reason()
    }

    /// Re-arm the job: fresh channels, cleared results and reason, and a new
    /// moderator.
    ///
    /// Must not be called while [`run`](Self::run) is in flight.
    pub fn restart(&self) {
        let mut generation = self.lock_generation();
        *generation = Generation::start(self.target);
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!(limit = self.target, "async job restarted");
    }

    fn lock_generation(&self) -> MutexGuard<'_, Generation<W::Output>> {
        self.generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: AsyncDoer> fmt::Debug for AsyncJob<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncJob")
            .field("workers", &self.workers.len())
            .field("target", &self.target)
            .field("collected", &self.responses().len())
            .field("closed", &self.is_closed())
            .field("stopped_by", &self.stopped_by())
            .finish()
    }
}
