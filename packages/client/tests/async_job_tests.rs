//! Fan-out engine behaviour

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, bounded};
use meteor_client::async_job::{AsyncDoer, AsyncJob, StopReason};

/// Configurable test worker
struct Probe {
    index: usize,
    value: u32,
    delay: Duration,
    stop: Option<String>,
    gate: Option<Receiver<()>>,
}

impl Probe {
    fn value(value: u32) -> Self {
        Self {
            index: usize::MAX,
            value,
            delay: Duration::ZERO,
            stop: None,
            gate: None,
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn stopping(mut self, reason: &str) -> Self {
        self.stop = Some(reason.to_owned());
        self
    }

    fn gated(mut self, gate: Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl AsyncDoer for Probe {
    type Output = (usize, u32);

    fn prepare(&mut self, index: usize) {
        self.index = index;
    }

    fn execute(&mut self) -> (usize, u32) {
        if let Some(gate) = &self.gate {
            let _ = gate.recv();
        }
        thread::sleep(self.delay);
        (self.index, self.value)
    }

    fn stop_signal(&self) -> Option<String> {
        self.stop.clone()
    }
}

fn values(results: &[(usize, u32)]) -> Vec<u32> {
    let mut values: Vec<_> = results.iter().map(|&(_, value)| value).collect();
    values.sort_unstable();
    values
}

#[test]
fn three_workers_all_collected() {
    let job = AsyncJob::new([Probe::value(0), Probe::value(10), Probe::value(20)]);
    let results = job.run();

    assert_eq!(values(&results), vec![0, 10, 20]);
    assert_eq!(job.target(), 3);
    assert!(job.is_closed());
    assert_eq!(job.stopped_by(), Some(StopReason::AutoStopped));
    assert_eq!(job.stopped_by().map(|r| r.to_string()).as_deref(), Some("async auto-stopped"));
}

#[test]
fn workers_see_their_index() {
    let job = AsyncJob::new((0..6).map(|i| Probe::value(i * 100)));
    let mut results = job.run();
    results.sort_unstable();
    for (index, value) in results {
        assert_eq!(u32::try_from(index).expect("small index") * 100, value);
    }
}

#[test]
fn worker_stop_signal_ends_the_job_early() {
    let slow = Duration::from_millis(400);
    let job = AsyncJob::new([
        Probe::value(1).delayed(slow),
        Probe::value(2).stopping("quota exceeded"),
        Probe::value(3).delayed(slow),
    ]);

    let started = Instant::now();
    let results = job.run();

    // slow workers are not waited for, and the stopping worker publishes nothing
    assert!(results.is_empty());
    assert!(started.elapsed() < slow);
    assert!(job.is_closed());
    assert_eq!(
        job.stopped_by(),
        Some(StopReason::Worker("quota exceeded".to_owned()))
    );

    // late finishers must not leak into the collected results
    thread::sleep(slow + Duration::from_millis(100));
    assert!(job.responses().is_empty());
}

#[test]
fn target_below_worker_count() {
    let job = AsyncJob::with_target((0..5).map(Probe::value), 2);
    let results = job.run();

    assert_eq!(results.len(), 2);
    assert_eq!(job.responses().len(), 2);
    assert_eq!(job.stopped_by(), Some(StopReason::AutoStopped));
}

#[test]
fn reaching_the_target_does_not_wait_for_the_rest() {
    let slow = Duration::from_millis(400);
    let job = AsyncJob::with_target(
        [
            Probe::value(1),
            Probe::value(2),
            Probe::value(3).delayed(slow),
            Probe::value(4).delayed(slow),
            Probe::value(5).delayed(slow),
        ],
        2,
    );

    let started = Instant::now();
    let results = job.run();

    assert!(started.elapsed() < slow);
    assert_eq!(values(&results), vec![1, 2]);
    assert_eq!(job.stopped_by(), Some(StopReason::AutoStopped));

    // the slow workers finish later and are discarded
    thread::sleep(slow + Duration::from_millis(100));
    assert_eq!(values(&job.responses()), vec![1, 2]);
}

#[test]
fn zero_target_means_all_workers() {
    let job = AsyncJob::with_target((0..4).map(Probe::value), 0);
    assert_eq!(job.target(), 4);
    assert_eq!(job.run().len(), 4);
}

#[test]
fn target_above_worker_count_is_exhausted() {
    let job = AsyncJob::with_target([Probe::value(7)], 3);
    let results = job.run();

    assert_eq!(values(&results), vec![7]);
    assert_eq!(job.stopped_by(), Some(StopReason::Exhausted));
}

#[test]
fn restart_rearms_the_job() {
    let job = AsyncJob::new([Probe::value(1), Probe::value(2)]);
    assert_eq!(job.run().len(), 2);
    assert!(job.is_closed());

    job.restart();
    assert!(!job.is_closed());
    assert_eq!(job.stopped_by(), None);
    assert!(job.responses().is_empty());

    let again = job.run();
    assert_eq!(values(&again), vec![1, 2]);
    assert!(job.is_closed());
    assert_eq!(job.stopped_by(), Some(StopReason::AutoStopped));
}

#[test]
fn responses_are_readable_while_running() {
    let (open, gate) = bounded(0);
    let job = AsyncJob::new([Probe::value(1), Probe::value(2).gated(gate)]);

    thread::scope(|scope| {
        let running = scope.spawn(|| job.run());

        // wait for the ungated worker's result to land
        let deadline = Instant::now() + Duration::from_secs(5);
        while job.responses().is_empty() {
            assert!(Instant::now() < deadline, "first result never arrived");
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(job.responses(), vec![(0, 1)]);
        assert!(!job.is_closed());

        open.send(()).expect("gated worker waiting");
        let results = running.join().expect("run thread");
        // arrival order
        assert_eq!(results, vec![(0, 1), (1, 2)]);
    });
}

#[test]
fn first_stop_reason_wins() {
    let job = AsyncJob::new([
        Probe::value(1).stopping("first"),
        Probe::value(2).delayed(Duration::from_millis(100)).stopping("second"),
    ]);
    job.run();
    assert_eq!(job.stopped_by(), Some(StopReason::Worker("first".to_owned())));
}
