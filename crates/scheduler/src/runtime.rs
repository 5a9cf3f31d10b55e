use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::lane::{Job, TaskLane};
use crate::model::{Priority, ScheduledTask, SchedulerConfig};

/// Cooperative task queue with a single worker, modelling one logical
/// thread of execution per page: a dequeued task runs to completion before
/// the next one is picked, nothing runs in parallel.
pub struct Scheduler {
    tx: mpsc::UnboundedSender<Job>,
    seq: AtomicU64,
    pending: Arc<AtomicUsize>,
    worker: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn start(config: SchedulerConfig) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let shutdown = CancellationToken::new();

        let worker = tokio::spawn(Self::run_worker(
            rx,
            config,
            Arc::clone(&pending),
            shutdown.clone(),
        ));

        Arc::new(Self {
            tx,
            seq: AtomicU64::new(0),
            pending,
            worker: Mutex::new(Some(worker)),
            shutdown,
        })
    }

    /// Queue a task. There is no depth limit and no coalescing: every call
    /// schedules an independent run, and once dequeued a task always runs to
    /// completion.
    pub fn enqueue<F>(&self, priority: Priority, task: F) -> ScheduledTask
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let (done_tx, done_rx) = oneshot::channel();
        let job = Job::new(priority, seq, Box::pin(task), done_tx);
        let id = job.id.clone();

        self.pending.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(job).is_err() {
            // Worker already stopped; the task is dropped and the handle's
            // receiver resolves with a closed error the caller ignores.
            self.pending.fetch_sub(1, Ordering::Relaxed);
            debug!(target: "adweave-scheduler", task = %id.0, "enqueue after shutdown dropped");
        }

        ScheduledTask { id, done: done_rx }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    /// Stop accepting new work and wait for the worker to exit. Tasks
    /// already submitted still run to completion; there is no cancellation
    /// of scheduled passes.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let worker = self.worker.lock().take();
        if let Some(handle) = worker {
            let _ = handle.await;
        }
    }

    async fn run_worker(
        mut rx: mpsc::UnboundedReceiver<Job>,
        config: SchedulerConfig,
        pending: Arc<AtomicUsize>,
        shutdown: CancellationToken,
    ) {
        let mut lane = TaskLane::new(config.weights);
        debug!(target: "adweave-scheduler", "worker started");

        loop {
            // Pull everything already submitted before choosing what runs
            // next, so a late high-priority task overtakes queued background
            // work.
            while let Ok(job) = rx.try_recv() {
                lane.push(job);
            }

            if let Some(mut job) = lane.pop() {
                job.task.await;
                if let Some(done) = job.done.take() {
                    let _ = done.send(());
                }
                pending.fetch_sub(1, Ordering::Relaxed);
                continue;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = rx.recv() => match received {
                    Some(job) => lane.push(job),
                    None => break,
                },
            }
        }

        debug!(target: "adweave-scheduler", "worker exited");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.worker.lock().take() {
            handle.abort();
        }
    }
}
