use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use kestrel_core::TrackerSettings;
use kestrel_world::{Observation, StateEstimator, Update};

use super::BoundedQueue;

/// How long a source may block before the stop flag is checked again.
const POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// One item produced by a [`Source`].
#[derive(Debug, Clone)]
pub enum Decoded {
    /// A raw pose sample, filtered before it is queued
    Observation(Observation),
    /// A ready-made update, queued as is
    Update(Update),
}

/// A blocking producer of decoded observations: a vision socket, a referee
/// feed, a simulator.
pub trait Source: Send {
    fn name(&self) -> &str;

    /// Wait up to `timeout` for input. An empty batch means nothing arrived.
    /// An error ends the updater that owns the source.
    fn recv(&mut self, timeout: Duration) -> Result<Vec<Decoded>>;
}

/// Runs a [`Source`] on its own thread, filtering observations and pushing
/// the resulting updates into a bounded queue.
///
/// The updater never touches the world; the control thread drains
/// [`Updater::queue`] instead.
pub struct Updater {
    name: String,
    queue: Arc<BoundedQueue<Update>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Updater {
    pub fn spawn(
        mut source: Box<dyn Source>,
        tracker: &TrackerSettings,
        capacity: usize,
    ) -> Result<Self> {
        let name = source.name().to_owned();
        let queue = Arc::new(BoundedQueue::new(capacity));
        let stop = Arc::new(AtomicBool::new(false));
        let mut estimator = StateEstimator::new(tracker);

        let handle = {
            let name = name.clone();
            let queue = Arc::clone(&queue);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name(format!("updater-{}", name))
                .spawn(move || {
                    log::info!("Updater {} started", name);
                    while !stop.load(Ordering::Relaxed) {
                        let batch = match source.recv(POLL_TIMEOUT) {
                            Ok(batch) => batch,
                            Err(err) => {
                                log::error!("Source {} failed: {:#}", name, err);
                                break;
                            }
                        };
                        for item in batch {
                            let update = match item {
                                Decoded::Observation(obs) => estimator.process(obs),
                                Decoded::Update(update) => update,
                            };
                            if queue.push(update) {
                                log::trace!("Queue of {} is full, dropped the oldest update", name);
                            }
                        }
                    }
                    log::info!("Updater {} stopped", name);
                })
                .context("Failed to spawn updater thread")?
        };

        Ok(Self {
            name,
            queue,
            stop,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn queue(&self) -> Arc<BoundedQueue<Update>> {
        Arc::clone(&self.queue)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Ask the thread to stop and wait for it up to `grace`. A thread that
    /// does not finish in time is detached. Returns whether it finished.
    pub fn stop(&mut self, grace: Duration) -> bool {
        self.stop.store(true, Ordering::Relaxed);
        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + grace;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                log::warn!(
                    "Updater {} did not stop within {:?}, detaching it",
                    self.name,
                    grace
                );
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        if handle.join().is_err() {
            log::error!("Updater {} panicked", self.name);
        }
        true
    }
}

impl Drop for Updater {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
