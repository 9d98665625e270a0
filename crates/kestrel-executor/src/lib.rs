use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use kestrel_core::{Settings, World};
use kestrel_world::Update;
use tokio::sync::{mpsc, watch};

pub mod behavior;
pub mod control;
mod handle;
pub mod skills;
pub mod sync;

use behavior::{Play, Steppable};
pub use handle::{ControlMsg, CycleInfo, ExecutorHandle};
use sync::{BoundedQueue, CommandTransport, Commander, Source, Updater};

/// The control loop. It owns the world and is its only writer.
///
/// Each cycle drains every update queue in arrival order and applies the
/// updates, marks stale robots inactive, steps the play and dispatches the
/// resulting commands. Producers run on their own threads and only ever touch
/// their queues.
pub struct Executor {
    settings: Settings,
    world: World,
    play: Play,
    commander: Commander,
    updaters: Vec<Updater>,
    queues: Vec<Arc<BoundedQueue<Update>>>,
    paused: bool,
    cycle: u64,
    /// Wall time and world clock at the first applied update
    time_anchor: Option<(Instant, f64)>,
    control_tx: mpsc::UnboundedSender<ControlMsg>,
    control_rx: mpsc::UnboundedReceiver<ControlMsg>,
    info_tx: watch::Sender<CycleInfo>,
}

impl Executor {
    pub fn new(settings: Settings, play: Play, transport: Box<dyn CommandTransport>) -> Self {
        let own_color = settings.executor.own_color;
        if play.color() != own_color {
            log::warn!(
                "Play {} drives {} but commands are sent for {}",
                play.name(),
                play.color(),
                own_color
            );
        }
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (info_tx, _) = watch::channel(CycleInfo::default());

        Self {
            world: World::new(settings.geometry.clone()),
            commander: Commander::new(own_color, transport),
            settings,
            play,
            updaters: Vec::new(),
            queues: Vec::new(),
            paused: false,
            cycle: 0,
            time_anchor: None,
            control_tx,
            control_rx,
            info_tx,
        }
    }

    /// Start an updater thread for `source`.
    pub fn add_source(&mut self, source: Box<dyn Source>) -> Result<()> {
        let updater = Updater::spawn(
            source,
            &self.settings.tracker,
            self.settings.executor.queue_capacity,
        )?;
        self.queues.push(updater.queue());
        self.updaters.push(updater);
        Ok(())
    }

    /// Register a queue fed by a producer the executor does not manage.
    pub fn add_queue(&mut self) -> Arc<BoundedQueue<Update>> {
        let queue = Arc::new(BoundedQueue::new(self.settings.executor.queue_capacity));
        self.queues.push(Arc::clone(&queue));
        queue
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn play(&self) -> &Play {
        &self.play
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn handle(&self) -> ExecutorHandle {
        ExecutorHandle {
            control_tx: self.control_tx.clone(),
            info_rx: self.info_tx.subscribe(),
        }
    }

    /// Run one control cycle.
    ///
    /// From the first applied update on, the world clock advances with wall
    /// time as well as with observation timestamps.
    ///
    /// Behavior errors are fatal and returned. A failing transport is logged
    /// and the cycle carries on.
    pub fn cycle(&mut self) -> Result<CycleInfo> {
        let mut applied = 0;
        for queue in &self.queues {
            for update in queue.drain() {
                update.apply(&mut self.world);
                applied += 1;
            }
        }
        // Keep the clock running when no observations arrive so silent robots
        // still expire
        match self.time_anchor {
            Some((instant, clock)) => self
                .world
                .advance_clock(clock + instant.elapsed().as_secs_f64()),
            None if applied > 0 => self.time_anchor = Some((Instant::now(), self.world.clock())),
            None => {}
        }
        self.world
            .expire_robots(self.settings.tracker.robot_timeout);

        let mut commands = 0;
        if !self.paused {
            self.play.step(&self.world)?;
            match self.commander.dispatch(&self.world) {
                Ok(sent) => commands = sent,
                Err(err) => log::error!("Failed to dispatch commands: {:#}", err),
            }
        }

        self.cycle += 1;
        let info = CycleInfo {
            cycle: self.cycle,
            clock: self.world.clock(),
            applied,
            commands,
        };
        self.info_tx.send_replace(info);
        Ok(info)
    }

    /// Run cycles at the configured period until stopped through a handle,
    /// until `max_cycles` cycles have run, or until a cycle fails. Updaters are
    /// stopped before returning.
    pub async fn run_real_time(mut self, max_cycles: Option<u64>) -> Result<()> {
        let period = Duration::from_secs_f64(self.settings.executor.cycle_period);
        let mut interval = tokio::time::interval(period);
        log::info!("Executor running with a {:?} cycle", period);

        let result = loop {
            tokio::select! {
                Some(msg) = self.control_rx.recv() => {
                    match msg {
                        ControlMsg::Stop => break Ok(()),
                        ControlMsg::SetPause(paused) => {
                            log::info!("Executor {}", if paused { "paused" } else { "resumed" });
                            self.paused = paused;
                        }
                    }
                }
                _ = interval.tick() => {
                    if let Err(err) = self.cycle() {
                        log::error!("Stopping executor: {:#}", err);
                        break Err(err);
                    }
                    if max_cycles.map_or(false, |max| self.cycle >= max) {
                        break Ok(());
                    }
                }
            }
        };

        self.stop_updaters();
        result
    }

    fn stop_updaters(&mut self) {
        let grace = Duration::from_secs_f64(self.settings.executor.stop_grace_period);
        for mut updater in self.updaters.drain(..) {
            updater.stop(grace);
        }
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.stop_updaters();
    }
}
