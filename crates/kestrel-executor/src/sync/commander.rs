use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use kestrel_core::{PlayerCmd, TeamColor, World};
use tokio::sync::watch;

/// Where robot commands go: a radio base station, a simulator, a log.
pub trait CommandTransport: Send {
    fn send(&mut self, commands: &[PlayerCmd]) -> Result<()>;
}

/// Collects the actions of the controlled team after a cycle and hands them
/// to the transport.
pub struct Commander {
    color: TeamColor,
    transport: Box<dyn CommandTransport>,
}

impl Commander {
    pub fn new(color: TeamColor, transport: Box<dyn CommandTransport>) -> Self {
        Self { color, transport }
    }

    pub fn color(&self) -> TeamColor {
        self.color
    }

    /// Send one command per active robot, then reset those robots' actions.
    /// Returns the number of commands sent.
    ///
    /// Actions are reset even if the transport fails; the next cycle
    /// recomputes them anyway.
    pub fn dispatch(&mut self, world: &World) -> Result<usize> {
        let team = world.team(self.color);
        let commands: Vec<PlayerCmd> = team
            .lock()
            .values()
            .filter(|robot| robot.is_active())
            .map(|robot| robot.action.command(robot.uid()))
            .collect();

        let sent = if commands.is_empty() {
            Ok(0)
        } else {
            self.transport.send(&commands).map(|_| commands.len())
        };

        for robot in team.lock().values_mut().filter(|r| r.is_active()) {
            robot.action.reset();
        }
        sent
    }
}

/// A transport that forwards batches to another transport on a worker thread.
///
/// Only the newest batch is kept: if the worker is still busy sending when new
/// batches arrive, all but the last one are skipped.
pub struct LatestDispatcher {
    tx: Option<watch::Sender<Vec<PlayerCmd>>>,
    worker: Option<JoinHandle<()>>,
}

impl LatestDispatcher {
    pub fn spawn(mut inner: Box<dyn CommandTransport>) -> Result<Self> {
        let (tx, mut rx) = watch::channel(Vec::new());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .context("Failed to build dispatcher runtime")?;

        let worker = thread::Builder::new()
            .name("dispatcher".to_owned())
            .spawn(move || {
                runtime.block_on(async move {
                    while rx.changed().await.is_ok() {
                        let batch = rx.borrow_and_update().clone();
                        if let Err(err) = inner.send(&batch) {
                            log::error!("Failed to dispatch commands: {:#}", err);
                        }
                    }
                });
                log::debug!("Dispatcher stopped");
            })
            .context("Failed to spawn dispatcher thread")?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }
}

impl CommandTransport for LatestDispatcher {
    fn send(&mut self, commands: &[PlayerCmd]) -> Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| anyhow!("Dispatcher is closed"))?;
        tx.send(commands.to_vec())
            .map_err(|_| anyhow!("Dispatcher worker is gone"))
    }
}

impl Drop for LatestDispatcher {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Dispatcher worker panicked");
            }
        }
    }
}
