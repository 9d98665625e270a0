use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, PartialEq)]
pub enum ControlMsg {
    /// Keep applying updates but stop stepping the play and sending commands.
    SetPause(bool),
    Stop,
}

/// A summary of the last completed control cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CycleInfo {
    pub cycle: u64,
    /// World clock at the end of the cycle, in seconds
    pub clock: f64,
    /// Updates applied during the cycle
    pub applied: usize,
    /// Commands handed to the transport during the cycle
    pub commands: usize,
}

/// Talks to a running [`Executor`](crate::Executor) from other tasks.
#[derive(Debug, Clone)]
pub struct ExecutorHandle {
    pub(crate) control_tx: mpsc::UnboundedSender<ControlMsg>,
    pub(crate) info_rx: watch::Receiver<CycleInfo>,
}

impl ExecutorHandle {
    pub fn send(&self, msg: ControlMsg) {
        self.control_tx
            .send(msg)
            .map_err(|err| {
                log::error!("Error sending control message: {:?}", err);
            })
            .ok();
    }

    pub fn stop(&self) {
        self.send(ControlMsg::Stop);
    }

    /// The latest cycle summary.
    pub fn info(&self) -> CycleInfo {
        *self.info_rx.borrow()
    }

    /// Wait for the next cycle to complete. Returns `None` once the executor is
    /// gone.
    pub async fn next_cycle(&mut self) -> Option<CycleInfo> {
        self.info_rx.changed().await.ok()?;
        let info = *self.info_rx.borrow_and_update();
        Some(info)
    }
}
