//! Background timers that wear stamina and hunger down.
//!
//! Timers only send [`DecayTick`] messages. The event loop owns the game
//! state and applies each tick itself, dropping ticks whose ticket is no
//! longer current.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{DecayConfig, IntervalRange};
use crate::game::Stat;

/// Identifies one `start` of the timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecayTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayTick {
    pub stat: Stat,
    pub ticket: DecayTicket,
}

pub struct DecayTimers {
    config: DecayConfig,
    tx: mpsc::UnboundedSender<DecayTick>,
    tasks: Vec<JoinHandle<()>>,
    generation: u64,
    current: Option<DecayTicket>,
}

impl DecayTimers {
    pub fn new(config: DecayConfig) -> (Self, mpsc::UnboundedReceiver<DecayTick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timers = Self {
            config,
            tx,
            tasks: Vec::new(),
            generation: 0,
            current: None,
        };
        (timers, rx)
    }

    /// Stop anything running, then start both timers. Each ticks once
    /// straight away. Must be called from within a tokio runtime.
    pub fn start(&mut self) -> DecayTicket {
        self.stop();

        self.generation += 1;
        let ticket = DecayTicket(self.generation);

        for (stat, range) in [
            (Stat::Stamina, self.config.stamina),
            (Stat::Hunger, self.config.hunger),
        ] {
            let tx = self.tx.clone();
            self.tasks
                .push(tokio::spawn(run_timer(stat, range, ticket, tx)));
        }

        self.current = Some(ticket);
        debug!(?ticket, "decay timers started");
        ticket
    }

    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if let Some(ticket) = self.current.take() {
            debug!(?ticket, "decay timers stopped");
        }
    }

    /// Stop only if `ticket` is the running one. Returns whether it was.
    pub fn cancel(&mut self, ticket: DecayTicket) -> bool {
        if self.current != Some(ticket) {
            return false;
        }
        self.stop();
        true
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Whether a tick should still be applied.
    pub fn is_current(&self, tick: &DecayTick) -> bool {
        self.current == Some(tick.ticket)
    }
}

impl Drop for DecayTimers {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer(
    stat: Stat,
    range: IntervalRange,
    ticket: DecayTicket,
    tx: mpsc::UnboundedSender<DecayTick>,
) {
    let mut rng = StdRng::from_entropy();
    loop {
        if tx.send(DecayTick { stat, ticket }).is_err() {
            break;
        }
        let delay = rng
            .gen_range(range.min_ms.min(range.max_ms)..=range.max_ms)
            .max(1);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}
