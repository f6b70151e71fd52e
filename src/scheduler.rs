//! Periodic timers feeding the main loop.
//!
//! Each timer lives on its own thread and only ever posts an [`Event`] onto the
//! shared channel. The receiving loop is the single writer of game state.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use crate::config::Config;

pub enum Event<I> {
    Input(I),
    EconomyTick,
    ComboDecay,
    Flush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub economy_tick: Duration,
    pub combo_decay: Duration,
    pub flush: Duration,
}

impl Schedule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            economy_tick: config.economy_tick(),
            combo_decay: config.combo_decay(),
            flush: config.flush(),
        }
    }
}

/// Handle over the running timers. Dropping it stops and joins all of them.
pub struct Timers {
    workers: Vec<(Sender<()>, JoinHandle<()>)>,
}

impl Timers {
    pub fn spawn<I: Send + 'static>(tx: &Sender<Event<I>>, schedule: Schedule) -> Self {
        let workers = vec![
            spawn_periodic(tx.clone(), schedule.economy_tick, || Event::EconomyTick),
            spawn_periodic(tx.clone(), schedule.combo_decay, || Event::ComboDecay),
            spawn_periodic(tx.clone(), schedule.flush, || Event::Flush),
        ];
        debug!("Started timers: {:?}", schedule);
        Self { workers }
    }

    pub fn shutdown(mut self) {
        self.stop_all();
    }

    fn stop_all(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        // Disconnect every stop channel first so no timer waits on another's join.
        let handles: Vec<_> = self
            .workers
            .drain(..)
            .map(|(stop, handle)| {
                drop(stop);
                handle
            })
            .collect();
        for handle in handles {
            let _ = handle.join();
        }
        debug!("Timers stopped");
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn spawn_periodic<I, F>(
    tx: Sender<Event<I>>,
    period: Duration,
    make: F,
) -> (Sender<()>, JoinHandle<()>)
where
    I: Send + 'static,
    F: Fn() -> Event<I> + Send + 'static,
{
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let handle = thread::spawn(move || {
        loop {
            match stop_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => {
                    if tx.send(make()).is_err() {
                        break;
                    }
                }
                _ => break,
            }
        }
    });
    (stop_tx, handle)
}
