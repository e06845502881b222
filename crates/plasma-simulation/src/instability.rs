//! Wall-clock timer that periodically requests instability events
//!
//! The timer runs on its own thread and only ever talks to the simulation
//! through a [`SimulationHandle`], so it cannot race the frame loop.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::command::{Command, SimulationHandle};

/// When instability events fire, measured from timer start
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstabilitySchedule {
    /// One extra event this long after start
    pub initial_delay: Option<Duration>,
    /// Period of the recurring events; the first fires one interval after start
    pub interval: Duration,
}

impl Default for InstabilitySchedule {
    fn default() -> Self {
        Self {
            initial_delay: Some(Duration::from_secs(3)),
            interval: Duration::from_secs(5),
        }
    }
}

impl InstabilitySchedule {
    /// Offsets from start of every event due at or before `horizon`, in order
    pub fn offsets_until(&self, horizon: Duration) -> Vec<Duration> {
        let mut offsets = Vec::new();
        let mut cursor = ScheduleCursor::new(*self);
        loop {
            let due = cursor.next_due();
            if due > horizon {
                break;
            }
            offsets.push(due);
            cursor.advance();
        }
        offsets
    }
}

/// Merges the one-shot initial event with the periodic ones
#[derive(Clone, Copy, Debug)]
struct ScheduleCursor {
    schedule: InstabilitySchedule,
    pending_initial: Option<Duration>,
    next_periodic: Duration,
}

impl ScheduleCursor {
    fn new(schedule: InstabilitySchedule) -> Self {
        Self {
            schedule,
            pending_initial: schedule.initial_delay,
            next_periodic: schedule.interval,
        }
    }

    fn next_due(&self) -> Duration {
        match self.pending_initial {
            Some(initial) if initial <= self.next_periodic => initial,
            _ => self.next_periodic,
        }
    }

    fn advance(&mut self) {
        match self.pending_initial {
            Some(initial) if initial <= self.next_periodic => self.pending_initial = None,
            _ => self.next_periodic += self.schedule.interval,
        }
    }
}

/// Running instability timer. Cancelled on [`cancel`](Self::cancel) or drop.
#[derive(Debug)]
pub struct InstabilityTimer {
    cancel: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl InstabilityTimer {
    pub fn spawn(schedule: InstabilitySchedule, handle: SimulationHandle) -> std::io::Result<Self> {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("plasma-instability".into())
            .spawn(move || {
                let start = Instant::now();
                let mut cursor = ScheduleCursor::new(schedule);

                loop {
                    let deadline = start + cursor.next_due();
                    let wait = deadline.saturating_duration_since(Instant::now());

                    match cancel_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {}
                        // Cancelled, or the owner went away
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    if !handle.send(Command::InjectInstability) {
                        log::debug!("Simulation gone, stopping instability timer");
                        break;
                    }
                    cursor.advance();
                }
            })?;

        log::debug!(
            "Instability timer started (initial {:?}, every {:?})",
            schedule.initial_delay,
            schedule.interval
        );

        Ok(Self {
            cancel: Some(cancel_tx),
            thread: Some(thread),
        })
    }

    /// Stop the timer and wait for its thread to exit.
    ///
    /// No command is sent after this returns.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The thread may already have exited on its own
            let _ = cancel.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Instability timer thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }
}

impl Drop for InstabilityTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
