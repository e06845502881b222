//! Messages from asynchronous producers to the simulation owner
//!
//! Pointer moves and instability timers run off the frame loop. They never
//! touch particle state directly. Instability requests are queued as a
//! [`Command`]; pointer moves overwrite a single slot so only the latest
//! position survives until the owner's next tick.

use std::sync::mpsc::Sender;
use std::sync::{Mutex, MutexGuard, PoisonError, Weak};

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Kick particles around a randomly chosen center
    InjectInstability,
    /// Kick particles around the given center
    InjectInstabilityAt(Vec3),
}

/// Latest pointer position not yet picked up by the simulation
#[derive(Debug, Default)]
pub(crate) struct PointerSlot(Mutex<Option<Vec3>>);

impl PointerSlot {
    fn store(&self, pointer: Vec3) {
        *self.lock() = Some(pointer);
    }

    pub(crate) fn take(&self) -> Option<Vec3> {
        self.lock().take()
    }

    // A panic while holding the lock cannot leave an Option<Vec3> half-written
    fn lock(&self) -> MutexGuard<'_, Option<Vec3>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable, `Send` handle for feeding the simulation
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    sender: Sender<Command>,
    pointer: Weak<PointerSlot>,
}

impl SimulationHandle {
    pub(crate) fn new(sender: Sender<Command>, pointer: Weak<PointerSlot>) -> Self {
        Self { sender, pointer }
    }

    /// Enqueue a command.
    ///
    /// Returns `false` once the simulation has been stopped or dropped; the
    /// command is discarded and nothing is queued.
    pub fn send(&self, command: Command) -> bool {
        self.sender.send(command).is_ok()
    }

    /// Replace the pending pointer position.
    ///
    /// Moves between two ticks coalesce: only the last one is applied.
    /// Returns `false` once the simulation has been stopped or dropped.
    pub fn set_pointer(&self, pointer: Vec3) -> bool {
        match self.pointer.upgrade() {
            Some(slot) => {
                slot.store(pointer);
                true
            }
            None => false,
        }
    }

    pub fn inject_instability(&self) -> bool {
        self.send(Command::InjectInstability)
    }
}
