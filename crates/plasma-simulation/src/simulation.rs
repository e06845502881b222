//! Simulation owner: particle field, pointer, command queue and lifecycle
//!
//! `PlasmaSimulation` is the single writer of particle state. Everything that
//! happens off the frame loop (pointer moves, instability timer) arrives
//! through a [`SimulationHandle`] and is applied at the start of
//! [`PlasmaSimulation::tick`], so a step never observes a half-applied input
//! and readers never observe a half-finished step.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use glam::Vec3;
use plasma_physics::{Charge, ParticleVertex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::command::{Command, PointerSlot, SimulationHandle};
use crate::field::{FieldStats, ParticleField};
use crate::instability::InstabilityTimer;
use crate::params::{FieldParams, ParamsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// Built, not yet receiving frame ticks
    Idle,
    /// Ticks advance the field; the instability timer is live
    Running,
    /// Torn down. Ticks and commands are ignored.
    Stopped,
}

pub struct PlasmaSimulation {
    params: FieldParams,
    field: ParticleField,
    pointer: Vec3,
    rng: StdRng,

    // Both inputs are dropped on stop, which disconnects every handle
    handle: SimulationHandle,
    commands: Option<Receiver<Command>>,
    pending_pointer: Option<Arc<PointerSlot>>,
    timer: Option<InstabilityTimer>,

    state: SimulationState,
    frame: u64,
    instabilities: u64,
}

impl PlasmaSimulation {
    /// Spawn a field seeded from OS entropy
    pub fn new(params: FieldParams) -> Result<Self, ParamsError> {
        Self::with_rng(params, StdRng::from_os_rng())
    }

    /// Spawn a reproducible field
    pub fn with_seed(params: FieldParams, seed: u64) -> Result<Self, ParamsError> {
        Self::with_rng(params, StdRng::seed_from_u64(seed))
    }

    /// Wrap an existing field. `params.particle_count` is ignored in favor of
    /// the field's own size.
    pub fn from_field(
        params: FieldParams,
        field: ParticleField,
        seed: u64,
    ) -> Result<Self, ParamsError> {
        let params = FieldParams {
            particle_count: field.len(),
            ..params
        };
        params.validate()?;
        Ok(Self::assemble(params, field, StdRng::seed_from_u64(seed)))
    }

    fn with_rng(params: FieldParams, mut rng: StdRng) -> Result<Self, ParamsError> {
        params.validate()?;
        let field = ParticleField::spawn(&params, &mut rng);
        Ok(Self::assemble(params, field, rng))
    }

    fn assemble(params: FieldParams, field: ParticleField, rng: StdRng) -> Self {
        let (sender, commands) = mpsc::channel();
        let pending_pointer = Arc::new(PointerSlot::default());

        log::info!(
            "Initialized plasma field: {} particles, B={}, E={}",
            field.len(),
            params.magnetic_field_strength,
            params.electric_field_strength
        );

        Self {
            params,
            field,
            pointer: Vec3::ZERO,
            rng,
            handle: SimulationHandle::new(sender, Arc::downgrade(&pending_pointer)),
            commands: Some(commands),
            pending_pointer: Some(pending_pointer),
            timer: None,
            state: SimulationState::Idle,
            frame: 0,
            instabilities: 0,
        }
    }

    /// Handle for producers on other threads or callbacks.
    ///
    /// After [`stop`](Self::stop) every handle, old or new, refuses input.
    pub fn handle(&self) -> SimulationHandle {
        self.handle.clone()
    }

    /// Begin accepting frame ticks and start the instability timer.
    ///
    /// Starting a running simulation does nothing. A stopped simulation
    /// stays stopped.
    pub fn start(&mut self) -> std::io::Result<()> {
        match self.state {
            SimulationState::Running => return Ok(()),
            SimulationState::Stopped => {
                log::warn!("Ignoring start on a stopped plasma simulation");
                return Ok(());
            }
            SimulationState::Idle => {}
        }

        let timer = InstabilityTimer::spawn(self.params.instability_schedule, self.handle())?;
        self.timer = Some(timer);
        self.state = SimulationState::Running;
        log::info!("Plasma simulation started");
        Ok(())
    }

    /// Cancel the timer, stop responding to ticks and disconnect all handles.
    ///
    /// Queued commands and any pending pointer move are discarded. From here
    /// on `send` and `set_pointer` on every handle return `false`.
    pub fn stop(&mut self) {
        if self.state == SimulationState::Stopped {
            return;
        }

        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        self.state = SimulationState::Stopped;
        self.disconnect();
        log::info!("Plasma simulation stopped after {} frames", self.frame);
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Frame callback: apply queued commands, then advance one step.
    ///
    /// Returns `true` if the field advanced. Idle simulations keep their
    /// queue and latest pointer move for the first running tick.
    pub fn tick(&mut self) -> bool {
        if self.state != SimulationState::Running {
            return false;
        }
        self.apply_inputs();
        self.step();
        true
    }

    /// Advance the field one step without touching the input queue.
    ///
    /// Works while `Idle` so drivers and tests can step by hand. Does nothing
    /// once stopped. Returns how many particles were pulled back onto the
    /// boundary.
    pub fn step(&mut self) -> usize {
        if self.state == SimulationState::Stopped {
            return 0;
        }

        let clamped = self.field.step(&self.params, self.pointer);
        self.frame += 1;

        if clamped > 0 {
            log::trace!("frame {}: {} particles confined", self.frame, clamped);
        }
        clamped
    }

    fn apply_inputs(&mut self) {
        if let Some(pointer) = self.pending_pointer.as_ref().and_then(|slot| slot.take()) {
            self.set_pointer(pointer);
        }

        // Taken out while draining: applying needs `&mut self`
        if let Some(commands) = self.commands.take() {
            for command in commands.try_iter() {
                self.apply(command);
            }
            self.commands = Some(commands);
        }
    }

    fn disconnect(&mut self) {
        let dropped = self
            .commands
            .take()
            .map_or(0, |rx| rx.try_iter().count());
        if dropped > 0 {
            log::warn!("Discarded {} queued commands on stop", dropped);
        }
        if let Some(pointer) = self.pending_pointer.take().and_then(|slot| slot.take()) {
            log::trace!("Discarded pending pointer {:?} on stop", pointer);
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::InjectInstability => {
                self.inject_instability();
            }
            Command::InjectInstabilityAt(center) => {
                self.inject_instability_at(center);
            }
        }
    }

    /// Move the pointer influence point directly. Ignored once stopped.
    pub fn set_pointer(&mut self, pointer: Vec3) {
        if self.state == SimulationState::Stopped {
            return;
        }
        log::trace!("pointer -> {:?}", pointer);
        self.pointer = pointer;
    }

    pub fn pointer(&self) -> Vec3 {
        self.pointer
    }

    /// Kick particles around a random center inside the instability box.
    ///
    /// Returns the number of particles kicked, always 0 once stopped.
    pub fn inject_instability(&mut self) -> usize {
        if self.state == SimulationState::Stopped {
            return 0;
        }

        let extent = self.params.instability_extent;
        let center = Vec3::new(
            (self.rng.random::<f32>() - 0.5) * extent.x,
            (self.rng.random::<f32>() - 0.5) * extent.y,
            (self.rng.random::<f32>() - 0.5) * extent.z,
        );
        self.inject_instability_at(center)
    }

    pub fn inject_instability_at(&mut self, center: Vec3) -> usize {
        if self.state == SimulationState::Stopped {
            return 0;
        }

        let kicked = self.field.perturb(
            center,
            self.params.instability_radius,
            self.params.instability_kick,
            &mut self.rng,
        );
        self.instabilities += 1;
        log::debug!(
            "Instability at ({:.2}, {:.2}, {:.2}) kicked {} particles",
            center.x,
            center.y,
            center.z,
            kicked
        );
        kicked
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of instability events applied so far
    pub fn instability_count(&self) -> u64 {
        self.instabilities
    }

    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        self.field.positions()
    }

    pub fn velocities(&self) -> &[Vec3] {
        self.field.velocities()
    }

    pub fn charges(&self) -> &[Charge] {
        self.field.charges()
    }

    pub fn intensities(&self) -> &[f32] {
        self.field.intensities()
    }

    pub fn vertices(&self) -> Vec<ParticleVertex> {
        self.field.vertices()
    }

    pub fn stats(&self) -> FieldStats {
        self.field.stats()
    }
}

impl Drop for PlasmaSimulation {
    fn drop(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }
}
