use std::collections::VecDeque;

use log::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::input::InputEvent;
use crate::math::to_rgba;
use crate::simulation::{FrameStats, SimulationState};
use crate::surface::Surface;

/// Owns the simulation for one surface and the queue of input that arrived
/// between frames.
///
/// The host drives it:
///
/// ```ignore
/// while session.frame(&mut surface) {
///     wait_for_next_refresh();
/// }
/// ```
pub struct Session {
    state: SimulationState,
    events: VecDeque<InputEvent>,
    running: bool,
    frames: u64,
}

impl Session {
    pub fn new(config: Config, width: f32, height: f32) -> Result<Self> {
        let state = SimulationState::new(config, width, height)?;
        info!(
            "session started: {} particle(s) on a {}x{} surface, background {}",
            state.particles.len(),
            width,
            height,
            to_rgba(state.physics.background, state.physics.repaint_opacity)
        );
        Ok(Self::from_state(state))
    }

    pub fn from_state(state: SimulationState) -> Self {
        Self {
            state,
            events: VecDeque::new(),
            running: true,
            frames: 0,
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Queues input for the next frame.
    pub fn post(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Stops rescheduling. The state is kept for inspection.
    pub fn stop(&mut self) {
        if self.running {
            info!("session stopped after {} frame(s)", self.frames);
        }
        self.running = false;
    }

    /// Applies queued input and runs one step.
    ///
    /// Returns whether the host should schedule another frame, along with
    /// the statistics of this one (`None` once stopped).
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> (bool, Option<FrameStats>) {
        if !self.running {
            return (false, None);
        }

        while let Some(event) = self.events.pop_front() {
            match event {
                InputEvent::Click(at) => {
                    if let Err(err) = self.state.place_well(at) {
                        error!("unable to place gravity well: {err}");
                    }
                }
                other => self.state.pointer.apply(&other),
            }
        }

        let stats = self.state.step(surface);
        self.frames += 1;
        (self.running, Some(stats))
    }
}
