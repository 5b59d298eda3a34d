//! Frame loop: queued commands, clock and step, then draw.
//!
//! The loop is the only owner of the [`SimulationState`]. Commands submitted
//! at any time wait in a FIFO queue and are applied together at the start of
//! the next frame, so a step always sees one consistent configuration.

use std::collections::VecDeque;

use crate::clock::FrameClock;
use crate::command::Command;
use crate::simulation::{SimulationState, StepReport};
use crate::surface::{render_frame, RenderSurface};

/// Outcome of one [`FrameLoop::frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub dt: f64,
    pub applied: usize,
    pub rejected: usize,
    pub step: StepReport,
}

pub struct FrameLoop {
    state: SimulationState,
    clock: FrameClock,
    queue: VecDeque<Command>,
}

impl FrameLoop {
    pub fn new(state: SimulationState) -> Self {
        Self {
            state,
            clock: FrameClock::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn into_state(self) -> SimulationState {
        self.state
    }

    /// Queues a command for the next frame boundary.
    pub fn submit(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Commands waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs one frame at host time `timestamp` (seconds).
    pub fn frame<S: RenderSurface + ?Sized>(&mut self, timestamp: f64, surface: &mut S) -> FrameReport {
        let dt = self.clock.tick(timestamp);
        self.frame_with_dt(dt, surface)
    }

    /// Runs one frame with an explicit `dt`, bypassing the clock. Used for
    /// fixed-step offline rendering.
    pub fn frame_with_dt<S: RenderSurface + ?Sized>(&mut self, dt: f64, surface: &mut S) -> FrameReport {
        let (applied, rejected) = self.drain_commands();
        let step = self.state.step(dt);
        render_frame(&self.state, surface);
        FrameReport {
            dt,
            applied,
            rejected,
            step,
        }
    }

    fn drain_commands(&mut self) -> (usize, usize) {
        let mut applied = 0;
        let mut rejected = 0;
        while let Some(command) = self.queue.pop_front() {
            match self.state.apply(command) {
                Ok(()) => applied += 1,
                Err(_) => rejected += 1,
            }
        }
        (applied, rejected)
    }
}
