//! The Burst interval controller partitions a value sequence into
//! alternating intervals of two types, A and B.  Each interval type has its
//! own length distribution and its own value distribution.  Interval
//! boundaries are signalled through an external event scheduler, and values
//! that overrun the active interval roll over into the following intervals.

use log::trace;
use serde::{Deserialize, Serialize};

use super::elementary::{positive, probability};
use super::{ContinuousRandomVariable, UniformRNG};
use crate::simulator::{EventKind, EventScheduler, EPOCH_START};
use crate::utils::errors::{ParameterError, SimulationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    A,
    B,
}

/// The length and value distributions of one interval type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSpec {
    pub length: ContinuousRandomVariable,
    pub value: ContinuousRandomVariable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionPolicy {
    /// Strict alternation, starting with A
    RoundRobin,
    /// A with probability `p`, otherwise B
    Probability { p: f64 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BurstState {
    active: Option<Interval>,
    interval_end: f64,
    discard_next_boundary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Burst {
    entity_id: String,
    interval_a: IntervalSpec,
    interval_b: IntervalSpec,
    policy: SelectionPolicy,
    #[serde(default)]
    state: BurstState,
}

impl Burst {
    pub fn new(
        entity_id: &str,
        interval_a: IntervalSpec,
        interval_b: IntervalSpec,
        policy: SelectionPolicy,
    ) -> Result<Self, ParameterError> {
        if let SelectionPolicy::Probability { p } = policy {
            probability("p", p)?;
        }
        Ok(Self {
            entity_id: entity_id.to_string(),
            interval_a,
            interval_b,
            policy,
            state: BurstState::default(),
        })
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The active interval type, or `None` before initialization.
    pub fn active(&self) -> Option<Interval> {
        self.state.active
    }

    /// Absolute simulation time at which the active interval ends.
    pub fn interval_end(&self) -> f64 {
        self.state.interval_end
    }

    pub fn discards_next_boundary(&self) -> bool {
        self.state.discard_next_boundary
    }

    /// Selects the first interval and schedules its boundary.
    pub fn initialize<S: EventScheduler>(
        &mut self,
        uniform_rng: &mut UniformRNG,
        scheduler: &mut S,
    ) -> Result<(), SimulationError> {
        let length = self.change_interval(uniform_rng)?;
        self.state.interval_end = scheduler.current_time() + length;
        self.state.discard_next_boundary = false;
        scheduler.schedule(&self.entity_id, length, EventKind::IntervalBoundary)
    }

    /// Switches the active interval according to the selection policy, and
    /// returns a length drawn for the newly active interval.
    /// A length that is not finite and strictly positive is an error, since
    /// an overrun could otherwise never leave the interval.
    pub fn change_interval(
        &mut self,
        uniform_rng: &mut UniformRNG,
    ) -> Result<f64, SimulationError> {
        let next = match self.policy {
            SelectionPolicy::RoundRobin => match self.state.active {
                Some(Interval::A) => Interval::B,
                Some(Interval::B) | None => Interval::A,
            },
            SelectionPolicy::Probability { p } => {
                if uniform_rng.raw() < probability("p", p)? {
                    Interval::A
                } else {
                    Interval::B
                }
            }
        };
        self.state.active = Some(next);
        let length = self.spec_mut(next).length.random_variate(uniform_rng)?;
        let length = positive("interval length", length)?;
        trace!("{} changed to interval {:?} of length {}", self.entity_id, next, length);
        Ok(length)
    }

    /// Draws the next value.  A value overrunning the active interval
    /// consumes the remaining time and is redrawn in the following
    /// interval, repeatedly, with the consumed time added to the result.
    pub fn random_variate<S: EventScheduler>(
        &mut self,
        uniform_rng: &mut UniformRNG,
        scheduler: &mut S,
    ) -> Result<f64, SimulationError> {
        let mut active = self.state.active.ok_or(SimulationError::InvalidModelState)?;
        let now = scheduler.current_time();
        let mut value = self.spec_mut(active).value.random_variate(uniform_rng)?;
        let mut remaining = self.state.interval_end - now;
        let mut offset = 0.0;
        let mut changed = false;
        while value > remaining {
            self.state.discard_next_boundary = true;
            offset += remaining;
            remaining = self.change_interval(uniform_rng)?;
            active = self.state.active.ok_or(SimulationError::InvalidModelState)?;
            value = self.spec_mut(active).value.random_variate(uniform_rng)?;
            changed = true;
        }
        if changed {
            let delay = offset + remaining;
            self.state.interval_end = now + delay;
            trace!(
                "{} overran into interval {:?}, next boundary at {}",
                self.entity_id,
                active,
                self.state.interval_end
            );
            scheduler.schedule(&self.entity_id, delay, EventKind::IntervalBoundary)?;
        }
        Ok(offset + value)
    }

    /// Responds to a boundary callback.  A boundary already consumed by an
    /// overrun is dropped, except at the epoch start.
    pub fn handle_boundary<S: EventScheduler>(
        &mut self,
        uniform_rng: &mut UniformRNG,
        scheduler: &mut S,
    ) -> Result<(), SimulationError> {
        if self.state.discard_next_boundary && scheduler.current_time() != EPOCH_START {
            trace!(
                "{} discarded a stale boundary at {}",
                self.entity_id,
                scheduler.current_time()
            );
            self.state.discard_next_boundary = false;
            return Ok(());
        }
        let length = self.change_interval(uniform_rng)?;
        self.state.interval_end += length;
        scheduler.schedule(&self.entity_id, length, EventKind::IntervalBoundary)
    }

    /// Dispatches a delivered event: the start event initializes the
    /// controller, and boundary events change the interval.
    pub fn handle_event<S: EventScheduler>(
        &mut self,
        kind: EventKind,
        uniform_rng: &mut UniformRNG,
        scheduler: &mut S,
    ) -> Result<(), SimulationError> {
        match kind {
            EventKind::Start if self.state.active.is_none() => {
                self.initialize(uniform_rng, scheduler)
            }
            EventKind::Start | EventKind::IntervalBoundary => {
                self.handle_boundary(uniform_rng, scheduler)
            }
        }
    }

    pub fn mean(&self) -> Result<f64, SimulationError> {
        Err(SimulationError::UnsupportedOperation(
            "moments of a burst process",
        ))
    }

    pub fn variance(&self) -> Result<f64, SimulationError> {
        Err(SimulationError::UnsupportedOperation(
            "moments of a burst process",
        ))
    }

    pub fn pdf(&self, _x: f64) -> Result<f64, SimulationError> {
        Ok(0.0)
    }

    pub fn cdf(&self, _x: f64) -> Result<f64, SimulationError> {
        Ok(0.0)
    }

    fn spec_mut(&mut self, interval: Interval) -> &mut IntervalSpec {
        match interval {
            Interval::A => &mut self.interval_a,
            Interval::B => &mut self.interval_b,
        }
    }
}
