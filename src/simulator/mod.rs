//! The simulator module captures the parts of a discrete event simulation
//! kernel that stateful random variables interact with.  The Burst
//! interval controller requests boundary callbacks through the
//! `EventScheduler` trait, and hosts deliver those callbacks back when
//! the simulation clock reaches them.
//!
//! `EventCalendar` is a minimal future-events list implementing the trait,
//! and `Services` bundles it with the uniform random number generator, in
//! the way a simulation provides both to its models.

use serde::{Deserialize, Serialize};

use crate::utils::errors::SimulationError;

pub mod services;

pub use self::services::{EventCalendar, Services};

/// Simulation time at which the unconditional start event is delivered.
pub const EPOCH_START: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Start,
    IntervalBoundary,
}

/// A pending callback, addressed to an entity at an absolute time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    pub entity_id: String,
    pub time: f64,
    pub kind: EventKind,
}

/// Hosts implement this to receive scheduling requests from stateful
/// random variables.
pub trait EventScheduler {
    /// Requests exactly one future callback, `delay` after the current time.
    fn schedule(&mut self, entity_id: &str, delay: f64, kind: EventKind)
        -> Result<(), SimulationError>;

    fn current_time(&self) -> f64;
}
