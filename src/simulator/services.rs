use serde::{Deserialize, Serialize};

use super::{EventKind, EventScheduler, ScheduledEvent};
use crate::input_modeling::UniformRNG;
use crate::utils::errors::SimulationError;

/// Pending events ordered by time, with the simulation clock.  Events
/// sharing a time are delivered in the order they were scheduled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCalendar {
    global_time: f64,
    pending: Vec<ScheduledEvent>,
}

impl EventCalendar {
    /// Queues the unconditional start event for an entity at the current time.
    pub fn start(&mut self, entity_id: &str) {
        self.pending.push(ScheduledEvent {
            entity_id: entity_id.to_string(),
            time: self.global_time,
            kind: EventKind::Start,
        });
    }

    pub fn pending(&self) -> &[ScheduledEvent] {
        &self.pending
    }

    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    /// Moves the clock forward without delivering events.
    pub fn set_global_time(&mut self, time: f64) -> Result<(), SimulationError> {
        if !time.is_finite() || time < self.global_time {
            return Err(SimulationError::EventSchedulingError);
        }
        self.global_time = time;
        Ok(())
    }

    /// Removes the earliest pending event and advances the clock to it.
    pub fn pop_next(&mut self) -> Option<ScheduledEvent> {
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .fold(None, |earliest: Option<(usize, f64)>, (index, event)| {
                match earliest {
                    Some((_, time)) if time <= event.time => earliest,
                    _ => Some((index, event.time)),
                }
            })?;
        let event = self.pending.remove(index);
        self.global_time = self.global_time.max(event.time);
        Some(event)
    }
}

impl EventScheduler for EventCalendar {
    fn schedule(
        &mut self,
        entity_id: &str,
        delay: f64,
        kind: EventKind,
    ) -> Result<(), SimulationError> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(SimulationError::EventSchedulingError);
        }
        self.pending.push(ScheduledEvent {
            entity_id: entity_id.to_string(),
            time: self.global_time + delay,
            kind,
        });
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.global_time
    }
}

/// The simulator provides a uniform random number generator and an event
/// calendar to random variables during the execution of a simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Services {
    uniform_rng: UniformRNG,
    calendar: EventCalendar,
}

impl Services {
    pub fn new(seed: u64) -> Self {
        Self {
            uniform_rng: UniformRNG::new(seed),
            calendar: EventCalendar::default(),
        }
    }

    pub fn uniform_rng(&mut self) -> &mut UniformRNG {
        &mut self.uniform_rng
    }

    pub fn calendar(&mut self) -> &mut EventCalendar {
        &mut self.calendar
    }

    /// Both services at once, for calls that draw variates and schedule.
    pub fn split(&mut self) -> (&mut UniformRNG, &mut EventCalendar) {
        (&mut self.uniform_rng, &mut self.calendar)
    }

    pub fn global_time(&self) -> f64 {
        self.calendar.global_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_delivered_in_time_order() {
        let mut calendar = EventCalendar::default();
        calendar.start("burst");
        calendar
            .schedule("burst", 5.0, EventKind::IntervalBoundary)
            .unwrap();
        calendar
            .schedule("other", 2.0, EventKind::IntervalBoundary)
            .unwrap();
        calendar
            .schedule("burst", 2.0, EventKind::IntervalBoundary)
            .unwrap();
        let delivered: Vec<(String, f64)> = std::iter::from_fn(|| calendar.pop_next())
            .map(|event| (event.entity_id, event.time))
            .collect();
        assert_eq!(
            delivered,
            vec![
                ("burst".to_string(), 0.0),
                ("other".to_string(), 2.0),
                ("burst".to_string(), 2.0),
                ("burst".to_string(), 5.0),
            ]
        );
        assert_eq!(calendar.global_time(), 5.0);
    }

    #[test]
    fn delays_are_relative_to_the_clock() {
        let mut calendar = EventCalendar::default();
        calendar.set_global_time(3.0).unwrap();
        calendar
            .schedule("burst", 4.0, EventKind::IntervalBoundary)
            .unwrap();
        assert_eq!(calendar.pending()[0].time, 7.0);
        assert!(calendar.set_global_time(1.0).is_err());
    }

    #[test]
    fn invalid_delays_are_rejected() {
        let mut calendar = EventCalendar::default();
        assert!(matches!(
            calendar.schedule("burst", -1.0, EventKind::IntervalBoundary),
            Err(SimulationError::EventSchedulingError)
        ));
        assert!(calendar
            .schedule("burst", f64::NAN, EventKind::IntervalBoundary)
            .is_err());
        assert!(calendar.pending().is_empty());
    }
}
