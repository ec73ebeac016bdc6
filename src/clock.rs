//! Simulated time of day and day counter.

use crate::config::WorldConfig;
use serde::{Deserialize, Serialize};

/// Day/night clock
///
/// Counts whole ticks inside the current day so a day always lasts
/// exactly `ticks_per_day` ticks regardless of float rounding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Clock {
    tick_in_day: u64,
    ticks_per_day: u64,
    tick_increment: f32,
    day: u32,
}

impl Clock {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            tick_in_day: 0,
            ticks_per_day: config.ticks_per_day(),
            tick_increment: config.tick_increment,
            day: 0,
        }
    }

    /// Advance one tick, returns true when a new day starts
    pub fn advance(&mut self) -> bool {
        self.tick_in_day += 1;
        if self.tick_in_day >= self.ticks_per_day {
            self.tick_in_day = 0;
            self.day += 1;
            true
        } else {
            false
        }
    }

    /// Current time of day in `[0, day_length)`
    #[inline]
    pub fn time_of_day(&self) -> f32 {
        self.tick_in_day as f32 * self.tick_increment
    }

    /// Days elapsed since the simulation started
    #[inline]
    pub fn day(&self) -> u32 {
        self.day
    }

    #[inline]
    pub fn ticks_per_day(&self) -> u64 {
        self.ticks_per_day
    }

    /// Days between `day_born` and now
    #[inline]
    pub fn age_of(&self, day_born: u32) -> u32 {
        self.day.saturating_sub(day_born)
    }
}
