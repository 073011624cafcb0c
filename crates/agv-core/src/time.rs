//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  `SimClock` maps ticks
//! to simulated seconds and, separately, to the wall-clock pause between
//! ticks when a run is paced for a viewer:
//!
//!   simulated_secs = tick * tick_duration_secs
//!   wall_interval  = BASE_WALL_INTERVAL / speed
//!
//! The speed multiplier only ever touches the second mapping.  Logical
//! behaviour (movement, battery, scheduling) is identical at any speed.

use std::fmt;
use std::time::Duration;

use crate::error::{check_range, CoreResult};

/// Wall-clock pause between ticks at speed 1×.
pub const BASE_WALL_INTERVAL: Duration = Duration::from_millis(1_000);

/// Accepted range for the speed multiplier.
pub const SPEED_RANGE: std::ops::RangeInclusive<f64> = 0.1..=100.0;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// `true` on every `interval`-th tick (never for tick 0 or interval 0).
    #[inline]
    pub fn is_multiple_of(self, interval: u64) -> bool {
        interval != 0 && self.0 != 0 && self.0 % interval == 0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tick counter plus the two time mappings described in the module docs.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many simulated seconds one tick represents.  Default: 1.
    pub tick_duration_secs: u32,
    /// The current tick, advanced by `SimClock::advance()` each step.
    pub current_tick:       Tick,
    speed:                  f64,
}

impl SimClock {
    pub fn new(tick_duration_secs: u32) -> Self {
        Self {
            tick_duration_secs: tick_duration_secs.max(1),
            current_tick:       Tick::ZERO,
            speed:              1.0,
        }
    }

    /// Advance the clock by one tick and return the new tick.
    #[inline]
    pub fn advance(&mut self) -> Tick {
        self.current_tick = Tick(self.current_tick.0 + 1);
        self.current_tick
    }

    /// Rewind to tick 0, keeping resolution and speed.
    pub fn reset(&mut self) {
        self.current_tick = Tick::ZERO;
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Change the playback multiplier.  Rejected outside [`SPEED_RANGE`].
    pub fn set_speed(&mut self, speed: f64) -> CoreResult<()> {
        check_range("speed", speed, SPEED_RANGE)?;
        self.speed = speed;
        Ok(())
    }

    /// Wall-clock pause between two paced ticks at the current speed.
    pub fn wall_interval(&self) -> Duration {
        BASE_WALL_INTERVAL.div_f64(self.speed)
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> u64 {
        self.current_tick.0 * self.tick_duration_secs as u64
    }

    /// Break elapsed time into (hours, minutes, seconds).
    pub fn elapsed_hms(&self) -> (u64, u32, u32) {
        let total = self.elapsed_secs();
        let hours = total / 3_600;
        let minutes = ((total % 3_600) / 60) as u32;
        let seconds = (total % 60) as u32;
        (hours, minutes, seconds)
    }

    // ── Tick-count helpers ────────────────────────────────────────────────

    /// How many ticks span `secs` seconds? (rounds up)
    #[inline]
    pub fn ticks_for_secs(&self, secs: u64) -> u64 {
        secs.div_ceil(self.tick_duration_secs as u64)
    }

    /// Saturates at `u64::MAX` seconds.
    #[inline]
    pub fn ticks_for_hours(&self, hours: u64) -> u64 {
        self.ticks_for_secs(hours.saturating_mul(3_600))
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.elapsed_hms();
        write!(f, "{} ({:02}:{:02}:{:02})", self.current_tick, h, m, s)
    }
}
