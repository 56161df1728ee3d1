//! Guarded-action countdown.
//!
//! Both destructive actions (safe-eject, factory reset) sit behind the
//! same cancellable countdown: entering the page starts it, every
//! control-loop pass ticks it against the wall clock, a navigation
//! press cancels it, and zero fires the action exactly once.
//!
//! The decrement is gated on the wall-clock second changing, so the
//! count drops by exactly one per elapsed second no matter how often
//! the loop polls.

use core::fmt::Write;
use heapless::String;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountdownState {
    Idle,
    Counting,
    Fired,
}

/// What one poll of the countdown produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Not counting (never started, cancelled, or already fired).
    Idle,
    /// Still counting; render this many remaining seconds.
    Running { remaining: u8 },
    /// Reached zero on this poll. Reported exactly once.
    Fired,
}

pub struct GuardedCountdown {
    total: u8,
    remaining: u8,
    last_tick_second: u32,
    state: CountdownState,
}

impl GuardedCountdown {
    /// `total` must be at least 1.
    pub const fn new(total: u8) -> Self {
        Self {
            total,
            remaining: total,
            last_tick_second: 0,
            state: CountdownState::Idle,
        }
    }

    /// Begin counting from the full total. `now_second` anchors the
    /// first whole-second boundary.
    pub fn start(&mut self, now_second: u32) {
        self.remaining = self.total;
        self.last_tick_second = now_second;
        self.state = CountdownState::Counting;
    }

    /// Abort without firing; the count is restored to the full total.
    pub fn cancel(&mut self) {
        self.remaining = self.total;
        self.state = CountdownState::Idle;
    }

    /// Advance against the wall clock. Decrements at most once per
    /// distinct second; returns [`Tick::Fired`] exactly once.
    pub fn tick(&mut self, now_second: u32) -> Tick {
        if self.state != CountdownState::Counting {
            return Tick::Idle;
        }

        if now_second != self.last_tick_second {
            self.last_tick_second = now_second;
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.state = CountdownState::Fired;
                return Tick::Fired;
            }
        }

        Tick::Running {
            remaining: self.remaining,
        }
    }

    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_counting(&self) -> bool {
        self.state == CountdownState::Counting
    }
}

/// Remaining-time label with correct singular/plural phrasing.
pub fn format_remaining(remaining: u8) -> String<16> {
    let mut out = String::new();
    let unit = if remaining == 1 { "second" } else { "seconds" };
    let _ = write!(out, "{} {}", remaining, unit);
    out
}
