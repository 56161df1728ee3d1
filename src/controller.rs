//! Top-level control loop state.
//!
//! One `Controller` owns everything the loop touches: the in-memory
//! configuration record, the page selector, the button edge detector
//! and the two guarded countdowns. `poll` is called every loop pass
//! (10 ms on target) with the current time and the raw button level,
//! and dispatches to whatever the current page needs.
//!
//! Fatal and halted conditions are explicit states checked at the top
//! of every poll, not hidden infinite loops: the device keeps drawing
//! its diagnostic and ignoring input until the operator power-cycles.

use crate::countdown::{GuardedCountdown, Tick};
use crate::config::{EJECT_COUNTDOWN_SECS, RESET_COUNTDOWN_SECS};
use crate::error::Error;
use crate::indicator::Indicator;
use crate::input::PressDetector;
use crate::pages::{self, Frame, Page, PageSelector, RideStats};
use crate::store::{ConfigMedium, ConfigRecord, ConfigStore};
use crate::time::ClockTime;

/// Run-loop terminal states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    Running,
    /// Safe-eject fired; requires a power cycle.
    Halted,
    /// Boot failed, or the store refused a wipe. Requires operator
    /// intervention; no automatic retry.
    Fatal(Error),
}

pub struct Controller {
    record: ConfigRecord,
    selector: PageSelector,
    button: PressDetector,
    eject: GuardedCountdown,
    reset: GuardedCountdown,
    state: RunState,
    indicator: Indicator,
}

impl Controller {
    /// Normal construction after a successful bootstrap.
    pub fn new(record: ConfigRecord, indicator: Indicator) -> Self {
        Self {
            record,
            selector: PageSelector::new(),
            button: PressDetector::new(),
            eject: GuardedCountdown::new(EJECT_COUNTDOWN_SECS),
            reset: GuardedCountdown::new(RESET_COUNTDOWN_SECS),
            state: RunState::Running,
            indicator,
        }
    }

    /// Construction for a failed bootstrap: the loop will render the
    /// diagnostic forever.
    pub fn fatal(error: Error) -> Self {
        let mut controller = Self::new(ConfigRecord::default(), Indicator::Initializing);
        controller.state = RunState::Fatal(error);
        controller
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    pub fn page_index(&self) -> u8 {
        self.selector.current()
    }

    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    /// One control-loop pass.
    pub fn poll<M: ConfigMedium>(
        &mut self,
        now_ms: u64,
        time: &ClockTime,
        pressed_raw: bool,
        store: &mut ConfigStore<M>,
        stats: &RideStats,
        frame: &mut impl Frame,
    ) {
        match &self.state {
            RunState::Fatal(error) => {
                pages::draw_fatal(frame, error);
                return;
            }
            RunState::Halted => {
                pages::draw_halted(frame);
                return;
            }
            RunState::Running => {}
        }

        let edge = self.button.sample(now_ms, pressed_raw);
        let now_second = time.seconds_of_day();

        match self.selector.page() {
            Some(Page::Eject) => self.poll_eject(edge, now_second, stats, time, frame),
            Some(Page::FactoryReset) => {
                self.poll_reset(edge, now_second, store, stats, time, frame)
            }
            _ => {
                if edge {
                    self.advance(now_second);
                }
                pages::render(self.selector.current(), &self.record, stats, time, frame);
            }
        }
    }

    /// Advance the page cursor; entering a guarded page arms its
    /// countdown from the full total.
    fn advance(&mut self, now_second: u32) {
        match Page::from_index(self.selector.advance()) {
            Some(Page::Eject) => self.eject.start(now_second),
            Some(Page::FactoryReset) => self.reset.start(now_second),
            _ => {}
        }
    }

    fn poll_eject(
        &mut self,
        edge: bool,
        now_second: u32,
        stats: &RideStats,
        time: &ClockTime,
        frame: &mut impl Frame,
    ) {
        if edge {
            // Cancel doubles as a normal navigation event.
            self.eject.cancel();
            self.advance(now_second);
            pages::render(self.selector.current(), &self.record, stats, time, frame);
            return;
        }

        match self.eject.tick(now_second) {
            Tick::Fired => {
                // Nothing to finalize for the card itself; the halt is
                // the guarantee that no further writes can happen.
                self.state = RunState::Halted;
                pages::draw_halted(frame);
            }
            Tick::Running { remaining } => pages::draw_countdown(frame, "EJECT CARD", remaining),
            Tick::Idle => pages::draw_countdown(frame, "EJECT CARD", self.eject.remaining()),
        }
    }

    fn poll_reset<M: ConfigMedium>(
        &mut self,
        edge: bool,
        now_second: u32,
        store: &mut ConfigStore<M>,
        stats: &RideStats,
        time: &ClockTime,
        frame: &mut impl Frame,
    ) {
        if edge {
            self.reset.cancel();
            self.advance(now_second);
            pages::render(self.selector.current(), &self.record, stats, time, frame);
            return;
        }

        match self.reset.tick(now_second) {
            Tick::Fired => match store.wipe() {
                Ok(()) => {
                    self.record = ConfigRecord::default();
                    self.selector = PageSelector::new();
                    pages::render(self.selector.current(), &self.record, stats, time, frame);
                }
                Err(error) => {
                    // A half-zeroed region must not masquerade as a
                    // working store.
                    self.state = RunState::Fatal(error);
                    pages::draw_fatal(frame, &error);
                }
            },
            Tick::Running { remaining } => pages::draw_countdown(frame, "FACTORY RESET", remaining),
            Tick::Idle => pages::draw_countdown(frame, "FACTORY RESET", self.reset.remaining()),
        }
    }
}
