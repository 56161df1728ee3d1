//! Display pages and the cyclic page selector.
//!
//! One button, five pages: each qualifying press advances the selector
//! by one, wrapping at the end. Every page is a pure render of
//! in-memory state - the core writes frames and never reads the
//! display back.

use core::fmt::Write;

use crate::countdown::format_remaining;
use crate::error::Error;
use crate::store::ConfigRecord;
use crate::time::ClockTime;
use heapless::String;

/// Number of pages in the cycle.
pub const PAGE_COUNT: u8 = 5;

/// The fixed page order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Page {
    /// Speed and trip distance.
    Ride,
    /// Wall-clock time and date.
    Clock,
    /// Device and operator identity, wheel size.
    Identity,
    /// Guarded safe-eject countdown.
    Eject,
    /// Guarded factory-reset countdown.
    FactoryReset,
}

impl Page {
    pub fn from_index(index: u8) -> Option<Page> {
        match index {
            0 => Some(Page::Ride),
            1 => Some(Page::Clock),
            2 => Some(Page::Identity),
            3 => Some(Page::Eject),
            4 => Some(Page::FactoryReset),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Page::Ride => 0,
            Page::Clock => 1,
            Page::Identity => 2,
            Page::Eject => 3,
            Page::FactoryReset => 4,
        }
    }
}

/// Cyclic page cursor. Advances by exactly one per press edge and
/// never leaves `[0, PAGE_COUNT)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PageSelector {
    current: u8,
}

impl PageSelector {
    pub const fn new() -> Self {
        Self { current: 0 }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn page(&self) -> Option<Page> {
        Page::from_index(self.current)
    }

    /// Advance one page, wrapping. Returns the new index.
    pub fn advance(&mut self) -> u8 {
        self.current = (self.current + 1) % PAGE_COUNT;
        self.current
    }
}

/// The capability set the core needs from the display collaborator.
///
/// Cursor positions are character cells (column, row); `print_line`
/// writes at the cursor and moves to the next row.
pub trait Frame {
    fn clear(&mut self);
    fn set_cursor(&mut self, col: u8, row: u8);
    fn set_text_size(&mut self, size: u8);
    fn print_line(&mut self, text: &str);
    fn commit(&mut self);
}

/// Live ride figures. The wheel-sensor input populates these; until it
/// is wired they stay at their power-on values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RideStats {
    /// Current speed in tenths of km/h.
    pub speed_kmh_x10: u16,
    /// Trip distance in metres.
    pub distance_m: u32,
}

/// Render the page at `index`. An out-of-range index draws the
/// diagnostic page and nothing else - it must never fault.
pub fn render(
    index: u8,
    record: &ConfigRecord,
    stats: &RideStats,
    time: &ClockTime,
    frame: &mut impl Frame,
) {
    match Page::from_index(index) {
        Some(Page::Ride) => draw_ride(frame, stats),
        Some(Page::Clock) => draw_clock(frame, time),
        Some(Page::Identity) => draw_identity(frame, record),
        // The guarded pages carry countdown state the controller owns;
        // it renders them through draw_countdown instead.
        Some(Page::Eject) => draw_countdown(frame, "EJECT CARD", crate::config::EJECT_COUNTDOWN_SECS),
        Some(Page::FactoryReset) => {
            draw_countdown(frame, "FACTORY RESET", crate::config::RESET_COUNTDOWN_SECS)
        }
        None => draw_fault(frame, index),
    }
}

fn draw_ride(frame: &mut impl Frame, stats: &RideStats) {
    frame.clear();

    let mut speed: String<16> = String::new();
    let _ = write!(
        speed,
        "{}.{}",
        stats.speed_kmh_x10 / 10,
        stats.speed_kmh_x10 % 10
    );

    frame.set_text_size(2);
    frame.set_cursor(0, 0);
    frame.print_line(speed.as_str());

    frame.set_text_size(1);
    frame.set_cursor(0, 2);
    frame.print_line("km/h");

    let mut dist: String<20> = String::new();
    let km = stats.distance_m / 1000;
    let centi_km = (stats.distance_m % 1000) / 10;
    let _ = write!(dist, "trip {}.{:02} km", km, centi_km);
    frame.set_cursor(0, 3);
    frame.print_line(dist.as_str());

    frame.commit();
}

fn draw_clock(frame: &mut impl Frame, time: &ClockTime) {
    frame.clear();

    let mut hms: String<16> = String::new();
    let _ = write!(hms, "{:02}:{:02}:{:02}", time.hours, time.minutes, time.seconds);
    frame.set_text_size(2);
    frame.set_cursor(0, 0);
    frame.print_line(hms.as_str());

    let mut ymd: String<16> = String::new();
    let _ = write!(ymd, "{:04}-{:02}-{:02}", time.year, time.month, time.day);
    frame.set_text_size(1);
    frame.set_cursor(0, 3);
    frame.print_line(ymd.as_str());

    frame.commit();
}

fn draw_identity(frame: &mut impl Frame, record: &ConfigRecord) {
    frame.clear();
    frame.set_text_size(1);
    frame.set_cursor(0, 0);

    if record.has_data {
        frame.print_line(record.device_name.as_str());
        frame.print_line(record.operator_name.as_str());

        let mut wheel: String<20> = String::new();
        let _ = write!(wheel, "wheel {} cm", record.wheel_circumference_cm);
        frame.print_line(wheel.as_str());
    } else {
        frame.print_line("not provisioned");
    }

    frame.commit();
}

/// Countdown page: title, remaining time, cancel hint.
pub fn draw_countdown(frame: &mut impl Frame, title: &str, remaining: u8) {
    frame.clear();
    frame.set_text_size(1);
    frame.set_cursor(0, 0);
    frame.print_line(title);
    frame.print_line(format_remaining(remaining).as_str());
    frame.set_cursor(0, 3);
    frame.print_line("press: cancel");
    frame.commit();
}

/// Bootstrap confirmation screen: the loaded record, verbatim.
pub fn draw_confirm(frame: &mut impl Frame, record: &ConfigRecord) {
    frame.clear();
    frame.set_text_size(1);
    frame.set_cursor(0, 0);
    frame.print_line("new config:");
    frame.print_line(record.device_name.as_str());
    frame.print_line(record.operator_name.as_str());

    let mut wheel: String<20> = String::new();
    let _ = write!(wheel, "wheel {} cm", record.wheel_circumference_cm);
    frame.print_line(wheel.as_str());

    frame.set_cursor(0, 4);
    frame.print_line("press: save");
    frame.commit();
}

/// Terminal page after a fired safe-eject.
pub fn draw_halted(frame: &mut impl Frame) {
    frame.clear();
    frame.set_text_size(1);
    frame.set_cursor(0, 0);
    frame.print_line("card ejected");
    frame.print_line("safe to power off");
    frame.commit();
}

/// Persistent diagnostic for a failed boot.
pub fn draw_fatal(frame: &mut impl Frame, error: &Error) {
    let reason = match error {
        Error::ConfigNotFound => "no info.txt on card",
        Error::MalformedRecord => "bad info.txt record",
        Error::FieldOverflow => "config field too long",
        Error::BadLayout => "store layout invalid",
        Error::StoreRead => "eeprom read failed",
        Error::StoreWrite => "eeprom write failed",
        Error::Display => "display fault",
        Error::Rtc => "rtc fault",
    };

    frame.clear();
    frame.set_text_size(1);
    frame.set_cursor(0, 0);
    frame.print_line("BOOT FAILED");
    frame.print_line(reason);
    frame.commit();
}

/// Defensive diagnostic for an out-of-range page index.
fn draw_fault(frame: &mut impl Frame, index: u8) {
    let mut line: String<16> = String::new();
    let _ = write!(line, "page {}", index);

    frame.clear();
    frame.set_text_size(1);
    frame.set_cursor(0, 0);
    frame.print_line("PAGE ERROR");
    frame.print_line(line.as_str());
    frame.commit();
}
