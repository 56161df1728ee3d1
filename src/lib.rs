//! Host-testable core for cyclometer.
//!
//! Everything with real state or failure handling - the config store
//! codec, the card-record loader, the bootstrap protocol, page
//! navigation and the guarded countdowns - lives here and runs on the
//! host (no embedded hardware required).
//!
//! Usage: `cargo test`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main],
//! built with `--features embedded` for the nRF52840 target. Hardware
//! adapters for the seams defined here (ConfigMedium, RecordSource,
//! Frame) live in src/hw/ and src/ui/.

#![cfg_attr(not(test), no_std)]

pub mod bootstrap;
pub mod config;
pub mod controller;
pub mod countdown;
pub mod error;
pub mod indicator;
pub mod input;
pub mod loader;
pub mod mock;
pub mod pages;
pub mod store;
pub mod time;

pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::bootstrap::{self, BootOutcome};
    use crate::config::{
        DEVICE_NAME_OFFSET, NAME_MAX_LEN, OPERATOR_NAME_OFFSET, STORE_REGION_SIZE,
    };
    use crate::controller::{Controller, RunState};
    use crate::countdown::{format_remaining, CountdownState, GuardedCountdown, Tick};
    use crate::error::Error;
    use crate::indicator::Indicator;
    use crate::input::PressDetector;
    use crate::mock::{FrameLog, RamMedium, StaticSource};
    use crate::pages::{self, Page, PageSelector, RideStats, PAGE_COUNT};
    use crate::store::{check_layout, ConfigRecord, ConfigStore, FieldSlot, LAYOUT};
    use crate::time::ClockTime;

    fn record(circumference: u8, device: &str, operator: &str) -> ConfigRecord {
        let mut r = ConfigRecord {
            has_data: true,
            wheel_circumference_cm: circumference,
            ..Default::default()
        };
        r.device_name.push_str(device).unwrap();
        r.operator_name.push_str(operator).unwrap();
        r
    }

    fn fresh_store() -> ConfigStore<RamMedium> {
        ConfigStore::new(RamMedium::new()).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Config Store - string codec
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn string_codec_roundtrip_all_lengths() {
        let mut store = fresh_store();
        for len in [0usize, 1, 5, 31, NAME_MAX_LEN] {
            let s = "a".repeat(len);
            store
                .write_string(DEVICE_NAME_OFFSET, NAME_MAX_LEN, &s)
                .unwrap();
            let back = store.read_string(DEVICE_NAME_OFFSET, NAME_MAX_LEN).unwrap();
            assert_eq!(back.as_str(), s);
        }
    }

    #[test]
    fn string_codec_rejects_overlong_write() {
        let mut store = fresh_store();
        let too_long = "x".repeat(NAME_MAX_LEN + 1);
        assert_eq!(
            store.write_string(DEVICE_NAME_OFFSET, NAME_MAX_LEN, &too_long),
            Err(Error::FieldOverflow)
        );
        // Nothing reached the medium.
        assert!(store.medium_mut().bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn string_slots_do_not_corrupt_each_other() {
        let mut store = fresh_store();
        store
            .write_string(DEVICE_NAME_OFFSET, NAME_MAX_LEN, "Trusty")
            .unwrap();
        let fat = "b".repeat(NAME_MAX_LEN);
        store
            .write_string(OPERATOR_NAME_OFFSET, NAME_MAX_LEN, &fat)
            .unwrap();

        let device = store.read_string(DEVICE_NAME_OFFSET, NAME_MAX_LEN).unwrap();
        let operator = store.read_string(OPERATOR_NAME_OFFSET, NAME_MAX_LEN).unwrap();
        assert_eq!(device.as_str(), "Trusty");
        assert_eq!(operator.as_str(), fat);
    }

    #[test]
    fn string_codec_detects_corrupt_length_byte() {
        let mut store = fresh_store();
        store.medium_mut().bytes[DEVICE_NAME_OFFSET] = 200;
        assert_eq!(
            store.read_string(DEVICE_NAME_OFFSET, NAME_MAX_LEN),
            Err(Error::FieldOverflow)
        );
    }

    #[test]
    fn string_codec_detects_non_utf8_payload() {
        let mut store = fresh_store();
        store.medium_mut().bytes[DEVICE_NAME_OFFSET] = 2;
        store.medium_mut().bytes[DEVICE_NAME_OFFSET + 1] = 0xFF;
        store.medium_mut().bytes[DEVICE_NAME_OFFSET + 2] = 0xFE;
        assert_eq!(
            store.read_string(DEVICE_NAME_OFFSET, NAME_MAX_LEN),
            Err(Error::MalformedRecord)
        );
    }

    // ════════════════════════════════════════════════════════════════════════
    // Config Store - records, wipe, layout
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn record_roundtrip() {
        let mut store = fresh_store();
        let rec = record(210, "Trusty", "Ada");
        store.write_record(&rec).unwrap();
        assert_eq!(store.read_record().unwrap(), rec);
    }

    #[test]
    fn zeroed_medium_reads_as_absent() {
        let mut store = fresh_store();
        let rec = store.read_record().unwrap();
        assert!(!rec.has_data);
        assert_eq!(rec, ConfigRecord::default());
    }

    #[test]
    fn factory_fresh_eeprom_reads_as_absent() {
        // A never-written AT24C32 holds 0xFF everywhere; that must not
        // pass for a committed record.
        let mut store = ConfigStore::new(RamMedium::filled(0xFF)).unwrap();
        assert!(!store.read_record().unwrap().has_data);
    }

    #[test]
    fn wipe_clears_presence_flag_and_region() {
        let mut store = fresh_store();
        store.write_record(&record(210, "Trusty", "Ada")).unwrap();
        store.wipe().unwrap();

        assert!(!store.read_record().unwrap().has_data);
        assert!(store.medium_mut().bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn write_failure_surfaces_as_store_write() {
        let mut medium = RamMedium::new();
        medium.fail_writes = true;
        let mut store = ConfigStore::new(medium).unwrap();
        assert_eq!(
            store.write_record(&record(210, "Trusty", "Ada")),
            Err(Error::StoreWrite)
        );
    }

    #[test]
    fn layout_table_is_valid() {
        assert!(check_layout(&LAYOUT).is_ok());
    }

    #[test]
    fn layout_check_rejects_overlap() {
        let overlapping = [
            FieldSlot { name: "a", offset: 0, width: 4 },
            FieldSlot { name: "b", offset: 3, width: 4 },
        ];
        assert_eq!(check_layout(&overlapping), Err(Error::BadLayout));
    }

    #[test]
    fn layout_check_rejects_out_of_region_slot() {
        let outside = [FieldSlot {
            name: "a",
            offset: STORE_REGION_SIZE - 1,
            width: 2,
        }];
        assert_eq!(check_layout(&outside), Err(Error::BadLayout));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Removable-storage loader
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn loader_parses_three_fields() {
        let rec = crate::loader::parse_record("210\nTrusty\nAda").unwrap();
        assert_eq!(rec.circumference_cm, 210);
        assert_eq!(rec.device_name.as_str(), "Trusty");
        assert_eq!(rec.operator_name.as_str(), "Ada");
    }

    #[test]
    fn loader_tolerates_crlf_records() {
        let rec = crate::loader::parse_record("210\r\nTrusty\r\nAda\r\n").unwrap();
        assert_eq!(rec.circumference_cm, 210);
        assert_eq!(rec.device_name.as_str(), "Trusty");
        assert_eq!(rec.operator_name.as_str(), "Ada");
    }

    #[test]
    fn loader_ignores_trailing_content() {
        let rec = crate::loader::parse_record("210\nTrusty\nAda\nnotes to self").unwrap();
        assert_eq!(rec.operator_name.as_str(), "Ada");
    }

    #[test]
    fn loader_allows_empty_third_field() {
        let rec = crate::loader::parse_record("210\nTrusty\n").unwrap();
        assert_eq!(rec.operator_name.as_str(), "");
    }

    #[test]
    fn loader_rejects_single_separator() {
        // A half-written record must not silently provision empty fields.
        assert_eq!(
            crate::loader::parse_record("210\nTrusty"),
            Err(Error::MalformedRecord)
        );
    }

    #[test]
    fn loader_rejects_missing_separators() {
        assert_eq!(crate::loader::parse_record("210"), Err(Error::MalformedRecord));
        assert_eq!(crate::loader::parse_record(""), Err(Error::MalformedRecord));
    }

    #[test]
    fn loader_rejects_bad_circumference() {
        assert_eq!(
            crate::loader::parse_record("tall\nTrusty\nAda"),
            Err(Error::MalformedRecord)
        );
        assert_eq!(
            crate::loader::parse_record("300\nTrusty\nAda"),
            Err(Error::MalformedRecord)
        );
    }

    #[test]
    fn loader_rejects_overlong_name() {
        let text = format!("210\n{}\nAda", "n".repeat(NAME_MAX_LEN + 1));
        assert_eq!(crate::loader::parse_record(&text), Err(Error::FieldOverflow));
    }

    #[test]
    fn loader_propagates_missing_source() {
        let mut source = StaticSource::missing();
        assert_eq!(
            crate::loader::load_record(&mut source),
            Err(Error::ConfigNotFound)
        );
    }

    // ════════════════════════════════════════════════════════════════════════
    // Guarded countdown
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn countdown_fires_exactly_on_final_tick() {
        let mut cd = GuardedCountdown::new(10);
        cd.start(100);
        for s in 1u32..=9 {
            assert_eq!(
                cd.tick(100 + s),
                Tick::Running { remaining: 10 - s as u8 }
            );
        }
        assert_eq!(cd.tick(110), Tick::Fired);
        // Fired is reported exactly once.
        assert_eq!(cd.tick(111), Tick::Idle);
        assert_eq!(cd.state(), CountdownState::Fired);
    }

    #[test]
    fn countdown_decrements_once_per_second_at_most() {
        let mut cd = GuardedCountdown::new(10);
        cd.start(50);
        for _ in 0..100 {
            assert_eq!(cd.tick(50), Tick::Running { remaining: 10 });
        }
        assert_eq!(cd.tick(51), Tick::Running { remaining: 9 });
        for _ in 0..100 {
            assert_eq!(cd.tick(51), Tick::Running { remaining: 9 });
        }
    }

    #[test]
    fn countdown_cancel_restores_full_total() {
        let mut cd = GuardedCountdown::new(10);
        cd.start(0);
        cd.tick(1);
        cd.tick(2);
        assert_eq!(cd.remaining(), 8);

        cd.cancel();
        assert_eq!(cd.remaining(), 10);
        assert_eq!(cd.state(), CountdownState::Idle);
        assert_eq!(cd.tick(3), Tick::Idle);
    }

    #[test]
    fn countdown_restarts_after_cancel() {
        let mut cd = GuardedCountdown::new(2);
        cd.start(0);
        cd.tick(1);
        cd.cancel();

        cd.start(10);
        assert_eq!(cd.tick(11), Tick::Running { remaining: 1 });
        assert_eq!(cd.tick(12), Tick::Fired);
    }

    #[test]
    fn remaining_label_uses_singular_and_plural() {
        assert_eq!(format_remaining(1).as_str(), "1 second");
        assert_eq!(format_remaining(2).as_str(), "2 seconds");
        assert_eq!(format_remaining(30).as_str(), "30 seconds");
    }

    // ════════════════════════════════════════════════════════════════════════
    // Press-edge detection
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn press_edge_after_stable_release() {
        let mut btn = PressDetector::new();
        assert!(!btn.sample(0, false));
        assert!(!btn.sample(60, false)); // settles, arms
        assert!(btn.sample(70, true));
    }

    #[test]
    fn held_press_fires_once() {
        let mut btn = PressDetector::new();
        btn.sample(0, false);
        btn.sample(60, false);
        assert!(btn.sample(70, true));
        for t in 80..200 {
            assert!(!btn.sample(t, true));
        }
    }

    #[test]
    fn contact_bounce_does_not_retrigger() {
        let mut btn = PressDetector::new();
        btn.sample(0, false);
        btn.sample(60, false);
        assert!(btn.sample(70, true));

        // Bounce on release: brief lows shorter than the debounce window.
        assert!(!btn.sample(80, false));
        assert!(!btn.sample(90, true));
        assert!(!btn.sample(100, false));

        // Only after a stable release does the next press count.
        assert!(!btn.sample(160, false));
        assert!(btn.sample(170, true));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Page navigation & rendering
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn selector_wraps_modulo_page_count() {
        let mut selector = PageSelector::new();
        for k in 1u32..=23 {
            let idx = selector.advance();
            assert_eq!(u32::from(idx), k % u32::from(PAGE_COUNT));
        }
    }

    #[test]
    fn page_index_mapping_is_total_over_range() {
        for i in 0..PAGE_COUNT {
            let page = Page::from_index(i).unwrap();
            assert_eq!(page.index(), i);
        }
        assert_eq!(Page::from_index(PAGE_COUNT), None);
    }

    #[test]
    fn out_of_range_page_renders_diagnostic() {
        let mut frame = FrameLog::new();
        pages::render(
            9,
            &ConfigRecord::default(),
            &RideStats::default(),
            &ClockTime::default(),
            &mut frame,
        );
        assert!(frame.contains("PAGE ERROR"));
        assert!(frame.contains("page 9"));
        assert_eq!(frame.commits, 1);
    }

    #[test]
    fn ride_page_formats_speed_and_distance() {
        let mut frame = FrameLog::new();
        let stats = RideStats {
            speed_kmh_x10: 123,
            distance_m: 4560,
        };
        pages::render(
            0,
            &ConfigRecord::default(),
            &stats,
            &ClockTime::default(),
            &mut frame,
        );
        assert!(frame.contains("12.3"));
        assert!(frame.contains("trip 4.56 km"));
    }

    #[test]
    fn clock_page_zero_pads() {
        let mut frame = FrameLog::new();
        let time = ClockTime {
            year: 2026,
            month: 8,
            day: 7,
            hours: 9,
            minutes: 5,
            seconds: 3,
        };
        pages::render(
            1,
            &ConfigRecord::default(),
            &RideStats::default(),
            &time,
            &mut frame,
        );
        assert!(frame.contains("09:05:03"));
        assert!(frame.contains("2026-08-07"));
    }

    #[test]
    fn identity_page_shows_unprovisioned_state() {
        let mut frame = FrameLog::new();
        pages::render(
            2,
            &ConfigRecord::default(),
            &RideStats::default(),
            &ClockTime::default(),
            &mut frame,
        );
        assert!(frame.contains("not provisioned"));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Bootstrap
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn bootstrap_provisions_from_card_and_commits() {
        let mut store = fresh_store();
        let mut source = StaticSource::with("30\nTrusty\nAda");

        let mut rec = match bootstrap::start(&mut store, &mut source).unwrap() {
            BootOutcome::NeedsConfirm(rec) => rec,
            other => panic!("expected NeedsConfirm, got {:?}", other),
        };
        // Nothing is committed before the operator confirms.
        assert!(!rec.has_data);
        assert!(!store.read_record().unwrap().has_data);

        bootstrap::confirm(&mut store, &mut rec).unwrap();
        let persisted = store.read_record().unwrap();
        assert!(persisted.has_data);
        assert_eq!(persisted.wheel_circumference_cm, 30);
        assert_eq!(persisted.device_name.as_str(), "Trusty");
        assert_eq!(persisted.operator_name.as_str(), "Ada");
    }

    #[test]
    fn bootstrap_fast_path_never_consults_loader() {
        let mut store = fresh_store();
        store.write_record(&record(210, "Trusty", "Ada")).unwrap();
        let mut source = StaticSource::with("99\nOther\nRider");

        match bootstrap::start(&mut store, &mut source).unwrap() {
            BootOutcome::Ready(rec) => assert_eq!(rec.wheel_circumference_cm, 210),
            other => panic!("expected Ready, got {:?}", other),
        }
        assert_eq!(source.reads, 0);
    }

    #[test]
    fn bootstrap_halts_on_missing_source() {
        let mut store = fresh_store();
        let mut source = StaticSource::missing();
        assert_eq!(
            bootstrap::start(&mut store, &mut source),
            Err(Error::ConfigNotFound)
        );
    }

    #[test]
    fn bootstrap_halts_on_malformed_record() {
        let mut store = fresh_store();
        let mut source = StaticSource::with("30\nTrusty");
        assert_eq!(
            bootstrap::start(&mut store, &mut source),
            Err(Error::MalformedRecord)
        );
    }

    #[test]
    fn failed_commit_does_not_mark_record() {
        let mut medium = RamMedium::new();
        medium.fail_writes = true;
        let mut store = ConfigStore::new(medium).unwrap();

        let mut rec = record(30, "Trusty", "Ada");
        rec.has_data = false;
        assert_eq!(
            bootstrap::confirm(&mut store, &mut rec),
            Err(Error::StoreWrite)
        );
        assert!(!rec.has_data);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Indicator
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn indicator_reflects_logging_availability() {
        assert_eq!(Indicator::from_boot(true), Indicator::Nominal);
        assert_eq!(Indicator::from_boot(false), Indicator::Degraded);
    }

    #[test]
    fn indicator_drives_one_channel_at_a_time() {
        for (indicator, channels) in [
            (Indicator::Initializing, (false, false, true)),
            (Indicator::Degraded, (true, false, false)),
            (Indicator::Nominal, (false, true, false)),
        ] {
            assert_eq!(indicator.channels(), channels);
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Controller - guarded flows
    // ════════════════════════════════════════════════════════════════════════

    struct Rig {
        controller: Controller,
        store: ConfigStore<RamMedium>,
        frame: FrameLog,
        now_ms: u64,
        now_sec: u32,
    }

    impl Rig {
        fn provisioned() -> Self {
            let mut store = fresh_store();
            let rec = record(210, "Trusty", "Ada");
            store.write_record(&rec).unwrap();
            Rig {
                controller: Controller::new(rec, Indicator::Nominal),
                store,
                frame: FrameLog::new(),
                now_ms: 0,
                now_sec: 1000,
            }
        }

        fn time(&self) -> ClockTime {
            ClockTime {
                hours: (self.now_sec / 3600) as u8,
                minutes: ((self.now_sec % 3600) / 60) as u8,
                seconds: (self.now_sec % 60) as u8,
                ..Default::default()
            }
        }

        fn poll(&mut self, pressed: bool) {
            let time = self.time();
            self.controller.poll(
                self.now_ms,
                &time,
                pressed,
                &mut self.store,
                &RideStats::default(),
                &mut self.frame,
            );
        }

        /// One physical press: settle released, press, release.
        fn press(&mut self) {
            self.now_ms += 60;
            self.poll(false);
            self.now_ms += 1;
            self.poll(true);
            self.now_ms += 1;
            self.poll(false);
        }

        /// Let `n` wall-clock seconds elapse with the button released.
        fn elapse_seconds(&mut self, n: u32) {
            for _ in 0..n {
                self.now_sec += 1;
                self.now_ms += 1000;
                self.poll(false);
            }
        }
    }

    #[test]
    fn presses_cycle_through_all_pages() {
        let mut rig = Rig::provisioned();
        let mut seen = vec![rig.controller.page_index()];
        for _ in 0..PAGE_COUNT {
            rig.press();
            seen.push(rig.controller.page_index());
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 0]);
    }

    #[test]
    fn eject_counts_down_and_halts() {
        let mut rig = Rig::provisioned();
        for _ in 0..3 {
            rig.press();
        }
        assert_eq!(rig.controller.page_index(), Page::Eject.index());

        rig.elapse_seconds(9);
        assert_eq!(*rig.controller.state(), RunState::Running);
        assert!(rig.frame.contains("1 second"));

        rig.elapse_seconds(1);
        assert_eq!(*rig.controller.state(), RunState::Halted);
        assert!(rig.frame.contains("card ejected"));

        // Halted is terminal: input is ignored.
        rig.press();
        assert_eq!(*rig.controller.state(), RunState::Halted);
        assert_eq!(rig.controller.page_index(), Page::Eject.index());
    }

    #[test]
    fn press_cancels_countdown_and_advances_page() {
        let mut rig = Rig::provisioned();
        for _ in 0..3 {
            rig.press();
        }
        rig.elapse_seconds(7);

        // Cancel is an ordinary navigation event.
        rig.press();
        assert_eq!(rig.controller.page_index(), Page::FactoryReset.index());
        assert_eq!(*rig.controller.state(), RunState::Running);

        // Re-entering eject later restarts from the full total: it
        // still takes all ten seconds to fire.
        rig.press(); // wrap to Ride
        for _ in 0..3 {
            rig.press();
        }
        assert_eq!(rig.controller.page_index(), Page::Eject.index());
        rig.elapse_seconds(9);
        assert_eq!(*rig.controller.state(), RunState::Running);
        rig.elapse_seconds(1);
        assert_eq!(*rig.controller.state(), RunState::Halted);
    }

    #[test]
    fn factory_reset_wipes_store_and_resumes() {
        let mut rig = Rig::provisioned();
        for _ in 0..4 {
            rig.press();
        }
        assert_eq!(rig.controller.page_index(), Page::FactoryReset.index());

        rig.elapse_seconds(30);
        assert_eq!(*rig.controller.state(), RunState::Running);
        assert!(!rig.store.read_record().unwrap().has_data);
        assert!(!rig.controller.record().has_data);
        assert_eq!(rig.controller.page_index(), 0);
    }

    #[test]
    fn failed_wipe_is_fatal() {
        let mut rig = Rig::provisioned();
        for _ in 0..4 {
            rig.press();
        }
        rig.store.medium_mut().fail_writes = true;
        rig.elapse_seconds(30);
        assert_eq!(*rig.controller.state(), RunState::Fatal(Error::StoreWrite));
        assert!(rig.frame.contains("BOOT FAILED"));
    }

    #[test]
    fn fatal_boot_renders_persistent_diagnostic() {
        let mut store = fresh_store();
        let mut frame = FrameLog::new();
        let mut controller = Controller::fatal(Error::ConfigNotFound);

        controller.poll(
            0,
            &ClockTime::default(),
            false,
            &mut store,
            &RideStats::default(),
            &mut frame,
        );
        assert!(frame.contains("BOOT FAILED"));
        assert!(frame.contains("no info.txt"));

        // Input does nothing in the fatal state.
        controller.poll(
            60,
            &ClockTime::default(),
            true,
            &mut store,
            &RideStats::default(),
            &mut frame,
        );
        assert_eq!(controller.page_index(), 0);
        assert_eq!(*controller.state(), RunState::Fatal(Error::ConfigNotFound));
    }
}
