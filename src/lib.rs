//! Host-testable core of the QUE Device firmware.
//!
//! Everything that decides *what* the device does lives here and has no
//! hardware dependency: the settings store, the characteristic write
//! hand-off, the connection inactivity policy and the periodic emission
//! scheduler, tied together by [`controller::Controller`].
//!
//! Usage: `cargo test --lib` (host), `cargo test` for the integration tests.
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and links this library with the `embedded` feature, which also turns
//! on `defmt` formatting and logging for the core types.

#![cfg_attr(not(test), no_std)]

// ═══════════════════════════════════════════════════════════════════════════
// Core Modules
// ═══════════════════════════════════════════════════════════════════════════

pub mod activity;
pub mod clock;
pub mod config;
pub mod controller;
pub mod led;
pub mod scheduler;
pub mod settings;
pub mod sync;

pub use clock::{Clock, Timestamp};
pub use controller::{Controller, SyncOutcome, TickReport};
pub use led::{LedActuator, LedCommand};
pub use settings::{Setting, SettingValue, SettingsStore};
pub use sync::{PendingWrites, SettingsSource};

// ═══════════════════════════════════════════════════════════════════════════
// Test Doubles
// ═══════════════════════════════════════════════════════════════════════════


// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::scheduler::Channel;
    use super::testing::{ManualClock, RecordingLed};
    use super::*;
    use embassy_futures::block_on;

    // ════════════════════════════════════════════════════════════════════════
    // LED Command Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn led_command_codes() {
        assert_eq!(LedCommand::Off.code(), 0);
        assert_eq!(LedCommand::Red.code(), 1);
        assert_eq!(LedCommand::Green.code(), 2);
        assert_eq!(LedCommand::Blue.code(), 3);
    }

    #[test]
    fn led_command_from_known_codes() {
        for command in [
            LedCommand::Off,
            LedCommand::Red,
            LedCommand::Green,
            LedCommand::Blue,
        ] {
            assert_eq!(LedCommand::from(command.code()), command);
        }
    }

    #[test]
    fn led_command_unknown_code_is_off() {
        assert_eq!(LedCommand::from(4), LedCommand::Off);
        assert_eq!(LedCommand::from(0xFF), LedCommand::Off);
    }

    #[test]
    fn channels_map_to_red_and_green() {
        assert_eq!(Channel::One.pulse_command(), LedCommand::Red);
        assert_eq!(Channel::Two.pulse_command(), LedCommand::Green);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Tick Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn idle_tick_with_defaults_does_nothing() {
        let mut controller = Controller::new(Timestamp::ZERO);
        let mut pending = PendingWrites::new();
        let mut led = RecordingLed::default();
        let mut clock = ManualClock::at(0);

        let report = block_on(controller.tick(&mut pending, &mut led, &mut clock));
        assert_eq!(report, TickReport::default());
        assert!(led.commands.is_empty());
    }

    #[test]
    fn tick_after_write_leaves_setting_alone() {
        let mut controller = Controller::new(Timestamp::ZERO);
        let mut pending = PendingWrites::new();
        let mut led = RecordingLed::default();
        let mut clock = ManualClock::at(0);

        for setting in Setting::ALL {
            pending.record(setting, SettingValue::Duration(7));
        }
        block_on(controller.tick(&mut pending, &mut led, &mut clock));
        let snapshot = *controller.store().settings();

        clock.set(10);
        let report = block_on(controller.tick(&mut pending, &mut led, &mut clock));
        assert!(!report.sync.activity);
        assert_eq!(*controller.store().settings(), snapshot);
    }

    #[test]
    fn channel_fires_exactly_once_per_interval() {
        let mut controller = Controller::new(Timestamp::ZERO);
        let mut pending = PendingWrites::new();
        let mut led = RecordingLed::default();
        let mut clock = ManualClock::at(0);

        pending.record(Setting::Periodic1Enabled, SettingValue::Flag(true));
        pending.record(Setting::Interval1, SettingValue::Duration(1_000));
        pending.record(Setting::Emission1Duration, SettingValue::Duration(50));
        block_on(controller.tick(&mut pending, &mut led, &mut clock));
        assert!(led.commands.is_empty());

        // Tick every 10 ms until just before the second firing is due.
        let mut pulses = 0;
        let mut t = 10;
        while t < 2_050 {
            clock.set(t);
            if block_on(controller.tick(&mut pending, &mut led, &mut clock))
                .fired
                .channel1
            {
                pulses += 1;
            }
            // Keep the link alive.
            controller.on_connect(clock.now());
            t = clock.now().as_millis() + 10;
        }
        assert_eq!(pulses, 1);
        assert_eq!(
            controller
                .scheduler()
                .channel(Channel::One)
                .last_fired_at
                .as_millis(),
            1_050
        );
    }

    #[test]
    fn zero_length_pulse_still_switches_off() {
        let mut controller = Controller::new(Timestamp::ZERO);
        let mut pending = PendingWrites::new();
        let mut led = RecordingLed::default();
        let mut clock = ManualClock::at(5);

        pending.record(Setting::Periodic2Enabled, SettingValue::Flag(true));
        pending.record(Setting::Interval2, SettingValue::Duration(0));
        pending.record(Setting::Emission2Duration, SettingValue::Duration(0));

        let report = block_on(controller.tick(&mut pending, &mut led, &mut clock));
        assert!(report.fired.channel2);
        assert_eq!(led.commands, [LedCommand::Green, LedCommand::Off]);
    }

    #[test]
    fn heartrate_threshold_does_not_affect_emissions() {
        let mut controller = Controller::new(Timestamp::ZERO);
        let mut pending = PendingWrites::new();
        let mut led = RecordingLed::default();
        let mut clock = ManualClock::at(0);

        pending.record(Setting::HeartrateThreshold, SettingValue::Threshold(200));
        let report = block_on(controller.tick(&mut pending, &mut led, &mut clock));
        assert_eq!(report.sync.changes.len(), 1);
        assert!(!report.fired.any());
    }
}
