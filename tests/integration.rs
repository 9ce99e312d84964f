//! Integration tests for the QUE Device core, driven the way the firmware
//! drives it: characteristic writes land in `PendingWrites`, the connection
//! manager calls `tick` and reacts to the report.

use que_device::scheduler::{Channel, ChannelState};
use que_device::{
    Clock, Controller, LedActuator, LedCommand, PendingWrites, Setting, SettingValue, Timestamp,
};

struct SimClock {
    now: u32,
    holds: Vec<u32>,
}

impl SimClock {
    fn at(ms: u32) -> Self {
        Self {
            now: ms,
            holds: Vec::new(),
        }
    }
}

impl Clock for SimClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now)
    }

    async fn hold(&mut self, ms: u32) {
        self.holds.push(ms);
        self.now = self.now.wrapping_add(ms);
    }
}

#[derive(Default)]
struct Led {
    log: Vec<LedCommand>,
}

impl LedActuator for Led {
    fn apply(&mut self, command: LedCommand) {
        self.log.push(command);
    }
}

#[test]
fn enabling_channel_one_fires_red_pulse() {
    let mut clock = SimClock::at(0);
    let mut led = Led::default();
    let mut pending = PendingWrites::new();
    let mut controller = Controller::new(clock.now());

    // Defaults: both channels disabled.
    let report = embassy_futures::block_on(controller.tick(&mut pending, &mut led, &mut clock));
    assert!(!report.fired.any());
    assert!(led.log.is_empty());

    // Central enables channel 1 with a 100 ms interval.
    pending.record(Setting::Periodic1Enabled, SettingValue::Flag(true));
    pending.record(Setting::Interval1, SettingValue::Duration(100));

    clock.now = 150;
    let report = embassy_futures::block_on(controller.tick(&mut pending, &mut led, &mut clock));
    assert!(report.fired.channel1);
    assert!(!report.fired.channel2);
    assert_eq!(led.log, [LedCommand::Red, LedCommand::Off]);
    assert_eq!(clock.holds, [10_000]);

    let channel = controller.scheduler().channel(Channel::One);
    assert_eq!(channel.last_fired_at, Timestamp::from_millis(10_150));
}

#[test]
fn silent_central_times_out_and_led_is_forced_off() {
    let mut clock = SimClock::at(1_000);
    let mut led = Led::default();
    let mut pending = PendingWrites::new();
    let mut controller = Controller::new(Timestamp::ZERO);
    controller.on_connect(clock.now());

    // Central turns the LED blue, then goes quiet.
    pending.record_switch(LedCommand::Blue.code());
    let report = embassy_futures::block_on(controller.tick(&mut pending, &mut led, &mut clock));
    assert_eq!(report.sync.switch, Some(LedCommand::Blue));
    assert!(!report.timed_out);

    clock.now += 60_000;
    let report = embassy_futures::block_on(controller.tick(&mut pending, &mut led, &mut clock));
    assert!(!report.timed_out);

    clock.now += 1;
    let report = embassy_futures::block_on(controller.tick(&mut pending, &mut led, &mut clock));
    assert!(report.timed_out);

    // Connection manager drops the link and hands cleanup to the core.
    controller.on_disconnect(&mut led);
    assert_eq!(led.log, [LedCommand::Blue, LedCommand::Off]);
}

#[test]
fn settings_survive_reconnect() {
    let mut clock = SimClock::at(0);
    let mut led = Led::default();
    let mut pending = PendingWrites::new();
    let mut controller = Controller::new(clock.now());

    pending.record(Setting::Emission2Duration, SettingValue::Duration(2_500));
    embassy_futures::block_on(controller.tick(&mut pending, &mut led, &mut clock));

    // Link dropped and a new central connects much later.
    clock.now = 500_000;
    controller.on_connect(clock.now());
    let report = embassy_futures::block_on(controller.tick(&mut pending, &mut led, &mut clock));
    assert!(!report.timed_out);
    assert_eq!(
        controller.store().get(Setting::Emission2Duration),
        SettingValue::Duration(2_500)
    );
}

#[test]
fn activity_timeout_is_wrap_safe() {
    let mut clock = SimClock::at(u32::MAX - 30_000);
    let mut led = Led::default();
    let mut pending = PendingWrites::new();
    let mut controller = Controller::new(clock.now());

    // 40 s later the counter has wrapped; still inside the window.
    clock.now = clock.now.wrapping_add(40_000);
    let report = embassy_futures::block_on(controller.tick(&mut pending, &mut led, &mut clock));
    assert!(!report.timed_out);

    clock.now = clock.now.wrapping_add(20_001);
    let report = embassy_futures::block_on(controller.tick(&mut pending, &mut led, &mut clock));
    assert!(report.timed_out);
}

#[test]
fn link_lost_mid_pulse_finishes_pulse_before_cleanup() {
    let mut clock = SimClock::at(0);
    let mut led = Led::default();
    let mut pending = PendingWrites::new();
    let mut controller = Controller::new(clock.now());

    pending.record(Setting::Periodic1Enabled, SettingValue::Flag(true));
    pending.record(Setting::Interval1, SettingValue::Duration(100));
    pending.record(Setting::Emission1Duration, SettingValue::Duration(400));
    clock.now = 150;

    // The connection manager awaits the in-flight tick, then cleans up.
    let report = embassy_futures::block_on(controller.tick(&mut pending, &mut led, &mut clock));
    controller.on_disconnect(&mut led);

    assert!(report.fired.channel1);
    assert_eq!(led.log, [LedCommand::Red, LedCommand::Off, LedCommand::Off]);
    let channel = controller.scheduler().channel(Channel::One);
    assert_eq!(channel.state(), ChannelState::Idle);
    assert_eq!(channel.last_fired_at, Timestamp::from_millis(550));
}
