//! Periodic emission scheduler.
//!
//! Two independent channels, red and green. Each tick a channel that is
//! enabled and whose interval has elapsed since its last pulse fires:
//!
//! ```text
//!   Idle ──(enabled && now - last_fired >= interval)──▶ Pulsing
//!   Pulsing: LED on → hold(pulse_duration) → LED off → last_fired = now
//!   Pulsing ──────────────────────────────────────────▶ Idle
//! ```
//!
//! The hold suspends the whole tick. Channel 1 finishes its pulse before
//! channel 2 is looked at, and no settings or timeout are processed while a
//! pulse is lit. A pulse in flight always runs to completion; if the tick
//! future is dropped mid-hold anyway, the pulse is closed out on drop (LED
//! off, channel back to Idle, counted as fired at its start).

use crate::clock::{Clock, Timestamp};
use crate::led::{LedActuator, LedCommand};
use crate::settings::Settings;

/// Emission channel selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Emission 1, red.
    One,
    /// Emission 2, green.
    Two,
}

impl Channel {
    /// Evaluation order within a tick.
    pub const ALL: [Channel; 2] = [Channel::One, Channel::Two];

    pub const fn pulse_command(self) -> LedCommand {
        match self {
            Channel::One => LedCommand::Red,
            Channel::Two => LedCommand::Green,
        }
    }

    const fn index(self) -> usize {
        match self {
            Channel::One => 0,
            Channel::Two => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    Idle,
    /// LED lit since the given time.
    Pulsing(Timestamp),
}

/// One periodic timer.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmissionChannel {
    pub enabled: bool,
    pub interval_ms: u32,
    pub pulse_duration_ms: u32,
    pub last_fired_at: Timestamp,
    state: ChannelState,
}

impl EmissionChannel {
    pub const fn new(enabled: bool, interval_ms: u32, pulse_duration_ms: u32) -> Self {
        Self {
            enabled,
            interval_ms,
            pulse_duration_ms,
            last_fired_at: Timestamp::ZERO,
            state: ChannelState::Idle,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Idle → Pulsing condition.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.enabled && now.elapsed_since(self.last_fired_at) >= self.interval_ms
    }
}

/// Which channels fired during one scheduler pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fired {
    pub channel1: bool,
    pub channel2: bool,
}

impl Fired {
    pub fn any(&self) -> bool {
        self.channel1 || self.channel2
    }

    fn mark(&mut self, channel: Channel) {
        match channel {
            Channel::One => self.channel1 = true,
            Channel::Two => self.channel2 = true,
        }
    }
}

/// Owner of both emission channels.
#[derive(Clone, Debug)]
pub struct EmissionScheduler {
    channels: [EmissionChannel; 2],
}

impl EmissionScheduler {
    pub fn new(settings: &Settings) -> Self {
        let mut scheduler = Self {
            channels: [EmissionChannel::new(false, 0, 0); 2],
        };
        scheduler.configure(settings);
        scheduler
    }

    /// Copy enable/interval/duration from the settings. `last_fired_at`
    /// and the pulse state are left alone.
    pub fn configure(&mut self, settings: &Settings) {
        let one = &mut self.channels[Channel::One.index()];
        one.enabled = settings.periodic1_enabled;
        one.interval_ms = settings.interval1_ms;
        one.pulse_duration_ms = settings.emission1_duration_ms;

        let two = &mut self.channels[Channel::Two.index()];
        two.enabled = settings.periodic2_enabled;
        two.interval_ms = settings.interval2_ms;
        two.pulse_duration_ms = settings.emission2_duration_ms;
    }

    pub fn channel(&self, channel: Channel) -> &EmissionChannel {
        &self.channels[channel.index()]
    }

    /// Evaluate both channels in order, pulsing the ones that are due.
    pub async fn run<L, C>(&mut self, led: &mut L, clock: &mut C) -> Fired
    where
        L: LedActuator,
        C: Clock,
    {
        let mut fired = Fired::default();
        for channel in Channel::ALL {
            if self.run_channel(channel, led, clock).await {
                fired.mark(channel);
            }
        }
        fired
    }

    async fn run_channel<L, C>(&mut self, channel: Channel, led: &mut L, clock: &mut C) -> bool
    where
        L: LedActuator,
        C: Clock,
    {
        let now = clock.now();
        let ch = &mut self.channels[channel.index()];
        if !ch.is_due(now) {
            return false;
        }

        // Duration is latched here; later writes only affect the next pulse.
        let duration = ch.pulse_duration_ms;
        ch.state = ChannelState::Pulsing(now);

        #[cfg(feature = "defmt")]
        defmt::info!("Emission {}: pulse {} ms", channel, duration);

        led.apply(channel.pulse_command());
        let pulse = PulseGuard { channel: ch, led };
        clock.hold(duration).await;
        pulse.complete(clock.now());
        true
    }
}

/// Owns a lit pulse until it is completed or dropped.
struct PulseGuard<'a, L: LedActuator> {
    channel: &'a mut EmissionChannel,
    led: &'a mut L,
}

impl<L: LedActuator> PulseGuard<'_, L> {
    fn complete(mut self, now: Timestamp) {
        self.finish(now);
    }

    fn finish(&mut self, fired_at: Timestamp) {
        self.led.apply(LedCommand::Off);
        self.channel.last_fired_at = fired_at;
        self.channel.state = ChannelState::Idle;
    }
}

impl<L: LedActuator> Drop for PulseGuard<'_, L> {
    fn drop(&mut self) {
        if let ChannelState::Pulsing(started) = self.channel.state {
            #[cfg(feature = "defmt")]
            defmt::warn!("Pulse cut short, closing it out");
            self.finish(started);
        }
    }
}
