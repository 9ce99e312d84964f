//! Device context: settings, activity tracking and emission scheduling.
//!
//! One `Controller` is created at boot and owned by the connection manager
//! task. It outlives individual connections, so settings written by one
//! central are still in force for the next.

use heapless::Vec;

use crate::activity::ActivityTracker;
use crate::clock::{Clock, Timestamp};
use crate::led::{LedActuator, LedCommand};
use crate::scheduler::{EmissionScheduler, Fired};
use crate::settings::{Setting, SettingChange, SettingsStore};
use crate::sync::SettingsSource;

/// Result of draining the characteristic writes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncOutcome {
    /// Switch command applied to the LED this tick.
    pub switch: Option<LedCommand>,
    /// Settings whose value changed, in sync order.
    pub changes: Vec<SettingChange, { Setting::COUNT }>,
    /// Any characteristic write was observed (changed or not).
    pub activity: bool,
}

/// What one tick did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    pub sync: SyncOutcome,
    /// The central has been idle past the timeout; it should be dropped.
    pub timed_out: bool,
    pub fired: Fired,
}

pub struct Controller {
    store: SettingsStore,
    activity: ActivityTracker,
    scheduler: EmissionScheduler,
}

impl Controller {
    /// Defaults everywhere; the activity window starts at `now`.
    pub fn new(now: Timestamp) -> Self {
        let store = SettingsStore::new();
        let scheduler = EmissionScheduler::new(store.settings());
        Self {
            store,
            activity: ActivityTracker::new(now),
            scheduler,
        }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn scheduler(&self) -> &EmissionScheduler {
        &self.scheduler
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    /// A central connected.
    pub fn on_connect(&mut self, now: Timestamp) {
        self.activity.reset(now);
    }

    /// The link went away: the LED is forced off whatever it was showing.
    ///
    /// Settings and emission timing are kept for the next central.
    pub fn on_disconnect<L: LedActuator>(&mut self, led: &mut L) {
        #[cfg(feature = "defmt")]
        defmt::info!("Central gone, LED off");
        led.apply(LedCommand::Off);
    }

    pub fn is_timed_out(&self, now: Timestamp) -> bool {
        self.activity.is_timed_out(now)
    }

    /// Apply every pending characteristic write exactly once.
    ///
    /// A switch write goes straight to the LED. Setting writes are stored
    /// and pushed into the scheduler. Any write counts as activity.
    pub fn apply_pending<S, L>(&mut self, source: &mut S, led: &mut L, now: Timestamp) -> SyncOutcome
    where
        S: SettingsSource,
        L: LedActuator,
    {
        let mut outcome = SyncOutcome::default();

        if let Some(command) = source.take_switch() {
            #[cfg(feature = "defmt")]
            defmt::info!("Switch command: {}", command);
            led.apply(command);
            outcome.switch = Some(command);
            outcome.activity = true;
        }

        for setting in Setting::ALL {
            if !source.has_pending_write(setting) {
                continue;
            }
            let Some(value) = source.take_value(setting) else {
                continue;
            };
            outcome.activity = true;
            if let Some(change) = self.store.set(setting, value) {
                // Capacity is one slot per setting.
                let _ = outcome.changes.push(change);
            }
        }

        if !outcome.changes.is_empty() {
            self.scheduler.configure(self.store.settings());
        }
        if outcome.activity {
            self.activity.reset(now);
        }
        outcome
    }

    /// Run the periodic emissions (may hold for whole pulses).
    pub async fn run_emissions<L, C>(&mut self, led: &mut L, clock: &mut C) -> Fired
    where
        L: LedActuator,
        C: Clock,
    {
        self.scheduler.run(led, clock).await
    }

    /// One pass of the cooperative loop: sync, timeout check, emissions.
    ///
    /// When the central has timed out the emissions are skipped; the caller
    /// is about to disconnect and force the LED off.
    pub async fn tick<S, L, C>(&mut self, source: &mut S, led: &mut L, clock: &mut C) -> TickReport
    where
        S: SettingsSource,
        L: LedActuator,
        C: Clock,
    {
        let now = clock.now();
        let sync = self.apply_pending(source, led, now);

        if self.is_timed_out(now) {
            return TickReport {
                sync,
                timed_out: true,
                fired: Fired::default(),
            };
        }

        let fired = self.run_emissions(led, clock).await;
        TickReport {
            sync,
            timed_out: false,
            fired,
        }
    }
}
