//! Characteristic → core hand-off.
//!
//! The GATT write callback records each write into [`PendingWrites`]; the
//! scheduler tick drains it through the [`SettingsSource`] trait. Every
//! slot is an edge-triggered flag: set by a write, cleared by the take, so
//! a write is applied exactly once. Two writes to the same characteristic
//! between ticks collapse into the latest value.

use core::cell::RefCell;

use crate::led::LedCommand;
use crate::settings::{Setting, SettingValue};

/// What the core pulls from the characteristic layer once per tick.
pub trait SettingsSource {
    /// A write for `setting` arrived since the last [`take_value`](Self::take_value).
    fn has_pending_write(&self, setting: Setting) -> bool;

    /// Consume the written value, `None` when nothing was written.
    fn take_value(&mut self, setting: Setting) -> Option<SettingValue>;

    /// Consume a pending write of the LED switch characteristic.
    fn take_switch(&mut self) -> Option<LedCommand>;
}

/// Latest unconsumed write per characteristic.
#[derive(Debug, Default)]
pub struct PendingWrites {
    settings: [Option<SettingValue>; Setting::COUNT],
    switch: Option<LedCommand>,
}

impl PendingWrites {
    pub const fn new() -> Self {
        Self {
            settings: [None; Setting::COUNT],
            switch: None,
        }
    }

    /// Called from the GATT write callback.
    pub fn record(&mut self, setting: Setting, value: SettingValue) {
        self.settings[setting.index()] = Some(value);
    }

    /// Called from the GATT write callback for the switch characteristic.
    pub fn record_switch(&mut self, code: u8) {
        self.switch = Some(LedCommand::from(code));
    }

    pub fn is_empty(&self) -> bool {
        self.switch.is_none() && self.settings.iter().all(Option::is_none)
    }
}

impl SettingsSource for PendingWrites {
    fn has_pending_write(&self, setting: Setting) -> bool {
        self.settings[setting.index()].is_some()
    }

    fn take_value(&mut self, setting: Setting) -> Option<SettingValue> {
        self.settings[setting.index()].take()
    }

    fn take_switch(&mut self) -> Option<LedCommand> {
        self.switch.take()
    }
}

/// Shared form used on target: the GATT callback and the tick loop run in
/// one task and each borrow only for the duration of a call.
impl SettingsSource for &RefCell<PendingWrites> {
    fn has_pending_write(&self, setting: Setting) -> bool {
        self.borrow().has_pending_write(setting)
    }

    fn take_value(&mut self, setting: Setting) -> Option<SettingValue> {
        self.borrow_mut().take_value(setting)
    }

    fn take_switch(&mut self) -> Option<LedCommand> {
        self.borrow_mut().take_switch()
    }
}
