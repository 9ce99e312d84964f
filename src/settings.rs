//! Remotely configurable settings.
//!
//! Seven values, one GATT characteristic each. The store accepts any value
//! the characteristic delivers; the only processing is coercion into the
//! setting's semantic type.

use crate::config;

/// One configurable value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Setting {
    Emission1Duration,
    Emission2Duration,
    Interval1,
    Interval2,
    Periodic1Enabled,
    Periodic2Enabled,
    HeartrateThreshold,
}

impl Setting {
    pub const COUNT: usize = 7;

    /// Every setting, in the order the sync step visits them.
    pub const ALL: [Setting; Setting::COUNT] = [
        Setting::Emission1Duration,
        Setting::Emission2Duration,
        Setting::Interval1,
        Setting::Interval2,
        Setting::Periodic1Enabled,
        Setting::Periodic2Enabled,
        Setting::HeartrateThreshold,
    ];

    /// Position in [`Setting::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A setting value as delivered by a characteristic or held by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingValue {
    /// Milliseconds.
    Duration(u32),
    Flag(bool),
    Threshold(u8),
}

impl SettingValue {
    /// Raw integer view, used for coercion between variants.
    pub const fn as_u32(self) -> u32 {
        match self {
            SettingValue::Duration(ms) => ms,
            SettingValue::Flag(on) => on as u32,
            SettingValue::Threshold(v) => v as u32,
        }
    }

    /// Non-zero is true.
    pub const fn as_flag(self) -> bool {
        self.as_u32() != 0
    }

    /// Keeps the low byte.
    pub const fn as_threshold(self) -> u8 {
        self.as_u32() as u8
    }
}

/// "old -> new" record produced when a write changes a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettingChange {
    pub setting: Setting,
    pub old: SettingValue,
    pub new: SettingValue,
}

/// Snapshot of all settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub emission1_duration_ms: u32,
    pub emission2_duration_ms: u32,
    pub interval1_ms: u32,
    pub interval2_ms: u32,
    pub periodic1_enabled: bool,
    pub periodic2_enabled: bool,
    pub heartrate_threshold: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            emission1_duration_ms: config::DEFAULT_EMISSION1_DURATION_MS,
            emission2_duration_ms: config::DEFAULT_EMISSION2_DURATION_MS,
            interval1_ms: config::DEFAULT_INTERVAL1_MS,
            interval2_ms: config::DEFAULT_INTERVAL2_MS,
            periodic1_enabled: config::DEFAULT_PERIODIC1_ENABLED,
            periodic2_enabled: config::DEFAULT_PERIODIC2_ENABLED,
            heartrate_threshold: config::DEFAULT_HEARTRATE_THRESHOLD,
        }
    }
}

/// Owner of the live settings. Mutated only by the sync step.
#[derive(Debug, Default)]
pub struct SettingsStore {
    values: Settings,
}

impl SettingsStore {
    /// Store holding the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.values
    }

    pub fn get(&self, setting: Setting) -> SettingValue {
        let v = &self.values;
        match setting {
            Setting::Emission1Duration => SettingValue::Duration(v.emission1_duration_ms),
            Setting::Emission2Duration => SettingValue::Duration(v.emission2_duration_ms),
            Setting::Interval1 => SettingValue::Duration(v.interval1_ms),
            Setting::Interval2 => SettingValue::Duration(v.interval2_ms),
            Setting::Periodic1Enabled => SettingValue::Flag(v.periodic1_enabled),
            Setting::Periodic2Enabled => SettingValue::Flag(v.periodic2_enabled),
            Setting::HeartrateThreshold => SettingValue::Threshold(v.heartrate_threshold),
        }
    }

    /// Store `value` verbatim (after coercion). Never fails.
    ///
    /// Returns the change record when the stored value actually moved.
    pub fn set(&mut self, setting: Setting, value: SettingValue) -> Option<SettingChange> {
        let old = self.get(setting);
        let v = &mut self.values;
        match setting {
            Setting::Emission1Duration => v.emission1_duration_ms = value.as_u32(),
            Setting::Emission2Duration => v.emission2_duration_ms = value.as_u32(),
            Setting::Interval1 => v.interval1_ms = value.as_u32(),
            Setting::Interval2 => v.interval2_ms = value.as_u32(),
            Setting::Periodic1Enabled => v.periodic1_enabled = value.as_flag(),
            Setting::Periodic2Enabled => v.periodic2_enabled = value.as_flag(),
            Setting::HeartrateThreshold => v.heartrate_threshold = value.as_threshold(),
        }
        let new = self.get(setting);

        if old == new {
            return None;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Updated {}: {} -> {}", setting, old, new);

        Some(SettingChange { setting, old, new })
    }
}
