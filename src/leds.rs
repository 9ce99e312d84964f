//! GPIO LED drivers.
//!
//! The RGB LED on the Nano 33 BLE is common-anode: a colour is lit by
//! driving its pin LOW. Exactly one colour is on at a time. The status
//! LED is a plain active-high LED showing whether a central is connected.

use defmt::info;
use embedded_hal::digital::OutputPin;
use que_device::{LedActuator, LedCommand};

/// Three active-low colour pins.
pub struct RgbLed<P: OutputPin> {
    red: P,
    green: P,
    blue: P,
}

impl<P: OutputPin> RgbLed<P> {
    /// Take the pins and switch everything off.
    pub fn new(red: P, green: P, blue: P) -> Self {
        let mut led = Self { red, green, blue };
        led.apply(LedCommand::Off);
        led
    }

    fn drive(&mut self, red: bool, green: bool, blue: bool) {
        // active-low: LOW = ON, HIGH = OFF
        let _ = if red { self.red.set_low() } else { self.red.set_high() };
        let _ = if green { self.green.set_low() } else { self.green.set_high() };
        let _ = if blue { self.blue.set_low() } else { self.blue.set_high() };
    }
}

impl<P: OutputPin> LedActuator for RgbLed<P> {
    fn apply(&mut self, command: LedCommand) {
        info!("LED command: {}", command);
        match command {
            LedCommand::Off => self.drive(false, false, false),
            LedCommand::Red => self.drive(true, false, false),
            LedCommand::Green => self.drive(false, true, false),
            LedCommand::Blue => self.drive(false, false, true),
        }
    }
}

/// Built-in LED, lit while a central is connected.
pub struct StatusLed<P: OutputPin> {
    pin: P,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin }
    }

    pub fn set_connected(&mut self, connected: bool) {
        let _ = if connected {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}
