//! Heater element driver (logic-level MOSFET on an LEDC channel).
//!
//! Exposes each zone's gate as an [`embedded_hal::pwm::SetDutyCycle`]
//! channel so the hardware adapter stays generic over the PWM source.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator. The process supervisor decides when a
//! heater may be on; the driver only latches the last duty written.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty register via hw_init helpers.
//! On host/test: tracks the duty in-memory only.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use crate::drivers::hw_init;

pub struct HeaterDriver {
    channel: u32,
    duty: u16,
}

impl HeaterDriver {
    /// Driver for one configured LEDC channel, starting off.
    pub fn new(channel: u32) -> Self {
        hw_init::ledc_set(channel, 0);
        Self { channel, duty: 0 }
    }

    /// Last duty written (raw LEDC counts).
    pub fn duty(&self) -> u16 {
        self.duty
    }

    pub fn is_on(&self) -> bool {
        self.duty > 0
    }
}

impl ErrorType for HeaterDriver {
    type Error = Infallible;
}

impl SetDutyCycle for HeaterDriver {
    fn max_duty_cycle(&self) -> u16 {
        hw_init::HEATER_MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = duty.min(hw_init::HEATER_MAX_DUTY);
        hw_init::ledc_set(self.channel, duty);
        self.duty = duty;
        Ok(())
    }
}
