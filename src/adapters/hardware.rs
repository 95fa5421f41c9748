//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and both heater PWM channels, exposing them
//! through [`SensorPort`] and [`ActuatorPort`]. The adapter is generic over
//! the embedded-hal traits so the host tests drive it with mocks and the
//! firmware with LEDC channels and the oneshot ADC.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::config::Zone;
use crate::control::pid::MAX_DUTY_PERCENT;
use crate::drivers::hw_init;
use crate::pins;
use crate::sensors::{AnalogInput, SensorHub, SensorSnapshot};

// ── Thermistor ADC ────────────────────────────────────────────

/// Both thermistor dividers on ADC1.
#[derive(Debug, Default, Clone, Copy)]
pub struct Adc1Thermistors;

impl AnalogInput for Adc1Thermistors {
    fn read_counts(&mut self, zone: Zone) -> u16 {
        let channel = match zone {
            Zone::One => pins::THERMISTOR_1_ADC_CHANNEL,
            Zone::Two => pins::THERMISTOR_2_ADC_CHANNEL,
        };
        hw_init::adc1_read(channel)
    }
}

// ── Adapter ───────────────────────────────────────────────────

/// Map a duty percentage onto a PWM channel's native range.
pub fn percent_to_duty(percent: f32, max_duty: u16) -> u16 {
    let fraction = if percent.is_finite() {
        percent.clamp(0.0, MAX_DUTY_PERCENT) / MAX_DUTY_PERCENT
    } else {
        0.0
    };
    (fraction * f32::from(max_duty)).round() as u16
}

/// Concrete adapter that combines the sensors and heaters behind port traits.
pub struct HardwareAdapter<A, D, P>
where
    A: AnalogInput,
    D: DelayNs,
    P: SetDutyCycle,
{
    sensors: SensorHub<A, D>,
    heaters: [P; 2],
    duty_percent: [f32; 2],
}

impl<A, D, P> HardwareAdapter<A, D, P>
where
    A: AnalogInput,
    D: DelayNs,
    P: SetDutyCycle,
{
    /// `heaters` is indexed by [`Zone::index`].
    pub fn new(sensors: SensorHub<A, D>, heaters: [P; 2]) -> Self {
        let mut hw = Self {
            sensors,
            heaters,
            duty_percent: [0.0; 2],
        };
        hw.all_off();
        hw
    }

    /// Last percentage commanded for a zone.
    pub fn duty_percent(&self, zone: Zone) -> f32 {
        self.duty_percent[zone.index()]
    }

    pub fn heater(&self, zone: Zone) -> &P {
        &self.heaters[zone.index()]
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<A, D, P> SensorPort for HardwareAdapter<A, D, P>
where
    A: AnalogInput,
    D: DelayNs,
    P: SetDutyCycle,
{
    fn read_all(&mut self) -> SensorSnapshot {
        self.sensors.read_all()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<A, D, P> ActuatorPort for HardwareAdapter<A, D, P>
where
    A: AnalogInput,
    D: DelayNs,
    P: SetDutyCycle,
{
    fn set_heater_duty(&mut self, zone: Zone, percent: f32) {
        let heater = &mut self.heaters[zone.index()];
        let duty = percent_to_duty(percent, heater.max_duty_cycle());
        match heater.set_duty_cycle(duty) {
            Ok(()) => self.duty_percent[zone.index()] = percent.clamp(0.0, MAX_DUTY_PERCENT),
            Err(e) => {
                warn!("{}: heater PWM write failed ({:?}), forcing off", zone, e);
                if heater.set_duty_cycle_fully_off().is_err() {
                    warn!("{}: heater PWM unresponsive", zone);
                }
                self.duty_percent[zone.index()] = 0.0;
            }
        }
    }
}
