//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                | Connects to                    |
//! |------------|---------------------------|--------------------------------|
//! | `hardware` | SensorPort, ActuatorPort  | ADC1 thermistors, heater PWM   |
//! | `log_sink` | EventSink                 | Serial log output              |
//! | `eeprom`   | StoragePort               | NVS blob / in-memory image     |
//! | `panel`    | MenuPort                  | Encoder push-button, log       |
//! | `time`     | (clock)                   | ESP32 system timer             |

pub mod eeprom;
pub mod hardware;
pub mod log_sink;
pub mod panel;
pub mod time;
