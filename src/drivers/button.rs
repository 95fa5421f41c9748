//! ISR-debounced push-button driver with short and long press detection.
//!
//! ## Hardware
//!
//! The encoder's active-low push switch with pull-up. The GPIO fires on a
//! falling edge; the ISR records the timestamp into an atomic, and
//! [`ButtonDriver::tick`] (called from the control loop) runs the
//! debounce and gesture state machine against the current pin level.
//!
//! ## Gestures
//!
//! | Gesture     | Condition                     | Event        |
//! |-------------|-------------------------------|--------------|
//! | Short press | Released before `LONG_PRESS_MS` | `ShortPress` |
//! | Long press  | Held for `LONG_PRESS_MS`       | `LongPress`  |

use core::sync::atomic::{AtomicU32, Ordering};

const DEBOUNCE_MS: u32 = 30;
const LONG_PRESS_MS: u32 = 1500;

/// Falling-edge timestamp (milliseconds since boot, truncated to u32).
/// Written by the ISR, read by the control loop.
pub static BUTTON_ISR_TIMESTAMP: AtomicU32 = AtomicU32::new(0);

/// Classified button gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u32 },
    Pressed { since_ms: u32 },
    /// Long press already reported; waiting for release.
    Held,
}

pub struct ButtonDriver {
    stamp: &'static AtomicU32,
    state: GestureState,
    last_isr_ms: u32,
}

impl ButtonDriver {
    /// Driver fed by the given ISR timestamp cell.
    pub fn new(stamp: &'static AtomicU32) -> Self {
        Self {
            stamp,
            state: GestureState::Idle,
            last_isr_ms: stamp.load(Ordering::Acquire),
        }
    }

    /// Advance the gesture machine. `pressed` is the debounced-at-call pin
    /// level (true while the switch is closed).
    pub fn tick(&mut self, now_ms: u32, pressed: bool) -> Option<ButtonEvent> {
        let isr_ms = self.stamp.load(Ordering::Acquire);
        let new_edge = isr_ms != self.last_isr_ms;
        self.last_isr_ms = isr_ms;

        match self.state {
            GestureState::Idle => {
                if new_edge {
                    self.state = GestureState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            GestureState::DebounceWait { since_ms } => {
                if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    // Contact bounce that settled open is noise.
                    self.state = if pressed {
                        GestureState::Pressed { since_ms }
                    } else {
                        GestureState::Idle
                    };
                }
                None
            }

            GestureState::Pressed { since_ms } => {
                if now_ms.wrapping_sub(since_ms) >= LONG_PRESS_MS {
                    self.state = GestureState::Held;
                    return Some(ButtonEvent::LongPress);
                }
                if !pressed {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }
                None
            }

            GestureState::Held => {
                if !pressed {
                    self.state = GestureState::Idle;
                }
                None
            }
        }
    }
}

/// ISR handler for the button falling edge.
/// Safe to call from interrupt context (lock-free atomic store).
pub fn button_isr_handler(now_ms: u32) {
    // Zero is indistinguishable from "no edge yet" on the first tick.
    BUTTON_ISR_TIMESTAMP.store(now_ms.max(1), Ordering::Release);
}
