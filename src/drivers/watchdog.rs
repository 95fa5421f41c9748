//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stalls, so a hung loop cannot
//! leave a heater latched at its last duty. The loop calls
//! [`Watchdog::feed`] every iteration; the timeout must exceed the longest
//! bounded wait in a tick (parameter commit included).

#[cfg(feature = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

pub struct Watchdog {
    #[cfg(feature = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    #[cfg(feature = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        // SAFETY: called once from the main task before the control loop.
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                log::warn!("TWDT reconfigure returned {} (may already be configured)", ret);
            }

            let ret = esp_task_wdt_add(core::ptr::null_mut());
            let subscribed = ret == ESP_OK;
            if subscribed {
                info!("Watchdog: subscribed ({} ms timeout, panic on trigger)", timeout_ms);
            } else {
                log::warn!("Watchdog: failed to subscribe ({})", ret);
            }
            Self { subscribed }
        }
    }

    #[cfg(not(feature = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        info!("Watchdog(sim): no-op ({} ms)", timeout_ms);
        Self {}
    }

    /// Feed the watchdog.
    pub fn feed(&self) {
        #[cfg(feature = "espidf")]
        if self.subscribed {
            // SAFETY: the current task subscribed in new().
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
