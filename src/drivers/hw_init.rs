//! One-shot hardware peripheral initialization.
//!
//! Configures the thermistor ADC channels, the encoder and button inputs,
//! and the heater LEDC timer/channels using raw ESP-IDF sys calls. Called
//! once from `main()` before the control loop starts.
//!
//! Host builds get no-op stand-ins so the adapters above compile and test
//! without the IDF.

#[cfg(feature = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(feature = "espidf")]
use log::info;

#[cfg(feature = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

/// LEDC channel per heater zone.
pub const LEDC_CH_HEATER_1: u32 = 0;
pub const LEDC_CH_HEATER_2: u32 = 1;

/// Highest duty value at the configured LEDC resolution.
pub const HEATER_MAX_DUTY: u16 = (1 << crate::pins::HEATER_PWM_RESOLUTION_BITS) - 1;

#[cfg(feature = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(feature = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(feature = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path. `init_adc()` completes before the loop starts.
#[cfg(feature = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(feature = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for channel in [pins::THERMISTOR_1_ADC_CHANNEL, pins::THERMISTOR_2_ADC_CHANNEL] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!(
        "hw_init: ADC1 configured (CH{}=zone1, CH{}=zone2)",
        pins::THERMISTOR_1_ADC_CHANNEL,
        pins::THERMISTOR_2_ADC_CHANNEL
    );
    Ok(())
}

/// One raw conversion. A failed read returns 0, which the thermistor
/// fault check reports as an open sensor.
#[cfg(feature = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract; single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(feature = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(feature = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    let inputs = [
        (pins::ENCODER_A_GPIO, gpio_int_type_t_GPIO_INTR_ANYEDGE),
        (pins::ENCODER_B_GPIO, gpio_int_type_t_GPIO_INTR_DISABLE),
        (pins::BUTTON_GPIO, gpio_int_type_t_GPIO_INTR_NEGEDGE),
    ];

    for (pin, intr_type) in inputs {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: encoder and button inputs configured");
    Ok(())
}

#[cfg(feature = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on an already-configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

/// Inputs idle high (pulled up) on the host.
#[cfg(not(feature = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(feature = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
        freq_hz: pins::HEATER_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: Called from single main-task context via init_peripherals().
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    // Both heaters share timer 0 and start at zero duty.
    let channels = [
        (LEDC_CH_HEATER_1, pins::HEATER_1_PWM_GPIO),
        (LEDC_CH_HEATER_2, pins::HEATER_2_PWM_GPIO),
    ];
    for (channel, gpio_num) in channels {
        let ret = unsafe {
            ledc_channel_config(&ledc_channel_config_t {
                speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel,
                timer_sel: ledc_timer_t_LEDC_TIMER_0,
                gpio_num,
                duty: 0,
                hpoint: 0,
                ..Default::default()
            })
        };
        if ret != ESP_OK {
            return Err(HwInitError::LedcInitFailed(ret));
        }
    }

    info!(
        "hw_init: LEDC configured (heater1=CH{}, heater2=CH{}, {} Hz)",
        LEDC_CH_HEATER_1,
        LEDC_CH_HEATER_2,
        pins::HEATER_PWM_FREQ_HZ
    );
    Ok(())
}

#[cfg(feature = "espidf")]
pub fn ledc_set(channel: u32, duty: u16) {
    // SAFETY: LEDC channels were configured in init_ledc(); only the main
    // loop writes duty registers.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(feature = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u16) {}

// ── GPIO ISR Service ──────────────────────────────────────────

/// Direction of one encoder detent, given the levels seen on a channel A
/// edge. Equal levels mean B leads A (counter-clockwise).
pub fn encoder_step(a_level: bool, b_level: bool) -> i32 {
    if a_level == b_level { -1 } else { 1 }
}

#[cfg(feature = "espidf")]
unsafe extern "C" fn encoder_gpio_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: gpio_get_level is a register read; safe in ISR context.
    let a = unsafe { gpio_get_level(pins::ENCODER_A_GPIO) } != 0;
    let b = unsafe { gpio_get_level(pins::ENCODER_B_GPIO) } != 0;
    crate::input::SELECTION_DELTA.add(encoder_step(a, b));
}

#[cfg(feature = "espidf")]
unsafe extern "C" fn button_gpio_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is an RTC counter read; safe in ISR context.
    let now_ms = (unsafe { esp_timer_get_time() } / 1_000) as u32;
    crate::drivers::button::button_isr_handler(now_ms);
}

/// Install the per-pin GPIO ISR service and register the encoder and
/// button handlers. Call after `init_peripherals()`.
#[cfg(feature = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service was already installed.
    // The handlers only touch the critical-section cell and an atomic.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        gpio_isr_handler_add(pins::ENCODER_A_GPIO, Some(encoder_gpio_isr), core::ptr::null_mut());
        gpio_intr_enable(pins::ENCODER_A_GPIO);

        gpio_isr_handler_add(pins::BUTTON_GPIO, Some(button_gpio_isr), core::ptr::null_mut());
        gpio_intr_enable(pins::BUTTON_GPIO);
    }
    info!("hw_init: ISR service installed (encoder, button)");
    Ok(())
}

#[cfg(not(feature = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
