//! Durable byte image of the [`ParameterSet`].
//!
//! ```text
//!  addr  0      magic 0xA5
//!  addr  1..=7  T1 t1 T2 t2 T3 t3 hold          (one byte each)
//!  addr  8..=19 Kp1 Ki1 Kd1 Kp2 Ki2 Kd2         (u16 big-endian, ×100)
//!  addr 20      constant setpoint
//!  addr 21      checksum (bytes 0..=21 sum to zero)
//! ```
//!
//! Profile and gain offsets match the legacy EEPROM layout; the magic and
//! checksum occupy bytes it left unused.

use crate::app::ports::ConfigError;
use crate::config::{ParameterSet, PidGains, ReflowProfile};

pub const MAGIC: u8 = 0xA5;

pub const ADDR_MAGIC: usize = 0;
pub const ADDR_PROFILE: usize = 1;
pub const PROFILE_LEN: usize = 7;
pub const ADDR_GAINS: usize = 8;
pub const GAINS_LEN: usize = 12;
pub const ADDR_CONSTANT: usize = 20;
pub const ADDR_CHECKSUM: usize = 21;

/// Total bytes in the image.
pub const IMAGE_LEN: usize = 22;

/// Fixed-point scale for persisted gains.
pub const GAIN_SCALE: f32 = 100.0;

pub type Image = [u8; IMAGE_LEN];

/// Gain to its ×100 integer form, rounded to nearest.
pub fn scale_gain(value: f32) -> u16 {
    (value * GAIN_SCALE).round().clamp(0.0, f32::from(u16::MAX)) as u16
}

pub fn unscale_gain(raw: u16) -> f32 {
    f32::from(raw) / GAIN_SCALE
}

/// Two's-complement of the byte sum.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    sum.wrapping_neg()
}

pub fn encode(params: &ParameterSet) -> Image {
    let mut img = [0u8; IMAGE_LEN];
    img[ADDR_MAGIC] = MAGIC;

    let p = &params.profile;
    img[ADDR_PROFILE..ADDR_PROFILE + PROFILE_LEN].copy_from_slice(&[
        p.preheat_c,
        p.preheat_secs,
        p.soak_c,
        p.soak_secs,
        p.peak_c,
        p.peak_secs,
        p.hold_secs,
    ]);

    let mut addr = ADDR_GAINS;
    for g in &params.gains {
        for v in [g.kp, g.ki, g.kd] {
            img[addr..addr + 2].copy_from_slice(&scale_gain(v).to_be_bytes());
            addr += 2;
        }
    }

    img[ADDR_CONSTANT] = params.constant_setpoint_c;
    img[ADDR_CHECKSUM] = checksum(&img[..ADDR_CHECKSUM]);
    img
}

/// Decode an image, checking magic and checksum. Range validation is the
/// caller's job.
pub fn decode(img: &Image) -> Result<ParameterSet, ConfigError> {
    if img[ADDR_MAGIC] != MAGIC {
        return Err(ConfigError::NotFound);
    }
    if checksum(&img[..ADDR_CHECKSUM]) != img[ADDR_CHECKSUM] {
        return Err(ConfigError::Corrupted);
    }

    let b = &img[ADDR_PROFILE..ADDR_PROFILE + PROFILE_LEN];
    let profile = ReflowProfile {
        preheat_c: b[0],
        preheat_secs: b[1],
        soak_c: b[2],
        soak_secs: b[3],
        peak_c: b[4],
        peak_secs: b[5],
        hold_secs: b[6],
    };

    let word = |i: usize| {
        let at = ADDR_GAINS + i * 2;
        unscale_gain(u16::from_be_bytes([img[at], img[at + 1]]))
    };
    let gains = [
        PidGains {
            kp: word(0),
            ki: word(1),
            kd: word(2),
        },
        PidGains {
            kp: word(3),
            ki: word(4),
            kd: word(5),
        },
    ];

    Ok(ParameterSet {
        profile,
        gains,
        constant_setpoint_c: img[ADDR_CONSTANT],
    })
}
