//! Parameter store
//!
//! Single writer of the [`ParameterSet`]. Every field write goes through
//! range validation; `save`/`load` translate to and from the durable image
//! defined in [`layout`] via a [`StoragePort`].
//!
//! Load fails closed: a missing, corrupted, or out-of-range image leaves the
//! store on factory defaults.

pub mod layout;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigError, StorageError, StoragePort};
use crate::config::{ParameterSet, PidGains, Zone};

// ---------------------------------------------------------------------------
// Field addressing
// ---------------------------------------------------------------------------

/// One editable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamField {
    PreheatTemp,
    PreheatTime,
    SoakTemp,
    SoakTime,
    PeakTemp,
    PeakTime,
    HoldTime,
    Kp(Zone),
    Ki(Zone),
    Kd(Zone),
    ConstantSetpoint,
}

/// Value class of a field, which fixes its range and edit step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole degrees Celsius.
    Temperature,
    /// Whole seconds.
    Duration,
    /// Controller gain, two decimal places.
    Gain,
}

pub const MAX_TEMPERATURE_C: f32 = 250.0;
pub const MAX_DURATION_SECS: f32 = 255.0;
pub const MAX_GAIN: f32 = 300.0;

impl ParamField {
    /// Every field in menu order.
    pub const ALL: [ParamField; 14] = [
        Self::PreheatTemp,
        Self::PreheatTime,
        Self::SoakTemp,
        Self::SoakTime,
        Self::PeakTemp,
        Self::PeakTime,
        Self::HoldTime,
        Self::Kp(Zone::One),
        Self::Ki(Zone::One),
        Self::Kd(Zone::One),
        Self::Kp(Zone::Two),
        Self::Ki(Zone::Two),
        Self::Kd(Zone::Two),
        Self::ConstantSetpoint,
    ];

    pub fn kind(self) -> FieldKind {
        match self {
            Self::PreheatTemp | Self::SoakTemp | Self::PeakTemp | Self::ConstantSetpoint => {
                FieldKind::Temperature
            }
            Self::PreheatTime | Self::SoakTime | Self::PeakTime | Self::HoldTime => {
                FieldKind::Duration
            }
            Self::Kp(_) | Self::Ki(_) | Self::Kd(_) => FieldKind::Gain,
        }
    }

    /// Inclusive valid range.
    pub fn range(self) -> (f32, f32) {
        match self.kind() {
            FieldKind::Temperature => (0.0, MAX_TEMPERATURE_C),
            FieldKind::Duration => (0.0, MAX_DURATION_SECS),
            FieldKind::Gain => (0.0, MAX_GAIN),
        }
    }

    /// Change per rotary detent.
    pub fn step(self) -> f32 {
        match self.kind() {
            FieldKind::Gain => 0.01,
            _ => 1.0,
        }
    }

    /// Static name used in logs and validation errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::PreheatTemp => "preheat_c",
            Self::PreheatTime => "preheat_secs",
            Self::SoakTemp => "soak_c",
            Self::SoakTime => "soak_secs",
            Self::PeakTemp => "peak_c",
            Self::PeakTime => "peak_secs",
            Self::HoldTime => "hold_secs",
            Self::Kp(Zone::One) => "kp1",
            Self::Ki(Zone::One) => "ki1",
            Self::Kd(Zone::One) => "kd1",
            Self::Kp(Zone::Two) => "kp2",
            Self::Ki(Zone::Two) => "ki2",
            Self::Kd(Zone::Two) => "kd2",
            Self::ConstantSetpoint => "constant_setpoint_c",
        }
    }

    /// Check a candidate value for this field.
    pub fn validate(self, value: f32) -> Result<(), ConfigError> {
        let (lo, hi) = self.range();
        if !value.is_finite() || value < lo || value > hi {
            return Err(ConfigError::ValidationFailed(self.name()));
        }
        if self.kind() != FieldKind::Gain && value.fract() != 0.0 {
            return Err(ConfigError::ValidationFailed(self.name()));
        }
        Ok(())
    }
}

impl core::fmt::Display for ParamField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Range-check every field of a snapshot.
pub fn validate(params: &ParameterSet) -> Result<(), ConfigError> {
    for field in ParamField::ALL {
        field.validate(read_field(params, field))?;
    }
    Ok(())
}

fn read_field(params: &ParameterSet, field: ParamField) -> f32 {
    let p = &params.profile;
    match field {
        ParamField::PreheatTemp => f32::from(p.preheat_c),
        ParamField::PreheatTime => f32::from(p.preheat_secs),
        ParamField::SoakTemp => f32::from(p.soak_c),
        ParamField::SoakTime => f32::from(p.soak_secs),
        ParamField::PeakTemp => f32::from(p.peak_c),
        ParamField::PeakTime => f32::from(p.peak_secs),
        ParamField::HoldTime => f32::from(p.hold_secs),
        ParamField::Kp(z) => params.gains(z).kp,
        ParamField::Ki(z) => params.gains(z).ki,
        ParamField::Kd(z) => params.gains(z).kd,
        ParamField::ConstantSetpoint => f32::from(params.constant_setpoint_c),
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// In-memory owner of the configuration snapshot.
#[derive(Debug, Clone, Default)]
pub struct ParamStore {
    params: ParameterSet,
    dirty: bool,
}

impl ParamStore {
    pub fn new(params: ParameterSet) -> Self {
        Self {
            params,
            dirty: false,
        }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn gains(&self, zone: Zone) -> PidGains {
        self.params.gains(zone)
    }

    pub fn get(&self, field: ParamField) -> f32 {
        read_field(&self.params, field)
    }

    /// Validate and write one field. Out-of-range values are rejected and
    /// leave the store unchanged.
    pub fn set(&mut self, field: ParamField, value: f32) -> Result<(), ConfigError> {
        if let Err(e) = field.validate(value) {
            warn!("params: rejected {} = {}", field, value);
            return Err(e);
        }

        // Integer fields are validated whole and within u8 range above.
        let byte = value as u8;
        let p = &mut self.params;
        match field {
            ParamField::PreheatTemp => p.profile.preheat_c = byte,
            ParamField::PreheatTime => p.profile.preheat_secs = byte,
            ParamField::SoakTemp => p.profile.soak_c = byte,
            ParamField::SoakTime => p.profile.soak_secs = byte,
            ParamField::PeakTemp => p.profile.peak_c = byte,
            ParamField::PeakTime => p.profile.peak_secs = byte,
            ParamField::HoldTime => p.profile.hold_secs = byte,
            ParamField::Kp(z) => p.gains[z.index()].kp = value,
            ParamField::Ki(z) => p.gains[z.index()].ki = value,
            ParamField::Kd(z) => p.gains[z.index()].kd = value,
            ParamField::ConstantSetpoint => p.constant_setpoint_c = byte,
        }
        self.dirty = true;
        info!("params: {} = {}", field, value);
        Ok(())
    }

    /// Unsaved changes since the last save or load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the full image through the storage port.
    pub fn save(&mut self, storage: &mut impl StoragePort) -> Result<(), StorageError> {
        let img = layout::encode(&self.params);
        storage.write_bytes(layout::ADDR_MAGIC, &img)?;
        self.dirty = false;
        info!("params: saved {} bytes", img.len());
        Ok(())
    }

    /// Read the stored image. On any failure the store is reset to
    /// defaults and the error is returned for reporting.
    pub fn load(&mut self, storage: &impl StoragePort) -> Result<(), ConfigError> {
        match read_image(storage) {
            Ok(params) => {
                self.params = params;
                self.dirty = false;
                info!("params: loaded from storage");
                Ok(())
            }
            Err(e) => {
                warn!("params: load failed ({}), using defaults", e);
                self.params = ParameterSet::default();
                self.dirty = false;
                Err(e)
            }
        }
    }
}

fn read_image(storage: &impl StoragePort) -> Result<ParameterSet, ConfigError> {
    let mut img = [0u8; layout::IMAGE_LEN];
    storage.read_bytes(layout::ADDR_MAGIC, &mut img)?;
    let params = layout::decode(&img)?;
    validate(&params)?;
    Ok(params)
}
