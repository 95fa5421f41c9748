//! Byte-addressed parameter storage.
//!
//! Implements [`StoragePort`] over a fixed-size image.
//!
//! - **`feature = "espidf"`**: the image is one NVS blob. Reads copy out of
//!   the blob; writes read-modify-write it and `nvs_commit()`, which is
//!   atomic per commit. An absent blob reads as erased (`0xFF`).
//! - **host**: the image is an in-memory array, starting erased.

use log::{debug, info};

use crate::app::ports::{StorageError, StoragePort};

#[cfg(feature = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(feature = "espidf")]
use log::warn;

/// Addressable size of the emulated device.
pub const EEPROM_SIZE: usize = 64;

/// Value of a never-written byte.
pub const ERASED: u8 = 0xFF;

#[cfg(feature = "espidf")]
const NAMESPACE: &[u8] = b"hotplate\0";
#[cfg(feature = "espidf")]
const IMAGE_KEY: &[u8] = b"eeprom\0";

pub struct EepromAdapter {
    #[cfg(not(feature = "espidf"))]
    image: [u8; EEPROM_SIZE],
}

fn check_range(address: usize, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
    let end = address.checked_add(len).ok_or(StorageError::OutOfRange)?;
    if end > EEPROM_SIZE {
        return Err(StorageError::OutOfRange);
    }
    Ok(address..end)
}

impl EepromAdapter {
    /// Open the storage backend.
    ///
    /// On first boot or after a version mismatch the NVS partition is erased
    /// and re-initialised automatically.
    #[cfg(feature = "espidf")]
    pub fn new() -> Result<Self, StorageError> {
        // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
        // single main-task context before any NVS access.
        let ret = unsafe { nvs_flash_init() };
        if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
            warn!("NVS: erasing and re-initialising flash partition");
            if unsafe { nvs_flash_erase() } != ESP_OK || unsafe { nvs_flash_init() } != ESP_OK {
                return Err(StorageError::IoError);
            }
        } else if ret != ESP_OK {
            return Err(StorageError::IoError);
        }
        info!("EepromAdapter: NVS backend ({} bytes)", EEPROM_SIZE);
        Ok(Self {})
    }

    #[cfg(not(feature = "espidf"))]
    pub fn new() -> Result<Self, StorageError> {
        info!("EepromAdapter: simulation backend ({} bytes)", EEPROM_SIZE);
        Ok(Self {
            image: [ERASED; EEPROM_SIZE],
        })
    }

    /// Open the NVS namespace, run `f` with the handle, then close.
    #[cfg(feature = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        // SAFETY: NAMESPACE is NUL-terminated; handle is closed below.
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }

    /// Whole image, erased where nothing was ever stored.
    #[cfg(feature = "espidf")]
    fn load_image() -> Result<[u8; EEPROM_SIZE], StorageError> {
        let mut image = [ERASED; EEPROM_SIZE];
        let result = Self::with_nvs_handle(false, |handle| {
            let mut size = EEPROM_SIZE;
            // SAFETY: image is EEPROM_SIZE bytes; size bounds the copy.
            let ret = unsafe {
                nvs_get_blob(handle, IMAGE_KEY.as_ptr().cast(), image.as_mut_ptr().cast(), &mut size)
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });
        match result {
            Ok(()) => Ok(image),
            // Nothing saved yet (or namespace absent on first boot).
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Ok([ERASED; EEPROM_SIZE]),
            Err(e) => {
                warn!("EepromAdapter: NVS read error {}", e);
                Err(StorageError::IoError)
            }
        }
    }

    #[cfg(feature = "espidf")]
    fn store_image(image: &[u8; EEPROM_SIZE]) -> Result<(), StorageError> {
        Self::with_nvs_handle(true, |handle| {
            // SAFETY: image outlives the call; key is NUL-terminated.
            let ret = unsafe {
                nvs_set_blob(handle, IMAGE_KEY.as_ptr().cast(), image.as_ptr().cast(), EEPROM_SIZE)
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(|e| {
            warn!("EepromAdapter: NVS write error {}", e);
            StorageError::IoError
        })
    }
}

impl StoragePort for EepromAdapter {
    fn read_bytes(&self, address: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = check_range(address, buf.len())?;

        #[cfg(not(feature = "espidf"))]
        buf.copy_from_slice(&self.image[range]);

        #[cfg(feature = "espidf")]
        buf.copy_from_slice(&Self::load_image()?[range]);

        Ok(())
    }

    fn write_bytes(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError> {
        let range = check_range(address, data.len())?;

        #[cfg(not(feature = "espidf"))]
        self.image[range].copy_from_slice(data);

        #[cfg(feature = "espidf")]
        {
            let mut image = Self::load_image()?;
            if image[range.clone()] == *data {
                debug!("EepromAdapter: {} bytes at {} unchanged", data.len(), address);
                return Ok(());
            }
            image[range].copy_from_slice(data);
            Self::store_image(&image)?;
        }

        debug!("EepromAdapter: wrote {} bytes at {}", data.len(), address);
        Ok(())
    }
}
