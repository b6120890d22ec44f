//! Wire types shared by the web UI server and the polling client
//!
//! The server builds these, the client deserializes them. Raw image bytes
//! are never embedded in listing views; stubs carry a byte-fetch URL
//! instead, and only the single-item frame payload carries the (base64)
//! image data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Display change interval bounds, in seconds
pub const MIN_CHANGE_INTERVAL: u32 = 5;
pub const MAX_CHANGE_INTERVAL: u32 = 3600;

/// LED brightness bounds, in percent
pub const MAX_LED_BRIGHTNESS: u8 = 100;

/// Saturation bounds
pub const MIN_SATURATION: f64 = 0.0;
pub const MAX_SATURATION: f64 = 1.0;

/// Global display settings
///
/// A single settings object is shared by the whole playlist; all fields
/// stay within their declared bounds after every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds between frame changes on the display
    pub change_interval: u32,
    /// Activity LED brightness, percent
    pub led_brightness: u8,
    /// Whether the display panel is powered
    pub power_on: bool,
    /// Rendering saturation passed through to the display driver
    pub saturation: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            change_interval: 60,
            led_brightness: 50,
            power_on: true,
            saturation: 0.5,
        }
    }
}

/// Partial settings update
///
/// Omitted fields are left untouched. The update is all-or-nothing: every
/// supplied field is validated before any field is committed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub change_interval: Option<u32>,
    pub led_brightness: Option<u8>,
    pub power_on: Option<bool>,
    pub saturation: Option<f64>,
}

impl SettingsUpdate {
    /// Validate every supplied field against its bound
    pub fn validate(&self) -> Result<()> {
        if let Some(interval) = self.change_interval {
            if !(MIN_CHANGE_INTERVAL..=MAX_CHANGE_INTERVAL).contains(&interval) {
                return Err(Error::InvalidInput(format!(
                    "change_interval must be within [{}, {}], got {}",
                    MIN_CHANGE_INTERVAL, MAX_CHANGE_INTERVAL, interval
                )));
            }
        }
        if let Some(brightness) = self.led_brightness {
            if brightness > MAX_LED_BRIGHTNESS {
                return Err(Error::InvalidInput(format!(
                    "led_brightness must be within [0, {}], got {}",
                    MAX_LED_BRIGHTNESS, brightness
                )));
            }
        }
        if let Some(saturation) = self.saturation {
            if !(MIN_SATURATION..=MAX_SATURATION).contains(&saturation) {
                return Err(Error::InvalidInput(format!(
                    "saturation must be within [{}, {}], got {}",
                    MIN_SATURATION, MAX_SATURATION, saturation
                )));
            }
        }
        Ok(())
    }

    /// Apply the update to `settings`, committing nothing on validation failure
    pub fn apply(&self, settings: &mut Settings) -> Result<()> {
        self.validate()?;
        if let Some(interval) = self.change_interval {
            settings.change_interval = interval;
        }
        if let Some(brightness) = self.led_brightness {
            settings.led_brightness = brightness;
        }
        if let Some(power_on) = self.power_on {
            settings.power_on = power_on;
        }
        if let Some(saturation) = self.saturation {
            settings.saturation = saturation;
        }
        Ok(())
    }
}

/// Public item view for listings: metadata plus a byte-fetch URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageStub {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    /// Dereferenceable locator for the raw bytes
    pub image_url: String,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Frame descriptor returned to the polling display client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramePayload {
    pub image_id: Uuid,
    pub filename: String,
    pub content_type: String,
    /// Raw image bytes, base64-encoded for the wire
    pub image_base64: String,
    pub offset_x: f64,
    pub offset_y: f64,
    pub settings: Settings,
    /// Number of items still waiting in the queue
    pub queued: usize,
    pub generated_at: DateTime<Utc>,
}

/// Point-in-time view of the whole playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub current: Option<ImageStub>,
    pub queue: Vec<ImageStub>,
    pub history: Vec<ImageStub>,
    pub settings: Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_in_bounds() {
        let settings = Settings::default();
        assert_eq!(settings.change_interval, 60);
        assert_eq!(settings.led_brightness, 50);
        assert!(settings.power_on);
        assert_eq!(settings.saturation, 0.5);
        assert!(SettingsUpdate {
            change_interval: Some(settings.change_interval),
            led_brightness: Some(settings.led_brightness),
            power_on: Some(settings.power_on),
            saturation: Some(settings.saturation),
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn update_rejects_out_of_bounds_interval() {
        let mut settings = Settings::default();
        let update = SettingsUpdate {
            change_interval: Some(4),
            ..Default::default()
        };
        assert!(update.apply(&mut settings).is_err());
        assert_eq!(settings.change_interval, 60);
    }

    #[test]
    fn update_is_all_or_nothing() {
        let mut settings = Settings::default();
        // Valid brightness paired with an invalid saturation: nothing changes
        let update = SettingsUpdate {
            led_brightness: Some(70),
            saturation: Some(1.5),
            ..Default::default()
        };
        assert!(update.apply(&mut settings).is_err());
        assert_eq!(settings.led_brightness, 50);
        assert_eq!(settings.saturation, 0.5);
    }

    #[test]
    fn update_changes_only_supplied_fields() {
        let mut settings = Settings::default();
        let update = SettingsUpdate {
            led_brightness: Some(70),
            ..Default::default()
        };
        update.apply(&mut settings).unwrap();
        assert_eq!(settings.led_brightness, 70);
        assert_eq!(settings.change_interval, 60);
        assert!(settings.power_on);
        assert_eq!(settings.saturation, 0.5);
    }

    #[test]
    fn settings_update_deserializes_partial_json() {
        let update: SettingsUpdate = serde_json::from_str(r#"{"power_on": false}"#).unwrap();
        assert_eq!(update.power_on, Some(false));
        assert!(update.change_interval.is_none());
        assert!(update.led_brightness.is_none());
        assert!(update.saturation.is_none());
    }
}
