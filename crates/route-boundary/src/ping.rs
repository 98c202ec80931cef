use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Providers are inconsistent with spacing and case ("Ignition  Off").
static IGNITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bignition\s+(on|off)\b").expect("ignition pattern should compile")
});

/// Ignition state carried by a provider event message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnitionEvent {
    /// The provider reported the ignition being switched on.
    On,
    /// The provider reported the ignition being switched off.
    Off,
    /// A routine position report.
    #[default]
    None,
}

impl IgnitionEvent {
    /// Decodes the ignition state from a free-text provider message.
    ///
    /// This is the single predicate used for both states. When a message
    /// mentions both, the first mention wins.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        IGNITION.captures(message).map_or(Self::None, |caps| {
            if caps[1].eq_ignore_ascii_case("on") { Self::On } else { Self::Off }
        })
    }
}

/// One position sample reported by the tracking provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsPing {
    /// Vehicle identifier as reported by the provider.
    pub asset_id: String,
    /// Provider-local time of the fix. Sequences are ordered by this field.
    pub timestamp: NaiveDateTime,
    /// Human readable place name, passed through untouched.
    #[serde(default)]
    pub location_label: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Raw provider event text, kept for persistence.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub ignition: IgnitionEvent,
}

impl GpsPing {
    /// Creates a ping, decoding the ignition state from `message`.
    #[must_use]
    pub fn new(
        asset_id: impl Into<String>, timestamp: NaiveDateTime, latitude: f64, longitude: f64,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            asset_id: asset_id.into(),
            timestamp,
            location_label: String::new(),
            latitude,
            longitude,
            ignition: IgnitionEvent::from_message(&message),
            message,
        }
    }

    #[must_use]
    pub fn with_location(mut self, label: impl Into<String>) -> Self {
        self.location_label = label.into();
        self
    }

    #[must_use]
    pub fn is_ignition_on(&self) -> bool {
        self.ignition == IgnitionEvent::On
    }

    #[must_use]
    pub fn is_ignition_off(&self) -> bool {
        self.ignition == IgnitionEvent::Off
    }

    /// Whether both coordinates are finite and inside the WGS84 range.
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}
