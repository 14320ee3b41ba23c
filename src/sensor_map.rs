/// Canonical field registry for the IP-100.
///
/// Maps the engine's station-agnostic field names onto the names the
/// IP-100 uses in its status document. This is the single source of truth
/// for the default mapping; deployments layer partial overrides on top.

use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Canonical names with special handling
// ---------------------------------------------------------------------------

/// Daily cumulative rain counter, the source of the rain delta.
pub const DAY_RAIN_TOTAL: &str = "day_rain_total";

/// Derived rain since the previous packet.
pub const RAIN: &str = "rain";

/// Hardware leaf reporting the station's unit system.
pub const BASE_UNITS: &str = "base_units";

// ---------------------------------------------------------------------------
// Default mapping
// ---------------------------------------------------------------------------

/// (canonical, device-native) pairs used when no override is configured.
pub static DEFAULT_SENSOR_MAP: &[(&str, &str)] = &[
    ("outTemp", "temperature_outside"),
    ("inTemp", "temperature_inside"),
    ("outHumidity", "humidity"),
    ("pressure", "pressure"),
    ("windSpeed", "wind_speed"),
    ("windDir", "wind_dir"),
    ("windGust", "gust_speed"),
    ("windGustDir", "gust_dir"),
    (DAY_RAIN_TOTAL, "precipitation"),
    ("radiation", "solar_radiation"),
];

/// Effective canonical → device-native mapping for one driver instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorMap {
    entries: BTreeMap<String, String>,
}

impl Default for SensorMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_SENSOR_MAP
                .iter()
                .map(|(canonical, native)| (canonical.to_string(), native.to_string()))
                .collect(),
        }
    }
}

impl SensorMap {
    /// Default map with `overrides` merged on top. Overridden keys point at
    /// the new device field, unknown keys are added.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut map = Self::default();
        for (canonical, native) in overrides {
            map.entries.insert(canonical.clone(), native.clone());
        }
        map
    }

    /// Device-native name for a canonical field.
    pub fn native_for(&self, canonical: &str) -> Option<&str> {
        self.entries.get(canonical).map(String::as_str)
    }

    /// (canonical, device-native) pairs in canonical-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
