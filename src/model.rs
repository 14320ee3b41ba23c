/// Shared data types for the IP-100 driver.
///
/// `FlatReading` is what the parser produces from one status document,
/// `Packet` is what the driver hands to the consuming engine. The error
/// types live here too so every module agrees on what is retry-eligible.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// A single value pulled out of the status document.
///
/// Hardware leaves keep their raw text; weather sensors are parsed to
/// numbers by the parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value. Text is parsed leniently (trimmed).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::Number(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Device-native field name → value, flattened from one status document.
pub type FlatReading = BTreeMap<String, FieldValue>;

// ---------------------------------------------------------------------------
// Output packet
// ---------------------------------------------------------------------------

/// Unit system the packet values are expressed in.
///
/// Serialized as the numeric codes the weather engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum UnitSystem {
    /// US customary units (station reports `English`).
    Us,
    /// Metric with wind speed in km/h.
    MetricWx,
}

impl UnitSystem {
    /// Maps the station's reported base units onto a unit system.
    /// Only the exact string `English` selects US units.
    pub fn from_base_units(base_units: Option<&str>) -> Self {
        match base_units {
            Some("English") => UnitSystem::Us,
            _ => UnitSystem::MetricWx,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            UnitSystem::Us => 1,
            UnitSystem::MetricWx => 17,
        }
    }
}

impl From<UnitSystem> for u8 {
    fn from(units: UnitSystem) -> u8 {
        units.code()
    }
}

/// One normalized record handed to the consumer per successful poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Packet {
    /// Epoch seconds, rounded to the nearest second.
    #[serde(rename = "dateTime")]
    pub date_time: i64,
    #[serde(rename = "usUnits")]
    pub us_units: UnitSystem,
    /// Canonical field name → value. Includes the derived `rain` field.
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Packet {
    pub fn new(date_time: i64, us_units: UnitSystem) -> Self {
        Self {
            date_time,
            us_units,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, canonical: &str) -> Option<&FieldValue> {
        self.fields.get(canonical)
    }

    pub fn get_f64(&self, canonical: &str) -> Option<f64> {
        self.fields.get(canonical).and_then(FieldValue::as_f64)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Any failure to retrieve the status document: connection refused, DNS,
/// timeout, non-2xx status or a broken body. All are retry-eligible.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("get data failed: {cause}")]
pub struct FetchError {
    pub cause: String,
}

impl FetchError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self { cause: cause.into() }
    }
}

/// Terminal failure of the poll loop.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PollError {
    /// `last` is the final fetch failure, if any fetch was attempted.
    #[error("max tries {max_tries} exceeded")]
    MaxTriesExceeded {
        max_tries: u32,
        last: Option<FetchError>,
    },
}

/// Problems loading the driver configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
