//! Transport modes and the flat-speed reachability model.
//!
//! Reachability is approximated by a straight-line radius: a mode's speed in
//! metres per minute multiplied by the time budget.

use std::str::FromStr;

use thiserror::Error;

/// How the visitor travels.
///
/// The string forms match the routing profile names used by the request
/// format (`foot-walking`, `cycling-regular`, `driving-car`).
///
/// # Examples
/// ```
/// use quinze_core::TransportMode;
///
/// assert_eq!(TransportMode::Cycling.as_profile(), "cycling-regular");
/// assert_eq!("driving-car".parse(), Ok(TransportMode::Driving));
/// assert_eq!(TransportMode::from_profile_or_walking("hovercraft"), TransportMode::Walking);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportMode {
    /// On foot.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "foot-walking"))]
    Walking,
    /// By bicycle.
    #[cfg_attr(feature = "serde", serde(rename = "cycling-regular"))]
    Cycling,
    /// By car.
    #[cfg_attr(feature = "serde", serde(rename = "driving-car"))]
    Driving,
}

impl TransportMode {
    /// Return the routing profile name.
    #[must_use]
    pub const fn as_profile(self) -> &'static str {
        match self {
            Self::Walking => "foot-walking",
            Self::Cycling => "cycling-regular",
            Self::Driving => "driving-car",
        }
    }

    /// Parse a profile name, falling back to walking for unknown values.
    #[must_use]
    pub fn from_profile_or_walking(profile: &str) -> Self {
        profile.parse().unwrap_or_else(|err: UnknownTransportMode| {
            log::warn!("{err}; falling back to {}", Self::Walking);
            Self::Walking
        })
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_profile())
    }
}

/// Error returned when a profile name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transport mode '{0}'")]
pub struct UnknownTransportMode(pub String);

impl FromStr for TransportMode {
    type Err = UnknownTransportMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "foot-walking" => Ok(Self::Walking),
            "cycling-regular" => Ok(Self::Cycling),
            "driving-car" => Ok(Self::Driving),
            other => Err(UnknownTransportMode(other.to_owned())),
        }
    }
}

/// Converts a time budget into a maximum straight-line distance.
///
/// Implementations must be pure: the same inputs always give the same
/// distance. Returning `0.0` disables every score contribution.
pub trait ReachModel: Send + Sync {
    /// Maximum distance in metres reachable by `mode` within `minutes`.
    fn max_distance_meters(&self, mode: TransportMode, minutes: u32) -> f64;
}

/// Per-mode travel speeds in metres per minute.
///
/// The defaults are 80 m/min walking (about 4.8 km/h), 250 m/min cycling
/// (15 km/h) and 500 m/min driving (30 km/h).
///
/// # Examples
/// ```
/// use quinze_core::{ReachModel, SpeedTable, TransportMode};
///
/// let speeds = SpeedTable::default();
/// assert_eq!(speeds.max_distance_meters(TransportMode::Walking, 15), 1200.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedTable {
    /// Walking speed.
    pub walking_m_per_min: f64,
    /// Cycling speed.
    pub cycling_m_per_min: f64,
    /// Driving speed.
    pub driving_m_per_min: f64,
}

impl SpeedTable {
    /// Speed for `mode` in metres per minute.
    #[must_use]
    pub const fn speed(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Walking => self.walking_m_per_min,
            TransportMode::Cycling => self.cycling_m_per_min,
            TransportMode::Driving => self.driving_m_per_min,
        }
    }
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            walking_m_per_min: 80.0,
            cycling_m_per_min: 250.0,
            driving_m_per_min: 500.0,
        }
    }
}

impl ReachModel for SpeedTable {
    #[expect(
        clippy::float_arithmetic,
        reason = "distance is speed multiplied by time"
    )]
    fn max_distance_meters(&self, mode: TransportMode, minutes: u32) -> f64 {
        let speed = self.speed(mode);
        if !speed.is_finite() || speed <= 0.0 {
            return 0.0;
        }
        speed * f64::from(minutes)
    }
}
