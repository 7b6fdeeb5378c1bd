use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::distance::haversine::calculate_distance;
use crate::position::accuracy::AccuracyQuality;
use crate::position::coords::{GeoCoords, GeoPositionInput, PositionSource, Reading};
use crate::position::error::PositionInputError;
use crate::LatLon;

const TYPE_NAME: &str = "GeoPosition";

/// Timestamp and coordinate snapshot captured from a non-null raw input.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPosition {
    timestamp: Option<f64>,
    coords: GeoCoords,
}

impl NormalizedPosition {
    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    /// All-absent when the raw input carried no coordinate substructure.
    pub fn coords(&self) -> &GeoCoords {
        &self.coords
    }
}

/// Immutable geographic position built from one raw sensor reading.
///
/// Every field is copied out of the source at construction and there are no
/// setters, so a `GeoPosition` can be shared across threads freely. Nested
/// data is only handed out by shared reference:
///
/// ```compile_fail
/// use geocore::position::coords::{GeoCoords, GeoPositionInput};
/// use geocore::GeoPosition;
///
/// let pos = GeoPosition::from_input(&GeoPositionInput::new(GeoCoords::new(1.0, 2.0)));
/// pos.coords().unwrap().latitude = Some(0.0);
/// ```
///
/// ```compile_fail
/// use geocore::position::coords::{GeoCoords, GeoPositionInput};
/// use geocore::GeoPosition;
///
/// let mut pos = GeoPosition::from_input(&GeoPositionInput::new(GeoCoords::new(1.0, 2.0)));
/// pos.timestamp = Some(0.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPosition {
    geolocation_position: Option<NormalizedPosition>,
    coords: Option<GeoCoords>,
    accuracy_quality: AccuracyQuality,
    timestamp: Option<f64>,
}

impl GeoPosition {
    /// Builds a position from a raw reading; `None` stands for a null input
    /// and yields a position with no data at all.
    pub fn new<S: PositionSource + ?Sized>(position: Option<&S>) -> Self {
        let coords = position
            .and_then(|p| p.coords())
            .map(|source| GeoCoords::read_from(source));
        let timestamp = position.and_then(|p| p.timestamp());
        let geolocation_position = position.map(|_| NormalizedPosition {
            timestamp,
            coords: coords.unwrap_or_default(),
        });
        let accuracy = coords.and_then(|c| c.accuracy).unwrap_or(f64::INFINITY);

        GeoPosition {
            geolocation_position,
            coords,
            accuracy_quality: AccuracyQuality::from_accuracy(accuracy),
            timestamp,
        }
    }

    pub fn from_input<S: PositionSource + ?Sized>(position: &S) -> Self {
        Self::new(Some(position))
    }

    pub fn empty() -> Self {
        Self::new::<GeoPositionInput>(None)
    }

    /// Builds a position from untrusted JSON.
    ///
    /// `null` gives an empty position and arrays are treated as objects with
    /// no known fields; any other primitive is rejected.
    pub fn from_json(value: &Value) -> Result<Self, PositionInputError> {
        match value {
            Value::Null => Ok(Self::empty()),
            Value::Object(map) => Ok(Self::from_input(map)),
            Value::Array(_) => Ok(Self::from_input(&GeoPositionInput::default())),
            Value::Bool(_) => Err(PositionInputError::NotAnObject { received: "boolean" }),
            Value::Number(_) => Err(PositionInputError::NotAnObject { received: "number" }),
            Value::String(_) => Err(PositionInputError::NotAnObject { received: "string" }),
        }
    }

    /// `None` only when the raw input itself was null.
    pub fn geolocation_position(&self) -> Option<&NormalizedPosition> {
        self.geolocation_position.as_ref()
    }

    /// `None` when the raw input had no coordinate substructure.
    pub fn coords(&self) -> Option<&GeoCoords> {
        self.coords.as_ref()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.coords.and_then(|c| c.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.coords.and_then(|c| c.longitude)
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.coords.and_then(|c| c.accuracy)
    }

    /// Tier computed once at construction; a missing accuracy counts as
    /// infinitely bad.
    pub fn accuracy_quality(&self) -> AccuracyQuality {
        self.accuracy_quality
    }

    pub fn altitude(&self) -> Reading {
        self.coords.map(|c| c.altitude).unwrap_or_default()
    }

    pub fn altitude_accuracy(&self) -> Reading {
        self.coords.map(|c| c.altitude_accuracy).unwrap_or_default()
    }

    pub fn heading(&self) -> Reading {
        self.coords.map(|c| c.heading).unwrap_or_default()
    }

    pub fn speed(&self) -> Reading {
        self.coords.map(|c| c.speed).unwrap_or_default()
    }

    /// Epoch milliseconds of the reading.
    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    #[deprecated(note = "use `accuracy_quality()`, which is computed once at construction")]
    pub fn calculate_accuracy_quality(&self) -> AccuracyQuality {
        AccuracyQuality::from_accuracy(self.accuracy().unwrap_or(f64::INFINITY))
    }

    /// Great-circle distance in meters to `target`, or `NaN` when this
    /// position has no latitude or longitude. Not cached.
    pub fn distance_to<T: LatLon + ?Sized>(&self, target: &T) -> f64 {
        let (Some(lat), Some(lon)) = (self.latitude(), self.longitude()) else {
            return f64::NAN;
        };
        let (target_lat, target_lon) = target.lat_lon();
        calculate_distance(lat, lon, target_lat, target_lon)
    }

    /// One-line debug summary.
    ///
    /// Latitude or longitude that is missing, zero or NaN produces the
    /// "No position data" form. This means a reading at exactly (0, 0) renders
    /// as having no data, a known limitation kept for output compatibility.
    pub fn render_summary(&self) -> String {
        let falsy = |v: Option<f64>| v.map_or(true, |v| v == 0.0 || v.is_nan());
        if falsy(self.latitude()) || falsy(self.longitude()) {
            return format!("{TYPE_NAME}: No position data");
        }
        format!(
            "{}: {}, {}, {}, {}, {}, {}, {}",
            TYPE_NAME,
            Reading::from_present(self.latitude()),
            Reading::from_present(self.longitude()),
            self.accuracy_quality,
            self.altitude(),
            self.speed(),
            self.heading(),
            Reading::from_present(self.timestamp),
        )
    }
}

impl Default for GeoPosition {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_summary())
    }
}

impl From<&GeoPositionInput> for GeoPosition {
    fn from(position: &GeoPositionInput) -> Self {
        Self::from_input(position)
    }
}

impl TryFrom<&Value> for GeoPosition {
    type Error = PositionInputError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

/// A position without coordinates measures as `NaN` from anywhere.
impl LatLon for GeoPosition {
    fn lat_lon(&self) -> (f64, f64) {
        (
            self.latitude().unwrap_or(f64::NAN),
            self.longitude().unwrap_or(f64::NAN),
        )
    }
}
