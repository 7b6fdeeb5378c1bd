pub mod distance;
pub mod observer;
pub mod position;
pub mod state;

use serde::{Deserialize, Serialize};

pub use distance::haversine::{calculate_distance, EARTH_RADIUS_METERS};
pub use observer::subject::{Observer, ObserverSubject, Subscription};
pub use position::accuracy::{classify_accuracy, AccuracyQuality};
pub use position::coords::{CoordinateSource, GeoCoords, GeoPositionInput, PositionSource, Reading};
pub use position::error::PositionInputError;
pub use position::geo_position::{GeoPosition, NormalizedPosition};
pub use state::geocoding_state::{GeocodingState, StateSnapshot};

/// Anything that can be measured to: a latitude/longitude pair in degrees.
pub trait LatLon {
    fn lat_lon(&self) -> (f64, f64);
}

/// Plain latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates { latitude, longitude }
    }

    pub fn distance_to<T: LatLon + ?Sized>(&self, other: &T) -> f64 {
        let (lat, lon) = other.lat_lon();
        calculate_distance(self.latitude, self.longitude, lat, lon)
    }
}

impl LatLon for Coordinates {
    fn lat_lon(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

impl LatLon for (f64, f64) {
    fn lat_lon(&self) -> (f64, f64) {
        *self
    }
}

/// Missing fields read as `NaN`.
impl LatLon for GeoCoords {
    fn lat_lon(&self) -> (f64, f64) {
        (
            self.latitude.unwrap_or(f64::NAN),
            self.longitude.unwrap_or(f64::NAN),
        )
    }
}
