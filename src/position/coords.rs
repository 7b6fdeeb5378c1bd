use std::fmt;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A nullable sensor field: never reported, explicitly reported as null, or a
/// number.
///
/// Geolocation sources distinguish "the device cannot measure this" (null)
/// from "this field was not supplied" (absent), and the distinction survives
/// extraction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Reading {
    #[default]
    Absent,
    Null,
    Value(f64),
}

impl Reading {
    /// Lifts a never-null field: `None` becomes [`Reading::Absent`].
    pub fn from_present(value: Option<f64>) -> Self {
        value.map_or(Reading::Absent, Reading::Value)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(v),
            Reading::Absent | Reading::Null => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Reading::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Reading::Null)
    }
}

impl From<f64> for Reading {
    fn from(value: f64) -> Self {
        Reading::Value(value)
    }
}

impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Reading::Null, Reading::Value)
    }
}

/// Renders a number the way geolocation summaries print it: plain decimals
/// inside `1e-6..1e21`, exponent form (`1e-7`, `1e+21`) outside, `Infinity`
/// for infinities and `0` for negative zero.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }
    let exp = format!("{value:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

/// Absent renders as `undefined` and null as `null`, matching the summary
/// strings produced for browser-sourced positions.
impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Absent => f.write_str("undefined"),
            Reading::Null => f.write_str("null"),
            Reading::Value(v) => f.write_str(&format_number(*v)),
        }
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Value(v) => serializer.serialize_f64(*v),
            Reading::Absent | Reading::Null => serializer.serialize_none(),
        }
    }
}

/// A missing field is handled by `#[serde(default)]`; anything that reaches
/// the deserializer is either null or a number.
impl<'de> Deserialize<'de> for Reading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<f64>::deserialize(deserializer).map(Reading::from)
    }
}

/// Read-by-name access to the seven coordinate fields of a reading.
pub trait CoordinateSource {
    fn latitude(&self) -> Option<f64>;
    fn longitude(&self) -> Option<f64>;
    fn accuracy(&self) -> Option<f64>;
    fn altitude(&self) -> Reading;
    fn altitude_accuracy(&self) -> Reading;
    fn heading(&self) -> Reading;
    fn speed(&self) -> Reading;
}

/// A raw position record: an optional epoch-millisecond timestamp and an
/// optional coordinate-bearing substructure.
pub trait PositionSource {
    fn timestamp(&self) -> Option<f64>;
    fn coords(&self) -> Option<&dyn CoordinateSource>;
}

/// Snapshot for a coordinate substructure that is present but carries no
/// readable fields.
static NO_FIELDS: GeoCoords = GeoCoords {
    latitude: None,
    longitude: None,
    accuracy: None,
    altitude: Reading::Absent,
    altitude_accuracy: Reading::Absent,
    heading: Reading::Absent,
    speed: Reading::Absent,
};

/// Plain snapshot of one reading's geometry and quality metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoCoords {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Radius of uncertainty in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Reading::is_absent")]
    pub altitude: Reading,
    #[serde(default, skip_serializing_if = "Reading::is_absent")]
    pub altitude_accuracy: Reading,
    #[serde(default, skip_serializing_if = "Reading::is_absent")]
    pub heading: Reading,
    #[serde(default, skip_serializing_if = "Reading::is_absent")]
    pub speed: Reading,
}

impl GeoCoords {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoCoords {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..GeoCoords::default()
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Copies every coordinate field out of `source`, one accessor at a time.
    pub fn read_from<S: CoordinateSource + ?Sized>(source: &S) -> Self {
        GeoCoords {
            latitude: source.latitude(),
            longitude: source.longitude(),
            accuracy: source.accuracy(),
            altitude: source.altitude(),
            altitude_accuracy: source.altitude_accuracy(),
            heading: source.heading(),
            speed: source.speed(),
        }
    }
}

impl CoordinateSource for GeoCoords {
    fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    fn altitude(&self) -> Reading {
        self.altitude
    }

    fn altitude_accuracy(&self) -> Reading {
        self.altitude_accuracy
    }

    fn heading(&self) -> Reading {
        self.heading
    }

    fn speed(&self) -> Reading {
        self.speed
    }
}

/// Typed raw input, shaped like a browser `GeolocationPosition`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPositionInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<GeoCoords>,
}

impl GeoPositionInput {
    pub fn new(coords: GeoCoords) -> Self {
        GeoPositionInput {
            timestamp: None,
            coords: Some(coords),
        }
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl PositionSource for GeoPositionInput {
    fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    fn coords(&self) -> Option<&dyn CoordinateSource> {
        self.coords.as_ref().map(|c| c as &dyn CoordinateSource)
    }
}

fn number_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        None | Some(Value::Null) => None,
        Some(other) => {
            debug!("ignoring non-numeric `{key}` field: {other}");
            None
        }
    }
}

fn reading_field(map: &Map<String, Value>, key: &str) -> Reading {
    match map.get(key) {
        None => Reading::Absent,
        Some(Value::Null) => Reading::Null,
        Some(Value::Number(n)) => n.as_f64().map_or(Reading::Absent, Reading::Value),
        Some(other) => {
            debug!("ignoring non-numeric `{key}` field: {other}");
            Reading::Absent
        }
    }
}

impl CoordinateSource for Map<String, Value> {
    fn latitude(&self) -> Option<f64> {
        number_field(self, "latitude")
    }

    fn longitude(&self) -> Option<f64> {
        number_field(self, "longitude")
    }

    fn accuracy(&self) -> Option<f64> {
        number_field(self, "accuracy")
    }

    fn altitude(&self) -> Reading {
        reading_field(self, "altitude")
    }

    fn altitude_accuracy(&self) -> Reading {
        reading_field(self, "altitudeAccuracy")
    }

    fn heading(&self) -> Reading {
        reading_field(self, "heading")
    }

    fn speed(&self) -> Reading {
        reading_field(self, "speed")
    }
}

impl PositionSource for Map<String, Value> {
    fn timestamp(&self) -> Option<f64> {
        number_field(self, "timestamp")
    }

    fn coords(&self) -> Option<&dyn CoordinateSource> {
        match self.get("coords") {
            Some(Value::Object(coords)) => Some(coords as &dyn CoordinateSource),
            Some(other) if is_truthy(other) => Some(&NO_FIELDS as &dyn CoordinateSource),
            _ => None,
        }
    }
}

/// `null`, `false`, `0` and `""` count as "no value"; everything else is
/// present, including empty arrays and objects.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_object_fields_are_read_by_name() {
        let value = json!({
            "latitude": 1.5,
            "longitude": 2,
            "altitude": null,
            "altitudeAccuracy": 3.0,
            "speed": "fast"
        });
        let coords = GeoCoords::read_from(value.as_object().unwrap());
        assert_eq!(coords.latitude, Some(1.5));
        assert_eq!(coords.longitude, Some(2.0));
        assert_eq!(coords.accuracy, None);
        assert_eq!(coords.altitude, Reading::Null);
        assert_eq!(coords.altitude_accuracy, Reading::Value(3.0));
        assert_eq!(coords.heading, Reading::Absent);
        assert_eq!(coords.speed, Reading::Absent);
    }

    #[test]
    fn deserialize_keeps_null_apart_from_absent() {
        let coords: GeoCoords =
            serde_json::from_str(r#"{"latitude":1,"longitude":2,"heading":null}"#).unwrap();
        assert_eq!(coords.heading, Reading::Null);
        assert_eq!(coords.speed, Reading::Absent);

        let out = serde_json::to_value(coords).unwrap();
        assert_eq!(out, json!({"latitude": 1.0, "longitude": 2.0, "heading": null}));
    }

    #[test]
    fn non_object_coords_follow_truthiness() {
        for present in [json!(5), json!([]), json!("x"), json!(true)] {
            let position = json!({ "coords": present });
            let map = position.as_object().unwrap();
            let coords = map.coords().map(|source| GeoCoords::read_from(source));
            assert_eq!(coords, Some(GeoCoords::default()), "coords {present}");
        }
        for missing in [json!(null), json!(0), json!(""), json!(false)] {
            let position = json!({ "coords": missing });
            assert!(position.as_object().unwrap().coords().is_none(), "coords {missing}");
        }
    }

    #[test]
    fn numbers_switch_to_exponent_form_at_the_extremes() {
        assert_eq!(format_number(0.0000001), "1e-7");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e22), "-1.5e+22");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(123456.75), "123456.75");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn reading_display() {
        assert_eq!(Reading::Absent.to_string(), "undefined");
        assert_eq!(Reading::Null.to_string(), "null");
        assert_eq!(Reading::Value(760.0).to_string(), "760");
        assert_eq!(Reading::from(None).value(), None);
    }
}
