//! Field extraction from device status documents.
//!
//! The service answers `GET /devices/{id}/status` with a JSON document,
//! usually wrapped in an envelope:
//!
//! ```json
//! {"statusCode":100,"body":{"power":"on","brightness":42,"color":"0:0:0"},"message":"success"}
//! ```
//!
//! Only two fields are taken from each document. They are looked up in the
//! top-level object first and then in `body`. Unknown fields are ignored; if
//! either required field is missing or has the wrong type, the whole
//! extraction fails and nothing is returned.

use serde_json::{Map, Value};

use lightdeck_types::{Brightness, LightStatus, SensorReading};

use crate::error::{Error, Result};

/// A parsed status response.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusDocument(Value);

impl StatusDocument {
    /// Parse a response body.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map(Self)
            .map_err(|e| Error::malformed(format!("status body is not JSON: {}", e)))
    }

    /// Wrap an already-parsed value.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Look up a field at the top level or inside the `body` envelope.
    fn field(&self, key: &str) -> Option<&Value> {
        let root = self.0.as_object()?;
        root.get(key).or_else(|| {
            root.get("body")
                .and_then(Value::as_object)
                .and_then(|body: &Map<String, Value>| body.get(key))
        })
    }

    fn required(&self, key: &str) -> Result<&Value> {
        self.field(key)
            .ok_or_else(|| Error::malformed(format!("missing field '{}'", key)))
    }

    /// Extract `power` and `brightness`.
    ///
    /// `power` must be a string; `"on"` means on and any other value means
    /// off. `brightness` must be an integer and is clamped into `1..=100`.
    pub fn light_status(&self) -> Result<LightStatus> {
        let power = self
            .required("power")?
            .as_str()
            .ok_or_else(|| Error::malformed("field 'power' is not a string"))?;
        let brightness = self
            .required("brightness")?
            .as_i64()
            .ok_or_else(|| Error::malformed("field 'brightness' is not an integer"))?;

        Ok(LightStatus {
            is_on: power == "on",
            brightness: Brightness::new(brightness),
        })
    }

    /// Extract `temperature` and `humidity`.
    pub fn sensor_reading(&self) -> Result<SensorReading> {
        let temperature = self
            .required("temperature")?
            .as_f64()
            .ok_or_else(|| Error::malformed("field 'temperature' is not a number"))?;
        let humidity = integer_like(self.required("humidity")?)
            .ok_or_else(|| Error::malformed("field 'humidity' is not a number"))?;

        Ok(SensorReading::new(temperature as f32, humidity))
    }
}

/// Accept `45` as well as `45.0`; fractional humidity is truncated.
fn integer_like(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_status_flat_document() {
        let doc = StatusDocument::parse(r#"{"power":"on","brightness":42}"#).unwrap();
        let status = doc.light_status().unwrap();
        assert!(status.is_on);
        assert_eq!(status.brightness.get(), 42);
    }

    #[test]
    fn test_light_status_envelope() {
        let doc = StatusDocument::parse(
            r#"{"statusCode":100,"body":{"deviceId":"94A99076A08A","power":"off","brightness":7,"colorTemperature":2700},"message":"success"}"#,
        )
        .unwrap();
        let status = doc.light_status().unwrap();
        assert!(!status.is_on);
        assert_eq!(status.brightness.get(), 7);
    }

    #[test]
    fn test_light_status_other_power_value_is_off() {
        let doc = StatusDocument::parse(r#"{"power":"standby","brightness":50}"#).unwrap();
        assert!(!doc.light_status().unwrap().is_on);
    }

    #[test]
    fn test_light_status_missing_brightness() {
        let doc = StatusDocument::parse(r#"{"power":"on"}"#).unwrap();
        let err = doc.light_status().unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
        assert!(err.to_string().contains("brightness"));
    }

    #[test]
    fn test_light_status_missing_power() {
        let doc = StatusDocument::parse(r#"{"body":{"brightness":50}}"#).unwrap();
        assert!(matches!(
            doc.light_status(),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_light_status_wrong_types() {
        let doc = StatusDocument::parse(r#"{"power":true,"brightness":50}"#).unwrap();
        assert!(doc.light_status().is_err());

        let doc = StatusDocument::parse(r#"{"power":"on","brightness":"high"}"#).unwrap();
        assert!(doc.light_status().is_err());
    }

    #[test]
    fn test_light_status_brightness_clamped() {
        let doc = StatusDocument::parse(r#"{"power":"on","brightness":0}"#).unwrap();
        assert_eq!(doc.light_status().unwrap().brightness.get(), 1);

        let doc = StatusDocument::parse(r#"{"power":"on","brightness":300}"#).unwrap();
        assert_eq!(doc.light_status().unwrap().brightness.get(), 100);
    }

    #[test]
    fn test_sensor_reading() {
        let doc = StatusDocument::parse(
            r#"{"statusCode":100,"body":{"temperature":23.4,"humidity":51,"battery":100},"message":"success"}"#,
        )
        .unwrap();
        let reading = doc.sensor_reading().unwrap();
        assert!((reading.temperature_c - 23.4).abs() < 0.001);
        assert_eq!(reading.humidity, 51);
    }

    #[test]
    fn test_sensor_reading_fractional_humidity_truncates() {
        let doc = StatusDocument::parse(r#"{"temperature":-3,"humidity":48.9}"#).unwrap();
        let reading = doc.sensor_reading().unwrap();
        assert!((reading.temperature_c + 3.0).abs() < 0.001);
        assert_eq!(reading.humidity, 48);
    }

    #[test]
    fn test_sensor_reading_missing_humidity() {
        let doc = StatusDocument::parse(r#"{"temperature":21.0}"#).unwrap();
        assert!(matches!(
            doc.sensor_reading(),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_top_level_field_wins_over_body() {
        let doc = StatusDocument::parse(
            r#"{"power":"on","brightness":10,"body":{"power":"off","brightness":90}}"#,
        )
        .unwrap();
        let status = doc.light_status().unwrap();
        assert!(status.is_on);
        assert_eq!(status.brightness.get(), 10);
    }

    #[test]
    fn test_not_json() {
        let err = StatusDocument::parse("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_non_object_document() {
        let doc = StatusDocument::parse("[1,2,3]").unwrap();
        assert!(doc.light_status().is_err());
        assert!(doc.sensor_reading().is_err());
    }
}
