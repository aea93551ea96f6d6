//! Shared wire types for the registry protocol and the local API.
//!
//! Everything the rover exchanges with the outside world lives here: the
//! record the remote registry hands back on register/lookup, the inbound
//! motor command message, and the outbound sensor event payload.
//!
//! # Example
//!
//! ```
//! use roverd::messages::CommandMessage;
//!
//! let json = r#"{"command": "START_MOTOR", "pin": 9, "speed": 50.0}"#;
//! let msg: CommandMessage = serde_json::from_str(json).unwrap();
//! assert_eq!(msg.pin, 9);
//! assert_eq!(msg.speed, Some(50.0));
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::traits::PinId;

// ============================================================================
// Registry Records
// ============================================================================

/// Sensor pin numbers assigned by the remote controller.
///
/// Delivered exactly once from the registration coordinator to the sensor
/// poller via a watch channel; until it arrives the poller has no sensors
/// and its iterations are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    /// Pin wired to the left IR sensor.
    pub left_eye: PinId,
    /// Pin wired to the right IR sensor.
    pub right_eye: PinId,
}

/// A rover record as returned by the remote registry.
///
/// The registry serves `id` as either a JSON number or a string depending
/// on endpoint; both are accepted and normalized to a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoverRecord {
    /// Identifier assigned by the remote controller.
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    /// Pin assigned to the left IR sensor.
    pub left_eye_pin: PinId,
    /// Pin assigned to the right IR sensor.
    pub right_eye_pin: PinId,
}

impl RoverRecord {
    /// Extract the sensor pin assignment from this record.
    pub fn pins(&self) -> PinAssignment {
        PinAssignment {
            left_eye: self.left_eye_pin,
            right_eye: self.right_eye_pin,
        }
    }
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "rover id must be a string or number, got {other}"
        ))),
    }
}

// ============================================================================
// Command Messages
// ============================================================================

/// Inbound motor command message.
///
/// Delivered via `POST /api/v1/sendcommand` and echoed back verbatim in the
/// response. `speed` is only meaningful for `START_MOTOR`.
///
/// # JSON Examples
///
/// ```json
/// {"command": "START_MOTOR", "pin": 9, "speed": 50.0}
/// ```
///
/// ```json
/// {"command": "STOP_MOTOR", "pin": 9}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMessage {
    /// Command verb, matched against [`RoverCommand`](crate::commands::RoverCommand).
    pub command: String,
    /// Motor pin the command applies to.
    pub pin: PinId,
    /// Duty-cycle percentage for `START_MOTOR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

// ============================================================================
// Sensor Events
// ============================================================================

/// A binary-sensor transition event.
///
/// Serialized as `{"data": "<event_name>"}` on the outbound event channel,
/// matching what remote clients expect on the `binary_sensors` stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorEvent {
    /// Name of the edge event, e.g. `leftEyeCovered`.
    pub data: String,
}

impl SensorEvent {
    /// Create an event carrying the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { data: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rover_record_with_numeric_id() {
        let json = r#"{"id": 7, "left_eye_pin": 3, "right_eye_pin": 4}"#;
        let record: RoverRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "7");
        assert_eq!(record.left_eye_pin, 3);
        assert_eq!(record.right_eye_pin, 4);
    }

    #[test]
    fn rover_record_with_string_id() {
        let json = r#"{"id": "7", "left_eye_pin": 3, "right_eye_pin": 4}"#;
        let record: RoverRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "7");
    }

    #[test]
    fn rover_record_missing_pin_is_error() {
        let json = r#"{"id": 7, "left_eye_pin": 3}"#;
        let result: Result<RoverRecord, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn rover_record_bool_id_is_error() {
        let json = r#"{"id": true, "left_eye_pin": 3, "right_eye_pin": 4}"#;
        let result: Result<RoverRecord, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn pin_assignment_from_record() {
        let record = RoverRecord {
            id: "12".into(),
            left_eye_pin: 3,
            right_eye_pin: 4,
        };
        let pins = record.pins();
        assert_eq!(pins.left_eye, 3);
        assert_eq!(pins.right_eye, 4);
    }

    #[test]
    fn command_message_speed_defaults_to_none() {
        let json = r#"{"command": "STOP_MOTOR", "pin": 9}"#;
        let msg: CommandMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.speed, None);
    }

    #[test]
    fn command_message_none_speed_not_serialized() {
        let msg = CommandMessage {
            command: "STOP_MOTOR".into(),
            pin: 9,
            speed: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("speed"));
    }

    #[test]
    fn sensor_event_payload_shape() {
        let event = SensorEvent::new("leftEyeCovered");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"data":"leftEyeCovered"}"#);
    }
}
