use super::{device_type::DeviceType, event_type::EventType};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One immutable row of the attendance log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    pub id: i64,                     // ⇔ attendance_events.id (also the insertion sequence)
    pub user_id: String,             // ⇔ attendance_events.user_id
    pub event_type: EventType,       // ⇔ attendance_events.event_type ('CHECK_IN' | 'CHECK_OUT')
    pub timestamp: DateTime<Utc>,    // ⇔ attendance_events.timestamp_ms (INT, UTC millis)
    pub latitude: Option<f64>,       // ⇔ attendance_events.latitude
    pub longitude: Option<f64>,      // ⇔ attendance_events.longitude
    pub accuracy: Option<f64>,       // ⇔ attendance_events.accuracy
    pub location_id: Option<String>, // ⇔ attendance_events.location_id
    pub task_id: Option<String>,     // ⇔ attendance_events.task_id
    pub device_type: DeviceType,     // ⇔ attendance_events.device_type (default 'MOBILE')
}

impl AttendanceEvent {
    pub fn timestamp_str(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn is_check_in(&self) -> bool {
        self.event_type.is_in()
    }
}

/// Optional data a client may attach to a check-in or check-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub location_id: Option<String>,
    pub task_id: Option<String>,
    pub device_type: Option<DeviceType>,
}

impl EventPayload {
    /// Parse a request body. An empty body is an empty payload.
    pub fn from_json_bytes(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| AppError::Validation(e.to_string()))
    }

    /// Check the correlated and bounded fields.
    pub fn validate(&self) -> AppResult<()> {
        if self.latitude.is_some() != self.longitude.is_some() {
            return Err(AppError::Validation(
                "latitude and longitude must be provided together".into(),
            ));
        }

        if let Some(lat) = self.latitude
            && (!lat.is_finite() || !(-90.0..=90.0).contains(&lat))
        {
            return Err(AppError::Validation(format!(
                "latitude must be between -90 and 90, got {lat}"
            )));
        }

        if let Some(lon) = self.longitude
            && (!lon.is_finite() || !(-180.0..=180.0).contains(&lon))
        {
            return Err(AppError::Validation(format!(
                "longitude must be between -180 and 180, got {lon}"
            )));
        }

        if let Some(acc) = self.accuracy
            && (!acc.is_finite() || acc < 0.0)
        {
            return Err(AppError::Validation(format!(
                "accuracy must be a non-negative number, got {acc}"
            )));
        }

        if matches!(&self.location_id, Some(s) if s.trim().is_empty()) {
            return Err(AppError::Validation("locationId must not be empty".into()));
        }

        if matches!(&self.task_id, Some(s) if s.trim().is_empty()) {
            return Err(AppError::Validation("taskId must not be empty".into()));
        }

        Ok(())
    }
}

/// An event about to be appended; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub user_id: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl NewEvent {
    pub fn into_event(self, id: i64) -> AttendanceEvent {
        AttendanceEvent {
            id,
            user_id: self.user_id,
            event_type: self.event_type,
            timestamp: self.timestamp,
            latitude: self.payload.latitude,
            longitude: self.payload.longitude,
            accuracy: self.payload.accuracy,
            location_id: self.payload.location_id,
            task_id: self.payload.task_id,
            device_type: self.payload.device_type.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_empty_payload() {
        let p = EventPayload::from_json_bytes(b"  ").unwrap();
        assert_eq!(p, EventPayload::default());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn latitude_without_longitude_is_rejected() {
        let p = EventPayload::from_json_bytes(br#"{"latitude": 45.1}"#).unwrap();
        let err = p.validate().unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("together"));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let p = EventPayload {
            latitude: Some(91.0),
            longitude: Some(10.0),
            ..Default::default()
        };
        assert!(p.validate().is_err());

        let p = EventPayload {
            latitude: Some(45.0),
            longitude: Some(-181.0),
            ..Default::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn unknown_device_type_is_an_input_error() {
        let err = EventPayload::from_json_bytes(br#"{"deviceType": "TABLET"}"#).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn full_payload_is_accepted() {
        let p = EventPayload::from_json_bytes(
            br#"{"latitude": 45.46, "longitude": 9.19, "accuracy": 12.5,
                 "locationId": "hq", "taskId": "t-1", "deviceType": "DESKTOP"}"#,
        )
        .unwrap();
        assert!(p.validate().is_ok());
        assert_eq!(p.device_type, Some(DeviceType::Desktop));
    }
}
