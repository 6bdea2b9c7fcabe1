//! Request and response bodies for the three delivery protocols and the
//! submission endpoint.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::event::{Event, Offset};

/// A frame on the push channel.
///
/// Encoded as `{ "kind": "INIT" | "DRAW", "payload": ... }`. The server sends
/// one `INIT` carrying the full log on connect, then one `DRAW` per appended
/// event. Clients may also send `DRAW` frames to submit an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "payload", rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum PushMessage {
    /// Snapshot of every event in the log at subscription time.
    Init(Vec<Event>),
    /// A single event appended after the snapshot.
    Draw(Event),
}

/// Query string accepted by both poll endpoints.
///
/// `lastUpdate` is kept as text so out-of-range integers can be clamped
/// instead of rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollQuery {
    /// Raw client offset; missing or empty means 0.
    pub last_update: Option<String>,
}

impl PollQuery {
    /// The raw offset with the default applied.
    ///
    /// Integers beyond `i64` saturate to `i64::MAX`/`i64::MIN`, which the
    /// log then clamps to `[0, len]`. Returns `None` only when the value is
    /// not an integer at all.
    pub fn raw_offset(&self) -> Option<i64> {
        let Some(value) = self.last_update.as_deref().map(str::trim) else {
            return Some(0);
        };
        if value.is_empty() {
            return Some(0);
        }
        if let Ok(parsed) = value.parse::<i64>() {
            return Some(parsed);
        }
        let (negative, digits) = match value.as_bytes().first() {
            Some(b'-') => (true, value.get(1..).unwrap_or_default()),
            Some(b'+') => (false, value.get(1..).unwrap_or_default()),
            _ => (false, value),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(if negative { i64::MIN } else { i64::MAX })
    }
}

/// Body returned by the long-poll and adaptive-poll endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PollResponse {
    /// Events the client has not seen yet, in log order.
    pub data: Vec<Event>,
    /// Offset to send with the next request.
    pub last_update: Offset,
}

/// Body accepted by `POST /draw`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DrawRequest {
    /// The event to append.
    pub data: Event,
}

/// Outcome marker in a [`DrawResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum DrawStatus {
    /// The event was appended.
    Success,
}

/// Body returned by `POST /draw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DrawResponse {
    /// Always [`DrawStatus::Success`] when the event was accepted.
    pub status: DrawStatus,
    /// Server receive time minus the event's timestamp, in milliseconds.
    #[ts(type = "number")]
    pub response_time: i64,
}

impl DrawResponse {
    /// Build a success response carrying the measured response time.
    pub const fn success(response_time: i64) -> Self {
        Self {
            status: DrawStatus::Success,
            response_time,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Event {
        Event {
            x: 1.0,
            y: 2.0,
            timestamp: 100,
        }
    }

    #[test]
    fn init_frame_is_tagged() {
        let json = serde_json::to_value(PushMessage::Init(vec![sample()])).unwrap();
        assert_eq!(json["kind"], "INIT");
        assert_eq!(json["payload"][0]["timestamp"], 100);
    }

    #[test]
    fn draw_frame_parses_from_client_text() {
        let text = r#"{"kind":"DRAW","payload":{"x":1,"y":2,"timestamp":100}}"#;
        let msg: PushMessage = serde_json::from_str(text).unwrap();
        assert_eq!(msg, PushMessage::Draw(sample()));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let text = r#"{"kind":"ERASE","payload":{}}"#;
        assert!(serde_json::from_str::<PushMessage>(text).is_err());
    }

    #[test]
    fn poll_response_uses_last_update_key() {
        let body = PollResponse {
            data: Vec::new(),
            last_update: Offset(3),
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({ "data": [], "lastUpdate": 3 }));
    }

    #[test]
    fn draw_response_shape() {
        let json = serde_json::to_value(DrawResponse::success(42)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "success", "responseTime": 42 })
        );
    }

    fn query(value: &str) -> PollQuery {
        PollQuery {
            last_update: Some(value.to_owned()),
        }
    }

    #[test]
    fn poll_query_defaults_to_zero() {
        assert_eq!(PollQuery::default().raw_offset(), Some(0));
        assert_eq!(query("").raw_offset(), Some(0));
    }

    #[test]
    fn poll_query_parses_plain_integers() {
        assert_eq!(query("7").raw_offset(), Some(7));
        assert_eq!(query("-3").raw_offset(), Some(-3));
    }

    #[test]
    fn poll_query_saturates_oversized_integers() {
        assert_eq!(query("99999999999999999999").raw_offset(), Some(i64::MAX));
        assert_eq!(query("-99999999999999999999").raw_offset(), Some(i64::MIN));
    }

    #[test]
    fn poll_query_rejects_non_integers() {
        assert_eq!(query("abc").raw_offset(), None);
        assert_eq!(query("1.5").raw_offset(), None);
        assert_eq!(query("-").raw_offset(), None);
    }
}
