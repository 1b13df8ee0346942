use serde::Serialize;
use serde_json::{Map, Value};
use tickvault_core::RetrievalError;

use crate::error::CliError;

/// Response envelope written to stdout.
///
/// Each command's fields sit next to `success`:
///
/// ```json
/// { "success": true, "data": { ... } }
/// { "success": true, "stocks": [ ... ] }
/// { "success": false, "error": { "kind": "rate_limited", "message": "..." } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(flatten)]
    pub body: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RetrievalError>,
}

impl Envelope {
    /// An object's fields are lifted to the top level; any other value is
    /// placed under `data`.
    pub fn ok(payload: Value) -> Self {
        let body = match payload {
            Value::Object(fields) => fields,
            other => {
                let mut fields = Map::new();
                fields.insert(String::from("data"), other);
                fields
            }
        };
        Self {
            success: true,
            body,
            error: None,
        }
    }

    pub fn failure(error: RetrievalError) -> Self {
        Self {
            success: false,
            body: Map::new(),
            error: Some(error),
        }
    }
}

pub fn to_json(envelope: &Envelope, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    Ok(payload)
}

pub fn render(envelope: &Envelope, pretty: bool) -> Result<(), CliError> {
    println!("{}", to_json(envelope, pretty)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tickvault_core::ErrorKind;

    #[test]
    fn success_envelope_lifts_fields_next_to_success() {
        let envelope = Envelope::ok(json!({"stocks": [{"symbol": "VOO"}]}));
        let rendered = to_json(&envelope, false).expect("serializes");
        assert_eq!(rendered, r#"{"success":true,"stocks":[{"symbol":"VOO"}]}"#);
    }

    #[test]
    fn non_object_payload_is_placed_under_data() {
        let envelope = Envelope::ok(json!([1, 2]));
        let value: Value =
            serde_json::from_str(&to_json(&envelope, false).expect("serializes")).expect("json");
        assert_eq!(value, json!({"success": true, "data": [1, 2]}));
    }

    #[test]
    fn failure_envelope_carries_kind_and_message() {
        let envelope = Envelope::failure(RetrievalError::new(
            ErrorKind::RateLimited,
            "API limit: 25 requests per day",
        ));
        let value: Value =
            serde_json::from_str(&to_json(&envelope, true).expect("serializes")).expect("json");
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": {"kind": "rate_limited", "message": "API limit: 25 requests per day"}
            })
        );
    }
}
