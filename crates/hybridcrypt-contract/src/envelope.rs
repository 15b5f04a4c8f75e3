//! Decoding of the `{ success, error, ... }` envelope shared by every endpoint.

use crate::{GatewayError, GatewayResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

const UNKNOWN_ERROR: &str = "unknown error";

/// Decode a JSON reply, surfacing `success: false` as [`GatewayError::Rejected`].
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> GatewayResult<T> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| GatewayError::Malformed(err.to_string()))?;

    let success = value
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| GatewayError::Malformed("missing `success` flag".to_string()))?;

    if !success {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or(UNKNOWN_ERROR);
        return Err(GatewayError::Rejected(message.to_string()));
    }

    serde_json::from_value(value).map_err(|err| GatewayError::Malformed(err.to_string()))
}

/// Acknowledgement-only replies such as `/reset`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Probe {
        value: u32,
    }

    #[test]
    fn success_payload_is_decoded() {
        let probe: Probe = decode_envelope(br#"{"success": true, "value": 7}"#).unwrap();
        assert_eq!(probe.value, 7);
    }

    #[test]
    fn rejection_carries_remote_message() {
        let err = decode_envelope::<Probe>(br#"{"success": false, "error": "locked"}"#)
            .unwrap_err();
        assert_eq!(err, GatewayError::Rejected("locked".into()));
        assert!(!err.is_transport());
    }

    #[test]
    fn rejection_without_message_uses_placeholder() {
        let err = decode_envelope::<Probe>(br#"{"success": false}"#).unwrap_err();
        assert_eq!(err, GatewayError::Rejected(UNKNOWN_ERROR.into()));
    }

    #[test]
    fn missing_flag_or_fields_are_malformed() {
        let err = decode_envelope::<Probe>(br#"{"value": 1}"#).unwrap_err();
        assert!(matches!(err, GatewayError::Malformed(_)));
        assert!(err.is_transport());

        let err = decode_envelope::<Probe>(br#"{"success": true}"#).unwrap_err();
        assert!(matches!(err, GatewayError::Malformed(_)));

        let err = decode_envelope::<Probe>(b"<html>").unwrap_err();
        assert!(matches!(err, GatewayError::Malformed(_)));
    }
}
