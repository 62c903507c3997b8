//! Wire envelopes for the call/response channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Retcodes that fail the originating call.
pub const BAD_RETCODES: [i64; 4] = [1400, 1401, 1403, 1404];

/// Outbound envelope for actions. `echo` is the correlation id the server
/// reflects back on the response; fire-and-forget sends omit it.
#[derive(Debug, Clone, Serialize)]
pub struct CallEnvelope<P> {
    pub action: &'static str,
    pub params: P,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo: Option<String>,
}

/// Inbound response envelope, still untyped: `data` is decoded against the
/// registered response shape only after correlation and status checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawApiResponse {
    pub status: String,
    pub retcode: i64,
    #[serde(default)]
    pub data: Value,
    pub echo: String,
}

impl RawApiResponse {
    /// Whether the retcode is in the defined bad-status set.
    pub fn is_bad_status(&self) -> bool {
        BAD_RETCODES.contains(&self.retcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_envelope_omits_absent_echo() {
        let envelope = CallEnvelope {
            action: "clean_cache",
            params: serde_json::json!({}),
            echo: None,
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"action":"clean_cache","params":{}}"#);
    }

    #[test]
    fn test_bad_status_set() {
        for retcode in [1400, 1401, 1403, 1404] {
            let response = RawApiResponse {
                status: "failed".to_string(),
                retcode,
                data: Value::Null,
                echo: "0".to_string(),
            };
            assert!(response.is_bad_status());
        }

        let ok = RawApiResponse {
            status: "ok".to_string(),
            retcode: 0,
            data: Value::Null,
            echo: "0".to_string(),
        };
        assert!(!ok.is_bad_status());
    }
}
