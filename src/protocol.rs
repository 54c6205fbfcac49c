/// Messages exchanged between the background, content and popup contexts

use crate::config::PROTOCOL_VERSION;
use serde::{Deserialize, Serialize};

/// A request, tagged by its `action` field on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    /// Content agent finished initialising in a tab
    ContentScriptLoaded,
    /// Content agent added an identifier to the history
    BvCopied {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bv: Option<String>,
    },
    /// Popup switched extraction mode
    ToggleBvMode { enabled: bool },
    /// Popup cleared the history; strip marks from the page
    ClearCopiedMarks,
    /// Liveness probe
    CheckContentScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    BackgroundReceived,
    Success,
    Alive,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    fn with_status(status: Status) -> Self {
        Response {
            status,
            version: None,
            message: None,
        }
    }

    pub fn success() -> Self {
        Self::with_status(Status::Success)
    }

    pub fn background_received() -> Self {
        Self::with_status(Status::BackgroundReceived)
    }

    pub fn alive() -> Self {
        Response {
            version: Some(PROTOCOL_VERSION.to_string()),
            ..Self::with_status(Status::Alive)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response {
            message: Some(message.into()),
            ..Self::with_status(Status::Error)
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == Status::Alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_names() {
        assert_eq!(
            serde_json::to_value(Request::ContentScriptLoaded).unwrap(),
            json!({ "action": "CONTENT_SCRIPT_LOADED" })
        );
        assert_eq!(
            serde_json::to_value(Request::ToggleBvMode { enabled: true }).unwrap(),
            json!({ "action": "TOGGLE_BV_MODE", "enabled": true })
        );
        assert_eq!(
            serde_json::to_value(Request::ClearCopiedMarks).unwrap(),
            json!({ "action": "CLEAR_COPIED_MARKS" })
        );
        assert_eq!(
            serde_json::to_value(Request::CheckContentScript).unwrap(),
            json!({ "action": "CHECK_CONTENT_SCRIPT" })
        );
        assert_eq!(
            serde_json::to_value(Request::BvCopied { bv: Some("BV1".into()) }).unwrap(),
            json!({ "action": "BV_COPIED", "bv": "BV1" })
        );
    }

    #[test]
    fn test_bv_copied_payload_is_optional() {
        let request: Request = serde_json::from_value(json!({ "action": "BV_COPIED" })).unwrap();
        assert_eq!(request, Request::BvCopied { bv: None });
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let parsed = serde_json::from_value::<Request>(json!({ "action": "SOMETHING_ELSE" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_alive_response() {
        let json = serde_json::to_value(Response::alive()).unwrap();
        assert_eq!(json, json!({ "status": "alive", "version": "1.0" }));
        assert!(Response::alive().is_alive());
        assert!(!Response::success().is_alive());
    }

    #[test]
    fn test_background_received_response() {
        let json = serde_json::to_value(Response::background_received()).unwrap();
        assert_eq!(json, json!({ "status": "background_received" }));
    }

    #[test]
    fn test_error_response() {
        let json = serde_json::to_value(Response::error("boom")).unwrap();
        assert_eq!(json, json!({ "status": "error", "message": "boom" }));
    }

    #[test]
    fn test_unrecognised_status_parses() {
        let response: Response = serde_json::from_value(json!({ "status": "pending" })).unwrap();
        assert_eq!(response.status, Status::Unknown);
        assert!(!response.is_alive());
    }
}
