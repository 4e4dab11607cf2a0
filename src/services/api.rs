//! API request and response types for the HTTP service.

use serde::{Deserialize, Serialize};

use crate::catalog::{CandidateFunction, CapabilityClass, PinDescriptor};
use crate::store::{ConfigIntent, PinConfiguration, VisualClass};
use crate::sync::SendOutcome;

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /api/pins/:id`.
///
/// ```json
/// {"function": "PWM", "freq": "2000", "duty": 70}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CommitRequest {
    /// Candidate label or bare kind name
    pub function: String,
    /// Direction and parameters
    #[serde(flatten)]
    pub intent: ConfigIntent,
}

/// Body of `POST /api/pins/:id/state`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PinStateRequest {
    /// 0 for LOW, anything else for HIGH
    pub value: u8,
}

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// One pin of the board, as listed by `GET /api/pins`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinSummary {
    /// Pin id
    pub id: &'static str,
    /// Descriptive label
    pub label: &'static str,
    /// Hardware class
    pub capability: CapabilityClass,
    /// PWM offered on this pin
    pub supports_pwm: bool,
    /// Candidate functions in display order
    pub candidates: Vec<CandidateFunction>,
    /// Current visual class
    pub visual_class: VisualClass,
}

impl PinSummary {
    /// Summary of a catalog pin with its current class.
    pub fn new(pin: &PinDescriptor, visual_class: VisualClass) -> Self {
        Self {
            id: pin.id,
            label: pin.label,
            capability: pin.capability,
            supports_pwm: pin.supports_pwm,
            candidates: pin.candidates.clone(),
            visual_class,
        }
    }
}

/// Result of a command that reaches the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// False when the command was dropped
    pub accepted: bool,
    /// `sent`, `queued` or `dropped`
    pub delivery: String,
}

impl From<SendOutcome> for CommandResponse {
    fn from(outcome: SendOutcome) -> Self {
        Self {
            accepted: outcome.is_delivered_or_pending(),
            delivery: outcome.as_str().to_string(),
        }
    }
}

/// Result of `POST /api/pins/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct CommitResponse {
    /// Configuration as stored
    pub config: PinConfiguration,
    /// What happened to the `configurePin` command
    #[serde(flatten)]
    pub command: CommandResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PinCatalog;
    use crate::store::{GpioDirection, NumericInput};
    use crate::sync::DropReason;

    #[test]
    fn test_commit_request_serde() {
        let req: CommitRequest =
            serde_json::from_str(r#"{"function":"PWM","freq":"abc","duty":70}"#).unwrap();
        assert_eq!(req.function, "PWM");
        assert_eq!(req.intent.freq, Some(NumericInput::Text("abc".into())));
        assert_eq!(req.intent.duty, Some(NumericInput::Int(70)));
        assert_eq!(req.intent.phase, None);
    }

    #[test]
    fn test_commit_request_direction() {
        let req: CommitRequest =
            serde_json::from_str(r#"{"function":"GPIO","direction":"Output"}"#).unwrap();
        assert_eq!(req.intent.direction, Some(GpioDirection::Output));
    }

    #[test]
    fn test_pin_state_request() {
        let req: PinStateRequest = serde_json::from_str(r#"{"value":1}"#).unwrap();
        assert_eq!(req.value, 1);
        assert!(serde_json::from_str::<PinStateRequest>(r#"{"value":"high"}"#).is_err());
    }

    #[test]
    fn test_api_response_ok() {
        let json = serde_json::to_string(&ApiResponse::ok(1)).unwrap();
        assert_eq!(json, r#"{"success":true,"data":1}"#);
    }

    #[test]
    fn test_api_response_err() {
        let json = serde_json::to_string(&ApiResponse::<()>::err("nope")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"nope"}"#);
    }

    #[test]
    fn test_command_response_from_outcome() {
        let resp = CommandResponse::from(SendOutcome::Dropped(DropReason::NotConnected));
        assert!(!resp.accepted);
        assert_eq!(resp.delivery, "dropped");
        assert!(CommandResponse::from(SendOutcome::Queued).accepted);
    }

    #[test]
    fn test_pin_summary_json() {
        let catalog = PinCatalog::esp32_devkit();
        let summary = PinSummary::new(catalog.classify("IO34").unwrap(), VisualClass::Unconfigured);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["capability"], "input_only");
        assert_eq!(json["supportsPwm"], false);
        assert_eq!(json["visualClass"], "neconfig");
        assert_eq!(json["candidates"][1]["label"], "ADC1-6");
        assert_eq!(json["candidates"][1]["kind"], "ADC");
    }
}
