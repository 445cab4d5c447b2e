use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chatops_dispatch::DispatchError;
use chatops_slack::{render_error, CommandParseError, SignatureError, SlackEventError};
use serde_json::Value;

/// Request failure rendered as `{status: "error", message, code}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl GatewayApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn deadline_exceeded() -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            "deadline_exceeded",
            "request deadline exceeded",
        )
    }
}

impl From<SignatureError> for GatewayApiError {
    fn from(error: SignatureError) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid_signature", error.to_string())
    }
}

impl From<CommandParseError> for GatewayApiError {
    fn from(error: CommandParseError) -> Self {
        Self::bad_request("invalid_command", error.to_string())
    }
}

impl From<SlackEventError> for GatewayApiError {
    fn from(error: SlackEventError) -> Self {
        let code = match &error {
            SlackEventError::UnsupportedEventType(_) => "unsupported_event",
            SlackEventError::UnknownCommandType(_) => "unknown_command_type",
            SlackEventError::InvalidPayload(_) | SlackEventError::MissingField(_) => {
                "invalid_event"
            }
        };
        Self::bad_request(code, error.to_string())
    }
}

impl From<DispatchError> for GatewayApiError {
    fn from(error: DispatchError) -> Self {
        let status = match &error {
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::AlreadyExists(_) => StatusCode::CONFLICT,
            DispatchError::Enrichment(_) => StatusCode::BAD_GATEWAY,
            DispatchError::IntegrationNotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.code(), error.to_string())
    }
}

impl IntoResponse for GatewayApiError {
    fn into_response(self) -> Response {
        let mut body = render_error(&self.message);
        body["code"] = Value::String(self.code.to_string());
        (self.status, Json(body)).into_response()
    }
}
