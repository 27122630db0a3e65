use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Map, Value};
use sitegen_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{ "error": message, "code": CODE, ...details }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sitegen_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing, malformed, or expired credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, machine code, message, and extra body fields for one error.
struct ErrorBody {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Map<String, Value>,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Map::new(),
        }
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

fn classify_core_error(err: &CoreError) -> ErrorBody {
    match err {
        CoreError::NotFound { entity, id } => ErrorBody::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => {
            ErrorBody::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        CoreError::Forbidden(msg) => ErrorBody::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::InvalidStateTransition { from, to } => ErrorBody::new(
            StatusCode::CONFLICT,
            "INVALID_STATE_TRANSITION",
            format!("A project in state {from} cannot move to {to}"),
        )
        .with("from", json!(from))
        .with("to", json!(to)),
        CoreError::GuardFailure { guard, reason } => {
            ErrorBody::new(StatusCode::CONFLICT, "GUARD_FAILURE", reason.clone())
                .with("guard", json!(guard))
        }
        CoreError::AiLimitExceeded { action, plan } => ErrorBody::new(
            StatusCode::PAYMENT_REQUIRED,
            "AI_LIMIT_EXCEEDED",
            format!(
                "You are out of {action} credits for this project on the {plan} plan. Upgrade to continue."
            ),
        )
        .with("action", json!(action.as_str()))
        .with("plan", json!(plan)),
        CoreError::AiCooldownActive { seconds_remaining } => {
            let retry_after = seconds_remaining.ceil() as u64;
            ErrorBody::new(
                StatusCode::TOO_MANY_REQUESTS,
                "AI_COOLDOWN_ACTIVE",
                format!("Please wait {retry_after} seconds before the next AI request."),
            )
            .with("retry_after_secs", json!(retry_after))
        }
        CoreError::AiRateLimited => ErrorBody::new(
            StatusCode::TOO_MANY_REQUESTS,
            "AI_RATE_LIMITED",
            "Too many AI requests. Try again in a minute.",
        ),
        CoreError::AiGeneration { stage, detail } => {
            tracing::warn!(stage = %stage, detail = %detail, "AI generation failed");
            ErrorBody::new(
                StatusCode::BAD_GATEWAY,
                "AI_GENERATION_FAILED",
                "The AI service could not produce a usable result. Restart planning to try again.",
            )
            .with("stage", json!(stage))
        }
        CoreError::AiValidation { issues } => ErrorBody::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "AI_VALIDATION_FAILED",
            "The generated site failed safety checks.",
        )
        .with("issues", json!(issues)),
        CoreError::ProjectLimitReached { plan } => ErrorBody::new(
            StatusCode::PAYMENT_REQUIRED,
            "PROJECT_LIMIT_REACHED",
            format!("The {plan} plan does not allow more projects. Upgrade to create another."),
        )
        .with("plan", json!(plan)),
        CoreError::Storage(msg) => {
            tracing::error!(error = %msg, "Storage error");
            ErrorBody::internal()
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            ErrorBody::internal()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::Unauthorized(msg) => {
                ErrorBody::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorBody::internal()
            }
        };

        let mut json = body.details;
        json.insert("error".into(), Value::String(body.message));
        json.insert("code".into(), Value::String(body.code.to_string()));

        (body.status, axum::Json(Value::Object(json))).into_response()
    }
}
