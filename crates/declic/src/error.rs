use crate::config::ConfigError;
use crate::survey::SurveySourceError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::warn;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Survey(SurveySourceError),
    Input(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Survey(err) => write!(f, "survey error: {}", err),
            AppError::Input(detail) => write!(f, "invalid input: {}", detail),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Survey(err) => Some(err),
            AppError::Input(_) => None,
        }
    }
}

/// Unknown documents are 404 and rejected names or input are 400. Stored
/// documents that fail to parse or validate are a server fault.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Survey(SurveySourceError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Survey(SurveySourceError::InvalidName(_)) | AppError::Input(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Survey(
                SurveySourceError::Io { .. }
                | SurveySourceError::Json { .. }
                | SurveySourceError::InvalidModule(_)
                | SurveySourceError::InvalidConfig(_)
                | SurveySourceError::UnexpectedBehavior { .. },
            ) => {
                warn!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SurveySourceError> for AppError {
    fn from(value: SurveySourceError) -> Self {
        Self::Survey(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_documents_map_to_not_found() {
        let err = AppError::from(SurveySourceError::NotFound("gaming.json".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn rejected_names_map_to_bad_request() {
        let err = AppError::from(SurveySourceError::InvalidName("../.env".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn broken_stored_documents_map_to_internal_error() {
        let json =
            serde_json::from_str::<serde_json::Value>("{ not json").expect_err("garbled");
        let err = AppError::from(SurveySourceError::Json {
            file: "alcohol.json".to_string(),
            source: json,
        });

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn input_errors_map_to_bad_request() {
        let err = AppError::Input("answers file is not valid JSON".to_string());
        assert_eq!(
            err.to_string(),
            "invalid input: answers file is not valid JSON"
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
