use crate::config::ConfigError;
use crate::safety::activity::ActivityImportError;
use crate::safety::csr::{CsrServiceError, ProviderError, SnapshotError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Snapshot(SnapshotError),
    Rating(CsrServiceError),
    Activity(ActivityImportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "invalid json: {}", err),
            AppError::Snapshot(err) => write!(f, "snapshot rejected: {}", err),
            AppError::Rating(err) => write!(f, "rating error: {}", err),
            AppError::Activity(err) => write!(f, "activity import error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Snapshot(err) => Some(err),
            AppError::Rating(err) => Some(err),
            AppError::Activity(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Json(_) | AppError::Activity(_) => StatusCode::BAD_REQUEST,
            AppError::Snapshot(_) | AppError::Rating(CsrServiceError::Snapshot(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Rating(CsrServiceError::Provider(
                ProviderError::UnknownCompany(_) | ProviderError::UnknownVendor(_),
            )) => StatusCode::NOT_FOUND,
            AppError::Rating(CsrServiceError::Provider(ProviderError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
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

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<SnapshotError> for AppError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<CsrServiceError> for AppError {
    fn from(value: CsrServiceError) -> Self {
        Self::Rating(value)
    }
}

impl From<ActivityImportError> for AppError {
    fn from(value: ActivityImportError) -> Self {
        Self::Activity(value)
    }
}
