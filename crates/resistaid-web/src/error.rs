//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use resistaid_common::ResistaidError;
use resistaid_db::DbError;
use serde_json::json;
use tracing::{error, warn};

/// Pipeline error rendered as a JSON `{error}` body.
#[derive(Debug)]
pub struct ApiError(pub ResistaidError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ResistaidError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ResistaidError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ResistaidError::CollectionNotFound(_) => StatusCode::NOT_FOUND,
            ResistaidError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ResistaidError::NoTemplates => StatusCode::UNPROCESSABLE_ENTITY,
            ResistaidError::Cancelled(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ResistaidError> for ApiError {
    fn from(e: ResistaidError) -> Self {
        Self(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.0.kind(), error = %self.0, "Request failed");
        } else {
            warn!(kind = self.0.kind(), error = %self.0, "Request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ResistaidError::InvalidQuery("empty".into()), StatusCode::BAD_REQUEST),
            (ResistaidError::StoreUnavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (ResistaidError::CollectionNotFound("images".into()), StatusCode::NOT_FOUND),
            (ResistaidError::timeout("search", Duration::from_secs(1)), StatusCode::GATEWAY_TIMEOUT),
            (ResistaidError::NoTemplates, StatusCode::UNPROCESSABLE_ENTITY),
            (ResistaidError::Cancelled("scoring".into()), StatusCode::CONFLICT),
            (ResistaidError::Config("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn test_db_error_keeps_kind() {
        let e = ApiError::from(DbError::CollectionNotFound("lab_notes".into()));
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
    }
}
