use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};

use super::models::ErrorResponse;
use crate::error::LedgerError;

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::StaleBlock { .. } => StatusCode::CONFLICT,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        })
    }
}

/// 400 for requests that never reached a ledger rule.
pub fn malformed(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "malformed_request".to_string(),
        message: message.into(),
    })
}

/// 403 for dev-only endpoints switched off by configuration.
pub fn disabled(kind: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Forbidden().json(ErrorResponse {
        error: kind.to_string(),
        message: message.into(),
    })
}

/// JSON extractor failures become the same 400 body.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = malformed(err.to_string());
    InternalError::from_response(err, response).into()
}
