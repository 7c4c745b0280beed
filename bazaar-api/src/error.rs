use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bazaar_order::{FulfillmentError, OrderError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    Fulfillment(FulfillmentError),
    Order(OrderError),
    Anyhow(anyhow::Error),
}

impl AppError {
    fn parts(self) -> (StatusCode, String, &'static str) {
        match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "INVALID_INPUT"),
            AppError::Fulfillment(err) => {
                let status = status_from(err.http_status());
                if status.is_server_error() {
                    tracing::error!(code = err.code(), error = ?err, "Order fulfillment failed");
                }
                (status, err.to_string(), err.code())
            }
            AppError::Order(OrderError::Store(err)) => {
                tracing::error!("Order store failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                    "PERSISTENCE_ERROR",
                )
            }
            AppError::Order(err) => (status_from(err.http_status()), err.to_string(), err.code()),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        }
    }
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = self.parts();

        let body = Json(json!({
            "error": error_message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

impl From<FulfillmentError> for AppError {
    fn from(err: FulfillmentError) -> Self {
        Self::Fulfillment(err)
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        Self::Order(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
