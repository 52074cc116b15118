use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gift_core::GiftError;

#[derive(Debug)]
pub struct GiftAxumError(pub GiftError);

impl From<GiftError> for GiftAxumError {
    fn from(e: GiftError) -> Self {
        Self(e)
    }
}

impl IntoResponse for GiftAxumError {
    fn into_response(self) -> Response {
        // Feathers-ish fields; the body never distinguishes a purged gift
        // from a token that was always invalid.
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.to_json())).into_response()
    }
}
