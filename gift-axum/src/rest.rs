use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use gift_core::{
    CreateGift, GiftCreated, GiftError, GiftToken, GiftView, PhotoUpload, Section, SectionView,
};

use crate::{GiftAxumError, GiftAxumState};

fn malformed(e: axum::extract::multipart::MultipartError) -> GiftAxumError {
    GiftError::validation(format!("malformed multipart body: {e}")).into()
}

/// POST /gifts
///
/// Multipart form: `creator_name`, `lover_name`, `letter_text`,
/// `promise_text` as text fields plus one `photos` file field per photo.
/// Field-level validation lives in the lifecycle, so blanks and bad photo
/// shapes all come back through the same 422 envelope.
pub async fn create_gift(
    State(state): State<GiftAxumState>,
    mut multipart: Multipart,
) -> Result<Json<GiftCreated>, GiftAxumError> {
    let mut req = CreateGift::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "creator_name" => req.creator_name = field.text().await.map_err(malformed)?,
            "lover_name" => req.lover_name = field.text().await.map_err(malformed)?,
            "letter_text" => req.letter_text = field.text().await.map_err(malformed)?,
            "promise_text" => req.promise_text = field.text().await.map_err(malformed)?,
            "photos" => {
                let filename = field.file_name().unwrap_or("photo").to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());
                let bytes = field.bytes().await.map_err(malformed)?;
                req.photos.push(PhotoUpload {
                    filename,
                    content_type,
                    bytes,
                });
            }
            // Unknown fields are ignored rather than rejected.
            _ => {}
        }
    }

    let created = state.lifecycle.create_gift(req).await?;
    Ok(Json(created))
}

/// GET /gifts/{token}
///
/// Reads the whole gift without flipping any viewed flag.
pub async fn fetch_gift(
    State(state): State<GiftAxumState>,
    Path(token): Path<String>,
) -> Result<Json<GiftView>, GiftAxumError> {
    let token = GiftToken::from_string(token);
    let view = state.lifecycle.fetch_gift(&token).await?;
    Ok(Json(view))
}

/// POST /gifts/{token}/view/{section}
///
/// Serves one section and records that it was seen. The view that turns
/// the last flag also triggers the purge, so a later call 404s.
pub async fn view_section(
    State(state): State<GiftAxumState>,
    Path((token, section)): Path<(String, String)>,
) -> Result<Json<SectionView>, GiftAxumError> {
    let token = GiftToken::from_string(token);
    let section: Section = section.parse()?;
    let view = state.lifecycle.view_section(&token, section).await?;
    Ok(Json(view))
}

pub async fn health() -> &'static str {
    "ok"
}
