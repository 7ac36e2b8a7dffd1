use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::export::{
    self, download, PDF_CONTENT_TYPE, PREVIEW_PDF_FILE_NAME, PREVIEW_SCALE,
    SPREADSHEET_FILE_NAME, XLSX_CONTENT_TYPE,
};
use crate::intake::form::render_form_page;
use crate::intake::submit::{submit, FormValues};
use crate::intake::upload::{decode_upload, upload_image};
use crate::models::{ApplicationRecord, ImageSlot};
use crate::presentation::view::DocumentView;
use crate::routes::{DOCUMENT_ROUTE, INTAKE_ROUTE};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct FormQuery {
    pub registered: Option<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub slot: ImageSlot,
    pub accepted: bool,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed form upload: {e}"))
}

/// GET /
///
/// A plain visit opens a fresh form session and drops any pending images. The
/// post-register redirect (`?registered=1`) keeps them.
pub async fn handle_form(
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
) -> Result<Html<String>, AppError> {
    let record = state.store.get().await?;
    let registered = query.registered.is_some_and(|v| v == "1");
    let draft = {
        let mut draft = state.draft.lock().await;
        if !registered {
            draft.clear();
        }
        draft.clone()
    };
    Ok(Html(render_form_page(
        &draft,
        record.as_ref(),
        registered,
        state.config.logo_path.is_some(),
    )))
}

/// POST /register
///
/// File parts go through the image upload path; every other part is a form
/// value. Accepted images reach the draft only once the whole body has been
/// read, so a malformed request leaves the draft untouched. The merged record
/// then replaces the stored one.
pub async fn handle_register(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut values = FormValues::from_html_form();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if let Some(slot) = ImageSlot::from_form_field(&name) {
            let bytes = field.bytes().await.map_err(multipart_error)?;
            // No file chosen.
            if bytes.is_empty() {
                continue;
            }
            match decode_upload(bytes.to_vec()).await {
                Some(uri) => uploads.push((slot, uri)),
                None => debug!("Upload for {slot} slot was not accepted"),
            }
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            if !values.set_field(&name, value) {
                debug!("Ignoring unknown form field '{name}'");
            }
        }
    }

    let draft = {
        let mut draft = state.draft.lock().await;
        for (slot, uri) in uploads {
            draft.set(slot, uri);
        }
        draft.clone()
    };
    submit(state.store.as_ref(), values, &draft).await?;
    Ok(Redirect::to(&format!("{INTAKE_ROUTE}?registered=1")))
}

/// POST /api/v1/intake/images/:slot
pub async fn handle_upload_image(
    State(state): State<AppState>,
    Path(slot): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let slot: ImageSlot = slot.parse().map_err(AppError::Validation)?;

    let mut accepted = false;
    if let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if !bytes.is_empty() {
            accepted = upload_image(&state.draft, slot, bytes.to_vec()).await;
        }
    }
    if !accepted {
        debug!("Upload for {slot} slot was not accepted");
    }
    Ok(Json(UploadResponse { slot, accepted }))
}

/// POST /api/v1/intake/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(values): Json<FormValues>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let draft = state.draft.lock().await.clone();
    let record = submit(state.store.as_ref(), values, &draft).await?;
    Ok(Json(record))
}

/// GET /prepare-cv
///
/// Leaving the form ends its session, so pending images are dropped.
pub async fn handle_navigate(State(state): State<AppState>) -> Redirect {
    state.draft.lock().await.clear();
    Redirect::to(DOCUMENT_ROUTE)
}

/// GET /export/cv_data.xlsx
pub async fn handle_export_spreadsheet(State(state): State<AppState>) -> Result<Response, AppError> {
    let Some(record) = state.store.get().await? else {
        debug!("Spreadsheet export skipped: no record stored");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let bytes = export::spreadsheet_bytes(record).await?;
    Ok(download(bytes, XLSX_CONTENT_TYPE, SPREADSHEET_FILE_NAME))
}

/// GET /export/cv_preview.pdf
///
/// The preview region only exists on the form page while a record is stored.
pub async fn handle_export_preview_pdf(State(state): State<AppState>) -> Result<Response, AppError> {
    let Some(record) = state.store.get().await? else {
        debug!("Preview PDF skipped: preview region not present");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let view = DocumentView::from_record(&record);
    let bytes = export::capture_pdf(state.capturer.clone(), view, PREVIEW_SCALE).await?;
    Ok(download(bytes, PDF_CONTENT_TYPE, PREVIEW_PDF_FILE_NAME))
}
