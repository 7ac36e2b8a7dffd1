use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::errors::AppError;
use crate::export::{self, download, DOCUMENT_PDF_FILE_NAME, DOCUMENT_SCALE, PDF_CONTENT_TYPE};
use crate::models::ApplicationRecord;
use crate::presentation::html::{render_document_page, render_missing_page, RenderMode};
use crate::presentation::view::DocumentView;
use crate::state::AppState;

const NO_RECORD: &str = "No CV record found";

async fn render_page(state: &AppState, mode: RenderMode) -> Result<Response, AppError> {
    match state.store.get().await? {
        Some(record) => {
            let view = DocumentView::from_record(&record);
            debug!(
                "Rendering document ({mode:?}, experience detail: {})",
                view.shows_experience_detail()
            );
            let with_logo = state.config.logo_path.is_some();
            Ok(Html(render_document_page(&view, mode, with_logo)).into_response())
        }
        None => Ok((StatusCode::NOT_FOUND, Html(render_missing_page())).into_response()),
    }
}

/// GET /cv
pub async fn handle_document(State(state): State<AppState>) -> Result<Response, AppError> {
    render_page(&state, RenderMode::Screen).await
}

/// GET /cv/print
pub async fn handle_print(State(state): State<AppState>) -> Result<Response, AppError> {
    render_page(&state, RenderMode::Print).await
}

/// GET /cv/cv.pdf
pub async fn handle_document_pdf(State(state): State<AppState>) -> Result<Response, AppError> {
    let record = state
        .store
        .get()
        .await?
        .ok_or_else(|| AppError::NotFound(NO_RECORD.to_string()))?;
    let view = DocumentView::from_record(&record);
    let bytes = export::capture_pdf(state.capturer.clone(), view, DOCUMENT_SCALE).await?;
    Ok(download(bytes, PDF_CONTENT_TYPE, DOCUMENT_PDF_FILE_NAME))
}

/// GET /api/v1/record
pub async fn handle_get_record(
    State(state): State<AppState>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let record = state
        .store
        .get()
        .await?
        .ok_or_else(|| AppError::NotFound(NO_RECORD.to_string()))?;
    Ok(Json(record))
}
