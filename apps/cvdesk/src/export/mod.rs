//! Export pipeline: spreadsheet, region capture, PDF wrapping.
//!
//! All encoders here are CPU-bound and synchronous; the async entry points run
//! them on the blocking pool.

pub mod capture;
pub mod pdf;
pub mod spreadsheet;

use std::sync::Arc;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::info;

use crate::models::ApplicationRecord;
use crate::presentation::view::DocumentView;
use capture::Capturer;

pub const SPREADSHEET_FILE_NAME: &str = "cv_data.xlsx";
pub const PREVIEW_PDF_FILE_NAME: &str = "cv_preview.pdf";
pub const DOCUMENT_PDF_FILE_NAME: &str = "cv.pdf";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Device pixels per CSS pixel for the intake page preview PDF.
pub const PREVIEW_SCALE: f32 = 1.0;
/// Device pixels per CSS pixel for the document page PDF.
pub const DOCUMENT_SCALE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No font configured for document capture")]
    FontUnavailable,

    #[error("Captured region has no pixels")]
    EmptyRaster,

    #[error("Export task failed: {0}")]
    Task(String),
}

/// Builds the one-sheet workbook for `record`.
pub async fn spreadsheet_bytes(record: ApplicationRecord) -> Result<Vec<u8>, ExportError> {
    let bytes = tokio::task::spawn_blocking(move || spreadsheet::build_workbook(&record))
        .await
        .map_err(|e| ExportError::Task(e.to_string()))??;
    info!("Spreadsheet exported ({} bytes)", bytes.len());
    Ok(bytes)
}

/// Captures the document container at `scale` and wraps it in a one-page A4 PDF.
pub async fn capture_pdf(
    capturer: Arc<Capturer>,
    view: DocumentView,
    scale: f32,
) -> Result<Vec<u8>, ExportError> {
    let bytes = tokio::task::spawn_blocking(move || {
        let raster = capturer.capture(&view, scale)?;
        pdf::wrap_raster(&raster)
    })
    .await
    .map_err(|e| ExportError::Task(e.to_string()))??;
    info!("PDF exported at scale {scale} ({} bytes)", bytes.len());
    Ok(bytes)
}

/// Response that makes the browser save `bytes` as `file_name`.
pub fn download(bytes: Vec<u8>, content_type: &'static str, file_name: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
