//! Image uploads: file bytes → data URI, held in the transient draft until the
//! form is opened afresh.

use image::ImageFormat;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::data_uri;
use crate::models::ImageSlot;

/// Images picked on the intake form but not yet written to the record.
/// Kept across submits, so re-registering repeats the same record. Cleared
/// when a new form session starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDraft {
    pub large: Option<String>,
    pub small: Option<String>,
}

impl ImageDraft {
    pub fn get(&self, slot: ImageSlot) -> Option<&str> {
        match slot {
            ImageSlot::Large => self.large.as_deref(),
            ImageSlot::Small => self.small.as_deref(),
        }
    }

    pub fn set(&mut self, slot: ImageSlot, uri: String) {
        match slot {
            ImageSlot::Large => self.large = Some(uri),
            ImageSlot::Small => self.small = Some(uri),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        _ => None,
    }
}

/// Turns uploaded bytes into a data URI. The format is sniffed from content
/// and the image must decode; `None` otherwise.
pub fn decode_image_upload(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let format = match image::guess_format(bytes) {
        Ok(format) => format,
        Err(e) => {
            debug!("Upload is not a recognised image: {e}");
            return None;
        }
    };
    let Some(mime) = mime_for(format) else {
        debug!("Upload format {format:?} is not accepted");
        return None;
    };
    if let Err(e) = image::load_from_memory_with_format(bytes, format) {
        debug!("Upload could not be decoded as {mime}: {e}");
        return None;
    }
    Some(data_uri::encode(mime, bytes))
}

/// [`decode_image_upload`] on the blocking pool.
pub async fn decode_upload(bytes: Vec<u8>) -> Option<String> {
    tokio::task::spawn_blocking(move || decode_image_upload(&bytes))
        .await
        .unwrap_or_else(|e| {
            debug!("Image decode task failed: {e}");
            None
        })
}

/// Stores an uploaded image in `slot`. A rejected file leaves the slot as it
/// was. Returns whether the file was accepted.
pub async fn upload_image(draft: &Mutex<ImageDraft>, slot: ImageSlot, bytes: Vec<u8>) -> bool {
    let size = bytes.len();
    match decode_upload(bytes).await {
        Some(uri) => {
            draft.lock().await.set(slot, uri);
            info!("Image stored in {slot} slot ({size} bytes)");
            true
        }
        None => false,
    }
}
