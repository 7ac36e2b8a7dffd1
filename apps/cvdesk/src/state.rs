use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::export::capture::Capturer;
use crate::intake::ImageDraft;
use crate::storage::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The persisted slot. Memory or file backend, chosen by `STORE_BACKEND`.
    pub store: Arc<dyn RecordStore>,
    /// Images picked on the form but not yet submitted (single session).
    pub draft: Arc<Mutex<ImageDraft>>,
    pub capturer: Arc<Capturer>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn RecordStore>, capturer: Capturer) -> Self {
        Self {
            store,
            draft: Arc::new(Mutex::new(ImageDraft::default())),
            capturer: Arc::new(capturer),
            config,
        }
    }
}
