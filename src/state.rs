use crate::models::AppData;
use crate::tips::TipService;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared handle to the store and collaborators. The `data` mutex is
/// the serialization point for the admission policy: check-then-record
/// happens under one lock of it.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub tips: Arc<dyn TipService>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, tips: Arc<dyn TipService>) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            tips,
        }
    }
}
