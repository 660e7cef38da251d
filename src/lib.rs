pub mod admission;
pub mod app;
pub mod budget;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod questions;
pub mod scoring;
pub mod state;
pub mod storage;
pub mod tips;
pub mod trends;

pub use app::router;
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};
