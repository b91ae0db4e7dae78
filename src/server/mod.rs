//! HTTP front end for the file store.

pub mod auth;
pub mod dto;
pub mod error;
pub mod routes;
pub mod upload;

use std::sync::Arc;

use crate::core::config::Credentials;
use crate::services::fs::PathScopedFileStore;

pub use error::ApiError;
pub use routes::router;

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<PathScopedFileStore>,
    pub credentials: Option<Arc<Credentials>>,
}

impl AppState {
    pub fn new(store: PathScopedFileStore, credentials: Option<Credentials>) -> Self {
        Self {
            store: Arc::new(store),
            credentials: credentials.map(Arc::new),
        }
    }
}
