pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;
pub mod jobs;

use std::sync::Arc;

use crate::app::classifier::Classifier;
use crate::infra::{db::Db, queue::QueueClient};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub queue: QueueClient,
    pub classifier: Arc<dyn Classifier>,
    pub service_token: Option<String>,
    pub max_content_bytes: usize,
}
