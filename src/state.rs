use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::rate_limit::AdmissionController;

// app's shared state, built once and handed to every request
pub struct AppState {
    pub client: reqwest::Client,
    pub admission: Arc<AdmissionController>,
    pub chat_backend: String, // normalized base url
}

impl AppState {
    pub fn new(
        admission: Arc<AdmissionController>,
        chat_backend: String,
        upstream_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(upstream_timeout).build()?;
        Ok(Self { client, admission, chat_backend })
    }
}
