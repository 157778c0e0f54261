use std::sync::Arc;

use tokio::time::{Duration, interval};
use tracing::{debug, info};

use crate::metrics::TRACKED_CLIENTS;
use crate::rate_limit::AdmissionController;

// Periodically reclaim memory held for clients that went quiet
pub async fn idle_sweeper(admission: Arc<AdmissionController>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    info!(interval = ?sweep_interval, "Idle client sweeper started");

    loop {
        interval.tick().await;

        let dropped = admission.sweep();
        let tracked = admission.tracked_clients();
        TRACKED_CLIENTS.set(tracked as f64);

        if dropped > 0 {
            debug!(dropped, tracked, "Idle clients forgotten");
        }
    }
}
