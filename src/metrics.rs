use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gateway_requests_total", "Requests subject to admission control")
            .unwrap();
    pub static ref ADMISSIONS: Counter =
        register_counter!("gateway_admissions_total", "Requests admitted").unwrap();
    pub static ref DENIALS: CounterVec = register_counter_vec!(
        "gateway_denials_total",
        "Requests denied, by policy",
        &["reason"]
    )
    .unwrap();
    pub static ref HIGH_LOAD: Gauge =
        register_gauge!("gateway_high_load", "1 while aggregate load is above threshold")
            .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("gateway_tracked_clients", "Client keys held by the admission controller")
            .unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "gateway_upstream_latency_seconds",
        "Chat backend latency in seconds"
    )
    .unwrap();
}
