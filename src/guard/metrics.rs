use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static::lazy_static! {
    pub static ref POOL_INITIALIZATIONS: IntCounter = register_int_counter!(
        "dbcp_pool_initializations_total",
        "Number of guarded pools realized on first acquisition"
    ).unwrap();

    pub static ref ACQUISITIONS: IntCounterVec = register_int_counter_vec!(
        "dbcp_acquisitions_total",
        "Connection acquisitions through a guarded pool",
        &["outcome"]
    ).unwrap();
}

pub fn inc_initialized() {
    POOL_INITIALIZATIONS.inc();
}

pub fn inc_acquired(outcome: &str) {
    ACQUISITIONS.with_label_values(&[outcome]).inc();
}
