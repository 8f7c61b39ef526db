//! Metrics collection.
//!
//! # Metrics
//! - `hancock_http_requests_total` (counter): downstream calls by service, status
//! - `hancock_dispatch_total` (counter): submissions by ledger and signing path
//! - `hancock_socket_frames_total` (counter): frames by direction and kind
//! - `hancock_socket_frames_dropped_total` (counter): frames not sent or not parsed
//!
//! # Design Decisions
//! - Facade only: the embedding application installs a recorder if it wants one
//! - Without a recorder every call is a no-op

use metrics::counter;

pub fn record_http_request(service: &'static str, status: u16) {
    counter!("hancock_http_requests_total", "service" => service, "status" => status.to_string())
        .increment(1);
}

pub fn record_dispatch(dlt: &'static str, path: &'static str) {
    counter!("hancock_dispatch_total", "dlt" => dlt, "path" => path).increment(1);
}

pub fn record_socket_frame(direction: &'static str, kind: &str) {
    counter!("hancock_socket_frames_total", "direction" => direction, "kind" => kind.to_string())
        .increment(1);
}

pub fn record_frame_dropped(reason: &'static str) {
    counter!("hancock_socket_frames_dropped_total", "reason" => reason).increment(1);
}
