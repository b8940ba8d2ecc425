use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};
use std::time::Instant;

lazy_static! {
    /// Completed RPCs segmented by method and status code.
    pub static ref FORUM_GRPC_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "forum_grpc_requests_total",
        "Completed forum RPCs segmented by method and status code",
        &["method", "code"]
    )
    .expect("failed to register forum_grpc_requests_total");

    pub static ref FORUM_GRPC_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "forum_grpc_request_duration_seconds",
        "Forum RPC latency segmented by method",
        &["method"]
    )
    .expect("failed to register forum_grpc_request_duration_seconds");
}

/// Records one RPC. Dropping the guard without calling [`RequestGuard::finish`]
/// counts the call as `CANCELLED`.
pub struct RequestGuard {
    method: &'static str,
    started: Instant,
    recorded: bool,
}

impl RequestGuard {
    pub fn new(method: &'static str) -> Self {
        Self {
            method,
            started: Instant::now(),
            recorded: false,
        }
    }

    /// Record the outcome and pass the result through.
    pub fn finish<T>(mut self, result: Result<T, tonic::Status>) -> Result<T, tonic::Status> {
        let code = match &result {
            Ok(_) => tonic::Code::Ok,
            Err(status) => status.code(),
        };
        self.record(code);
        result
    }

    fn record(&mut self, code: tonic::Code) {
        if self.recorded {
            return;
        }
        self.recorded = true;
        FORUM_GRPC_REQUESTS_TOTAL
            .with_label_values(&[self.method, code_label(code)])
            .inc();
        FORUM_GRPC_REQUEST_DURATION_SECONDS
            .with_label_values(&[self.method])
            .observe(self.started.elapsed().as_secs_f64());
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.record(tonic::Code::Cancelled);
    }
}

fn code_label(code: tonic::Code) -> &'static str {
    match code {
        tonic::Code::Ok => "OK",
        tonic::Code::InvalidArgument => "INVALID_ARGUMENT",
        tonic::Code::NotFound => "NOT_FOUND",
        tonic::Code::AlreadyExists => "ALREADY_EXISTS",
        tonic::Code::FailedPrecondition => "FAILED_PRECONDITION",
        tonic::Code::Cancelled => "CANCELLED",
        tonic::Code::Internal => "INTERNAL",
        _ => "OTHER",
    }
}
