//! Metric names and instruments for relayed chat completions

use std::sync::OnceLock;
use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram};

pub const RELAY_REQUEST_COUNT: &str = "rolebridge.relay.request.count";
pub const RELAY_STREAM_DURATION: &str = "rolebridge.relay.stream.duration";
pub const RELAY_TIME_TO_FIRST_BYTE: &str = "rolebridge.relay.time_to_first_byte";
pub const RELAY_BYTES: &str = "rolebridge.relay.bytes";

/// Instruments recorded once per finished stream session
pub struct RelayMetrics {
    requests: Counter<u64>,
    stream_duration: Histogram<f64>,
    time_to_first_byte: Histogram<f64>,
    bytes: Counter<u64>,
}

impl RelayMetrics {
    /// Process-wide instruments from the global meter provider
    ///
    /// Without an exporter configured the global provider is a no-op,
    /// so recording is always safe.
    pub fn global() -> &'static Self {
        static METRICS: OnceLock<RelayMetrics> = OnceLock::new();

        METRICS.get_or_init(|| {
            let meter = opentelemetry::global::meter("rolebridge");
            Self {
                requests: meter.u64_counter(RELAY_REQUEST_COUNT).build(),
                stream_duration: meter
                    .f64_histogram(RELAY_STREAM_DURATION)
                    .with_unit("s")
                    .build(),
                time_to_first_byte: meter
                    .f64_histogram(RELAY_TIME_TO_FIRST_BYTE)
                    .with_unit("s")
                    .build(),
                bytes: meter.u64_counter(RELAY_BYTES).with_unit("By").build(),
            }
        })
    }

    /// Record the outcome of one dispatch
    pub fn record(
        &self,
        outcome: &'static str,
        duration: Duration,
        first_byte: Option<Duration>,
        bytes: u64,
    ) {
        let attributes = [KeyValue::new("outcome", outcome)];

        self.requests.add(1, &attributes);
        self.stream_duration.record(duration.as_secs_f64(), &attributes);
        if let Some(first_byte) = first_byte {
            self.time_to_first_byte.record(first_byte.as_secs_f64(), &attributes);
        }
        self.bytes.add(bytes, &attributes);
    }
}
