use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("warbot.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("warbot.client.request_errors");
pub(crate) static CLIENT_REQUEST_RETRIES: Counter = Counter::new("warbot.client.retries");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("warbot.client.request_duration_seconds");
pub(crate) static CLIENT_RETRY_BACKOFF: Moments =
    Moments::new("warbot.client.retry_backoff_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("warbot.stream.chunks");
pub(crate) static STREAM_UNKNOWN_CHUNKS: Counter = Counter::new("warbot.stream.unknown_chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("warbot.stream.errors");

pub(crate) static SESSION_TURNS: Counter = Counter::new("warbot.session.turns");
pub(crate) static SESSION_FAILED_TURNS: Counter = Counter::new("warbot.session.failed_turns");
pub(crate) static SESSION_TURN_REQUESTS: Counter = Counter::new("warbot.session.turn_requests");
pub(crate) static SESSION_TURN_DURATION: Moments =
    Moments::new("warbot.session.turn_duration_seconds");

pub(crate) static TOOL_CALLS: Counter = Counter::new("warbot.tools.calls");
pub(crate) static TOOL_ERRORS: Counter = Counter::new("warbot.tools.errors");
pub(crate) static TOOL_DURATION: Moments = Moments::new("warbot.tools.duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_REQUEST_RETRIES);
    collector.register_moments(&CLIENT_REQUEST_DURATION);
    collector.register_moments(&CLIENT_RETRY_BACKOFF);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_UNKNOWN_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_FAILED_TURNS);
    collector.register_counter(&SESSION_TURN_REQUESTS);
    collector.register_moments(&SESSION_TURN_DURATION);

    collector.register_counter(&TOOL_CALLS);
    collector.register_counter(&TOOL_ERRORS);
    collector.register_moments(&TOOL_DURATION);
}
