//! Per-call debug logging, routed through the `log` facade

use crate::types::DebugOptions;

const TARGET: &str = "geosearch";

fn enabled(options: &Option<DebugOptions>) -> Option<&DebugOptions> {
    options.as_ref().filter(|opts| opts.enabled)
}

/// Log a message if debugging is enabled
pub fn log(options: &Option<DebugOptions>, message: &str, data: &str) {
    if enabled(options).is_some() {
        log::info!(target: TARGET, "{message}: {data}");
    }
}

/// Log an outgoing request if request logging is enabled
pub fn log_request(options: &Option<DebugOptions>, provider: &str, url: &str) {
    if enabled(options).is_some_and(|opts| opts.log_requests) {
        log::debug!(target: TARGET, "REQUEST [{provider}] GET {url}");
    }
}

/// Log a response summary if response logging is enabled
pub fn log_response(options: &Option<DebugOptions>, provider: &str, message: &str) {
    if enabled(options).is_some_and(|opts| opts.log_responses) {
        log::debug!(target: TARGET, "RESPONSE [{provider}] {message}");
    }
}

/// Map a `-d` count from the command line to debug options.
///
/// `0` disables logging, `1` logs requests, `2` and above also log responses.
pub fn from_verbosity(level: u8) -> DebugOptions {
    DebugOptions {
        enabled: level > 0,
        log_requests: level > 0,
        log_responses: level > 1,
    }
}
