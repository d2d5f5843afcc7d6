use reqwest::{Method, StatusCode};
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Parse a configured log level, falling back to INFO.
pub fn parse_level(log_level: &str) -> Level {
    match log_level.to_uppercase().as_str() {
        "TRACE" => Level::TRACE,
        "DEBUG" => Level::DEBUG,
        "INFO" => Level::INFO,
        "WARN" | "WARNING" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO", log_level);
            Level::INFO
        }
    }
}

/// Initialize structured logging with JSON or plain output
pub fn init_logging(log_level: &str, log_format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let level = parse_level(log_level);

    // Configured level wins over RUST_LOG
    let filter_string = format!("condo_console={},reqwest=warn,hyper=warn", level);
    let env_filter = tracing_subscriber::EnvFilter::new(filter_string);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match log_format.to_lowercase().as_str() {
        "json" => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_writer(std::io::stderr);

            subscriber.with(json_layer).try_init()?;
        }
        "plain" | "text" => {
            let plain_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr);

            subscriber.with(plain_layer).try_init()?;
        }
        _ => {
            eprintln!("Invalid log format '{}', defaulting to plain", log_format);
            let plain_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr);

            subscriber.with(plain_layer).try_init()?;
        }
    }

    tracing::debug!(
        log_level = %log_level,
        log_format = %log_format,
        "logging initialized"
    );

    Ok(())
}

/// Correlation and timing for one outgoing API request.
pub struct RequestLog {
    correlation_id: Uuid,
    method: Method,
    endpoint: String,
    started: Instant,
}

impl RequestLog {
    pub fn start(method: &Method, endpoint: &str) -> Self {
        let log = Self {
            correlation_id: Uuid::new_v4(),
            method: method.clone(),
            endpoint: endpoint.to_string(),
            started: Instant::now(),
        };

        tracing::debug!(
            correlation_id = %log.correlation_id,
            method = %log.method,
            endpoint = %log.endpoint,
            "outgoing request"
        );

        log
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn completed(&self, status: StatusCode) {
        tracing::debug!(
            correlation_id = %self.correlation_id,
            method = %self.method,
            endpoint = %self.endpoint,
            status = %status,
            duration_ms = self.started.elapsed().as_millis() as u64,
            "request completed"
        );
    }

    pub fn failed(&self, error: &reqwest::Error) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            method = %self.method,
            endpoint = %self.endpoint,
            error = %error,
            duration_ms = self.started.elapsed().as_millis() as u64,
            "request failed"
        );
    }
}
