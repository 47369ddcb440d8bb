//! Log setup for the command line tool and helpers for logging request
//! bodies.

use std::{fmt::Display, fs::OpenOptions, path::Path, sync::Arc};

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::Error;

/// Install the global tracing subscriber.
///
/// Logs at `info` and above go to stdout. If `log_file` is given, logs at
/// `debug` and above are also appended to it. `RUST_LOG` can narrow either
/// further.
///
/// # Errors
///
/// Returns an [Error::Storage] if the log file cannot be opened.
pub fn setup_logging(log_file: Option<&Path>) -> Result<(), Error> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(filter::LevelFilter::INFO);

    let debug_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(filter::LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(stdout_log)
        .with(debug_log)
        .init();

    Ok(())
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log a request body sent to `url`.
///
/// Bodies longer than [LOG_BODY_LENGTH_LIMIT] bytes are truncated at the
/// `info` level and logged in full at the `debug` level.
pub(crate) fn log_request_body(url: impl Display, body: &str) {
    let truncated = truncate(body, LOG_BODY_LENGTH_LIMIT);

    if truncated.len() < body.len() {
        tracing::info!("Sending request to {url}\nbody: {truncated}...");
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Sending request to {url}\nbody: {body:?}");
    }
}

/// The longest prefix of `text` that is at most `limit` bytes and ends on a
/// character boundary.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate("action=delete", 64), "action=delete");
    }

    #[test]
    fn long_text_is_cut_at_limit() {
        let text = "a".repeat(100);

        assert_eq!(truncate(&text, 64).len(), 64);
    }

    #[test]
    fn cut_never_splits_a_character() {
        assert_eq!(truncate("ab\u{e5}c", 3), "ab");
    }
}
