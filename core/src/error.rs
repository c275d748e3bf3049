//! Error types for request construction.
//!
//! # Design
//! Only URL parsing can fail while building a request, and that failure is
//! surfaced as-is. Executor failures never pass through here: they reach the
//! completion callback in the executor's own error type. Envelope and
//! attachment extraction never fail; they degrade to pass-through results.

use thiserror::Error;

/// Errors returned by `RequestBuilder::build` and `Transport::send`.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The target URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_errors_convert() {
        let err: BuildError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, BuildError::InvalidUrl(url::ParseError::RelativeUrlWithoutBase)));
        assert!(err.to_string().starts_with("invalid url:"));
    }
}
