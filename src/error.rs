//! Unified error type.

use std::fmt;

use http::StatusCode;

/// What a failure maps to on the wire.
///
/// The pipeline does not distinguish more than the response needs to:
/// a missing-resource signal becomes `404`, everything else becomes `500`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A collaborator reported a missing resource (e.g. a file that does
    /// not exist). Responds with `404 Not Found`.
    NotFound,
    /// Any other failure inside the pipeline. Responds with
    /// `500 Internal Server Error`.
    Internal,
}

/// The error type returned by negi's fallible operations.
///
/// Middlewares return `Err(Error)` to abort the request; the dispatcher is
/// the single place that catches it, maps [`ErrorKind`] to a status code,
/// and writes the message as the response body. A middleware that wants
/// finer-grained handling catches its own errors and keeps the chain alive.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    /// A missing-resource failure. Maps to `404`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::NotFound, message: message.into(), source: None }
    }

    /// Any other pipeline failure. Maps to `500`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Internal, message: message.into(), source: None }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message written verbatim as the error response body.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.source {
            Some(e) => Some(&**e),
            None => None,
        }
    }
}

/// `io::ErrorKind::NotFound` carries the missing-file signal through to a
/// `404`; every other I/O failure is a `500`.
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        let kind = match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        };
        Self { kind, message: e.to_string(), source: Some(Box::new(e)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_404() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::from(io);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "no such file");
    }

    #[test]
    fn other_io_maps_to_500() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn display_is_the_message() {
        assert_eq!(Error::internal("boom").to_string(), "boom");
    }
}
