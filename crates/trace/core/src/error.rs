//! Error types for building and installing trace interceptors

/// Errors raised while configuring or installing a [`TraceInterceptor`](crate::TraceInterceptor)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    /// The namespace path had no segments
    #[error("Namespace is empty")]
    EmptyNamespace,

    /// A namespace segment was empty or not an identifier
    #[error("Invalid segment {segment:?} in namespace {path:?}")]
    InvalidSegment {
        /// Full path as given
        path: String,
        /// Offending segment
        segment: String,
    },

    /// An excluded sub-namespace does not lie under the root namespace
    #[error("Excluded namespace {excluded} is not inside {root}")]
    ExcludedOutsideRoot {
        /// Root namespace
        root: String,
        /// Excluded namespace
        excluded: String,
    },

    /// A process-wide interceptor was already installed
    #[error("A trace interceptor is already installed for this process")]
    AlreadyInstalled,
}

impl TraceError {
    /// Create a new invalid segment error
    pub fn invalid_segment(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::InvalidSegment {
            path: path.into(),
            segment: segment.into(),
        }
    }
}

/// Failure reported by a [`DiagnosticSink`](crate::DiagnosticSink)
///
/// Sink failures never reach the traced call; the interceptor drops the line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The sink cannot accept lines right now
    #[error("Diagnostic sink unavailable")]
    Unavailable,

    /// Writing the line failed
    #[error("Failed to write trace line: {0}")]
    Write(String),
}

impl SinkError {
    /// Create a new write error
    pub fn write<S: Into<String>>(message: S) -> Self {
        Self::Write(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TraceError::invalid_segment("a::::b", "");
        assert_eq!(err.to_string(), "Invalid segment \"\" in namespace \"a::::b\"");

        let err = TraceError::ExcludedOutsideRoot {
            root: "com::example::lib".to_string(),
            excluded: "com::other".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Excluded namespace com::other is not inside com::example::lib"
        );

        assert_eq!(
            SinkError::write("disk full").to_string(),
            "Failed to write trace line: disk full"
        );
    }
}
